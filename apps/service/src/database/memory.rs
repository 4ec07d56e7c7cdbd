use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::StoreError;
use super::repository::ObservationStore;
use crate::monitoring::types::{NewObservation, Observation};

/// In-process observation log for tests.
///
/// `set_unavailable(true)` makes every operation fail, which is how tests
/// exercise the store-failure paths.
#[derive(Default)]
pub struct MemoryStore {
    observations: Mutex<Vec<Observation>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Everything appended so far, in insertion order
    pub fn snapshot(&self) -> Vec<Observation> {
        self.observations.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObservationStore for MemoryStore {
    async fn append(&self, observation: &NewObservation) -> Result<i64, StoreError> {
        self.check_available()?;

        let mut observations = self
            .observations
            .lock()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        let id = observations.last().map_or(1, |last| last.id + 1);
        observations.push(Observation {
            id,
            url: observation.url.clone(),
            status: observation.status,
            timestamp: observation.timestamp,
        });

        Ok(id)
    }

    async fn query_since(&self, since: DateTime<Utc>) -> Result<Vec<Observation>, StoreError> {
        self.check_available()?;

        let mut matching: Vec<Observation> = self
            .observations
            .lock()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?
            .iter()
            .filter(|o| o.timestamp > since)
            .cloned()
            .collect();

        // Stable sort keeps insertion order among equal timestamps
        matching.sort_by_key(|o| o.timestamp);
        Ok(matching)
    }
}
