use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::params;

use super::StoreError;
use super::models::{PingRow, timestamp_to_i64};
use crate::monitoring::types::{NewObservation, Observation};
use crate::pool::{LibsqlManager, LibsqlPool};

/// Append-only observation log shared by the prober and the status aggregator
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// Append one observation, returning its store-assigned id
    async fn append(&self, observation: &NewObservation) -> Result<i64, StoreError>;

    /// All observations strictly newer than `since`, oldest first.
    ///
    /// Observations sharing a timestamp come back in insertion order.
    async fn query_since(&self, since: DateTime<Utc>) -> Result<Vec<Observation>, StoreError>;
}

/// LibSQL database implementation
pub struct DatabaseImpl {
    pool: LibsqlPool,
}

impl DatabaseImpl {
    /// Create a new database instance from a pool
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>, StoreError> {
        self.pool.get().await.map_err(|e| StoreError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ObservationStore for DatabaseImpl {
    async fn append(&self, observation: &NewObservation) -> Result<i64, StoreError> {
        let conn = self.get_conn().await?;

        conn.execute(
            "INSERT INTO pings (url, status, timestamp) VALUES (?, ?, ?)",
            params![
                observation.url.clone(),
                observation.status.as_status(),
                timestamp_to_i64(observation.timestamp)
            ],
        )
        .await?;

        Ok(conn.last_insert_rowid())
    }

    async fn query_since(&self, since: DateTime<Utc>) -> Result<Vec<Observation>, StoreError> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare(
                "SELECT id, url, status, timestamp FROM pings WHERE timestamp > ? ORDER BY timestamp ASC, id ASC",
            )
            .await?;

        let mut rows = stmt.query(params![timestamp_to_i64(since)]).await?;
        let mut observations = Vec::new();

        while let Some(row) = rows.next().await? {
            let ping = PingRow {
                id: row.get(0)?,
                url: row.get(1)?,
                status: row.get(2)?,
                timestamp: row.get(3)?,
            };
            observations.push(Observation::try_from(ping)?);
        }

        Ok(observations)
    }
}
