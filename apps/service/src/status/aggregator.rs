use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::database::{ObservationStore, StoreError};
use crate::monitoring::types::Observation;
use crate::registry::{Target, TargetRegistry};

/// Observations older than this many hours are ignored entirely
pub const STATUS_WINDOW_HOURS: i64 = 24;

/// Points kept in the per-target history (one hour at one probe per minute)
pub const HISTORY_POINTS: usize = 60;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("failed to query observations: {0}")]
    Query(#[from] StoreError),
}

/// Aggregated view of one target, as served to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStatus {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub is_up: bool,
    /// Last status as stored: latency in ms, `-1` after a failed probe, `0`
    /// without data.
    pub latency: i64,
    /// Percentage of successful probes in the window, rounded
    pub uptime: u8,
    /// Most recent observations, oldest first
    pub history: Vec<Observation>,
}

/// Computes per-target status from the observation window on every read.
pub struct StatusAggregator {
    registry: Arc<TargetRegistry>,
    store: Arc<dyn ObservationStore>,
}

impl StatusAggregator {
    pub fn new(registry: Arc<TargetRegistry>, store: Arc<dyn ObservationStore>) -> Self {
        Self { registry, store }
    }

    pub async fn summarize(&self) -> Result<Vec<TargetStatus>, StatusError> {
        self.summarize_at(Utc::now()).await
    }

    pub async fn summarize_at(&self, now: DateTime<Utc>) -> Result<Vec<TargetStatus>, StatusError> {
        let since = now - Duration::hours(STATUS_WINDOW_HOURS);
        let observations = self.store.query_since(since).await?;
        Ok(aggregate(self.registry.targets(), &observations))
    }
}

/// Summarize `observations` (ascending by timestamp) for every target, in
/// target order.
pub fn aggregate(targets: &[Target], observations: &[Observation]) -> Vec<TargetStatus> {
    let mut by_url: HashMap<&str, Vec<&Observation>> = HashMap::with_capacity(targets.len());
    for observation in observations {
        by_url.entry(observation.url.as_str()).or_default().push(observation);
    }

    targets
        .iter()
        .map(|target| {
            let history = by_url.get(target.url.as_str()).map(Vec::as_slice).unwrap_or_default();
            summarize_target(target, history)
        })
        .collect()
}

fn summarize_target(target: &Target, history: &[&Observation]) -> TargetStatus {
    let last = history.last();

    // No data yet counts as up
    let is_up = last.is_none_or(|o| o.status.is_success());
    let latency = last.map_or(0, |o| o.status.as_status());

    let successes = history.iter().filter(|o| o.status.is_success()).count();
    let recent = &history[history.len().saturating_sub(HISTORY_POINTS)..];

    TargetStatus {
        id: target.id.clone(),
        name: target.name.clone(),
        description: target.description.clone(),
        url: target.url.clone(),
        is_up,
        latency,
        uptime: uptime_percent(successes, history.len()),
        history: recent.iter().map(|&o| o.clone()).collect(),
    }
}

/// `round(100 * successes / total)` with halves rounded up; 100 when empty.
fn uptime_percent(successes: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let rounded = (200 * successes + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::monitoring::types::{NewObservation, ProbeOutcome};

    fn targets() -> Vec<Target> {
        vec![
            Target::new("a", "Site A", "first", "https://a"),
            Target::new("b", "Site B", "second", "https://b"),
        ]
    }

    fn observation(id: i64, url: &str, status: i64, timestamp: DateTime<Utc>) -> Observation {
        Observation { id, url: url.into(), status: ProbeOutcome::from(status), timestamp }
    }

    #[test]
    fn uptime_rounds_half_up() {
        assert_eq!(uptime_percent(0, 0), 100);
        assert_eq!(uptime_percent(7, 10), 70);
        assert_eq!(uptime_percent(1, 8), 13); // 12.5
        assert_eq!(uptime_percent(2, 3), 67);
        assert_eq!(uptime_percent(1, 3), 33);
        assert_eq!(uptime_percent(0, 5), 0);
        assert_eq!(uptime_percent(5, 5), 100);
    }

    #[test]
    fn target_without_observations_is_optimistically_up() {
        let summary = aggregate(&targets(), &[]);

        assert_eq!(summary.len(), 2);
        for status in &summary {
            assert!(status.is_up);
            assert_eq!(status.latency, 0);
            assert_eq!(status.uptime, 100);
            assert!(status.history.is_empty());
        }
    }

    #[test]
    fn output_follows_registry_order_and_metadata() {
        let now = Utc::now();
        let observations = vec![observation(1, "https://b", 10, now), observation(2, "https://a", 20, now)];

        let summary = aggregate(&targets(), &observations);
        let ids: Vec<_> = summary.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(summary[0].name, "Site A");
        assert_eq!(summary[0].description, "first");
        assert_eq!(summary[0].latency, 20);
        assert_eq!(summary[1].latency, 10);
    }

    #[test]
    fn unknown_urls_are_ignored() {
        let now = Utc::now();
        let summary = aggregate(&targets(), &[observation(1, "https://elsewhere", -1, now)]);
        assert!(summary.iter().all(|s| s.history.is_empty() && s.is_up));
    }

    #[test]
    fn last_failure_reports_sentinel_latency() {
        let now = Utc::now();
        // Ten observations, three failures, the last one failing
        let statuses = [100, -1, 110, 120, -1, 130, 140, 150, 160, -1];
        let observations: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(i, &status)| {
                observation(i as i64 + 1, "https://a", status, now - Duration::minutes(10 - i as i64))
            })
            .collect();

        let a = &aggregate(&targets(), &observations)[0];
        assert!(!a.is_up);
        assert_eq!(a.latency, -1);
        assert_eq!(a.uptime, 70);
        assert_eq!(a.history.len(), 10);
    }

    #[test]
    fn history_is_the_most_recent_suffix() {
        let now = Utc::now();
        let observations: Vec<_> = (0..150)
            .map(|i| observation(i + 1, "https://a", i, now - Duration::minutes(150 - i)))
            .collect();

        let a = &aggregate(&targets(), &observations)[0];
        assert_eq!(a.history.len(), HISTORY_POINTS);
        assert_eq!(a.history.first().map(|o| o.id), Some(91));
        assert_eq!(a.history.last().map(|o| o.id), Some(150));
        assert!(a.history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        // Uptime covers the full window, not just the visible tail
        assert_eq!(a.uptime, 100);
        assert_eq!(a.latency, 149);
    }

    #[test]
    fn is_up_tracks_last_observation_only() {
        let now = Utc::now();
        let observations = vec![
            observation(1, "https://a", -1, now - Duration::minutes(3)),
            observation(2, "https://a", -1, now - Duration::minutes(2)),
            observation(3, "https://a", 80, now - Duration::minutes(1)),
        ];

        let a = &aggregate(&targets(), &observations)[0];
        assert!(a.is_up);
        assert_eq!(a.latency, 80);
        assert_eq!(a.uptime, 33);
    }

    #[tokio::test]
    async fn single_recent_observation() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        store
            .append(&NewObservation::new(
                "https://a",
                ProbeOutcome::Success { latency_ms: 120 },
                now - Duration::minutes(1),
            ))
            .await
            .unwrap();

        let registry = Arc::new(TargetRegistry::new(vec![Target::new("a", "A", "", "https://a")]).unwrap());
        let aggregator = StatusAggregator::new(registry, store);

        let summary = aggregator.summarize_at(now).await.unwrap();
        assert_eq!(summary.len(), 1);
        assert!(summary[0].is_up);
        assert_eq!(summary[0].latency, 120);
        assert_eq!(summary[0].uptime, 100);
        assert_eq!(summary[0].history.len(), 1);
    }

    #[tokio::test]
    async fn observations_outside_window_are_excluded() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        store
            .append(&NewObservation::new("https://a", ProbeOutcome::Failure, now - Duration::hours(25)))
            .await
            .unwrap();
        // Exactly on the boundary is also out
        store
            .append(&NewObservation::new("https://a", ProbeOutcome::Failure, now - Duration::hours(STATUS_WINDOW_HOURS)))
            .await
            .unwrap();

        let registry = Arc::new(TargetRegistry::new(vec![Target::new("a", "A", "", "https://a")]).unwrap());
        let aggregator = StatusAggregator::new(registry, store);

        let a = &aggregator.summarize_at(now).await.unwrap()[0];
        assert!(a.is_up);
        assert_eq!(a.latency, 0);
        assert_eq!(a.uptime, 100);
        assert!(a.history.is_empty());
    }

    #[tokio::test]
    async fn repeated_reads_are_identical() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        for (i, outcome) in [ProbeOutcome::Success { latency_ms: 5 }, ProbeOutcome::Failure].into_iter().enumerate() {
            store
                .append(&NewObservation::new("https://b", outcome, now - Duration::minutes(i as i64 + 1)))
                .await
                .unwrap();
        }

        let registry = Arc::new(TargetRegistry::new(targets()).unwrap());
        let aggregator = StatusAggregator::new(registry, store);

        let first = aggregator.summarize_at(now).await.unwrap();
        let second = aggregator.summarize_at(now).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn store_failure_is_not_an_empty_summary() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let registry = Arc::new(TargetRegistry::new(targets()).unwrap());
        let aggregator = StatusAggregator::new(registry, store);

        assert!(matches!(aggregator.summarize().await, Err(StatusError::Query(_))));
    }
}
