use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use super::checker::Checker;
use super::types::{NewObservation, ProbeOutcome};
use crate::database::ObservationStore;
use crate::registry::{Target, TargetRegistry};

/// Tally of one probe cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub probed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub write_errors: usize,
}

/// Probes every registered target once per cycle and records the outcomes.
///
/// The prober is the only writer of the observation store.
pub struct Prober {
    registry: Arc<TargetRegistry>,
    checker: Arc<dyn Checker>,
    store: Arc<dyn ObservationStore>,
}

impl Prober {
    pub fn new(
        registry: Arc<TargetRegistry>,
        checker: Arc<dyn Checker>,
        store: Arc<dyn ObservationStore>,
    ) -> Self {
        Self { registry, checker, store }
    }

    /// Run one cycle stamped with the current time
    pub async fn run_cycle(&self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle; every observation written carries `now`.
    ///
    /// Probes run concurrently, writes follow in registry order. Neither a
    /// failed probe nor a failed write stops the rest of the cycle.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> CycleReport {
        let targets = self.registry.targets();
        let outcomes = join_all(targets.iter().map(|target| self.probe(target))).await;

        let mut report = CycleReport { probed: targets.len(), ..CycleReport::default() };

        for (target, outcome) in targets.iter().zip(outcomes) {
            if outcome.is_success() {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }

            debug!("{} -> {}", target.url, outcome);
            let observation = NewObservation::new(target.url.clone(), outcome, now);
            if let Err(e) = self.store.append(&observation).await {
                error!("Failed to record observation for {}: {}", target.url, e);
                report.write_errors += 1;
            }
        }

        info!(
            "Probe cycle complete - {} targets, {} up, {} down, {} write errors",
            report.probed, report.succeeded, report.failed, report.write_errors
        );

        report
    }

    async fn probe(&self, target: &Target) -> ProbeOutcome {
        let start = Instant::now();

        match self.checker.check(&target.url).await {
            Ok(status_code) => {
                let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                debug!(target_id = %target.id, status_code, latency_ms, "Probe succeeded");
                ProbeOutcome::Success { latency_ms }
            }
            Err(e) => {
                warn!(target_id = %target.id, url = %target.url, "Probe failed: {}", e);
                ProbeOutcome::Failure
            }
        }
    }
}
