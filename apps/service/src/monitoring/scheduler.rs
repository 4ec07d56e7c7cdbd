use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use super::prober::Prober;

/// Drives the prober on a fixed period.
pub struct ProbeScheduler {
    prober: Arc<Prober>,
    period: Duration,
}

impl ProbeScheduler {
    pub fn new(prober: Arc<Prober>, period: Duration) -> Self {
        Self { prober, period }
    }

    /// Start the timer loop. The first cycle runs immediately.
    ///
    /// Each cycle is spawned on its own task so a slow cycle never holds back
    /// the next tick; overlapping cycles are allowed.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut timer = interval(self.period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!("Probe scheduler started (every {:?})", self.period);

            loop {
                timer.tick().await;

                let prober = Arc::clone(&self.prober);
                tokio::spawn(async move {
                    prober.run_cycle().await;
                });
            }
        })
    }
}
