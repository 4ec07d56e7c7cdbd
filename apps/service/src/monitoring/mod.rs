/// Probing engine
///
/// This module is responsible for:
/// - Issuing bounded-timeout HTTP checks against targets
/// - Turning each check into a recorded observation
/// - Running probe cycles on a fixed schedule
pub mod checker;
pub mod prober;
pub mod scheduler;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use checker::{CheckError, Checker, HttpChecker};
pub use prober::{CycleReport, Prober};
pub use scheduler::ProbeScheduler;
pub use types::{FAILURE_SENTINEL, NewObservation, Observation, ProbeOutcome};
