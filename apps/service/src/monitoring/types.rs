use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Status value stored and reported for a failed probe.
pub const FAILURE_SENTINEL: i64 = -1;

/// Outcome of a single probe.
///
/// Flattened to a plain integer at the storage and API boundary: the latency in
/// milliseconds, or [`FAILURE_SENTINEL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ProbeOutcome {
    Success { latency_ms: u64 },
    Failure,
}

impl ProbeOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }

    pub fn latency_ms(self) -> Option<u64> {
        match self {
            ProbeOutcome::Success { latency_ms } => Some(latency_ms),
            ProbeOutcome::Failure => None,
        }
    }

    /// Integer form used in the `status` column and the JSON payload.
    pub fn as_status(self) -> i64 {
        self.into()
    }
}

impl From<ProbeOutcome> for i64 {
    fn from(outcome: ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Success { latency_ms } => i64::try_from(latency_ms).unwrap_or(i64::MAX),
            ProbeOutcome::Failure => FAILURE_SENTINEL,
        }
    }
}

impl From<i64> for ProbeOutcome {
    /// Any negative value reads back as a failure.
    fn from(status: i64) -> Self {
        match u64::try_from(status) {
            Ok(latency_ms) => ProbeOutcome::Success { latency_ms },
            Err(_) => ProbeOutcome::Failure,
        }
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeOutcome::Success { latency_ms } => write!(f, "up ({latency_ms}ms)"),
            ProbeOutcome::Failure => write!(f, "down"),
        }
    }
}

/// An observation about to be appended to the store.
///
/// Timestamps are kept at millisecond resolution, the precision of the
/// `pings.timestamp` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewObservation {
    pub url: String,
    pub status: ProbeOutcome,
    pub timestamp: DateTime<Utc>,
}

impl NewObservation {
    pub fn new(url: impl Into<String>, status: ProbeOutcome, timestamp: DateTime<Utc>) -> Self {
        Self { url: url.into(), status, timestamp: timestamp.trunc_subsecs(3) }
    }
}

/// A stored probe result, echoed as-is in the status payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Store-assigned, monotonically increasing
    pub id: i64,
    pub url: String,
    pub status: ProbeOutcome,
    pub timestamp: DateTime<Utc>,
}
