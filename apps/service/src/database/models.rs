use chrono::{DateTime, Utc};

use super::StoreError;
use crate::monitoring::types::{Observation, ProbeOutcome};

/// Convert a timestamp to the Unix milliseconds stored in `pings.timestamp`
pub fn timestamp_to_i64(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Convert stored Unix milliseconds back to a timestamp
pub fn i64_to_timestamp(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Raw `pings` row as read from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingRow {
    pub id: i64,
    pub url: String,
    pub status: i64,
    pub timestamp: i64,
}

impl TryFrom<PingRow> for Observation {
    type Error = StoreError;

    fn try_from(row: PingRow) -> Result<Self, Self::Error> {
        let timestamp = i64_to_timestamp(row.timestamp).ok_or_else(|| StoreError::Decode {
            id: row.id,
            reason: format!("timestamp {} out of range", row.timestamp),
        })?;

        Ok(Observation { id: row.id, url: row.url, status: ProbeOutcome::from(row.status), timestamp })
    }
}
