//! Read-side status aggregation.
//!
//! Nothing is cached: every request recomputes the summary from the last
//! 24 hours of observations.

pub mod aggregator;

pub use aggregator::{HISTORY_POINTS, STATUS_WINDOW_HOURS, StatusAggregator, StatusError, TargetStatus, aggregate};
