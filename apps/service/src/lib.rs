//! Uptime monitoring service.
//!
//! A background prober checks a fixed list of targets and appends one
//! observation per target per cycle; the HTTP API aggregates the last 24 hours
//! of observations into a status view on every request.

pub mod config;
pub mod database;
pub mod error;
pub mod monitoring;
pub mod orchestrator;
pub mod pool;
pub mod registry;
pub mod routes;
pub mod status;

pub use config::Config;
pub use error::{ApiError, AppError};
pub use orchestrator::Orchestrator;
