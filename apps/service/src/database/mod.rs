/// Observation storage
///
/// The prober appends one row per target per cycle; the status aggregator
/// reads back a time window. Both sides go through [`ObservationStore`], which
/// is backed by LibSQL in production and by [`MemoryStore`] in tests.

pub mod memory;
pub mod migrations;
pub mod models;
pub mod repository;

pub use memory::MemoryStore;
pub use repository::{DatabaseImpl, ObservationStore};

use anyhow::Result;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to acquire database connection: {0}")]
    Connection(String),
    #[error("database operation failed: {0}")]
    Query(#[from] libsql::Error),
    #[error("malformed row {id}: {reason}")]
    Decode { id: i64, reason: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
