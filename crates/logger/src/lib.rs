//! Shared tracing setup for the pingboard binaries.

mod subscriber;

pub use subscriber::{LogFormat, init as init_tracing};
