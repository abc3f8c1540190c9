//! Shared utilities for the staking vault.

pub mod duration;
pub mod logging;

pub use duration::format_duration;
pub use logging::{init_logging, LogFormat};
pub use tracing_subscriber::util::TryInitError;
