//! Error types for the traffic engine binary.

use traffic_sim::SessionError;
use traffic_sim::config::ConfigError;

/// Top-level error for the traffic engine binary.
///
/// Each variant wraps a subsystem error, so `main` can propagate any of
/// them with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A grid, persistence, or run-control operation failed.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: SessionError,
    },
}
