//! Error types for the playback environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Tick interval cannot be constructed (zero period, etc.)
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
}

impl EnvError {
    /// Creates an invalid-interval error.
    pub fn invalid_interval(msg: impl Into<String>) -> Self {
        Self::InvalidInterval(msg.into())
    }
}
