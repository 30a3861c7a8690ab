//! Error types for trajectory generation and playback.

use thiserror::Error;

/// Errors produced by the Lorenz core.
#[derive(Debug, Error)]
pub enum LorenzError {
    /// Solver failed to converge, ran out of steps, or produced non-finite values
    #[error("Integration failed at t={t}: {reason}")]
    Integration { t: f64, reason: String },

    /// Playback was asked to window a zero-length trajectory
    #[error("Playback requires a non-empty trajectory")]
    EmptyTrajectory,

    /// Configuration or input validation failed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LorenzError {
    /// Creates an integration error at solver time `t`.
    pub fn integration(t: f64, reason: impl Into<String>) -> Self {
        Self::Integration {
            t,
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

pub type LorenzResult<T> = Result<T, LorenzError>;
