//! Error type for the playback runner.

use lorenz_core::LorenzError;
use lorenz_env::EnvError;
use thiserror::Error;

/// Anything that can stop a playback run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Lorenz(#[from] LorenzError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Playback thread panicked")]
    PlaybackPanicked,
}

pub type SimResult<T> = Result<T, SimError>;
