//! Core clock trait for the playback runner.

use async_trait::async_trait;
use std::time::{Duration, SystemTime};

/// The central interface for time.
///
/// This trait abstracts the "real world" so that the playback runner can be
/// paced by a real timer or replayed instantly against a virtual clock.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`
/// - **Simulation**: `SimContext` (in `lorenz_sim`) - manually advanced clock
#[async_trait]
pub trait PlaybackContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    ///
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time used to stamp exported frames.
    fn system_time(&self) -> SystemTime;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances virtual clock
    async fn sleep(&self, duration: Duration);

    /// Returns true if time is virtual (sleep does not block).
    fn is_virtual(&self) -> bool;
}
