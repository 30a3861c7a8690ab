//! Lorenz Core - Trajectory Generation and Windowed Playback
//!
//! This library has two halves:
//! 1. **Trajectory Generator**: integrates the Lorenz system once with an
//!    adaptive Runge-Kutta 5(4) solver (numeris `RKTS54`) and samples it on a fixed time grid
//! 2. **Windowed Playback Driver**: walks a cursor over the frozen trajectory,
//!    emitting one bounded x/y window per tick and wrapping at the end

pub mod config;
pub mod error;
pub mod lorenz;
pub mod playback;
pub mod solver;
pub mod trajectory;

#[cfg(feature = "dashboard")]
pub mod dashboard;

// Re-export key types for convenience
pub use config::{LorenzConfig, PlaybackConfig};
pub use error::{LorenzError, LorenzResult};
pub use lorenz::LorenzParams;
pub use playback::{tick, DisplayWindow, FrameUpdate, PlaybackDriver, PlaybackStore, TraceBuffer};
pub use solver::{integrate, SolverConfig, SolverStats};
pub use trajectory::{generate, linspace, Trajectory};
