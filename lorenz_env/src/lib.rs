//! Lorenz Playback Environment Abstraction Layer
//!
//! This crate provides the clock abstraction that lets the playback runner
//! drive ticks against either **wall-clock** time (tokio) or a **virtual**
//! clock (deterministic headless runs and tests).
//!
//! # Core Concept: The Timer Collaborator
//!
//! The playback core never sleeps or reads the time itself. Everything that
//! depends on time goes through a [`PlaybackContext`]:
//! - Time (`now()`, `system_time()`)
//! - Pacing (`sleep()`)
//!
//! A bounded [`Interval`] on top of the context produces the periodic tick
//! signal (increasing tick count, fixed maximum number of ticks).
//!
//! # Example
//!
//! ```ignore
//! use lorenz_env::{Interval, PlaybackContext, TokioContext};
//! use std::time::Duration;
//!
//! async fn animate<Ctx: PlaybackContext>(ctx: &Ctx) -> Result<(), lorenz_env::EnvError> {
//!     let mut interval = Interval::new(Duration::from_millis(25), 400)?;
//!     while let Some(tick) = interval.tick(ctx).await {
//!         render(tick);
//!     }
//!     Ok(())
//! }
//! ```

mod context;
mod error;
mod interval;
mod tokio_impl;

pub use context::PlaybackContext;
pub use error::EnvError;
pub use interval::Interval;
pub use tokio_impl::TokioContext;
