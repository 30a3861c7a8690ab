//! Lorenz Playback Runner
//!
//! Wires the core together into one run:
//!
//! ```text
//!  LorenzConfig ──► startup() ──► Arc<Trajectory>
//!                                      │
//!  PlaybackContext ──► Interval ──► PlaybackRunner ──► FrameSink
//!  (tokio | virtual)   (N ticks)    (cursor owner)     (dashboard, export, rerun)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use lorenz_sim::{startup, PlaybackRunner, SimContext, SimExport};
//! use lorenz_core::LorenzConfig;
//!
//! let config = LorenzConfig::default();
//! let trajectory = startup(&config)?;
//!
//! let mut export = SimExport::new(config.clone());
//! let runner = PlaybackRunner::new(trajectory, config.playback.clone());
//! runner.run(&SimContext::new(), &mut export).await?;
//! export.write_to_file("lorenz.json")?;
//! ```

mod context;
mod error;
mod exporter;
mod runner;
mod visualizer;

pub use context::SimContext;
pub use error::{SimError, SimResult};
pub use exporter::{ExportFrame, SimExport};
pub use runner::{startup, FrameSink, NullSink, PlaybackRunner, PlaybackSummary};
pub use visualizer::RerunLogger;
