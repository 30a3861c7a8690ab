//! Rerun visualization for playback runs.
//!
//! Visualization is optional and only available with the `visualization` feature.
//!
//! # What Gets Logged
//!
//! - The full trajectory as a 3D line strip (once)
//! - Each playback window as 2D points on the x/y plane
//! - Cursor position as a scalar on the `playback_time` timeline

use crate::runner::{FrameSink, PlaybackSummary};
use lorenz_core::{DisplayWindow, FrameUpdate, Trajectory};
#[cfg(feature = "visualization")]
use rerun::{components::LineStrip3D, Color, LineStrips3D, Points2D, Radius, RecordingStream};
use std::time::Duration;

/// Rerun logger for playback visualization.
pub struct RerunLogger {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    /// Whether visualization is enabled
    enabled: bool,
}

impl RerunLogger {
    /// Creates a new logger with visualization disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            enabled: false,
        }
    }

    /// Creates a new logger with visualization enabled.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled - open Rerun Viewer to watch playback");
                Self {
                    rec: Some(rec),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self::disabled()
            }
        }
    }

    /// Creates a logger - returns disabled if visualization feature not enabled.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::warn!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }

    /// Returns whether visualization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the playback time for subsequent logs.
    #[cfg(feature = "visualization")]
    pub fn set_time(&self, seconds: f64) {
        if let Some(ref rec) = self.rec {
            rec.set_time_seconds("playback_time", seconds);
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn set_time(&self, _seconds: f64) {}

    /// Logs the whole trajectory as a static 3D curve.
    #[cfg(feature = "visualization")]
    pub fn log_trajectory(&self, trajectory: &Trajectory) {
        if let Some(ref rec) = self.rec {
            let strip: LineStrip3D = trajectory
                .points()
                .iter()
                .map(|p| [p.x as f32, p.y as f32, p.z as f32])
                .collect();

            let _ = rec.log_static(
                "attractor/trajectory",
                &LineStrips3D::new([strip])
                    .with_colors([Color::from_rgb(80, 80, 200)])
                    .with_radii([Radius::new_scene_units(0.05)]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_trajectory(&self, _trajectory: &Trajectory) {}

    /// Logs one playback window on the x/y plane.
    #[cfg(feature = "visualization")]
    pub fn log_window(&self, window: &DisplayWindow) {
        if let Some(ref rec) = self.rec {
            let points: Vec<[f32; 2]> = window.points().map(|(x, y)| [x as f32, y as f32]).collect();

            let _ = rec.log(
                "playback/window",
                &Points2D::new(points)
                    .with_colors([Color::from_rgb(0, 200, 255)])
                    .with_radii([Radius::new_scene_units(0.3)]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_window(&self, _window: &DisplayWindow) {}

    /// Logs the cursor as a scalar metric.
    #[cfg(feature = "visualization")]
    pub fn log_cursor(&self, cursor: usize) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log("metrics/cursor", &rerun::Scalar::new(cursor as f64));
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_cursor(&self, _cursor: usize) {}

    /// Logs a text annotation.
    #[cfg(feature = "visualization")]
    pub fn log_event(&self, path: &str, message: &str) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log(path, &rerun::TextLog::new(message));
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_event(&self, _path: &str, _message: &str) {}
}

impl FrameSink for RerunLogger {
    fn on_frame(&mut self, frame: &FrameUpdate, at: Duration) {
        if !self.enabled {
            return;
        }
        self.set_time(at.as_secs_f64());
        self.log_window(&frame.window);
        self.log_cursor(frame.cursor);
    }

    fn on_finish(&mut self, summary: &PlaybackSummary) {
        self.log_event(
            "playback/events",
            &format!("finished after {} ticks at cursor {}", summary.ticks, summary.final_cursor),
        );
    }
}
