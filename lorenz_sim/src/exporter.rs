//! JSON exporter for offline chart playback.
//!
//! Writes the initial display state and every frame so a browser chart (or
//! any other consumer) can replay the exact same animation.

use crate::runner::{FrameSink, PlaybackSummary};
use lorenz_core::{FrameUpdate, LorenzConfig, PlaybackStore};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::time::Duration;

/// A single exported tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFrame {
    /// 1-based tick count
    pub tick: u64,

    /// Clock time since playback started (ms)
    pub time_ms: f64,

    /// Window x coordinates to append
    pub x: Vec<f64>,

    /// Window y coordinates to append
    pub y: Vec<f64>,

    /// Trace cap for this update
    pub max_points: usize,

    /// Cursor to use on the next tick
    pub cursor: usize,
}

impl From<(&FrameUpdate, Duration)> for ExportFrame {
    fn from((frame, at): (&FrameUpdate, Duration)) -> Self {
        Self {
            tick: frame.tick,
            time_ms: at.as_nanos() as f64 / 1e6,
            x: frame.window.xs.clone(),
            y: frame.window.ys.clone(),
            max_points: frame.max_points,
            cursor: frame.cursor,
        }
    }
}

/// Complete playback export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Configuration the run used
    pub config: LorenzConfig,

    /// Fixed chart x axis range
    pub x_range: [f64; 2],

    /// Fixed chart y axis range
    pub y_range: [f64; 2],

    /// Initial display state (full projection, cursor 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<PlaybackStore>,

    /// All frames
    pub frames: Vec<ExportFrame>,

    /// Final results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PlaybackSummary>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(config: LorenzConfig) -> Self {
        Self {
            x_range: config.playback.x_range,
            y_range: config.playback.y_range,
            config,
            store: None,
            frames: Vec::new(),
            summary: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: ExportFrame) {
        self.frames.push(frame);
    }

    /// Returns true once the summary has been recorded.
    pub fn is_finalized(&self) -> bool {
        self.summary.is_some()
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

impl FrameSink for SimExport {
    fn on_start(&mut self, store: &PlaybackStore) {
        self.store = Some(store.clone());
    }

    fn on_frame(&mut self, frame: &FrameUpdate, at: Duration) {
        self.add_frame(ExportFrame::from((frame, at)));
    }

    fn on_finish(&mut self, summary: &PlaybackSummary) {
        self.summary = Some(summary.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;
    use crate::runner::PlaybackRunner;
    use lorenz_core::Trajectory;
    use nalgebra::Vector3;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_export_records_store_frames_and_summary() {
        let traj = Arc::new(Trajectory::from_points(
            (0..12).map(|i| Vector3::new(i as f64, -(i as f64), 0.0)).collect(),
        ));
        let mut config = LorenzConfig::default();
        config.playback.max_ticks = 3;

        let mut export = SimExport::new(config.clone());
        let runner = PlaybackRunner::new(traj, config.playback.clone());
        runner.run(&SimContext::new(), &mut export).await.unwrap();

        assert!(export.is_finalized());
        let store = export.store.as_ref().unwrap();
        assert_eq!(store.x.len(), 12);
        assert_eq!(store.cursor, 0);

        assert_eq!(export.frames.len(), 3);
        assert_eq!(export.frames[0].x, (0..10).map(|i| i as f64).collect::<Vec<_>>());
        assert_eq!(export.frames[1].x, vec![10.0, 11.0]);
        assert_eq!(export.frames[1].cursor, 0);
        assert_eq!(export.frames[2].time_ms, 75.0);
        assert_eq!(export.frames[2].max_points, 500);
    }

    #[test]
    fn test_export_writes_json() {
        let mut export = SimExport::new(LorenzConfig::default());
        export.add_frame(ExportFrame {
            tick: 1,
            time_ms: 25.0,
            x: vec![1.0],
            y: vec![2.0],
            max_points: 500,
            cursor: 1,
        });

        let path = std::env::temp_dir().join(format!("lorenz_export_{}.json", std::process::id()));
        let path_str = path.to_str().unwrap();
        export.write_to_file(path_str).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["frames"][0]["tick"], 1);
        assert_eq!(value["config"]["samples"], 10_000);
        assert_eq!(value["x_range"][0], -25.0);
        assert!(value.get("summary").is_none());

        std::fs::remove_file(&path).unwrap();
    }
}
