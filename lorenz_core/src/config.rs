//! Run configuration.
//!
//! Every field has a default matching the reference run: classic Lorenz
//! parameters, `(0.1, 0.1, 0.1)` start, 10000 samples over `[0, 100]`,
//! 10-point windows every 25 ms for 400 ticks with a 500-point trace.
//! Config files are JSON; missing fields fall back to the defaults.

use crate::error::{LorenzError, LorenzResult};
use crate::lorenz::LorenzParams;
use crate::playback::{DEFAULT_MAX_POINTS, DEFAULT_WINDOW};
use crate::solver::SolverConfig;
use crate::trajectory::linspace;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LorenzConfig {
    /// Vector field parameters
    pub system: LorenzParams,
    /// Initial (x, y, z)
    pub initial_state: [f64; 3],
    /// Integration span [t_start, t_end]
    pub t_span: [f64; 2],
    /// Number of evenly spaced sample times over the span
    pub samples: usize,
    pub solver: SolverConfig,
    pub playback: PlaybackConfig,
}

impl Default for LorenzConfig {
    fn default() -> Self {
        Self {
            system: LorenzParams::default(),
            initial_state: [0.1, 0.1, 0.1],
            t_span: [0.0, 100.0],
            samples: 10_000,
            solver: SolverConfig::default(),
            playback: PlaybackConfig::default(),
        }
    }
}

/// Playback and display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Points emitted per tick
    pub window: NonZeroUsize,
    /// Tick period in milliseconds
    pub interval_ms: u64,
    /// Ticks before playback stops
    pub max_ticks: u64,
    /// Points retained in the displayed trace
    pub max_points: usize,
    /// Fixed x axis range of the chart
    pub x_range: [f64; 2],
    /// Fixed y axis range of the chart
    pub y_range: [f64; 2],
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            window: NonZeroUsize::new(DEFAULT_WINDOW).unwrap_or(NonZeroUsize::MIN),
            interval_ms: 25,
            max_ticks: 400,
            max_points: DEFAULT_MAX_POINTS,
            x_range: [-25.0, 25.0],
            y_range: [-25.0, 25.0],
        }
    }
}

impl PlaybackConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> LorenzResult<()> {
        if self.interval_ms == 0 {
            return Err(LorenzError::invalid_config("interval_ms must be at least 1"));
        }
        if self.max_points == 0 {
            return Err(LorenzError::invalid_config("max_points must be at least 1"));
        }
        for (name, [lo, hi]) in [("x_range", self.x_range), ("y_range", self.y_range)] {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(LorenzError::invalid_config(format!(
                    "{} must be finite and increasing, got [{}, {}]",
                    name, lo, hi
                )));
            }
        }
        Ok(())
    }
}

impl LorenzConfig {
    /// Loads a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> LorenzResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> LorenzResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> LorenzResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn initial_state(&self) -> Vector3<f64> {
        Vector3::from(self.initial_state)
    }

    pub fn t_span(&self) -> (f64, f64) {
        (self.t_span[0], self.t_span[1])
    }

    /// Evenly spaced sample times over the span.
    pub fn sample_times(&self) -> Vec<f64> {
        linspace(self.t_span[0], self.t_span[1], self.samples)
    }

    /// Checks everything that can be checked before integrating.
    pub fn validate(&self) -> LorenzResult<()> {
        if !self.system.is_finite() {
            return Err(LorenzError::invalid_config(format!(
                "Lorenz parameters must be finite: {:?}",
                self.system
            )));
        }
        if !self.initial_state.iter().all(|v| v.is_finite()) {
            return Err(LorenzError::invalid_config("initial_state must be finite"));
        }
        let [t0, t1] = self.t_span;
        if !(t0.is_finite() && t1.is_finite() && t0 < t1) {
            return Err(LorenzError::invalid_config(format!(
                "t_span must be finite and increasing, got [{}, {}]",
                t0, t1
            )));
        }
        if self.samples == 0 {
            return Err(LorenzError::invalid_config("samples must be at least 1"));
        }
        self.solver.validate()?;
        self.playback.validate()
    }
}
