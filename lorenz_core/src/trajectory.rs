//! Trajectory generation.
//!
//! Integrates the Lorenz system once and freezes the result into an
//! immutable [`Trajectory`] that playback reads for the rest of the process.

use crate::error::{LorenzError, LorenzResult};
use crate::lorenz::LorenzParams;
use crate::solver::{integrate, SolverConfig, SolverStats};
use nalgebra::Vector3;
use serde::Serialize;
use tracing::info;

/// Ordered, immutable sequence of sampled Lorenz states.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    times: Vec<f64>,
    points: Vec<Vector3<f64>>,
    #[serde(skip)]
    stats: SolverStats,
}

impl Trajectory {
    /// Builds a trajectory from already sampled data.
    ///
    /// `times` and `points` must have the same length.
    pub fn from_parts(times: Vec<f64>, points: Vec<Vector3<f64>>) -> LorenzResult<Self> {
        if times.len() != points.len() {
            return Err(LorenzError::invalid_config(format!(
                "{} sample times but {} points",
                times.len(),
                points.len()
            )));
        }
        Ok(Self {
            times,
            points,
            stats: SolverStats::default(),
        })
    }

    /// Builds a trajectory from points at times `0, 1, 2, ...`.
    pub fn from_points(points: Vec<Vector3<f64>>) -> Self {
        let times = (0..points.len()).map(|i| i as f64).collect();
        Self {
            times,
            points,
            stats: SolverStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn point(&self, index: usize) -> Option<&Vector3<f64>> {
        self.points.get(index)
    }

    /// Solver counters from the integration that produced this trajectory.
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// Returns true if no coordinate is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.iter().all(|c| c.is_finite()))
    }

    /// Axis-aligned bounding box `(min, max)`, or None when empty.
    pub fn bounds(&self) -> Option<(Vector3<f64>, Vector3<f64>)> {
        let first = self.points.first()?;
        Some(self.points.iter().fold((*first, *first), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        }))
    }
}

/// `n` evenly spaced samples over `[start, end]`, both ends included.
///
/// The last sample is pinned to `end` so it never drifts past the span.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut samples: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            samples[n - 1] = end;
            samples
        }
    }
}

/// Integrates the Lorenz system and reports the state at each sample time.
///
/// Fails with [`LorenzError::Integration`] when the solver cannot converge,
/// exhausts its step budget, or produces a non-finite state.
pub fn generate(
    params: &LorenzParams,
    initial_state: Vector3<f64>,
    t_span: (f64, f64),
    sample_times: &[f64],
    solver: &SolverConfig,
) -> LorenzResult<Trajectory> {
    if !params.is_finite() {
        return Err(LorenzError::invalid_config(format!(
            "Lorenz parameters must be finite: {:?}",
            params
        )));
    }

    let (points, stats) = integrate(params, t_span, initial_state, sample_times, solver)?;

    let trajectory = Trajectory {
        times: sample_times.to_vec(),
        points,
        stats,
    };

    if let Some(index) = trajectory
        .points
        .iter()
        .position(|p| !p.iter().all(|c| c.is_finite()))
    {
        return Err(LorenzError::integration(
            trajectory.times[index],
            format!("non-finite state at sample {}", index),
        ));
    }

    info!(
        "Generated trajectory: {} points over [{}, {}] ({} steps, {} rejected, {} evals)",
        trajectory.len(),
        t_span.0,
        t_span.1,
        stats.accepted_steps,
        stats.rejected_steps,
        stats.fn_evals
    );

    Ok(trajectory)
}
