//! Adaptive integration of the Lorenz field.
//!
//! Uses the Tsitouras 5(4) pair from `numeris` (`RKTS54`): first-same-as-last
//! stages and a free 4th-degree interpolant, so the state is reported exactly
//! at each sample time without forcing the step size onto the sample grid.

use crate::error::{LorenzError, LorenzResult};
use crate::lorenz::LorenzParams;
use nalgebra::Vector3;
use numeris::ode::{AdaptiveSettings, RKAdaptive, RKTS54};
use numeris::Vector;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Solver tolerances and limits.
///
/// Results depend on these settings: the Lorenz system amplifies any change in
/// the numerical path, so reproducible runs must pin them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Ceiling on attempted (accepted + rejected) steps
    pub max_steps: usize,
    /// Initial step size (None = automatic selection)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_step: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            max_steps: 1_000_000,
            first_step: None,
        }
    }
}

impl SolverConfig {
    /// Checks tolerances and limits.
    pub fn validate(&self) -> LorenzResult<()> {
        if !(self.rtol.is_finite() && self.rtol > 0.0) {
            return Err(LorenzError::invalid_config(format!(
                "rtol must be positive, got {}",
                self.rtol
            )));
        }
        if !(self.atol.is_finite() && self.atol > 0.0) {
            return Err(LorenzError::invalid_config(format!(
                "atol must be positive, got {}",
                self.atol
            )));
        }
        if self.max_steps == 0 {
            return Err(LorenzError::invalid_config("max_steps must be at least 1"));
        }
        if let Some(h) = self.first_step {
            if !(h.is_finite() && h > 0.0) {
                return Err(LorenzError::invalid_config(format!(
                    "first_step must be positive, got {}",
                    h
                )));
            }
        }
        Ok(())
    }

    fn settings(&self) -> AdaptiveSettings<f64> {
        AdaptiveSettings {
            abs_tol: self.atol,
            rel_tol: self.rtol,
            max_steps: self.max_steps,
            initial_step: self.first_step,
            dense_output: true,
            ..AdaptiveSettings::default()
        }
    }
}

/// Counters collected during one integration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub fn_evals: usize,
}

/// Integrates the Lorenz field over `t_span` and reports the state at each
/// of `sample_times`.
///
/// Sample times must be finite, strictly increasing and inside the span. A
/// sample equal to the span start reports `y0` verbatim.
pub fn integrate(
    params: &LorenzParams,
    t_span: (f64, f64),
    y0: Vector3<f64>,
    sample_times: &[f64],
    config: &SolverConfig,
) -> LorenzResult<(Vec<Vector3<f64>>, SolverStats)> {
    config.validate()?;
    validate_inputs(t_span, &y0, sample_times)?;
    let (t0, t_end) = t_span;

    let start = Vector::from_array([y0.x, y0.y, y0.z]);
    let mut reached = t0;
    let result = RKTS54::integrate(
        t0,
        t_end,
        &start,
        |t, y| {
            reached = t;
            let d = params.derivative(&Vector3::new(y[0], y[1], y[2]));
            Vector::from_array([d.x, d.y, d.z])
        },
        &config.settings(),
    );
    let solution = result.map_err(|e| LorenzError::integration(reached, e.to_string()))?;

    let stats = SolverStats {
        accepted_steps: solution.accepted,
        rejected_steps: solution.rejected,
        fn_evals: solution.evals,
    };
    debug!(
        "RKTS54 reached t={} ({} accepted, {} rejected, {} evals)",
        solution.t, stats.accepted_steps, stats.rejected_steps, stats.fn_evals
    );

    let dense = RKTS54::interpolate_batch(sample_times, &solution)
        .map_err(|e| LorenzError::integration(t_end, format!("dense output: {}", e)))?;

    let states = sample_times
        .iter()
        .zip(dense.iter())
        .map(|(&t, y)| {
            if t == t0 {
                y0
            } else {
                Vector3::new(y[0], y[1], y[2])
            }
        })
        .collect();

    Ok((states, stats))
}

fn validate_inputs(t_span: (f64, f64), y0: &Vector3<f64>, sample_times: &[f64]) -> LorenzResult<()> {
    let (t0, t_end) = t_span;
    if !(t0.is_finite() && t_end.is_finite()) || t_end <= t0 {
        return Err(LorenzError::invalid_config(format!(
            "time span must be finite and increasing, got [{}, {}]",
            t0, t_end
        )));
    }
    if !y0.iter().all(|c| c.is_finite()) {
        return Err(LorenzError::invalid_config("initial state must be finite"));
    }

    let mut prev: Option<f64> = None;
    for (i, &s) in sample_times.iter().enumerate() {
        if !s.is_finite() || s < t0 || s > t_end {
            return Err(LorenzError::invalid_config(format!(
                "sample time #{} ({}) outside span [{}, {}]",
                i, s, t0, t_end
            )));
        }
        if let Some(p) = prev {
            if s <= p {
                return Err(LorenzError::invalid_config(format!(
                    "sample times must be strictly increasing (#{}: {} after {})",
                    i, s, p
                )));
            }
        }
        prev = Some(s);
    }
    Ok(())
}
