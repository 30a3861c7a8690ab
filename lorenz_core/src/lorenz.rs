//! The Lorenz vector field.
//!
//! ```text
//! dx/dt = sigma (y - x)
//! dy/dt = x (rho - z) - y
//! dz/dt = x y - beta z
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Lorenz system parameters.
///
/// The defaults (`sigma = 10`, `rho = 28`, `beta = 8/3`) are the classic
/// chaotic regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LorenzParams {
    /// Prandtl number
    pub sigma: f64,
    /// Rayleigh number
    pub rho: f64,
    /// Geometric factor
    pub beta: f64,
}

impl Default for LorenzParams {
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        }
    }
}

impl LorenzParams {
    /// Creates a parameter set.
    pub fn new(sigma: f64, rho: f64, beta: f64) -> Self {
        Self { sigma, rho, beta }
    }

    /// Returns true if every parameter is a finite number.
    pub fn is_finite(&self) -> bool {
        self.sigma.is_finite() && self.rho.is_finite() && self.beta.is_finite()
    }

    /// Time derivative of `state`.
    pub fn derivative(&self, state: &Vector3<f64>) -> Vector3<f64> {
        let (x, y, z) = (state.x, state.y, state.z);
        Vector3::new(
            self.sigma * (y - x),
            x * (self.rho - z) - y,
            x * y - self.beta * z,
        )
    }

    /// Equilibrium points of the field.
    ///
    /// The origin is always a fixed point. For `rho > 1` (and `beta > 0`) the
    /// two symmetric points `C+` and `C-` exist as well.
    pub fn fixed_points(&self) -> Vec<Vector3<f64>> {
        let mut points = vec![Vector3::zeros()];
        let r = self.beta * (self.rho - 1.0);
        if r > 0.0 {
            let c = r.sqrt();
            points.push(Vector3::new(c, c, self.rho - 1.0));
            points.push(Vector3::new(-c, -c, self.rho - 1.0));
        }
        points
    }
}
