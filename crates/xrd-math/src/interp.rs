//! 1D interpolation on tabulated knots.
//!
//! Cubic spline (natural or clamped ends) and piecewise-linear lookup,
//! evaluated on arrays of positions.

use crate::tridiag::thomas_solve;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use xrd_types::error::{XrdError, XrdResult};

/// End condition of a cubic spline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// Zero second derivative at both ends.
    #[default]
    Natural,
    /// Zero first derivative at both ends.
    Clamped,
}

/// Check knots: at least two, finite, strictly increasing abscissae.
pub fn validate_knots(x: &[f64], y: &[f64]) -> XrdResult<()> {
    if x.len() != y.len() {
        return Err(XrdError::ShapeMismatch {
            context: "knot values".to_string(),
            expected: x.len(),
            actual: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(XrdError::InvalidConfiguration(format!(
            "interpolation needs at least 2 knots, got {}",
            x.len()
        )));
    }
    if !x.iter().chain(y.iter()).all(|v| v.is_finite()) {
        return Err(XrdError::InvalidConfiguration(
            "knots contain non-finite values".to_string(),
        ));
    }
    if let Some(i) = x.windows(2).position(|w| w[1] <= w[0]) {
        return Err(XrdError::InvalidConfiguration(format!(
            "knot abscissae must be strictly increasing (x[{}] = {}, x[{}] = {})",
            i,
            x[i],
            i + 1,
            x[i + 1]
        )));
    }
    Ok(())
}

/// Index of the knot interval used for `t`, clamped to the end intervals.
fn interval(x: &[f64], t: f64) -> usize {
    let n = x.len();
    // partition_point gives the first knot strictly above t
    let upper = x.partition_point(|&k| k <= t);
    upper.saturating_sub(1).min(n - 2)
}

/// Interpolating cubic spline.
///
/// Stores knot second derivatives; outside the knot range the end
/// polynomials are extended, like `scipy.interpolate.CubicSpline`.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    m: Vec<f64>, // second derivatives at knots
}

impl CubicSpline {
    pub fn new(x: &[f64], y: &[f64], bc: BoundaryCondition) -> XrdResult<Self> {
        validate_knots(x, y)?;
        let n = x.len();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let slope: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

        let mut sub = vec![0.0; n];
        let mut diag = vec![0.0; n];
        let mut sup = vec![0.0; n];
        let mut rhs = vec![0.0; n];

        for i in 1..n - 1 {
            sub[i] = h[i - 1];
            diag[i] = 2.0 * (h[i - 1] + h[i]);
            sup[i] = h[i];
            rhs[i] = 6.0 * (slope[i] - slope[i - 1]);
        }

        match bc {
            BoundaryCondition::Natural => {
                diag[0] = 1.0;
                diag[n - 1] = 1.0;
            }
            BoundaryCondition::Clamped => {
                diag[0] = 2.0 * h[0];
                sup[0] = h[0];
                rhs[0] = 6.0 * slope[0];
                sub[n - 1] = h[n - 2];
                diag[n - 1] = 2.0 * h[n - 2];
                rhs[n - 1] = -6.0 * slope[n - 2];
            }
        }

        let m = thomas_solve(&sub, &diag, &sup, &rhs)?;
        Ok(CubicSpline {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    /// Evaluate at a single position.
    pub fn value(&self, t: f64) -> f64 {
        let i = interval(&self.x, t);
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (m0, m1) = (self.m[i], self.m[i + 1]);
        let h = x1 - x0;
        let a = x1 - t;
        let b = t - x0;
        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (self.y[i] / h - m0 * h / 6.0) * a
            + (self.y[i + 1] / h - m1 * h / 6.0) * b
    }

    pub fn evaluate(&self, positions: &Array1<f64>) -> Array1<f64> {
        positions.mapv(|t| self.value(t))
    }
}

/// Piecewise-linear interpolation holding end values outside the knots,
/// like `numpy.interp`.
#[derive(Debug, Clone)]
pub struct LinearInterp {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LinearInterp {
    pub fn new(x: &[f64], y: &[f64]) -> XrdResult<Self> {
        validate_knots(x, y)?;
        Ok(LinearInterp {
            x: x.to_vec(),
            y: y.to_vec(),
        })
    }

    pub fn value(&self, t: f64) -> f64 {
        let (x, y) = (&self.x, &self.y);
        let n = x.len();
        if t <= x[0] {
            return y[0];
        }
        if t >= x[n - 1] {
            return y[n - 1];
        }
        let i = interval(x, t);
        let w = (t - x[i]) / (x[i + 1] - x[i]);
        (1.0 - w) * y[i] + w * y[i + 1]
    }

    pub fn evaluate(&self, positions: &Array1<f64>) -> Array1<f64> {
        positions.mapv(|t| self.value(t))
    }
}
