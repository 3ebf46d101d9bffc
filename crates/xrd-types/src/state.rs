// ─────────────────────────────────────────────────────────────────────
// SCPN XRD Scan — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{XrdError, XrdResult};
use ndarray::Array1;

/// Number of points in the half-open range `[0, length)` stepped by `step`.
///
/// Same count rule as `numpy.arange(0, length, step)`: `ceil(length / step)`.
pub fn arange_len(length: f64, step: f64) -> usize {
    let n = (length / step).ceil();
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}

/// Uniform 1D grid over `[0, length)`.
///
/// Node positions are `x_i = i * dx`. Only [`Grid1D::arange`] builds one,
/// so `n >= 2` and `dx > 0` always hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid1D {
    n: usize,
    x: Array1<f64>, // node positions [n], mm
    dx: f64,        // node spacing, mm
    length: f64,    // nominal extent, mm (exclusive)
}

impl Grid1D {
    /// Grid with nodes `0, dx, 2dx, ...` strictly below `length`.
    pub fn arange(length: f64, dx: f64) -> XrdResult<Self> {
        if !length.is_finite() || length <= 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "grid length must be finite and > 0, got {length}"
            )));
        }
        if !dx.is_finite() || dx <= 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "grid spacing must be finite and > 0, got {dx}"
            )));
        }
        let n = arange_len(length, dx);
        if n < 2 {
            return Err(XrdError::InvalidConfiguration(format!(
                "grid over [0, {length}) with spacing {dx} has {n} node(s), need at least 2"
            )));
        }
        let x = Array1::from_shape_fn(n, |i| i as f64 * dx);
        Ok(Grid1D { n, x, dx, length })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Node positions, mm.
    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Exclusive upper bound the grid was built for, mm.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Position of the last node.
    pub fn last(&self) -> f64 {
        self.x[self.n - 1]
    }
}

/// Ordered beam-center positions for one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementCenters {
    pub positions: Array1<f64>,
    /// Spacing between successive centers, mm.
    pub step: f64,
}

impl MeasurementCenters {
    /// Centers `0, step, 2*step, ...` strictly below `length`.
    pub fn arange(length: f64, step: f64) -> XrdResult<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "measurement step must be finite and > 0, got {step}"
            )));
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "scan length must be finite and > 0, got {length}"
            )));
        }
        let n = arange_len(length, step);
        let positions = Array1::from_shape_fn(n, |i| i as f64 * step);
        Ok(MeasurementCenters { positions, step })
    }

    /// Explicit center list. Must be finite and strictly increasing.
    ///
    /// `step` is taken from the first two centers (zero for a single center).
    pub fn from_positions(positions: Vec<f64>) -> XrdResult<Self> {
        if positions.iter().any(|p| !p.is_finite()) {
            return Err(XrdError::InvalidConfiguration(
                "measurement centers must be finite".to_string(),
            ));
        }
        if positions.windows(2).any(|w| w[1] <= w[0]) {
            return Err(XrdError::InvalidConfiguration(
                "measurement centers must be strictly increasing".to_string(),
            ));
        }
        let step = if positions.len() > 1 {
            positions[1] - positions[0]
        } else {
            0.0
        };
        Ok(MeasurementCenters {
            positions: Array1::from_vec(positions),
            step,
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_arange_fine() {
        let grid = Grid1D::arange(3.5, 0.005).unwrap();
        assert_eq!(grid.len(), 700);
        assert_eq!(grid.x().len(), 700);
        assert!((grid.x()[0] - 0.0).abs() < 1e-15);
        assert!((grid.last() - 3.495).abs() < 1e-12);
        assert!(grid.last() < 3.5);
    }

    #[test]
    fn test_grid_arange_recon() {
        let grid = Grid1D::arange(3.5, 0.1).unwrap();
        assert_eq!(grid.len(), 35);
        assert!((grid.dx() - 0.1).abs() < 1e-15);
        assert_eq!(grid.length(), 3.5);
    }

    #[test]
    fn test_grid_half_open_count() {
        // 1.0 / 0.3 = 3.33 → nodes 0.0, 0.3, 0.6, 0.9
        let grid = Grid1D::arange(1.0, 0.3).unwrap();
        assert_eq!(grid.len(), 4);
        assert!(!grid.is_empty());
        assert!((grid.x()[3] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_grid_rejects_single_node() {
        let err = Grid1D::arange(0.1, 0.5).unwrap_err();
        assert!(matches!(err, XrdError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_grid_rejects_bad_spacing() {
        assert!(Grid1D::arange(1.0, 0.0).is_err());
        assert!(Grid1D::arange(1.0, -0.1).is_err());
        assert!(Grid1D::arange(1.0, f64::NAN).is_err());
        assert!(Grid1D::arange(0.0, 0.1).is_err());
    }

    #[test]
    fn test_centers_arange() {
        let centers = MeasurementCenters::arange(3.5, 0.25).unwrap();
        assert_eq!(centers.len(), 14);
        assert!((centers.positions[13] - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_centers_from_positions_validation() {
        assert!(MeasurementCenters::from_positions(vec![0.0, 0.5, 0.5]).is_err());
        assert!(MeasurementCenters::from_positions(vec![0.0, f64::INFINITY]).is_err());
        let single = MeasurementCenters::from_positions(vec![1.0]).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single.step, 0.0);
        let empty = MeasurementCenters::from_positions(Vec::new()).unwrap();
        assert!(empty.is_empty());
    }
}
