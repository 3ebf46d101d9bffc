// ─────────────────────────────────────────────────────────────────────
// SCPN XRD Scan — Forward Operator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Beam-averaging forward operator.
//!
//! Builds the geometry matrix A of shape (n_measurements, n_grid_nodes)
//! that maps profile values on a grid to the beam-averaged reading at each
//! measurement center. Two averaging policies are supported, see
//! [`AveragingPolicy`].

use ndarray::{Array1, Array2, ArrayViewMut1, Zip};
use tracing::{debug, warn};
use xrd_types::config::AveragingPolicy;
use xrd_types::error::{XrdError, XrdResult};
use xrd_types::state::{Grid1D, MeasurementCenters};

/// Dense beam-averaging matrix, rows = readings, columns = grid nodes.
#[derive(Debug, Clone)]
pub struct ForwardOperator {
    matrix: Array2<f64>,
    policy: AveragingPolicy,
    beam_diameter_mm: f64,
}

impl ForwardOperator {
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn policy(&self) -> AveragingPolicy {
        self.policy
    }

    pub fn beam_diameter_mm(&self) -> f64 {
        self.beam_diameter_mm
    }

    /// Number of readings.
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of grid nodes.
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// Readings produced by `profile` sampled on the operator's grid.
    pub fn apply(&self, profile: &Array1<f64>) -> XrdResult<Array1<f64>> {
        if profile.len() != self.ncols() {
            return Err(XrdError::ShapeMismatch {
                context: "forward operator input".to_string(),
                expected: self.ncols(),
                actual: profile.len(),
            });
        }
        Ok(self.matrix.dot(profile))
    }

    pub fn row_sums(&self) -> Array1<f64> {
        self.matrix.rows().into_iter().map(|row| row.sum()).collect()
    }

    /// Readings whose beam covers no grid node.
    pub fn empty_rows(&self) -> Vec<usize> {
        self.matrix
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|&w| w == 0.0))
            .map(|(i, _)| i)
            .collect()
    }

    /// Grid nodes that no reading sees.
    pub fn uncovered_columns(&self) -> Vec<usize> {
        self.matrix
            .columns()
            .into_iter()
            .enumerate()
            .filter(|(_, col)| col.iter().all(|&w| w == 0.0))
            .map(|(j, _)| j)
            .collect()
    }
}

/// Number of beam samples for the reflective policy: `max(1, round(d / dx))`,
/// rounding half to even.
pub fn points_per_beam(beam_diameter_mm: f64, dx: f64) -> usize {
    let ratio = (beam_diameter_mm / dx).round_ties_even();
    if ratio.is_finite() && ratio >= 1.0 {
        ratio as usize
    } else {
        1
    }
}

/// Grid index of a beam sample after folding it about x = 0.
///
/// `|p| / dx` is rounded half to even; `None` when it lands past the grid.
pub fn folded_index(position: f64, dx: f64, n: usize) -> Option<usize> {
    let j = (position.abs() / dx).round_ties_even();
    if j.is_finite() && j < n as f64 {
        Some(j as usize)
    } else {
        None
    }
}

/// k-th of `count` evenly spaced samples over `[start, start + width]`.
///
/// The last sample is pinned to the window end; a single sample sits at
/// `start`.
fn beam_sample(start: f64, width: f64, count: usize, k: usize) -> f64 {
    if count <= 1 {
        start
    } else if k == count - 1 {
        start + width
    } else {
        start + k as f64 * (width / (count - 1) as f64)
    }
}

/// Fills one operator row for a beam centered at `center`.
trait RowKernel: Sync {
    fn fill_row(&self, center: f64, row: ArrayViewMut1<f64>);
}

/// Uniform weight over every node in `[c - r, c + r]`.
struct WindowedMask<'a> {
    x: &'a Array1<f64>,
    radius: f64,
}

impl RowKernel for WindowedMask<'_> {
    fn fill_row(&self, center: f64, mut row: ArrayViewMut1<f64>) {
        let lo = center - self.radius;
        let hi = center + self.radius;
        let inside = |xj: f64| xj >= lo && xj <= hi;

        let count = self.x.iter().filter(|&&xj| inside(xj)).count();
        if count == 0 {
            return;
        }
        let weight = 1.0 / count as f64;
        for (w, &xj) in row.iter_mut().zip(self.x.iter()) {
            if inside(xj) {
                *w = weight;
            }
        }
    }
}

/// Evenly spaced samples across the beam, folded about x = 0 and
/// accumulated onto the nearest node.
struct ReflectiveSymmetry {
    n: usize,
    dx: f64,
    radius: f64,
    diameter: f64,
    samples: usize,
}

impl RowKernel for ReflectiveSymmetry {
    fn fill_row(&self, center: f64, mut row: ArrayViewMut1<f64>) {
        let start = center - self.radius;
        let weight = 1.0 / self.samples as f64;
        for k in 0..self.samples {
            let p = beam_sample(start, self.diameter, self.samples, k);
            if let Some(j) = folded_index(p, self.dx, self.n) {
                row[j] += weight;
            }
        }
    }
}

#[cfg_attr(feature = "parallel", allow(dead_code))]
fn fill_rows_serial<K: RowKernel>(matrix: &mut Array2<f64>, centers: &Array1<f64>, kernel: &K) {
    Zip::from(matrix.rows_mut())
        .and(centers)
        .for_each(|row, &c| kernel.fill_row(c, row));
}

/// Rows are disjoint, so each one is filled on its own rayon task.
#[cfg(feature = "parallel")]
fn fill_rows<K: RowKernel>(matrix: &mut Array2<f64>, centers: &Array1<f64>, kernel: &K) {
    use rayon::prelude::*;

    let centers = centers.to_vec();
    matrix
        .axis_iter_mut(ndarray::Axis(0))
        .into_par_iter()
        .zip(centers.par_iter())
        .for_each(|(row, &c)| kernel.fill_row(c, row));
}

#[cfg(not(feature = "parallel"))]
fn fill_rows<K: RowKernel>(matrix: &mut Array2<f64>, centers: &Array1<f64>, kernel: &K) {
    fill_rows_serial(matrix, centers, kernel);
}

/// Builds [`ForwardOperator`]s for a fixed averaging policy.
///
/// Stateless per call: the same builder serves the fine simulation grid and
/// the reconstruction grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardOperatorBuilder {
    policy: AveragingPolicy,
}

impl ForwardOperatorBuilder {
    pub fn new(policy: AveragingPolicy) -> Self {
        ForwardOperatorBuilder { policy }
    }

    pub fn policy(&self) -> AveragingPolicy {
        self.policy
    }

    pub fn build(
        &self,
        grid: &Grid1D,
        centers: &MeasurementCenters,
        beam_diameter_mm: f64,
    ) -> XrdResult<ForwardOperator> {
        if !beam_diameter_mm.is_finite() || beam_diameter_mm <= 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "beam diameter must be finite and > 0, got {beam_diameter_mm}"
            )));
        }
        if centers.is_empty() {
            return Err(XrdError::InvalidConfiguration(
                "forward operator needs at least one measurement center".to_string(),
            ));
        }
        if grid.is_empty() {
            return Err(XrdError::InvalidConfiguration(
                "forward operator needs a non-empty grid".to_string(),
            ));
        }

        let radius = beam_diameter_mm / 2.0;
        let mut matrix = Array2::zeros((centers.len(), grid.len()));

        match self.policy {
            AveragingPolicy::WindowedMask => {
                let kernel = WindowedMask { x: grid.x(), radius };
                fill_rows(&mut matrix, &centers.positions, &kernel);
                debug!(
                    rows = centers.len(),
                    cols = grid.len(),
                    dx = grid.dx(),
                    "built windowed-mask operator"
                );
            }
            AveragingPolicy::ReflectiveSymmetry => {
                let samples = points_per_beam(beam_diameter_mm, grid.dx());
                let kernel = ReflectiveSymmetry {
                    n: grid.len(),
                    dx: grid.dx(),
                    radius,
                    diameter: beam_diameter_mm,
                    samples,
                };
                fill_rows(&mut matrix, &centers.positions, &kernel);
                debug!(
                    rows = centers.len(),
                    cols = grid.len(),
                    dx = grid.dx(),
                    points_per_beam = samples,
                    "built reflective-symmetry operator"
                );
            }
        }

        let operator = ForwardOperator {
            matrix,
            policy: self.policy,
            beam_diameter_mm,
        };
        let empty = operator.empty_rows();
        if !empty.is_empty() {
            warn!(
                empty_rows = empty.len(),
                rows = operator.nrows(),
                "some beam positions cover no grid node"
            );
        }
        Ok(operator)
    }
}
