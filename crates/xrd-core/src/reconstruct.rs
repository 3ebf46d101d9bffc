// ─────────────────────────────────────────────────────────────────────
// SCPN XRD Scan — Reconstructor
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Regularized profile recovery from beam readings.
//!
//! Solves min ||A x - b||₂ with a truncated SVD pseudo-inverse: singular
//! values at or below `rcond * s_max` are dropped, giving the minimum-norm
//! solution of the retained subspace.

use crate::operator::ForwardOperator;
use ndarray::{Array1, Array2};
use tracing::{debug, warn};
use xrd_math::linalg::{svd_thin, Svd};
use xrd_types::error::{XrdError, XrdResult};

/// Recovered profile on the reconstruction grid plus solve diagnostics.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub values: Array1<f64>,
    /// Singular values kept by the cutoff.
    pub rank: usize,
    /// Absolute singular value cutoff, `rcond * s_max`.
    pub cutoff: f64,
    pub singular_values: Array1<f64>,
    /// ||A x - b||₂ of the returned solution.
    pub residual_norm: f64,
}

/// Factorizes a reconstruction-grid operator once and solves for any
/// reading vector or `rcond`.
#[derive(Debug, Clone)]
pub struct Reconstructor {
    matrix: Array2<f64>,
    svd: Svd,
}

impl Reconstructor {
    pub fn new(operator: &ForwardOperator) -> XrdResult<Self> {
        let matrix = operator.matrix().clone();
        let svd = svd_thin(&matrix)?;
        debug!(
            rows = matrix.nrows(),
            cols = matrix.ncols(),
            s_max = svd.max_singular_value(),
            "factorized reconstruction operator"
        );
        Ok(Reconstructor { matrix, svd })
    }

    pub fn singular_values(&self) -> &Array1<f64> {
        &self.svd.s
    }

    /// Recover profile values from `measurements`.
    ///
    /// Rank-deficient operators are fine; only a length mismatch between
    /// operator rows and readings, or an invalid `rcond`, is an error.
    pub fn solve(&self, measurements: &Array1<f64>, rcond: f64) -> XrdResult<Reconstruction> {
        if measurements.len() != self.matrix.nrows() {
            return Err(XrdError::ShapeMismatch {
                context: "reconstruction readings".to_string(),
                expected: self.matrix.nrows(),
                actual: measurements.len(),
            });
        }
        if !rcond.is_finite() || rcond < 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "rcond must be finite and >= 0, got {rcond}"
            )));
        }
        if !measurements.iter().all(|v| v.is_finite()) {
            return Err(XrdError::InvalidConfiguration(
                "readings contain non-finite values".to_string(),
            ));
        }

        let values = self.svd.solve(measurements.view(), rcond)?;
        let rank = self.svd.rank(rcond);
        let cutoff = self.svd.cutoff(rcond);
        let residual = self.matrix.dot(&values) - measurements;
        let residual_norm = residual.dot(&residual).sqrt();

        let dropped = self.svd.s.len() - rank;
        if dropped > 0 {
            warn!(
                dropped,
                rank,
                cutoff,
                "truncated singular values in reconstruction"
            );
        }
        debug!(rank, cutoff, residual_norm, "reconstruction solved");

        Ok(Reconstruction {
            values,
            rank,
            cutoff,
            singular_values: self.svd.s.clone(),
            residual_norm,
        })
    }
}

/// One-shot reconstruction: factorize `operator` and solve once.
pub fn reconstruct(
    operator: &ForwardOperator,
    measurements: &Array1<f64>,
    rcond: f64,
) -> XrdResult<Reconstruction> {
    if measurements.len() != operator.nrows() {
        return Err(XrdError::ShapeMismatch {
            context: "reconstruction readings".to_string(),
            expected: operator.nrows(),
            actual: measurements.len(),
        });
    }
    Reconstructor::new(operator)?.solve(measurements, rcond)
}
