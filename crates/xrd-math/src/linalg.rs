//! Linear algebra utilities.
//!
//! Thin SVD by one-sided Jacobi rotations and the truncated least-squares
//! solve built on it.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use xrd_types::error::{XrdError, XrdResult};

/// Orthogonality threshold per column entry, scaled by the column length.
const JACOBI_TOL: f64 = f64::EPSILON;

/// Sweep limit; typical operators converge in under 15 sweeps.
const MAX_SWEEPS: usize = 80;

/// Thin singular value decomposition `A = U * diag(s) * Vt`.
///
/// `U` is (m, k), `s` is (k) sorted descending, `Vt` is (k, n), k = min(m, n).
#[derive(Debug, Clone)]
pub struct Svd {
    pub u: Array2<f64>,
    pub s: Array1<f64>,
    pub vt: Array2<f64>,
}

impl Svd {
    /// Largest singular value, zero for an all-zero matrix.
    pub fn max_singular_value(&self) -> f64 {
        self.s.iter().copied().fold(0.0, f64::max)
    }

    /// Absolute cutoff for a relative threshold `rcond`.
    pub fn cutoff(&self, rcond: f64) -> f64 {
        rcond * self.max_singular_value()
    }

    /// Number of singular values retained under `rcond`.
    pub fn rank(&self, rcond: f64) -> usize {
        let cutoff = self.cutoff(rcond);
        self.s.iter().filter(|&&s| s > cutoff && s > 0.0).count()
    }

    /// Minimum-norm least-squares solution discarding `s <= rcond * s_max`.
    ///
    /// Singular values that are exactly zero are always discarded, so the
    /// result is finite for any finite `b`.
    pub fn solve(&self, b: ArrayView1<f64>, rcond: f64) -> XrdResult<Array1<f64>> {
        if b.len() != self.u.nrows() {
            return Err(XrdError::ShapeMismatch {
                context: "SVD solve right-hand side".to_string(),
                expected: self.u.nrows(),
                actual: b.len(),
            });
        }
        let cutoff = self.cutoff(rcond);
        let n = self.vt.ncols();
        let mut x = Array1::<f64>::zeros(n);
        for (idx, &sigma) in self.s.iter().enumerate() {
            if sigma <= cutoff || sigma <= 0.0 {
                continue;
            }
            let coeff = self.u.column(idx).dot(&b) / sigma;
            x.scaled_add(coeff, &self.vt.row(idx));
        }
        Ok(x)
    }
}

/// One-sided (Hestenes) Jacobi on the columns of a tall matrix, m >= n.
///
/// Returns (W, V) with W = A V having mutually orthogonal columns, or
/// `LinAlg` when a sweep still rotates after `max_sweeps`.
fn hestenes(a: &Array2<f64>, max_sweeps: usize) -> XrdResult<(Array2<f64>, Array2<f64>)> {
    let n = a.ncols();
    let tol = JACOBI_TOL * a.nrows() as f64;
    let mut w = a.clone();
    let mut v: Array2<f64> = Array2::eye(n);

    for _ in 0..max_sweeps {
        let mut rotated = false;
        for p in 0..n {
            for q in (p + 1)..n {
                let (alpha, beta, gamma) = {
                    let cp = w.column(p);
                    let cq = w.column(q);
                    (cp.dot(&cp), cq.dot(&cq), cp.dot(&cq))
                };
                if gamma == 0.0 || gamma.abs() <= tol * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let cos = 1.0 / (1.0 + t * t).sqrt();
                let sin = cos * t;

                for r in 0..w.nrows() {
                    let wp = w[[r, p]];
                    let wq = w[[r, q]];
                    w[[r, p]] = cos * wp - sin * wq;
                    w[[r, q]] = sin * wp + cos * wq;
                }
                for r in 0..n {
                    let vp = v[[r, p]];
                    let vq = v[[r, q]];
                    v[[r, p]] = cos * vp - sin * vq;
                    v[[r, q]] = sin * vp + cos * vq;
                }
            }
        }
        if !rotated {
            return Ok((w, v));
        }
    }

    Err(XrdError::LinAlg(format!(
        "Jacobi SVD did not converge in {max_sweeps} sweeps ({}x{n})",
        a.nrows()
    )))
}

/// Thin SVD of a general (m, n) matrix.
///
/// Works on A when m >= n and on A^T otherwise, so the rotation count scales
/// with the smaller dimension. Rank-deficient and all-zero matrices are
/// fine: missing directions come back with zero singular values and zero
/// singular vectors.
///
/// Matches `numpy.linalg.svd(A, full_matrices=False)` up to column signs.
pub fn svd_thin(a: &Array2<f64>) -> XrdResult<Svd> {
    let (m, n) = a.dim();
    if m == 0 || n == 0 {
        return Err(XrdError::LinAlg(format!(
            "SVD of an empty {m}x{n} matrix"
        )));
    }
    if !a.iter().all(|v| v.is_finite()) {
        return Err(XrdError::LinAlg(
            "SVD input contains non-finite values".to_string(),
        ));
    }

    let transposed = m < n;
    let tall = if transposed {
        a.t().to_owned()
    } else {
        a.clone()
    };
    let (w, v) = hestenes(&tall, MAX_SWEEPS)?;
    let k = tall.ncols();

    let norms: Vec<f64> = w
        .axis_iter(Axis(1))
        .map(|col| col.dot(&col).sqrt())
        .collect();
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&i, &j| {
        norms[j]
            .partial_cmp(&norms[i])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Left vectors of the tall problem, normalized; right vectors from V.
    let rows = tall.nrows();
    let mut left = Array2::<f64>::zeros((rows, k));
    let mut right = Array2::<f64>::zeros((k, k));
    let mut s = Array1::<f64>::zeros(k);
    for (idx, &col) in order.iter().enumerate() {
        let sigma = norms[col];
        s[idx] = sigma;
        if sigma > 0.0 {
            let inv = 1.0 / sigma;
            for r in 0..rows {
                left[[r, idx]] = w[[r, col]] * inv;
            }
            for r in 0..k {
                right[[idx, r]] = v[[r, col]];
            }
        }
    }

    // tall = left * diag(s) * right; for A^T swap the roles.
    let (u, vt) = if transposed {
        (right.t().to_owned(), left.t().to_owned())
    } else {
        (left, right)
    };

    Ok(Svd { u, s, vt })
}

/// Truncated least-squares solve of `A x = b`.
///
/// Singular values `<= rcond * s_max` are treated as zero, like
/// `numpy.linalg.lstsq(A, b, rcond)`.
pub fn lstsq_truncated(a: &Array2<f64>, b: &Array1<f64>, rcond: f64) -> XrdResult<Array1<f64>> {
    if b.len() != a.nrows() {
        return Err(XrdError::ShapeMismatch {
            context: "least-squares right-hand side".to_string(),
            expected: a.nrows(),
            actual: b.len(),
        });
    }
    svd_thin(a)?.solve(b.view(), rcond)
}
