// ─────────────────────────────────────────────────────────────────────
// SCPN XRD Scan — Tridiag
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Thomas algorithm for tridiagonal systems.
//!
//! Used by the cubic spline fit for the second-derivative system.

use xrd_types::error::{XrdError, XrdResult};

/// Solve tridiagonal system Ax = d using the Thomas algorithm.
///
/// - `a`: sub-diagonal \[n\] (a\[0\] unused)
/// - `b`: main diagonal \[n\]
/// - `c`: super-diagonal \[n\] (c\[n-1\] unused)
/// - `d`: right-hand side \[n\]
///
/// Returns: solution vector x \[n\]
///
/// Errors on mismatched lengths or a zero pivot (singular system).
pub fn thomas_solve(a: &[f64], b: &[f64], c: &[f64], d: &[f64]) -> XrdResult<Vec<f64>> {
    let n = d.len();
    if n == 0 {
        return Err(XrdError::LinAlg("tridiagonal system is empty".to_string()));
    }
    for (name, len) in [("sub-diagonal", a.len()), ("diagonal", b.len()), ("super-diagonal", c.len())] {
        if len != n {
            return Err(XrdError::ShapeMismatch {
                context: format!("tridiagonal {name}"),
                expected: n,
                actual: len,
            });
        }
    }

    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    if b[0] == 0.0 {
        return Err(XrdError::LinAlg("zero pivot at row 0".to_string()));
    }
    c_prime[0] = c[0] / b[0];
    d_prime[0] = d[0] / b[0];

    // Forward sweep
    for i in 1..n {
        let den = b[i] - a[i] * c_prime[i - 1];
        if den == 0.0 {
            return Err(XrdError::LinAlg(format!("zero pivot at row {i}")));
        }
        if i < n - 1 {
            c_prime[i] = c[i] / den;
        }
        d_prime[i] = (d[i] - a[i] * d_prime[i - 1]) / den;
    }

    // Back substitution
    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }

    Ok(x)
}
