// ─────────────────────────────────────────────────────────────────────
// SCPN XRD Scan — Stress Profiles
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Continuous residual-stress profiles sampled by the scan.
//!
//! Positions are in mm, stresses in MPa. A tabulated profile is stored as
//! explicit knots plus an interpolation tag, never as executable state.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use xrd_math::interp::{BoundaryCondition, CubicSpline, LinearInterp};
use xrd_types::error::{XrdError, XrdResult};

/// A stress profile that can be sampled at arbitrary positions.
pub trait ContinuousProfile {
    /// Stress at each of `positions`, same length as the input.
    fn evaluate(&self, positions: &Array1<f64>) -> Array1<f64>;
}

impl<P: ContinuousProfile + ?Sized> ContinuousProfile for &P {
    fn evaluate(&self, positions: &Array1<f64>) -> Array1<f64> {
        (**self).evaluate(positions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    #[default]
    CubicSpline,
    Linear,
}

/// How a reference stress scales a normalized curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    /// Multiply by `|sigma_ref|`; the curve carries the sign.
    Magnitude,
    /// Multiply by `sigma_ref` as given.
    Signed,
}

/// Serialized form of [`TabulatedProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileTable {
    pub knots_mm: Vec<f64>,
    pub values_mpa: Vec<f64>,
    #[serde(default)]
    pub method: InterpolationMethod,
    #[serde(default)]
    pub boundary: BoundaryCondition,
}

#[derive(Debug, Clone)]
enum Interpolant {
    Spline(CubicSpline),
    Linear(LinearInterp),
}

/// Profile interpolated through tabulated knots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ProfileTable", into = "ProfileTable")]
pub struct TabulatedProfile {
    table: ProfileTable,
    interpolant: Interpolant,
}

impl TryFrom<ProfileTable> for TabulatedProfile {
    type Error = XrdError;

    fn try_from(table: ProfileTable) -> XrdResult<Self> {
        let interpolant = match table.method {
            InterpolationMethod::CubicSpline => Interpolant::Spline(CubicSpline::new(
                &table.knots_mm,
                &table.values_mpa,
                table.boundary,
            )?),
            InterpolationMethod::Linear => {
                Interpolant::Linear(LinearInterp::new(&table.knots_mm, &table.values_mpa)?)
            }
        };
        Ok(TabulatedProfile { table, interpolant })
    }
}

impl From<TabulatedProfile> for ProfileTable {
    fn from(profile: TabulatedProfile) -> Self {
        profile.table
    }
}

impl TabulatedProfile {
    pub fn new(
        knots_mm: Vec<f64>,
        values_mpa: Vec<f64>,
        method: InterpolationMethod,
        boundary: BoundaryCondition,
    ) -> XrdResult<Self> {
        Self::try_from(ProfileTable {
            knots_mm,
            values_mpa,
            method,
            boundary,
        })
    }

    /// Calibrate a digitized normalized curve `(r / r_spot, sigma / sigma_ref)`.
    ///
    /// Points may arrive in any order; they are sorted by abscissa.
    pub fn from_normalized(
        points: &[(f64, f64)],
        r_spot_mm: f64,
        sigma_ref_mpa: f64,
        sign: SignConvention,
        method: InterpolationMethod,
        boundary: BoundaryCondition,
    ) -> XrdResult<Self> {
        if !r_spot_mm.is_finite() || r_spot_mm <= 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "r_spot_mm must be finite and > 0, got {r_spot_mm}"
            )));
        }
        if !sigma_ref_mpa.is_finite() {
            return Err(XrdError::InvalidConfiguration(format!(
                "sigma_ref_mpa must be finite, got {sigma_ref_mpa}"
            )));
        }
        let scale = match sign {
            SignConvention::Magnitude => sigma_ref_mpa.abs(),
            SignConvention::Signed => sigma_ref_mpa,
        };

        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (knots_mm, values_mpa): (Vec<f64>, Vec<f64>) = sorted
            .iter()
            .map(|&(r, s)| (r * r_spot_mm, s * scale))
            .unzip();
        Self::new(knots_mm, values_mpa, method, boundary)
    }

    /// Load a JSON tabulation.
    pub fn from_file(path: &str) -> XrdResult<Self> {
        if !Path::new(path).exists() {
            return Err(XrdError::MissingInput(format!(
                "profile table not found: {path}"
            )));
        }
        let contents = std::fs::read_to_string(path)?;
        let profile: Self = serde_json::from_str(&contents)?;
        debug!(
            path,
            knots = profile.table.knots_mm.len(),
            method = ?profile.table.method,
            "loaded profile table"
        );
        Ok(profile)
    }

    pub fn table(&self) -> &ProfileTable {
        &self.table
    }

    pub fn value(&self, x: f64) -> f64 {
        match &self.interpolant {
            Interpolant::Spline(spline) => spline.value(x),
            Interpolant::Linear(linear) => linear.value(x),
        }
    }
}

impl ContinuousProfile for TabulatedProfile {
    fn evaluate(&self, positions: &Array1<f64>) -> Array1<f64> {
        positions.mapv(|x| self.value(x))
    }
}

fn gaussian(r: f64, mean: f64, width: f64) -> f64 {
    (-(r - mean).powi(2) / (2.0 * width * width)).exp()
}

/// Analytic laser-peening reference curve.
///
/// A compressive core, a deeper compressive ring near `r = 1.05` and a
/// small tensile rebound near `r = 2.6`, with `r = x / r_spot`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceProfile {
    pub r_spot_mm: f64,
    pub sigma_ref_mpa: f64,
}

impl ReferenceProfile {
    pub fn new(r_spot_mm: f64, sigma_ref_mpa: f64) -> XrdResult<Self> {
        if !r_spot_mm.is_finite() || r_spot_mm <= 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "r_spot_mm must be finite and > 0, got {r_spot_mm}"
            )));
        }
        if !sigma_ref_mpa.is_finite() {
            return Err(XrdError::InvalidConfiguration(format!(
                "sigma_ref_mpa must be finite, got {sigma_ref_mpa}"
            )));
        }
        Ok(ReferenceProfile {
            r_spot_mm,
            sigma_ref_mpa,
        })
    }

    /// Normalized stress `sigma / sigma_ref` at normalized radius `r`.
    pub fn normalized(r: f64) -> f64 {
        -0.38 * gaussian(r, 0.0, 1.2) - 0.75 * gaussian(r, 1.05, 0.35)
            + 0.12 * gaussian(r, 2.6, 0.7)
    }

    pub fn value(&self, x: f64) -> f64 {
        self.sigma_ref_mpa * Self::normalized(x / self.r_spot_mm)
    }
}

impl ContinuousProfile for ReferenceProfile {
    fn evaluate(&self, positions: &Array1<f64>) -> Array1<f64> {
        positions.mapv(|x| self.value(x))
    }
}

/// Profile backed by a closure.
#[derive(Clone)]
pub struct FnProfile<F>(pub F);

impl<F: Fn(f64) -> f64> ContinuousProfile for FnProfile<F> {
    fn evaluate(&self, positions: &Array1<f64>) -> Array1<f64> {
        positions.mapv(|x| (self.0)(x))
    }
}

/// Uniform stress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantProfile(pub f64);

impl ContinuousProfile for ConstantProfile {
    fn evaluate(&self, positions: &Array1<f64>) -> Array1<f64> {
        Array1::from_elem(positions.len(), self.0)
    }
}
