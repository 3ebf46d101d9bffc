// ─────────────────────────────────────────────────────────────────────
// SCPN XRD Scan — Measurement Simulator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Synthetic beam readings with additive Gaussian noise.

use crate::operator::ForwardOperator;
use ndarray::Array1;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;
use xrd_types::error::{XrdError, XrdResult};

/// Readings for one simulated scan, ordered like the measurement centers.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    /// Noise-free readings, `A @ profile`.
    pub clean: Array1<f64>,
    /// `clean` plus i.i.d. N(0, sigma²) noise.
    pub noisy: Array1<f64>,
}

/// Applies a fine-grid operator to sampled truth and injects noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementSimulator {
    noise_std_dev: f64,
}

impl MeasurementSimulator {
    pub fn new(noise_std_dev: f64) -> XrdResult<Self> {
        if !noise_std_dev.is_finite() || noise_std_dev < 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "noise_std_dev must be finite and >= 0, got {noise_std_dev}"
            )));
        }
        Ok(MeasurementSimulator { noise_std_dev })
    }

    pub fn noise_std_dev(&self) -> f64 {
        self.noise_std_dev
    }

    /// Simulate readings of `profile_values` (sampled on the operator's grid).
    ///
    /// The caller owns `rng`; with zero noise it is left untouched and
    /// `noisy == clean` exactly.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        operator: &ForwardOperator,
        profile_values: &Array1<f64>,
        rng: &mut R,
    ) -> XrdResult<Measurements> {
        if !profile_values.iter().all(|v| v.is_finite()) {
            return Err(XrdError::InvalidConfiguration(
                "profile samples contain non-finite values".to_string(),
            ));
        }
        let clean = operator.apply(profile_values)?;

        if self.noise_std_dev == 0.0 {
            debug!(readings = clean.len(), "simulated noise-free readings");
            return Ok(Measurements {
                noisy: clean.clone(),
                clean,
            });
        }

        let noise_dist = Normal::new(0.0, self.noise_std_dev)
            .map_err(|e| XrdError::InvalidConfiguration(e.to_string()))?;
        let noisy = clean.mapv(|v| v + noise_dist.sample(rng));
        debug!(
            readings = clean.len(),
            sigma = self.noise_std_dev,
            "simulated noisy readings"
        );
        Ok(Measurements { clean, noisy })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::ForwardOperatorBuilder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use xrd_types::config::AveragingPolicy;
    use xrd_types::state::{Grid1D, MeasurementCenters};

    fn fine_operator() -> ForwardOperator {
        let grid = Grid1D::arange(3.5, 0.005).unwrap();
        let centers = MeasurementCenters::arange(3.5, 0.25).unwrap();
        ForwardOperatorBuilder::new(AveragingPolicy::WindowedMask)
            .build(&grid, &centers, 0.5)
            .unwrap()
    }

    #[test]
    fn test_zero_noise_is_exact() {
        let op = fine_operator();
        let profile = Array1::from_shape_fn(op.ncols(), |j| -300.0 + j as f64);
        let mut rng = StdRng::seed_from_u64(7);
        let meas = MeasurementSimulator::new(0.0)
            .unwrap()
            .simulate(&op, &profile, &mut rng)
            .unwrap();
        assert_eq!(meas.noisy, meas.clean);
        assert_eq!(meas.clean, op.apply(&profile).unwrap());
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let op = fine_operator();
        let profile = Array1::from_elem(op.ncols(), -400.0);
        let sim = MeasurementSimulator::new(15.0).unwrap();
        let a = sim.simulate(&op, &profile, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = sim.simulate(&op, &profile, &mut StdRng::seed_from_u64(42)).unwrap();
        let c = sim.simulate(&op, &profile, &mut StdRng::seed_from_u64(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.noisy, c.noisy);
        assert_eq!(a.clean, c.clean);
    }

    #[test]
    fn test_noise_statistics() {
        let grid = Grid1D::arange(100.0, 0.5).unwrap();
        let centers = MeasurementCenters::arange(100.0, 0.05).unwrap();
        let op = ForwardOperatorBuilder::new(AveragingPolicy::WindowedMask)
            .build(&grid, &centers, 1.0)
            .unwrap();
        let profile = Array1::zeros(grid.len());
        let meas = MeasurementSimulator::new(10.0)
            .unwrap()
            .simulate(&op, &profile, &mut StdRng::seed_from_u64(2026))
            .unwrap();
        let n = meas.noisy.len() as f64;
        let mean = meas.noisy.sum() / n;
        let var = meas.noisy.mapv(|v| (v - mean).powi(2)).sum() / (n - 1.0);
        assert!(mean.abs() < 1.0, "noise mean {mean}");
        assert!((var.sqrt() - 10.0).abs() < 0.8, "noise std {}", var.sqrt());
    }

    #[test]
    fn test_rejects_negative_noise() {
        assert!(matches!(
            MeasurementSimulator::new(-1.0),
            Err(XrdError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_profile_length_mismatch() {
        let op = fine_operator();
        let profile = Array1::zeros(10);
        let err = MeasurementSimulator::new(0.0)
            .unwrap()
            .simulate(&op, &profile, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, XrdError::ShapeMismatch { .. }));
    }
}
