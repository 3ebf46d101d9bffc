// ─────────────────────────────────────────────────────────────────────
// SCPN XRD Scan — Scan Pipeline
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! End-to-end scan: geometry, simulation on the fine grid, reconstruction
//! on the coarse grid.
//!
//! Every stage returns an immutable value; the pipeline only caches what
//! is fixed by the configuration (grids, centers, fine-grid operator,
//! reconstruction SVD).

use crate::operator::{ForwardOperator, ForwardOperatorBuilder};
use crate::planner::MeasurementPlanner;
use crate::profile::ContinuousProfile;
use crate::reconstruct::{Reconstruction, Reconstructor};
use crate::simulator::MeasurementSimulator;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use xrd_types::config::ScanConfig;
use xrd_types::error::XrdResult;
use xrd_types::state::{Grid1D, MeasurementCenters};

/// Grids and beam centers derived once from a [`ScanConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScanGeometry {
    pub fine_grid: Grid1D,
    pub recon_grid: Grid1D,
    pub centers: MeasurementCenters,
}

impl ScanGeometry {
    pub fn from_config(config: &ScanConfig) -> XrdResult<Self> {
        config.validate()?;
        Ok(ScanGeometry {
            fine_grid: config.fine_grid()?,
            recon_grid: config.recon_grid()?,
            centers: MeasurementPlanner::from_config(config)?.plan()?,
        })
    }
}

/// One simulated scan of a ground-truth profile.
#[derive(Debug, Clone)]
pub struct SimulatedScan {
    /// Profile sampled on the fine grid.
    pub truth: Array1<f64>,
    pub clean: Array1<f64>,
    pub noisy: Array1<f64>,
}

/// Configured scan; simulate and reconstruct as often as needed.
#[derive(Debug, Clone)]
pub struct ScanPipeline {
    config: ScanConfig,
    geometry: ScanGeometry,
    fine_operator: ForwardOperator,
    reconstructor: Reconstructor,
}

impl ScanPipeline {
    pub fn new(config: ScanConfig) -> XrdResult<Self> {
        let geometry = ScanGeometry::from_config(&config)?;
        let builder = ForwardOperatorBuilder::new(config.policy);
        let fine_operator =
            builder.build(&geometry.fine_grid, &geometry.centers, config.beam_diameter_mm)?;
        let recon_operator =
            builder.build(&geometry.recon_grid, &geometry.centers, config.beam_diameter_mm)?;
        let reconstructor = Reconstructor::new(&recon_operator)?;
        info!(
            centers = geometry.centers.len(),
            fine_nodes = geometry.fine_grid.len(),
            recon_nodes = geometry.recon_grid.len(),
            policy = ?config.policy,
            "scan pipeline ready"
        );
        Ok(ScanPipeline {
            config,
            geometry,
            fine_operator,
            reconstructor,
        })
    }

    /// Random source for this config: seeded when `seed` is set.
    pub fn rng_for(config: &ScanConfig) -> StdRng {
        match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn geometry(&self) -> &ScanGeometry {
        &self.geometry
    }

    /// Operator that synthesizes readings from fine-grid truth.
    pub fn fine_operator(&self) -> &ForwardOperator {
        &self.fine_operator
    }

    pub fn reconstructor(&self) -> &Reconstructor {
        &self.reconstructor
    }

    /// Sample `profile` on the fine grid and simulate noisy readings.
    pub fn simulate<P, R>(&self, profile: &P, rng: &mut R) -> XrdResult<SimulatedScan>
    where
        P: ContinuousProfile + ?Sized,
        R: Rng + ?Sized,
    {
        let truth = profile.evaluate(self.geometry.fine_grid.x());
        let measurements = MeasurementSimulator::new(self.config.noise_std_dev)?
            .simulate(&self.fine_operator, &truth, rng)?;
        info!(
            readings = measurements.noisy.len(),
            sigma = self.config.noise_std_dev,
            "scan simulated"
        );
        Ok(SimulatedScan {
            truth,
            clean: measurements.clean,
            noisy: measurements.noisy,
        })
    }

    /// Reconstruct from a simulated scan; reuses the cached factorization.
    pub fn reconstruct(&self, scan: &SimulatedScan, rcond: f64) -> XrdResult<Reconstruction> {
        let recon = self.reconstructor.solve(&scan.noisy, rcond)?;
        info!(rank = recon.rank, rcond, "profile reconstructed");
        Ok(recon)
    }

    /// Simulate and reconstruct with the configured `rcond`.
    pub fn run<P, R>(&self, profile: &P, rng: &mut R) -> XrdResult<ScanOutcome>
    where
        P: ContinuousProfile + ?Sized,
        R: Rng + ?Sized,
    {
        let scan = self.simulate(profile, rng)?;
        let reconstruction = self.reconstruct(&scan, self.config.rcond)?;
        Ok(ScanOutcome {
            geometry: self.geometry.clone(),
            scan,
            reconstruction,
        })
    }
}

/// Result of a full run, read-only.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    geometry: ScanGeometry,
    scan: SimulatedScan,
    reconstruction: Reconstruction,
}

impl ScanOutcome {
    pub fn fine_positions(&self) -> &Array1<f64> {
        self.geometry.fine_grid.x()
    }

    pub fn truth(&self) -> &Array1<f64> {
        &self.scan.truth
    }

    pub fn centers(&self) -> &Array1<f64> {
        &self.geometry.centers.positions
    }

    pub fn clean(&self) -> &Array1<f64> {
        &self.scan.clean
    }

    pub fn noisy(&self) -> &Array1<f64> {
        &self.scan.noisy
    }

    pub fn recon_positions(&self) -> &Array1<f64> {
        self.geometry.recon_grid.x()
    }

    pub fn reconstructed(&self) -> &Array1<f64> {
        &self.reconstruction.values
    }

    pub fn reconstruction(&self) -> &Reconstruction {
        &self.reconstruction
    }

    pub fn scan(&self) -> &SimulatedScan {
        &self.scan
    }

    /// RMS difference between the reconstruction and `profile` sampled on
    /// the reconstruction grid.
    pub fn reconstruction_rmse<P: ContinuousProfile + ?Sized>(&self, profile: &P) -> f64 {
        let expected = profile.evaluate(self.recon_positions());
        let diff = &self.reconstruction.values - &expected;
        (diff.dot(&diff) / diff.len() as f64).sqrt()
    }
}
