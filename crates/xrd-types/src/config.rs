// ─────────────────────────────────────────────────────────────────────
// SCPN XRD Scan — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{XrdError, XrdResult};
use crate::state::{arange_len, Grid1D};
use serde::{Deserialize, Serialize};

/// How a beam reading averages the profile under its footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragingPolicy {
    /// Uniform average of every grid node inside `[c - r, c + r]`.
    WindowedMask,
    /// Evenly spaced beam samples folded about x = 0, accumulated onto the
    /// nearest node.
    #[default]
    ReflectiveSymmetry,
}

/// Scan and reconstruction parameters.
/// Maps 1:1 to the scan_config.json schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub beam_diameter_mm: f64,
    pub overlap_ratio: f64,
    pub noise_std_dev: f64,
    pub scan_length_mm: f64,
    /// Spacing of the simulation ("truth") grid.
    #[serde(default = "default_fine_resolution")]
    pub fine_resolution_mm: f64,
    /// Spacing of the reconstruction grid.
    #[serde(default = "default_recon_resolution")]
    pub recon_resolution_mm: f64,
    /// Relative singular value cutoff for the inverse solve.
    #[serde(default = "default_rcond")]
    pub rcond: f64,
    #[serde(default)]
    pub policy: AveragingPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_fine_resolution() -> f64 {
    0.005
}
fn default_recon_resolution() -> f64 {
    0.05
}
fn default_rcond() -> f64 {
    0.05
}

fn require_positive(name: &str, value: f64) -> XrdResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(XrdError::InvalidConfiguration(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

impl ScanConfig {
    /// Config with the default grid resolutions, rcond and policy.
    pub fn new(
        beam_diameter_mm: f64,
        overlap_ratio: f64,
        noise_std_dev: f64,
        scan_length_mm: f64,
    ) -> Self {
        ScanConfig {
            beam_diameter_mm,
            overlap_ratio,
            noise_std_dev,
            scan_length_mm,
            fine_resolution_mm: default_fine_resolution(),
            recon_resolution_mm: default_recon_resolution(),
            rcond: default_rcond(),
            policy: AveragingPolicy::default(),
            seed: None,
        }
    }

    /// Load from JSON file and validate.
    pub fn from_file(path: &str) -> XrdResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field range and that both grids hold at least two nodes.
    pub fn validate(&self) -> XrdResult<()> {
        require_positive("beam_diameter_mm", self.beam_diameter_mm)?;
        require_positive("scan_length_mm", self.scan_length_mm)?;
        require_positive("fine_resolution_mm", self.fine_resolution_mm)?;
        require_positive("recon_resolution_mm", self.recon_resolution_mm)?;
        if !self.overlap_ratio.is_finite() || !(0.0..1.0).contains(&self.overlap_ratio) {
            return Err(XrdError::InvalidConfiguration(format!(
                "overlap_ratio must lie in [0, 1), got {}",
                self.overlap_ratio
            )));
        }
        if !self.noise_std_dev.is_finite() || self.noise_std_dev < 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "noise_std_dev must be finite and >= 0, got {}",
                self.noise_std_dev
            )));
        }
        if !self.rcond.is_finite() || self.rcond < 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "rcond must be finite and >= 0, got {}",
                self.rcond
            )));
        }
        for (name, res) in [
            ("fine_resolution_mm", self.fine_resolution_mm),
            ("recon_resolution_mm", self.recon_resolution_mm),
        ] {
            if arange_len(self.scan_length_mm, res) < 2 {
                return Err(XrdError::InvalidConfiguration(format!(
                    "{name} = {res} leaves fewer than 2 nodes over {} mm",
                    self.scan_length_mm
                )));
            }
        }
        Ok(())
    }

    pub fn beam_radius_mm(&self) -> f64 {
        self.beam_diameter_mm / 2.0
    }

    /// Distance between successive beam centers.
    pub fn step_mm(&self) -> f64 {
        self.beam_diameter_mm * (1.0 - self.overlap_ratio)
    }

    pub fn fine_grid(&self) -> XrdResult<Grid1D> {
        Grid1D::arange(self.scan_length_mm, self.fine_resolution_mm)
    }

    pub fn recon_grid(&self) -> XrdResult<Grid1D> {
        Grid1D::arange(self.scan_length_mm, self.recon_resolution_mm)
    }
}
