// ─────────────────────────────────────────────────────────────────────
// SCPN XRD Scan — Measurement Planner
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Beam-center placement for a stepped scan.

use xrd_types::config::ScanConfig;
use xrd_types::error::{XrdError, XrdResult};
use xrd_types::state::MeasurementCenters;

/// Places beam centers every `beam_diameter * (1 - overlap_ratio)` from 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementPlanner {
    beam_diameter_mm: f64,
    overlap_ratio: f64,
    scan_length_mm: f64,
}

impl MeasurementPlanner {
    pub fn new(beam_diameter_mm: f64, overlap_ratio: f64, scan_length_mm: f64) -> XrdResult<Self> {
        if !beam_diameter_mm.is_finite() || beam_diameter_mm <= 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "beam diameter must be finite and > 0, got {beam_diameter_mm}"
            )));
        }
        if !overlap_ratio.is_finite() || overlap_ratio < 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "overlap ratio must be finite and >= 0, got {overlap_ratio}"
            )));
        }
        if !scan_length_mm.is_finite() || scan_length_mm <= 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "scan length must be finite and > 0, got {scan_length_mm}"
            )));
        }
        let step = beam_diameter_mm * (1.0 - overlap_ratio);
        if step <= 0.0 {
            return Err(XrdError::InvalidConfiguration(format!(
                "overlap ratio {overlap_ratio} leaves a non-positive step {step}"
            )));
        }
        Ok(MeasurementPlanner {
            beam_diameter_mm,
            overlap_ratio,
            scan_length_mm,
        })
    }

    pub fn from_config(config: &ScanConfig) -> XrdResult<Self> {
        Self::new(
            config.beam_diameter_mm,
            config.overlap_ratio,
            config.scan_length_mm,
        )
    }

    pub fn step(&self) -> f64 {
        self.beam_diameter_mm * (1.0 - self.overlap_ratio)
    }

    /// Centers `0, step, 2*step, ...` strictly below the scan length.
    pub fn plan(&self) -> XrdResult<MeasurementCenters> {
        MeasurementCenters::arange(self.scan_length_mm, self.step())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scan_centers() {
        let planner = MeasurementPlanner::new(0.5, 0.5, 3.5).unwrap();
        let centers = planner.plan().unwrap();
        assert_eq!(centers.len(), 14);
        assert!((centers.step - 0.25).abs() < 1e-15);
        for (i, &c) in centers.positions.iter().enumerate() {
            assert!((c - 0.25 * i as f64).abs() < 1e-12, "center {i} = {c}");
        }
        assert!((centers.positions[13] - 3.25).abs() < 1e-12);
        assert!(centers.positions[13] < 3.5);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let planner = MeasurementPlanner::new(0.3, 0.2, 5.0).unwrap();
        assert_eq!(planner.plan().unwrap(), planner.plan().unwrap());
    }

    #[test]
    fn test_zero_overlap_steps_by_diameter() {
        let centers = MeasurementPlanner::new(1.0, 0.0, 4.0).unwrap().plan().unwrap();
        assert_eq!(centers.positions.to_vec(), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_rejects_invalid_geometry() {
        for (d, o, l) in [
            (0.0, 0.5, 3.5),
            (-0.5, 0.5, 3.5),
            (0.5, 1.0, 3.5),
            (0.5, 1.5, 3.5),
            (0.5, 0.5, 0.0),
            (f64::NAN, 0.5, 3.5),
        ] {
            assert!(
                matches!(
                    MeasurementPlanner::new(d, o, l),
                    Err(XrdError::InvalidConfiguration(_))
                ),
                "accepted d={d}, o={o}, l={l}"
            );
        }
    }

    #[test]
    fn test_from_config() {
        let config = ScanConfig::new(0.5, 0.5, 0.0, 3.5);
        let planner = MeasurementPlanner::from_config(&config).unwrap();
        assert!((planner.step() - config.step_mm()).abs() < 1e-15);
    }
}
