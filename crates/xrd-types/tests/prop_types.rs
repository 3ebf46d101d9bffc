// ─────────────────────────────────────────────────────────────────────
// SCPN XRD Scan — Property-Based Tests (proptest) for xrd-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for xrd-types using proptest.
//!
//! Covers: Grid1D construction invariants, MeasurementCenters spacing,
//! ScanConfig validation and serialization roundtrip.

use proptest::prelude::*;
use xrd_types::config::{AveragingPolicy, ScanConfig};
use xrd_types::state::{Grid1D, MeasurementCenters};

// ── Grid1D Construction Invariants ───────────────────────────────────

proptest! {
    /// Every node lies in [0, length) and the count follows the arange rule.
    #[test]
    fn grid_covers_half_open_range(
        length in 0.5f64..10.0,
        dx in 0.005f64..0.2,
    ) {
        let grid = Grid1D::arange(length, dx).unwrap();
        prop_assert!(grid.len() >= 2);
        prop_assert_eq!(grid.x().len(), grid.len());
        prop_assert_eq!(grid.x()[0], 0.0);
        prop_assert!(grid.last() < length);
        prop_assert!(grid.last() + dx >= length - 1e-9);
    }

    /// Nodes are strictly increasing with uniform spacing.
    #[test]
    fn grid_uniform_monotone(
        length in 0.5f64..10.0,
        dx in 0.01f64..0.2,
    ) {
        let grid = Grid1D::arange(length, dx).unwrap();
        for i in 1..grid.len() {
            let delta = grid.x()[i] - grid.x()[i - 1];
            prop_assert!(delta > 0.0);
            prop_assert!((delta - grid.dx()).abs() < 1e-9,
                "Non-uniform spacing at {}: delta={}, dx={}", i, delta, grid.dx());
        }
    }
}

// ── MeasurementCenters Invariants ────────────────────────────────────

proptest! {
    /// Centers start at zero, stay below the scan length and keep the step.
    #[test]
    fn centers_spacing(
        length in 0.5f64..10.0,
        step in 0.01f64..1.0,
    ) {
        let centers = MeasurementCenters::arange(length, step).unwrap();
        prop_assert!(!centers.is_empty());
        prop_assert_eq!(centers.positions[0], 0.0);
        prop_assert!(centers.positions[centers.len() - 1] < length);
        for w in centers.positions.as_slice().unwrap().windows(2) {
            prop_assert!((w[1] - w[0] - step).abs() < 1e-9);
        }
    }
}

// ── ScanConfig Validation ────────────────────────────────────────────

proptest! {
    /// Overlap ratios at or above one are always rejected.
    #[test]
    fn config_rejects_full_overlap(overlap in 1.0f64..5.0) {
        let cfg = ScanConfig::new(0.5, overlap, 0.0, 3.5);
        prop_assert!(cfg.validate().is_err());
    }

    /// Valid configs survive a JSON roundtrip unchanged.
    #[test]
    fn config_roundtrip(
        beam in 0.05f64..2.0,
        overlap in 0.0f64..0.95,
        noise in 0.0f64..50.0,
        seed in any::<u64>(),
        windowed in any::<bool>(),
    ) {
        let policy = if windowed {
            AveragingPolicy::WindowedMask
        } else {
            AveragingPolicy::ReflectiveSymmetry
        };
        let cfg = ScanConfig {
            policy,
            seed: Some(seed),
            ..ScanConfig::new(beam, overlap, noise, 3.5)
        };
        prop_assert!(cfg.validate().is_ok());
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ScanConfig = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(cfg, back);
    }
}
