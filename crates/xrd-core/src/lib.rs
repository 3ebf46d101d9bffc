// ─────────────────────────────────────────────────────────────────────
// SCPN XRD Scan — Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! XRD beam-scan simulation and regularized deconvolution.
//!
//! Stage 1: measurement planning, forward operators
//! Stage 2: noisy readings, truncated-SVD reconstruction, pipeline

pub mod operator;
pub mod pipeline;
pub mod planner;
pub mod profile;
pub mod reconstruct;
pub mod simulator;
