//! Mathematical primitives for SCPN XRD Scan.

pub mod interp;
pub mod linalg;
pub mod tridiag;
