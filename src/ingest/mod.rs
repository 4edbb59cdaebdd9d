//! Input readers for the two source artifacts.
//!
//! Thin I/O collaborators with fixed contracts: the permit CSV and the
//! boundary GeoJSON. A missing file is the one fatal pre-processing error;
//! everything downstream recovers per-row.

pub mod boundaries;
pub mod permits;
