//! CLI command implementations.

pub mod bb84;
pub mod common;
pub mod heatmap;
pub mod run;
pub mod sanity;
pub mod sweep;
pub mod version;
pub mod vqe;
pub mod walkthrough;
