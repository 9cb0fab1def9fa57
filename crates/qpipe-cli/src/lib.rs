//! Pipeline orchestration behind the `qpipe` command.
//!
//! The binary is a thin clap front end; everything it runs lives here so
//! it can be driven from tests:
//!
//! - [`config`]: YAML file, flag and `QPIPE_*` environment layering
//! - [`pipeline`]: the BB84 gate → key → VQE → sealed results sequence
//! - [`envelope`]: key packing and the XOR result envelope
//! - [`report`]: CSV and JSON artefacts

pub mod config;
pub mod envelope;
pub mod error;
pub mod pipeline;
pub mod report;

pub use config::{Bb84Config, ConfigError, HeatmapConfig, PipelineConfig, VqeConfig};
pub use envelope::{EnvelopeError, SessionKey, open, open_raw, seal};
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{
    Bb84Stage, Bb84Summary, PipelineOutcome, PipelineReport, Stage, VqeReport, run_bb84_stage,
    run_heatmap, run_pipeline, run_vqe_stage,
};
