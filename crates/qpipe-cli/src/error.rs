//! Error types for pipeline orchestration.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::envelope::EnvelopeError;

/// Errors produced while running the pipeline or writing artefacts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// BB84 simulation rejected its arguments.
    #[error("BB84 stage failed: {0}")]
    Qkd(#[from] qpipe_qkd::QkdError),

    /// VQE stage rejected its arguments or hit an ill-conditioned matrix.
    #[error("VQE stage failed: {0}")]
    Vqe(#[from] qpipe_vqe::VqeError),

    /// Key derivation or envelope failure.
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing an artefact failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// File or directory being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The sealed results did not decrypt back to the written plaintext.
    #[error("decrypt check failed for {}", path.display())]
    RoundTripMismatch {
        /// The encrypted artefact.
        path: PathBuf,
    },
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
