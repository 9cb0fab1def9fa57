//! Error types for the VQE crate.

use thiserror::Error;

/// Errors produced by the Hamiltonian table, exact solver and ansatz.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum VqeError {
    /// An argument is outside its domain (bond length, parameter count, matrix shape).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The matrix cannot be diagonalized reliably.
    #[error("numerical ill-conditioning: {0}")]
    NumericalIllConditioning(String),
}

/// Result type for VQE operations.
pub type VqeResult<T> = Result<T, VqeError>;
