//! Error types for the QKD crate.

use thiserror::Error;

/// Errors produced by BB84 session simulation and sweeps.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum QkdError {
    /// A probability argument is NaN or outside [0, 1].
    #[error("invalid parameter: {name} = {value} must lie in [0, 1]")]
    InvalidProbability {
        /// Name of the offending argument.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A sweep or collection argument is out of its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for QKD operations.
pub type QkdResult<T> = Result<T, QkdError>;

/// Reject probabilities that are NaN or outside [0, 1].
pub(crate) fn check_probability(name: &'static str, value: f64) -> QkdResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(QkdError::InvalidProbability { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_closed_unit_interval() {
        assert!(check_probability("p", 0.0).is_ok());
        assert!(check_probability("p", 1.0).is_ok());
        assert!(check_probability("p", 0.37).is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        for bad in [-0.01, 1.0001, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                check_probability("p_eve", bad),
                Err(QkdError::InvalidProbability { name: "p_eve", .. })
            ));
        }
    }
}
