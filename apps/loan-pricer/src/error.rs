//! Error types for loan pricing.
//!
//! A solver that cannot find a fair rate or fee does NOT produce an error:
//! that outcome is `SolveOutcome::NoSolution`. Errors are reserved for inputs
//! that have no well-defined option value and must be rejected at the
//! boundary.

use thiserror::Error;

/// Errors raised while validating pricing inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// An input parameter is outside its valid domain.
    #[error("Invalid input: {field} = {value} ({reason})")]
    InvalidInput {
        /// Name of the offending parameter.
        field: &'static str,
        /// Value that was rejected.
        value: f64,
        /// Constraint the value violated.
        reason: &'static str,
    },
}

impl PricingError {
    pub(crate) const fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidInput {
            field,
            value,
            reason,
        }
    }
}

/// Require a finite, strictly positive value.
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<f64, PricingError> {
    if !value.is_finite() {
        return Err(PricingError::invalid(field, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(PricingError::invalid(field, value, "must be positive"));
    }
    Ok(value)
}

/// Require a finite value.
pub(crate) fn require_finite(field: &'static str, value: f64) -> Result<f64, PricingError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PricingError::invalid(field, value, "must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive("spot", 2.5), Ok(2.5));
        assert!(require_positive("spot", 0.0).is_err());
        assert!(require_positive("spot", -1.0).is_err());
        assert!(require_positive("spot", f64::NAN).is_err());
        assert!(require_positive("spot", f64::INFINITY).is_err());
    }

    #[test]
    fn test_require_finite_allows_negative() {
        assert_eq!(require_finite("risk_free_rate", -0.01), Ok(-0.01));
        assert!(require_finite("risk_free_rate", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_error_message_names_field() {
        let err = PricingError::invalid("volatility", 0.0, "must be positive");
        let message = err.to_string();
        assert!(message.contains("volatility"));
        assert!(message.contains("must be positive"));
    }
}
