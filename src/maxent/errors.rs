//! Errors for maximum-entropy models (construction checks, numerical
//! failures, fit lifecycle, and optimizer failures).
//!
//! [`MaxentError`] is the single error type of the model layer. It implements
//! `Display`/`Error` and, with the `python-bindings` feature, converts to a
//! Python `ValueError`.
//!
//! ## Conventions
//! - **Indices are 0-based**: `feature` is a row of the feature matrix,
//!   `outcome` a position in the sample space.
//! - Solver failures ([`OptError`]) are folded into the closest model-level
//!   variant; anything that stops a fit short of convergence becomes
//!   [`MaxentError::ConvergenceFailure`].
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::optimization::errors::OptError;

/// Crate-wide result alias for model operations.
pub type MaxentResult<T> = Result<T, MaxentError>;

#[derive(Debug, Clone, PartialEq)]
pub enum MaxentError {
    // ---- Construction ----
    /// The sample space has no outcomes.
    EmptySampleSpace,

    /// No feature functions were supplied.
    NoFeatures,

    /// A feature produced NaN or ±inf.
    NonFiniteFeature { feature: usize, outcome: usize, value: f64 },

    /// A vector has the wrong length (`what` names it).
    ShapeMismatch { what: &'static str, expected: usize, found: usize },

    /// Prior log-probabilities must be finite or `-inf`, with some mass left.
    InvalidPrior { index: usize, value: f64, reason: &'static str },

    /// Gaussian smoothing variance must be finite and > 0.
    InvalidSigma2 { value: f64 },

    // ---- Fit inputs ----
    /// A target expectation is NaN or ±inf.
    NonFiniteTarget { index: usize, value: f64 },

    /// A parameter is NaN or ±inf.
    NonFiniteParam { index: usize, value: f64 },

    /// The dual lower bound must be finite.
    InvalidMinDual { value: f64 },

    /// Solver configuration rejected.
    InvalidOptions { text: String },

    // ---- Evaluation ----
    /// The partition function under- or overflowed.
    NumericalInstability { reason: String },

    // ---- Fit lifecycle ----
    /// The solver stopped without meeting its tolerances.
    ConvergenceFailure { status: String, iterations: Option<usize>, grad_norm: Option<f64> },

    /// The query needs a successfully fitted model.
    NotFitted,
}

impl std::error::Error for MaxentError {}

impl std::fmt::Display for MaxentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Construction ----
            MaxentError::EmptySampleSpace => {
                write!(f, "Sample space must contain at least one outcome.")
            }
            MaxentError::NoFeatures => {
                write!(f, "At least one feature function is required.")
            }
            MaxentError::NonFiniteFeature { feature, outcome, value } => {
                write!(f, "Feature {feature} is non-finite at outcome {outcome}: {value}")
            }
            MaxentError::ShapeMismatch { what, expected, found } => {
                write!(f, "Length mismatch for {what}: expected {expected}, found {found}")
            }
            MaxentError::InvalidPrior { index, value, reason } => {
                write!(f, "Invalid prior log-probability at index {index}: {value}. {reason}")
            }
            MaxentError::InvalidSigma2 { value } => {
                write!(f, "Smoothing variance sigma2 must be finite and > 0; got: {value}")
            }

            // ---- Fit inputs ----
            MaxentError::NonFiniteTarget { index, value } => {
                write!(f, "Target expectation at index {index} is non-finite: {value}")
            }
            MaxentError::NonFiniteParam { index, value } => {
                write!(f, "Parameter at index {index} is non-finite: {value}")
            }
            MaxentError::InvalidMinDual { value } => {
                write!(f, "Dual lower bound must be finite; got: {value}")
            }
            MaxentError::InvalidOptions { text } => {
                write!(f, "Invalid solver options: {text}")
            }

            // ---- Evaluation ----
            MaxentError::NumericalInstability { reason } => {
                write!(f, "Numerical instability: {reason}")
            }

            // ---- Fit lifecycle ----
            MaxentError::ConvergenceFailure { status, iterations, grad_norm } => {
                write!(f, "Fit did not converge ({status})")?;
                if let Some(it) = iterations {
                    write!(f, " after {it} iterations")?;
                }
                if let Some(g) = grad_norm {
                    write!(f, ", gradient norm {g:e}")?;
                }
                Ok(())
            }
            MaxentError::NotFitted => {
                write!(f, "Model hasn't been fitted yet.")
            }
        }
    }
}

/// Convert a [`MaxentError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl std::convert::From<MaxentError> for PyErr {
    fn from(err: MaxentError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<OptError> for MaxentError {
    fn from(err: OptError) -> MaxentError {
        match err {
            OptError::NumericalInstability { reason } => MaxentError::NumericalInstability { reason },
            OptError::NonFiniteCost { value } => MaxentError::NumericalInstability {
                reason: format!("dual evaluated to {value}"),
            },
            OptError::InvalidGradient { index, value, .. } => MaxentError::NumericalInstability {
                reason: format!("dual gradient is {value} at index {index}"),
            },
            OptError::ThetaLengthMismatch { expected, actual } => {
                MaxentError::ShapeMismatch { what: "parameters", expected, found: actual }
            }
            OptError::GradientDimMismatch { expected, found } => {
                MaxentError::ShapeMismatch { what: "gradient", expected, found }
            }
            OptError::InvalidThetaInput { index, value }
            | OptError::InvalidThetaHat { index, value, .. } => {
                MaxentError::NonFiniteParam { index, value }
            }
            OptError::InvalidMinCost { value, .. } => MaxentError::InvalidMinDual { value },
            e @ (OptError::InvalidTolGrad { .. }
            | OptError::InvalidTolCost { .. }
            | OptError::InvalidMaxIter { .. }
            | OptError::NoTolerancesProvided
            | OptError::InvalidLineSearch { .. }
            | OptError::InvalidLBFGSMem { .. }) => MaxentError::InvalidOptions { text: e.to_string() },
            other => MaxentError::ConvergenceFailure {
                status: other.to_string(),
                iterations: None,
                grad_norm: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Numerical failures raised inside the dual survive the round trip
    // through the solver's error type.
    fn numerical_instability_round_trips_through_opt_error() {
        // Arrange
        let original = MaxentError::NumericalInstability { reason: "Z underflow".into() };

        // Act
        let back = MaxentError::from(OptError::from(original.clone()));

        // Assert
        assert_eq!(back, original);
    }

    #[test]
    fn option_errors_become_invalid_options() {
        let err = MaxentError::from(OptError::NoTolerancesProvided);
        assert!(matches!(err, MaxentError::InvalidOptions { .. }));

        let err = MaxentError::from(OptError::InvalidMinCost { value: f64::NAN, reason: "x" });
        assert!(matches!(err, MaxentError::InvalidMinDual { .. }));
    }

    #[test]
    fn backend_errors_become_convergence_failures() {
        let err = MaxentError::from(OptError::ConditionViolated { text: "no descent".into() });
        match err {
            MaxentError::ConvergenceFailure { status, iterations, .. } => {
                assert!(status.contains("no descent"));
                assert_eq!(iterations, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn convergence_failure_message_lists_diagnostics() {
        let err = MaxentError::ConvergenceFailure {
            status: "MaxItersReached".into(),
            iterations: Some(10),
            grad_norm: Some(0.5),
        };
        assert_eq!(
            err.to_string(),
            "Fit did not converge (MaxItersReached) after 10 iterations, gradient norm 5e-1"
        );
    }
}
