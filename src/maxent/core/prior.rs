//! Validation and normalization of prior log-probabilities.
use ndarray::Array1;

use crate::{
    maxent::errors::{MaxentError, MaxentResult},
    optimization::numerical_stability::log_sum_exp,
};

/// Check `log_prior` against a sample space of `n` outcomes and shift it so
/// that `Σ exp(log_prior) = 1`.
///
/// `-inf` entries mark outcomes with zero prior mass and stay `-inf`.
///
/// # Errors
/// - [`MaxentError::ShapeMismatch`] if the length is not `n`.
/// - [`MaxentError::InvalidPrior`] for NaN or `+inf` entries, or when every
///   entry is `-inf`.
pub fn normalize_log_prior(log_prior: Array1<f64>, n: usize) -> MaxentResult<Array1<f64>> {
    if log_prior.len() != n {
        return Err(MaxentError::ShapeMismatch {
            what: "prior log-probabilities",
            expected: n,
            found: log_prior.len(),
        });
    }
    for (index, &value) in log_prior.iter().enumerate() {
        if value.is_nan() || value == f64::INFINITY {
            return Err(MaxentError::InvalidPrior {
                index,
                value,
                reason: "Entries must be finite or -inf.",
            });
        }
    }
    let lse = log_sum_exp(log_prior.view());
    if !lse.is_finite() {
        return Err(MaxentError::InvalidPrior {
            index: 0,
            value: lse,
            reason: "At least one outcome needs positive prior mass.",
        });
    }
    Ok(log_prior - lse)
}
