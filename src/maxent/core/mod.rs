//! core — sample-space features, the feature matrix, priors, and fit options.
//!
//! Purpose
//! -------
//! Collect the building blocks a maximum-entropy model is made of: feature
//! functions and their evaluation over the sample space, the cached
//! `m × n` feature matrix, prior normalization, fit options and the fit
//! lifecycle state.
//!
//! Key behaviors
//! -------------
//! - [`Feature`] / [`VectorizedFeature`] accept plain closures returning any
//!   numeric or boolean value (per outcome) or a column (whole sample space).
//! - [`FeatureMatrix::build`] evaluates every feature once and rejects
//!   non-finite values with their `(feature, outcome)` position.
//! - [`normalize_log_prior`] validates prior log-probabilities and shifts
//!   them to sum to one in probability space.
//!
//! Conventions
//! -----------
//! - Row `i` of the feature matrix is feature `f_i`; column `j` is outcome
//!   `x_j` in sample-space order.
//! - Probabilities and priors are carried as natural logarithms.

pub mod features;
pub mod matrix;
pub mod options;
pub mod prior;
pub mod state;

// ---- Re-exports ------------------------------------------------------------

pub use self::features::{
    Feature, FeatureColumn, FeatureSet, FeatureValue, VectorizedFeature, feature, vectorized,
};
pub use self::matrix::FeatureMatrix;
pub use self::options::{DEFAULT_MIN_DUAL, FitOptions};
pub use self::prior::normalize_log_prior;
pub use self::state::FitState;

pub mod prelude {
    pub use super::{
        Feature, FeatureMatrix, FeatureSet, FitOptions, FitState, VectorizedFeature, feature,
        vectorized,
    };
}
