//! maxent — maximum-entropy and minimum-divergence models on finite sample
//! spaces.
//!
//! Purpose
//! -------
//! Fit the distribution `p_θ(x) ∝ p0(x) exp(θ·f(x))` whose feature
//! expectations match given targets `K`, by minimizing the convex entropy
//! dual `ln Z(θ) − θ·K` with L-BFGS.
//!
//! Key behaviors
//! -------------
//! - [`core`]: feature functions, the feature matrix, prior handling, fit
//!   options and lifecycle state.
//! - [`models`]: the dual objective ([`EntropyDual`]) and the model
//!   ([`Model`]) with `fit`, `probdist` and friends.
//! - [`errors`]: [`MaxentError`] and the [`MaxentResult`] alias.
//!
//! Invariants & assumptions
//! ------------------------
//! - The feature matrix is evaluated once at construction and never changes.
//! - Every `f_i(x_j)` is finite; prior log-probabilities are finite or `-inf`
//!   and are stored normalized.
//! - Fitted distributions are non-negative and sum to one; `ln Z` is always
//!   computed with the maximum log-weight shifted out.
//!
//! Conventions
//! -----------
//! - Natural logarithms throughout; entropy is in nats.
//! - Parameters have one entry per feature, in feature order.
//! - Distribution queries on a model that is not `Fitted` return
//!   [`MaxentError::NotFitted`].
//!
//! Downstream usage
//! ----------------
//! ```ignore
//! use maxentropy::maxent::prelude::*;
//! use ndarray::array;
//!
//! let mut model = Model::new((1..=6).collect::<Vec<u8>>(), vec![feature(|x: &u8| *x)])?;
//! model.fit(&array![4.5])?;
//! let p = model.probdist()?;
//! ```

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    DEFAULT_MIN_DUAL, Feature, FeatureMatrix, FeatureSet, FitOptions, FitState, VectorizedFeature,
    feature, vectorized,
};
pub use self::errors::{MaxentError, MaxentResult};
pub use self::models::{EntropyDual, Model};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use maxentropy::maxent::prelude::*;
//
// to import the model, feature helpers and error types in one line.

pub mod prelude {
    pub use super::{
        Feature, FeatureSet, FitOptions, FitState, MaxentError, MaxentResult, Model,
        VectorizedFeature, feature, vectorized,
    };
}
