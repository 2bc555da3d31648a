//! optimization — dual minimizer, numerical helpers, and solver error surface.
//!
//! Purpose
//! -------
//! Provide the solver layer used to fit maximum-entropy models: an
//! Argmin-backed L-BFGS minimizer for convex objectives, overflow-safe
//! log-sum-exp helpers, and a single error enum for configuration, numerical
//! and backend failures.
//!
//! Key behaviors
//! -------------
//! - `dual_optimizer`: minimize `c(θ)` with configurable line search,
//!   tolerances, iteration cap, cost lower bound and verbose logging.
//! - `numerical_stability`: max-shifted `log_sum_exp` and softmax.
//! - `errors`: [`OptError`](errors::OptError) with conversions from Argmin's
//!   error type and from model-layer errors raised inside objectives.
//!
//! Conventions
//! -----------
//! - The optimizer minimizes directly; no sign flip is applied.
//! - Public entry points that can fail return `OptResult<T>`.
//!
//! Downstream usage
//! ----------------
//! - `maxent::models` implements `Objective` for its dual and calls
//!   `minimize_tracked`; front-ends usually import `optimization::prelude::*`.

pub mod dual_optimizer;
pub mod errors;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use maxentropy::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::dual_optimizer::prelude::*;
    pub use super::errors::{OptError, OptResult};
    pub use super::numerical_stability::prelude::*;
}
