//! dual_optimizer — argmin-powered minimizer for convex dual objectives.
//!
//! Purpose
//! -------
//! Minimize a smooth convex objective `c(θ)` (the maximum-entropy dual) with
//! L-BFGS. Callers implement [`Objective`] and invoke [`minimize`] or
//! [`minimize_tracked`].
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] bridges an [`Objective`] into Argmin and
//!   falls back to finite differences when no analytic gradient exists.
//! - [`builders`] construct L-BFGS with More–Thuente or Hager–Zhang line
//!   search and wire in the tolerances.
//! - [`run::run_lbfgs`] executes the solver, applying the iteration cap, the
//!   lower bound on the cost and the verbose observer.
//! - [`Incumbent`] keeps the lowest-cost point evaluated, so a failed run
//!   still yields usable parameters.
//!
//! Conventions
//! -----------
//! - Stopping on `tol_grad` or `tol_cost` is convergence; stopping on
//!   `max_iter` or `min_cost` is not.
//! - Errors bubble up as [`OptResult<T>`](crate::optimization::errors::OptResult);
//!   raw Argmin errors never cross this module's boundary.
//!
//! Testing notes
//! -------------
//! - Submodules test sign conventions, finite-difference fallbacks, solver
//!   wiring, option validation and the verbose formatter on toy objectives.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod observers;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{minimize, minimize_tracked};
pub use self::observers::VerboseLogger;
pub use self::traits::{LineSearcher, Objective, OptimOutcome, SolverOptions, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Incumbent, Theta};

pub mod prelude {
    pub use super::api::{minimize, minimize_tracked};
    pub use super::traits::{LineSearcher, Objective, OptimOutcome, SolverOptions, Tolerances};
    pub use super::types::{Grad, Incumbent, Theta};
}
