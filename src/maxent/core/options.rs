//! Fit options — solver configuration plus the dual lower bound.
//!
//! Purpose
//! -------
//! Bundle everything `Model::fit` needs beyond the targets: the L-BFGS
//! settings ([`SolverOptions`]) and the value below which the dual is
//! treated as unbounded (`min_dual`).
//!
//! Invariants & assumptions
//! ------------------------
//! - `SolverOptions` is validated by its own constructor.
//! - `min_dual`, when present, is finite. Without a prior the dual of a
//!   feasible problem equals the entropy of the solution, which is never
//!   negative, so reaching a large negative value means the targets lie
//!   outside the feasible polytope.
use crate::{
    maxent::errors::{MaxentError, MaxentResult},
    optimization::dual_optimizer::SolverOptions,
};

/// Default lower bound on the dual.
pub const DEFAULT_MIN_DUAL: f64 = -100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub solver: SolverOptions,
    pub min_dual: Option<f64>,
}

impl FitOptions {
    /// # Errors
    /// - [`MaxentError::InvalidMinDual`] if `min_dual` is NaN or infinite.
    pub fn new(solver: SolverOptions, min_dual: Option<f64>) -> MaxentResult<Self> {
        if let Some(value) = min_dual {
            if !value.is_finite() {
                return Err(MaxentError::InvalidMinDual { value });
            }
        }
        Ok(Self { solver, min_dual })
    }

    /// Solver options with `min_dual` applied as the cost lower bound.
    pub fn solver_options(&self) -> MaxentResult<SolverOptions> {
        let mut opts = self.solver.clone();
        opts.tols = opts.tols.with_min_cost(self.min_dual)?;
        Ok(opts)
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self { solver: SolverOptions::default(), min_dual: Some(DEFAULT_MIN_DUAL) }
    }
}
