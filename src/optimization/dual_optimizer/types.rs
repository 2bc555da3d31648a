//! dual_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types and solver aliases used by the dual
//! optimizer, so that the rest of the optimization code can stay agnostic
//! to `ndarray` and Argmin generics.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` are column vectors with one entry per feature.
//! - `Cost` is the scalar value of the objective being **minimized**.
//! - `DEFAULT_LBFGS_MEM` encodes the typical history size for L-BFGS;
//!   callers may override this via per-run options.
//!
//! Testing notes
//! -------------
//! - [`Incumbent`] has small unit tests; the aliases are exercised by the
//!   surrounding optimizer modules.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::{cell::RefCell, collections::HashMap};

/// Parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient vector `∇c(θ)`, matching the shape of `Theta`.
pub type Grad = Array1<f64>;

/// Scalar objective value used by the optimizer.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Hager–Zhang line search specialized to this crate’s numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate’s numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// Lowest-cost parameter vector seen during a run.
///
/// The adapter offers every successfully evaluated `(θ, c(θ))` pair. The
/// incumbent outlives the argmin executor, so the best point is still
/// available when the run aborts with an error and no final state exists.
#[derive(Debug, Default)]
pub struct Incumbent {
    best: RefCell<Option<(Cost, Theta)>>,
}

impl Incumbent {
    /// Record `theta` if its cost beats the current best. Non-finite costs are ignored.
    pub fn offer(&self, cost: Cost, theta: &Theta) {
        if !cost.is_finite() {
            return;
        }
        let mut slot = self.best.borrow_mut();
        match slot.as_ref() {
            Some((best_cost, _)) if *best_cost <= cost => {}
            _ => *slot = Some((cost, theta.clone())),
        }
    }

    /// Cost of the best point so far, if any.
    pub fn best_cost(&self) -> Option<Cost> {
        self.best.borrow().as_ref().map(|(c, _)| *c)
    }

    /// Copy of the best parameters so far, if any.
    pub fn best_theta(&self) -> Option<Theta> {
        self.best.borrow().as_ref().map(|(_, theta)| theta.clone())
    }

    /// Consume the incumbent, returning the best parameters seen.
    pub fn into_best(self) -> Option<Theta> {
        self.best.into_inner().map(|(_, theta)| theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // The incumbent keeps the lowest finite cost and ignores worse or
    // non-finite offers.
    fn incumbent_keeps_lowest_finite_cost() {
        let inc = Incumbent::default();
        inc.offer(3.0, &array![1.0]);
        inc.offer(1.0, &array![2.0]);
        inc.offer(2.0, &array![3.0]);
        inc.offer(f64::NAN, &array![4.0]);
        inc.offer(f64::NEG_INFINITY, &array![5.0]);

        assert_eq!(inc.best_cost(), Some(1.0));
        assert_eq!(inc.best_theta(), Some(array![2.0]));
        assert_eq!(inc.into_best(), Some(array![2.0]));
    }

    #[test]
    fn empty_incumbent_has_no_best() {
        let inc = Incumbent::default();
        assert_eq!(inc.best_cost(), None);
        assert!(inc.into_best().is_none());
    }
}
