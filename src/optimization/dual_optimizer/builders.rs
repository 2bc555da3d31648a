//! dual_optimizer::builders — L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Hide Argmin's generic wiring behind two builders, one per line search,
//! and apply the gradient and cost-change tolerances from [`SolverOptions`].
//!
//! Conventions
//! -----------
//! - Builders do **not** set `theta0`, `max_iters` or the target cost; those
//!   are runtime concerns applied by [`run_lbfgs`](super::run::run_lbfgs).
//! - Argmin errors never leak across the module boundary; they are mapped to
//!   [`OptError`](crate::optimization::errors::OptError) via `?`.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    dual_optimizer::{
        traits::SolverOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
    errors::OptResult,
};

/// Construct L-BFGS with Hager–Zhang line search.
///
/// Uses `opts.lbfgs_mem` (or [`DEFAULT_LBFGS_MEM`]) as history size and
/// applies the optional tolerances via [`configure_lbfgs`].
///
/// # Errors
/// Any tolerance rejected by Argmin, mapped to `OptError`.
pub fn build_optimizer_hager_zhang(opts: &SolverOptions) -> OptResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Construct L-BFGS with More–Thuente line search.
///
/// # Errors
/// Any tolerance rejected by Argmin, mapped to `OptError`.
pub fn build_optimizer_more_thuente(opts: &SolverOptions) -> OptResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Apply optional tolerances to an L-BFGS solver, regardless of its line
/// search. A `None` tolerance leaves Argmin's default in effect.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &SolverOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::dual_optimizer::traits::{LineSearcher, Tolerances};

    #[test]
    // Purpose
    // -------
    // Both builders succeed with the default memory and valid tolerances.
    fn builders_accept_default_memory() {
        // Arrange
        let tols =
            Tolerances::new(Some(1e-6), Some(1e-8), Some(50)).expect("Tolerances should be valid");
        let opts = SolverOptions::new(tols, LineSearcher::HagerZhang, None)
            .expect("SolverOptions should be valid");

        // Act / Assert
        assert!(build_optimizer_hager_zhang(&opts).is_ok());
        assert!(build_optimizer_more_thuente(&opts).is_ok());
    }

    #[test]
    fn builders_accept_explicit_memory() {
        let tols = Tolerances::new(Some(1e-6), None, Some(25)).expect("Tolerances should be valid");
        let opts = SolverOptions::new(tols, LineSearcher::MoreThuente, Some(11))
            .expect("SolverOptions should be valid");

        assert!(build_optimizer_more_thuente(&opts).is_ok());
        assert!(build_optimizer_hager_zhang(&opts).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // With only an iteration cap, no tolerance is forwarded and Argmin's
    // defaults stay in place.
    fn configure_lbfgs_without_tolerances_keeps_defaults() {
        let raw = LBFGS::new(MoreThuenteLS::new(), DEFAULT_LBFGS_MEM);
        let tols = Tolerances::new(None, None, Some(10)).expect("Tolerances should be valid");
        let opts = SolverOptions::new(tols, LineSearcher::MoreThuente, None)
            .expect("SolverOptions should be valid");

        assert!(configure_lbfgs(raw, &opts).is_ok());
    }
}
