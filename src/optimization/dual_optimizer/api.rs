//! High-level entry point for minimizing a user-provided `Objective`.
//!
//! Selects an L-BFGS solver with either Hager–Zhang or More–Thuente line
//! search, wraps the objective in an [`ArgMinAdapter`], and delegates the run
//! to [`run_lbfgs`].
use std::collections::HashMap;

use crate::optimization::{
    dual_optimizer::{
        Grad, Incumbent, OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, Objective, SolverOptions},
        types::FnEvalMap,
    },
    errors::OptResult,
};
use argmin::core::{CostFunction, Gradient};
use argmin_math::ArgminL2Norm;
use log::{debug, info};

/// Minimize `f` from `theta0` with a fresh incumbent.
///
/// See [`minimize_tracked`] for the full contract.
pub fn minimize<F: Objective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &SolverOptions,
) -> OptResult<OptimOutcome> {
    let incumbent = Incumbent::default();
    minimize_tracked(f, theta0, data, opts, &incumbent)
}

/// Minimize `f` from `theta0`, recording every evaluated point in `incumbent`.
///
/// Behavior:
/// - `f.check` validates the starting point first.
/// - If `tol_grad` is set and the gradient at `theta0` is already below it,
///   no solver is built: the outcome is converged with zero iterations and
///   `theta_hat == theta0`.
/// - If the line search breaks down but the best point seen already
///   satisfies `tol_grad`, the run is reported as converged at that point.
///
/// After an `Err`, the caller can still read the lowest-cost point from
/// `incumbent`.
///
/// # Errors
/// - Errors from `check`, from objective evaluation, or from the solver
///   backend, as `OptError`.
pub fn minimize_tracked<F: Objective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &SolverOptions, incumbent: &Incumbent,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data, incumbent);

    let cost0 = problem.cost(&theta0)?;
    if opts.verbose {
        info!("init: dual(theta0) = {cost0:.8}");
    }
    if let Some(tol_grad) = opts.tols.tol_grad {
        let grad0 = problem.gradient(&theta0)?;
        let norm0 = grad0.l2_norm();
        if norm0 < tol_grad {
            debug!("gradient norm {norm0:e} at the starting point is below {tol_grad:e}");
            return OptimOutcome::from_parts(
                Some(theta0),
                cost0,
                true,
                "Converged at initial parameters".to_string(),
                0,
                eval_counts(1, 1),
                Some(norm0),
            );
        }
    }

    let run = match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    };

    match run {
        Err(e) if e.is_backend() => match stalled_at_optimum(f, data, opts, incumbent)? {
            Some((theta, cost, norm)) => {
                debug!("line search stopped at a stationary point: {e}");
                OptimOutcome::from_parts(
                    Some(theta),
                    cost,
                    true,
                    "Converged (line search stalled at optimum)".to_string(),
                    0,
                    FnEvalMap::new(),
                    Some(norm),
                )
            }
            None => Err(e),
        },
        other => other,
    }
}

/// If the incumbent's best point satisfies `tol_grad`, return it with its
/// cost and gradient norm.
fn stalled_at_optimum<F: Objective>(
    f: &F, data: &F::Data, opts: &SolverOptions, incumbent: &Incumbent,
) -> OptResult<Option<(Theta, f64, f64)>> {
    let (Some(tol_grad), Some(theta), Some(cost)) =
        (opts.tols.tol_grad, incumbent.best_theta(), incumbent.best_cost())
    else {
        return Ok(None);
    };
    let grad: Grad = match f.grad(&theta, data) {
        Ok(g) => g,
        Err(_) => return Ok(None),
    };
    let norm = grad.l2_norm();
    Ok((norm.is_finite() && norm < tol_grad).then_some((theta, cost, norm)))
}

fn eval_counts(cost: u64, gradient: u64) -> FnEvalMap {
    HashMap::from([("cost_count".to_string(), cost), ("gradient_count".to_string(), gradient)])
}
