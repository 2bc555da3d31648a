//! Execution helper that runs an `argmin` solver on a dual objective and
//! returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    dual_optimizer::{
        adapter::ArgMinAdapter,
        observers::{DualState, VerboseLogger},
        traits::{Objective, OptimOutcome, SolverOptions},
        types::Theta,
    },
    errors::OptResult,
};
use argmin::core::{observers::ObserverMode, Executor, Solver, State};

/// Run an L-BFGS solver from `theta0`.
///
/// Wiring:
/// - `max_iter` becomes Argmin's `max_iters`.
/// - `min_cost` becomes Argmin's target cost; reaching it terminates the run
///   with `TargetCostReached`, which is reported as *not converged*.
/// - With `verbose`, a [`VerboseLogger`] is attached in `ObserverMode::Always`
///   (plus the slog terminal observer when the `obs_slog` feature is on).
///
/// The returned outcome carries the best parameters and best cost seen by
/// the executor.
///
/// # Errors
/// - Any Argmin failure, mapped to `OptError` (objective errors keep their
///   original variant).
/// - Validation errors from [`OptimOutcome::new`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &SolverOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: Objective,
    S: Solver<ArgMinAdapter<'a, F>, DualState> + 'static,
{
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }
    if let Some(min_cost) = opts.tols.min_cost {
        optimizer = optimizer.configure(|state| state.target_cost(min_cost));
    }
    if opts.verbose {
        optimizer = optimizer.add_observer(VerboseLogger, ObserverMode::Always);
        #[cfg(feature = "obs_slog")]
        {
            let observer = argmin_observer_slog::SlogLogger::term_noblock();
            optimizer = optimizer.add_observer(observer, ObserverMode::Always);
        }
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}
