//! Maximum-entropy / minimum-divergence model over a finite sample space.
//!
//! A [`Model`] owns an ordered sample space, its feature functions and the
//! feature matrix evaluated once at construction. [`Model::fit`] minimizes
//! the entropy dual ([`EntropyDual`]) from the current parameters with
//! L-BFGS, after which the fitted distribution can be queried.
//!
//! Lifecycle:
//! - construction leaves the model [`FitState::Unfit`] with `θ = 0`, i.e. the
//!   uniform distribution (or the prior, if one is set);
//! - `fit` moves it to `Fitted` on convergence and to `FitFailed` otherwise;
//!   in both cases `params()` holds the best point found;
//! - changing parameters, prior or smoothing moves it back to `Unfit`;
//! - re-fitting is allowed from any state and warm-starts from `params()`.
//!
//! Distribution queries (`probdist`, `expectations`, `entropy`, ...) need a
//! `Fitted` model; [`Model::probdist_at`] evaluates any parameter vector in
//! any state.
use log::{debug, info, warn};
use ndarray::Array1;

use crate::{
    maxent::{
        core::{
            features::{Feature, FeatureSet, VectorizedFeature},
            matrix::FeatureMatrix,
            options::FitOptions,
            prior::normalize_log_prior,
            state::FitState,
        },
        errors::{MaxentError, MaxentResult},
        models::dual::EntropyDual,
    },
    optimization::dual_optimizer::{minimize_tracked, Incumbent, OptimOutcome},
};

#[derive(Debug)]
pub struct Model<X> {
    samplespace: Vec<X>,
    features: FeatureSet<X>,
    matrix: FeatureMatrix,
    log_prior: Option<Array1<f64>>,
    sigma2: Option<f64>,
    params: Array1<f64>,
    state: FitState,
    options: FitOptions,
    targets: Option<Array1<f64>>,
    results: Option<OptimOutcome>,
}

impl<X> Model<X> {
    /// Model whose features are evaluated once per outcome.
    ///
    /// # Errors
    /// - [`MaxentError::EmptySampleSpace`] / [`MaxentError::NoFeatures`].
    /// - [`MaxentError::NonFiniteFeature`] if any `f_i(x_j)` is NaN or ±inf.
    pub fn new(samplespace: Vec<X>, features: Vec<Box<dyn Feature<X>>>) -> MaxentResult<Self> {
        Self::from_feature_set(samplespace, FeatureSet::PerOutcome(features))
    }

    /// Model whose features are evaluated once over the whole sample space.
    ///
    /// # Errors
    /// As [`Model::new`], plus [`MaxentError::ShapeMismatch`] when a feature
    /// returns a column whose length is not the sample-space size.
    pub fn vectorized(
        samplespace: Vec<X>, features: Vec<Box<dyn VectorizedFeature<X>>>,
    ) -> MaxentResult<Self> {
        Self::from_feature_set(samplespace, FeatureSet::Vectorized(features))
    }

    /// Build from an explicit [`FeatureSet`].
    pub fn from_feature_set(samplespace: Vec<X>, features: FeatureSet<X>) -> MaxentResult<Self> {
        let matrix = FeatureMatrix::build(&features, &samplespace)?;
        debug!(
            "feature matrix built: {} features x {} outcomes ({})",
            matrix.n_features(),
            matrix.n_outcomes(),
            if features.is_vectorized() { "vectorized" } else { "per outcome" }
        );
        let params = Array1::zeros(matrix.n_features());
        Ok(Self {
            samplespace,
            features,
            matrix,
            log_prior: None,
            sigma2: None,
            params,
            state: FitState::Unfit,
            options: FitOptions::default(),
            targets: None,
            results: None,
        })
    }

    // ---- Builders ----

    /// Use prior log-probabilities `ln p0(x_j)`, turning the model into a
    /// minimum-divergence model. See [`Model::set_prior`].
    pub fn with_prior(mut self, log_prior: Array1<f64>) -> MaxentResult<Self> {
        self.set_prior(Some(log_prior))?;
        Ok(self)
    }

    /// Add a Gaussian prior `N(0, σ²)` on each parameter. See [`Model::set_smoothing`].
    pub fn with_smoothing(mut self, sigma2: f64) -> MaxentResult<Self> {
        self.set_smoothing(Some(sigma2))?;
        Ok(self)
    }

    pub fn with_options(mut self, options: FitOptions) -> Self {
        self.options = options;
        self
    }

    // ---- Configuration ----

    /// Set or clear the prior. Entries may be `-inf` and need not be
    /// normalized. Resets the state to `Unfit`.
    ///
    /// # Errors
    /// - [`MaxentError::ShapeMismatch`] / [`MaxentError::InvalidPrior`].
    pub fn set_prior(&mut self, log_prior: Option<Array1<f64>>) -> MaxentResult<()> {
        self.log_prior = match log_prior {
            Some(lp) => Some(normalize_log_prior(lp, self.matrix.n_outcomes())?),
            None => None,
        };
        self.state = FitState::Unfit;
        Ok(())
    }

    /// Set or clear the smoothing variance `σ²`. Resets the state to `Unfit`.
    ///
    /// # Errors
    /// - [`MaxentError::InvalidSigma2`] unless `σ²` is finite and > 0.
    pub fn set_smoothing(&mut self, sigma2: Option<f64>) -> MaxentResult<()> {
        if let Some(value) = sigma2 {
            if !(value.is_finite() && value > 0.0) {
                return Err(MaxentError::InvalidSigma2 { value });
            }
        }
        self.sigma2 = sigma2;
        self.state = FitState::Unfit;
        Ok(())
    }

    pub fn set_options(&mut self, options: FitOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    pub fn verbose(&self) -> bool {
        self.options.solver.verbose
    }

    /// Toggle per-iteration logging during `fit`.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.options.solver.verbose = verbose;
    }

    // ---- Fitting ----

    /// Fit the parameters so that model expectations match `targets`.
    ///
    /// Starts from the current parameters. On convergence the model becomes
    /// `Fitted` and the solver report is returned. Otherwise the model becomes
    /// `FitFailed`, its parameters hold the lowest-dual point found, and an
    /// error is returned.
    ///
    /// # Errors
    /// - [`MaxentError::ShapeMismatch`] / [`MaxentError::NonFiniteTarget`] for
    ///   bad targets (the model is left untouched).
    /// - [`MaxentError::InvalidOptions`] / [`MaxentError::InvalidMinDual`].
    /// - [`MaxentError::ConvergenceFailure`] when the iteration cap or the
    ///   dual lower bound is hit (infeasible targets), or the line search
    ///   breaks down. An overflow of `Z(θ)` at a trial point inside the line
    ///   search also lands here, with the solver's message in `status`.
    /// - [`MaxentError::NumericalInstability`] only if `Z(θ)` under- or
    ///   overflows at the starting parameters, before any iteration runs.
    pub fn fit(&mut self, targets: &Array1<f64>) -> MaxentResult<&OptimOutcome> {
        self.validate_targets(targets)?;
        let solver_opts = self.options.solver_options()?;
        let dual = EntropyDual::new(&self.matrix, self.log_prior.as_ref(), self.sigma2);
        let incumbent = Incumbent::default();

        debug!("fitting {} parameters from {}", self.params.len(), self.params);
        let run = minimize_tracked(&dual, self.params.clone(), targets, &solver_opts, &incumbent);
        self.targets = Some(targets.clone());

        match run {
            Ok(outcome) => {
                self.params = outcome.theta_hat.clone();
                if outcome.converged {
                    if solver_opts.verbose {
                        info!(
                            "converged after {} iterations: dual = {:.8}, status = {}",
                            outcome.iterations, outcome.value, outcome.status
                        );
                    }
                    self.state = FitState::Fitted;
                    Ok(self.results.insert(outcome))
                } else {
                    let err = MaxentError::ConvergenceFailure {
                        status: outcome.status.clone(),
                        iterations: Some(outcome.iterations),
                        grad_norm: outcome.grad_norm,
                    };
                    warn!("{err}");
                    self.state = FitState::FitFailed;
                    self.results = Some(outcome);
                    Err(err)
                }
            }
            Err(e) => {
                let below_bound = match (incumbent.best_cost(), solver_opts.tols.min_cost) {
                    (Some(best), Some(bound)) => best <= bound,
                    _ => false,
                };
                if let Some(best) = incumbent.into_best() {
                    self.params = best;
                }
                // A dual already below the bound means the run was diverging
                // on infeasible targets when the evaluation broke down.
                let err = if below_bound {
                    MaxentError::ConvergenceFailure {
                        status: format!("dual fell below its lower bound ({e})"),
                        iterations: None,
                        grad_norm: None,
                    }
                } else {
                    MaxentError::from(e)
                };
                warn!("fit aborted: {err}");
                self.state = FitState::FitFailed;
                self.results = None;
                Err(err)
            }
        }
    }

    // ---- Distribution queries ----

    /// Fitted probabilities, one per outcome, in sample-space order.
    ///
    /// # Errors
    /// - [`MaxentError::NotFitted`] unless the state is `Fitted`.
    pub fn probdist(&self) -> MaxentResult<Array1<f64>> {
        self.require_fitted()?;
        self.dual().probdist(self.params.view())
    }

    /// Probabilities for an arbitrary parameter vector, in any state.
    ///
    /// # Errors
    /// - [`MaxentError::ShapeMismatch`] / [`MaxentError::NonFiniteParam`].
    /// - [`MaxentError::NumericalInstability`].
    pub fn probdist_at(&self, theta: &Array1<f64>) -> MaxentResult<Array1<f64>> {
        self.validate_params(theta)?;
        self.dual().probdist(theta.view())
    }

    /// Fitted log-probabilities (`-inf` where the prior excludes an outcome).
    pub fn log_probdist(&self) -> MaxentResult<Array1<f64>> {
        self.require_fitted()?;
        self.dual().log_probdist(self.params.view())
    }

    /// Feature expectations under the fitted distribution.
    pub fn expectations(&self) -> MaxentResult<Array1<f64>> {
        self.require_fitted()?;
        self.dual().expectations(self.params.view())
    }

    /// Shannon entropy (nats) of the fitted distribution.
    pub fn entropy(&self) -> MaxentResult<f64> {
        self.require_fitted()?;
        self.dual().entropy(self.params.view())
    }

    /// `KL(p ‖ p0)` of the fitted distribution from the prior (uniform if none).
    pub fn kl_divergence(&self) -> MaxentResult<f64> {
        self.require_fitted()?;
        self.dual().kl_divergence(self.params.view())
    }

    /// `ln Z(θ)` at the fitted parameters.
    pub fn log_partition(&self) -> MaxentResult<f64> {
        self.require_fitted()?;
        self.dual().log_partition(self.params.view())
    }

    /// Dual value at the fitted parameters for the targets of the last fit.
    pub fn dual_value(&self) -> MaxentResult<f64> {
        self.require_fitted()?;
        let targets = self.targets.as_ref().ok_or(MaxentError::NotFitted)?;
        self.dual().value(self.params.view(), targets.view())
    }

    /// Evaluate every feature at `x`, which need not be in the sample space.
    ///
    /// # Errors
    /// - [`MaxentError::NonFiniteFeature`] / [`MaxentError::ShapeMismatch`].
    pub fn feature_values(&self, x: &X) -> MaxentResult<Array1<f64>> {
        self.features.eval_at(x)
    }

    // ---- Parameters & accessors ----

    pub fn params(&self) -> &Array1<f64> {
        &self.params
    }

    /// Replace the parameters. Resets the state to `Unfit`.
    ///
    /// # Errors
    /// - [`MaxentError::ShapeMismatch`] / [`MaxentError::NonFiniteParam`].
    pub fn set_params(&mut self, theta: Array1<f64>) -> MaxentResult<()> {
        self.validate_params(&theta)?;
        self.params = theta;
        self.state = FitState::Unfit;
        Ok(())
    }

    /// Zero the parameters and forget the last fit.
    pub fn reset_params(&mut self) {
        self.params.fill(0.0);
        self.state = FitState::Unfit;
        self.targets = None;
        self.results = None;
    }

    pub fn state(&self) -> FitState {
        self.state
    }

    pub fn samplespace(&self) -> &[X] {
        &self.samplespace
    }

    pub fn feature_matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    pub fn n_features(&self) -> usize {
        self.matrix.n_features()
    }

    /// Normalized prior log-probabilities, if a prior is set.
    pub fn log_prior(&self) -> Option<&Array1<f64>> {
        self.log_prior.as_ref()
    }

    pub fn sigma2(&self) -> Option<f64> {
        self.sigma2
    }

    /// Solver report of the last fit that ran to completion.
    pub fn results(&self) -> Option<&OptimOutcome> {
        self.results.as_ref()
    }

    // ---- Helpers ----

    fn dual(&self) -> EntropyDual<'_> {
        EntropyDual::new(&self.matrix, self.log_prior.as_ref(), self.sigma2)
    }

    fn require_fitted(&self) -> MaxentResult<()> {
        if self.state.is_fitted() { Ok(()) } else { Err(MaxentError::NotFitted) }
    }

    fn validate_targets(&self, targets: &Array1<f64>) -> MaxentResult<()> {
        if targets.len() != self.n_features() {
            return Err(MaxentError::ShapeMismatch {
                what: "targets",
                expected: self.n_features(),
                found: targets.len(),
            });
        }
        match targets.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(MaxentError::NonFiniteTarget { index, value: targets[index] }),
            None => Ok(()),
        }
    }

    fn validate_params(&self, theta: &Array1<f64>) -> MaxentResult<()> {
        if theta.len() != self.n_features() {
            return Err(MaxentError::ShapeMismatch {
                what: "parameters",
                expected: self.n_features(),
                found: theta.len(),
            });
        }
        match theta.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(MaxentError::NonFiniteParam { index, value: theta[index] }),
            None => Ok(()),
        }
    }
}
