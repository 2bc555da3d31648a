//! maxentropy — maximum-entropy and minimum-divergence models with Python
//! bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes maximum-entropy model fitting to Python via the `_maxentropy`
//! extension module. When the `python-bindings` feature is enabled, this
//! module defines the Python-facing `Model` and `FitOutcome` classes.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`maxent` and `optimization`) as the
//!   public crate surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_maxentropy` Python extension.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this file
//!   performs only FFI glue, input validation, and error mapping.
//! - Python feature functions are called with the GIL held, once per outcome
//!   (or once per feature when vectorized), and only while the model is
//!   being constructed.
//!
//! Conventions
//! -----------
//! - Errors from core Rust code are propagated as [`maxent::MaxentError`]
//!   internally and converted to `ValueError` at the PyO3 boundary.
//! - Arrays cross the boundary as 1-D `float64` numpy arrays.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`maxent::Model`] directly and can
//!   ignore the PyO3 items guarded by the `python-bindings` feature.
//! - From Python:
//!
//! ```text
//! model = Model([f0, f1, f2], samplespace)
//! model.verbose = True
//! model.fit([1.0, 0.3, 0.5])
//! model.params, model.probdist()
//! ```
//!
//! Testing notes
//! -------------
//! - Model behavior is covered by unit tests in the inner modules and by the
//!   integration tests under `tests/`.

pub mod maxent;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    maxent::{
        core::{
            features::{self, FeatureSet},
            options::FitOptions,
        },
        errors::MaxentError,
        models::model::Model as CoreModel,
    },
    optimization::dual_optimizer::OptimOutcome,
    utils::{
        PyFeature, PyVectorizedFeature, extract_callables, extract_f64_vector, extract_objects,
        extract_solver_opts,
    },
};

/// Model — Python-facing maximum-entropy model over a finite sample space.
///
/// Constructed from Python via
/// `Model(f, samplespace, vectorized=False, prior_log_probs=None, sigma2=None,
/// tol_grad=None, tol_cost=None, max_iter=None, line_searcher=None,
/// lbfgs_mem=None, min_dual=-100.0, verbose=False)`:
/// - `f`: a callable or a sequence of callables. Each takes one outcome, or
///   the whole sample space as a list when `vectorized=True`.
/// - `samplespace`: any iterable of Python objects; its order fixes the order
///   of `probdist()`.
/// - `prior_log_probs`: optional prior log-probabilities, one per outcome.
/// - `sigma2`: optional Gaussian smoothing variance.
/// - the remaining arguments configure the L-BFGS run.
///
/// All feature functions are evaluated during construction.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "Model", module = "maxentropy", unsendable)]
pub struct PyModel {
    inner: CoreModel<PyObject>,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyModel {
    #[new]
    #[pyo3(
        signature = (
            f,
            samplespace,
            vectorized = false,
            prior_log_probs = None,
            sigma2 = None,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            lbfgs_mem = None,
            min_dual = Some(crate::maxent::core::options::DEFAULT_MIN_DUAL),
            verbose = false,
        ),
        text_signature = "(f, samplespace, /, vectorized=False, prior_log_probs=None, \
                          sigma2=None, tol_grad=None, tol_cost=None, max_iter=None, \
                          line_searcher=None, lbfgs_mem=None, min_dual=-100.0, verbose=False)"
    )]
    pub fn new<'py>(
        py: Python<'py>, f: &Bound<'py, PyAny>, samplespace: &Bound<'py, PyAny>, vectorized: bool,
        prior_log_probs: Option<&Bound<'py, PyAny>>, sigma2: Option<f64>, tol_grad: Option<f64>,
        tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
        lbfgs_mem: Option<usize>, min_dual: Option<f64>, verbose: bool,
    ) -> PyResult<Self> {
        let funcs = extract_callables(f)?;
        let outcomes = extract_objects(samplespace)?;
        let solver =
            extract_solver_opts(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem, verbose)?;
        let options = FitOptions::new(solver, min_dual)?;

        let feature_set = if vectorized {
            FeatureSet::Vectorized(
                funcs
                    .into_iter()
                    .map(|func| features::vectorized(PyVectorizedFeature::new(func)))
                    .collect(),
            )
        } else {
            FeatureSet::PerOutcome(
                funcs.into_iter().map(|func| features::feature(PyFeature::new(func))).collect(),
            )
        };
        let mut inner = CoreModel::from_feature_set(outcomes, feature_set)?.with_options(options);
        if let Some(raw) = prior_log_probs {
            inner.set_prior(Some(extract_f64_vector(py, raw)?))?;
        }
        inner.set_smoothing(sigma2)?;
        Ok(PyModel { inner })
    }

    /// Fit the parameters so that feature expectations equal `K`.
    ///
    /// Raises `ValueError` when the fit does not converge; `params` then holds
    /// the best point found.
    #[pyo3(text_signature = "(self, K, /)")]
    pub fn fit<'py>(&mut self, py: Python<'py>, k: &Bound<'py, PyAny>) -> PyResult<()> {
        let targets = extract_f64_vector(py, k)?;
        self.inner.fit(&targets)?;
        Ok(())
    }

    /// Fitted probabilities in sample-space order.
    pub fn probdist<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.inner.probdist()?.into_pyarray(py))
    }

    /// Probabilities for an explicit parameter vector; works before fitting.
    #[pyo3(text_signature = "(self, params, /)")]
    pub fn probdist_at<'py>(
        &self, py: Python<'py>, params: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let theta = extract_f64_vector(py, params)?;
        Ok(self.inner.probdist_at(&theta)?.into_pyarray(py))
    }

    pub fn log_probdist<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.inner.log_probdist()?.into_pyarray(py))
    }

    pub fn expectations<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.inner.expectations()?.into_pyarray(py))
    }

    pub fn entropy(&self) -> PyResult<f64> {
        Ok(self.inner.entropy()?)
    }

    pub fn kl_divergence(&self) -> PyResult<f64> {
        Ok(self.inner.kl_divergence()?)
    }

    pub fn log_partition(&self) -> PyResult<f64> {
        Ok(self.inner.log_partition()?)
    }

    pub fn dual(&self) -> PyResult<f64> {
        Ok(self.inner.dual_value()?)
    }

    /// Feature values at one outcome, which need not be in the sample space.
    pub fn feature_values<'py>(
        &self, py: Python<'py>, x: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.inner.feature_values(&x.clone().unbind())?.into_pyarray(py))
    }

    /// Zero the parameters and mark the model unfit.
    pub fn reset_params(&mut self) {
        self.inner.reset_params();
    }

    #[getter]
    pub fn params<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.params().clone().into_pyarray(py)
    }

    #[setter]
    pub fn set_params(&mut self, params: &Bound<'_, PyAny>) -> PyResult<()> {
        let theta = extract_f64_vector(params.py(), params)?;
        Ok(self.inner.set_params(theta)?)
    }

    #[getter]
    pub fn verbose(&self) -> bool {
        self.inner.verbose()
    }

    #[setter]
    pub fn set_verbose(&mut self, verbose: bool) {
        self.inner.set_verbose(verbose);
    }

    /// One of `"unfit"`, `"fitted"`, `"fit failed"`.
    #[getter]
    pub fn state(&self) -> String {
        self.inner.state().to_string()
    }

    #[getter]
    pub fn samplespace(&self, py: Python<'_>) -> Vec<PyObject> {
        self.inner.samplespace().iter().map(|x| x.clone_ref(py)).collect()
    }

    #[getter]
    pub fn n_features(&self) -> usize {
        self.inner.n_features()
    }

    #[getter]
    pub fn results(&self) -> PyResult<FitOutcome> {
        match self.inner.results() {
            Some(outcome) => Ok(FitOutcome { inner: outcome.clone() }),
            None => Err(MaxentError::NotFitted.into()),
        }
    }
}

/// FitOutcome — read-only solver report of the last fit.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "maxentropy")]
pub struct FitOutcome {
    pub inner: OptimOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl FitOutcome {
    #[getter]
    pub fn theta_hat(&self) -> Vec<f64> {
        self.inner.theta_hat.to_vec()
    }

    #[getter]
    pub fn value(&self) -> f64 {
        self.inner.value
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }

    #[getter]
    pub fn grad_norm(&self) -> Option<f64> {
        self.inner.grad_norm
    }

    #[getter]
    pub fn fn_evals(&self) -> Vec<(String, u64)> {
        self.inner.fn_evals.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }
}

/// _maxentropy — PyO3 module initializer for the Python extension.
///
/// Registers `Model` and `FitOutcome`. Invoked by Python when the compiled
/// extension is imported.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _maxentropy<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<PyModel>()?;
    m.add_class::<FitOutcome>()?;
    Ok(())
}
