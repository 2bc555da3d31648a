//! utils — conversion helpers for the PyO3 boundary.
//!
//! Everything here is compiled only with the `python-bindings` feature:
//! array extraction, solver-option parsing, and wrappers that let Python
//! callables act as [`Feature`] / [`VectorizedFeature`] implementations.
#[cfg(feature = "python-bindings")]
use log::warn;

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyList},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
use crate::{
    maxent::{
        core::features::{Feature, VectorizedFeature},
        errors::MaxentError,
    },
    optimization::dual_optimizer::{LineSearcher, SolverOptions, Tolerances},
};

/// Read a 1-D float64 array from a numpy array, pandas Series or sequence.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray1<f64>>() {
        if arr.as_slice().is_ok() {
            return Ok(arr);
        }
    }
    if let Ok(obj) = raw.call_method("to_numpy", (false,), None) {
        if let Ok(series) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series.as_slice().is_ok() {
                return Ok(series);
            }
        }
    }
    let vec: Vec<f64> = raw.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Owned copy of [`extract_f64_array`].
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vector<'py>(py: Python<'py>, raw: &Bound<'py, PyAny>) -> PyResult<Array1<f64>> {
    Ok(extract_f64_array(py, raw)?.as_array().to_owned())
}

/// Collect an iterable of Python objects, keeping their order.
#[cfg(feature = "python-bindings")]
pub fn extract_objects(raw: &Bound<'_, PyAny>) -> PyResult<Vec<PyObject>> {
    raw.try_iter()?.map(|item| item.map(Bound::unbind)).collect()
}

/// Collect an iterable of callables; a single callable is accepted as a
/// one-element list.
#[cfg(feature = "python-bindings")]
pub fn extract_callables(raw: &Bound<'_, PyAny>) -> PyResult<Vec<PyObject>> {
    if raw.is_callable() {
        return Ok(vec![raw.clone().unbind()]);
    }
    let funcs = extract_objects(raw)?;
    let py = raw.py();
    if let Some(i) = funcs.iter().position(|f| !f.bind(py).is_callable()) {
        return Err(PyTypeError::new_err(format!("feature {i} is not callable")));
    }
    if funcs.is_empty() {
        return Err(PyValueError::new_err("at least one feature function is required"));
    }
    Ok(funcs)
}

#[cfg(feature = "python-bindings")]
pub fn extract_solver_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>, verbose: bool,
) -> PyResult<SolverOptions> {
    use std::str::FromStr;

    // Tolerances::new -> OptResult<Tolerances> -> MaxentError -> PyErr
    let tols = Tolerances::new(tol_grad, tol_cost, max_iter).map_err(MaxentError::from)?;

    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name).map_err(MaxentError::from)?,
        None => LineSearcher::MoreThuente,
    };

    let opts = SolverOptions::new(tols, ls, lbfgs_mem).map_err(MaxentError::from)?;
    Ok(opts.with_verbose(verbose))
}

/// Python callable evaluated at one outcome.
///
/// A raised exception or a non-numeric return value yields `NaN`, which the
/// feature matrix then reports as a non-finite feature value.
#[cfg(feature = "python-bindings")]
pub struct PyFeature {
    func: PyObject,
}

#[cfg(feature = "python-bindings")]
impl PyFeature {
    pub fn new(func: PyObject) -> Self {
        Self { func }
    }
}

#[cfg(feature = "python-bindings")]
impl Feature<PyObject> for PyFeature {
    fn eval(&self, x: &PyObject) -> f64 {
        Python::with_gil(|py| {
            match self.func.bind(py).call1((x.bind(py),)).and_then(|v| v.extract::<f64>()) {
                Ok(v) => v,
                Err(e) => {
                    warn!("feature function failed: {e}");
                    f64::NAN
                }
            }
        })
    }
}

/// Python callable evaluated over a list of outcomes.
///
/// On failure an empty column is returned, which the feature matrix reports
/// as a length mismatch.
#[cfg(feature = "python-bindings")]
pub struct PyVectorizedFeature {
    func: PyObject,
}

#[cfg(feature = "python-bindings")]
impl PyVectorizedFeature {
    pub fn new(func: PyObject) -> Self {
        Self { func }
    }
}

#[cfg(feature = "python-bindings")]
impl VectorizedFeature<PyObject> for PyVectorizedFeature {
    fn eval_all(&self, xs: &[PyObject]) -> Array1<f64> {
        Python::with_gil(|py| {
            let column = PyList::new(py, xs.iter().map(|x| x.bind(py)))
                .and_then(|list| self.func.bind(py).call1((list,)))
                .and_then(|out| extract_f64_vector(py, &out));
            match column {
                Ok(col) => col,
                Err(e) => {
                    warn!("vectorized feature function failed: {e}");
                    Array1::zeros(0)
                }
            }
        })
    }
}
