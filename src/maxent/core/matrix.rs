//! Cached feature matrix `F[i, j] = f_i(x_j)`.
//!
//! Rows are features, columns are outcomes of the sample space. The matrix
//! is built once from a [`FeatureSet`] and exposes read-only views only, so
//! its entries always equal a fresh evaluation of the feature functions.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::maxent::{
    core::features::FeatureSet,
    errors::{MaxentError, MaxentResult},
};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Evaluate every feature over `samplespace`.
    ///
    /// # Errors
    /// - [`MaxentError::EmptySampleSpace`] / [`MaxentError::NoFeatures`].
    /// - [`MaxentError::ShapeMismatch`] for a malformed vectorized output.
    /// - [`MaxentError::NonFiniteFeature`] naming the first NaN/±inf entry.
    pub fn build<X>(features: &FeatureSet<X>, samplespace: &[X]) -> MaxentResult<Self> {
        if samplespace.is_empty() {
            return Err(MaxentError::EmptySampleSpace);
        }
        if features.is_empty() {
            return Err(MaxentError::NoFeatures);
        }
        let mut values = Array2::zeros((features.len(), samplespace.len()));
        for (i, mut row) in values.axis_iter_mut(Axis(0)).enumerate() {
            let column = features.eval_feature(i, samplespace)?;
            if let Some(j) = column.iter().position(|v| !v.is_finite()) {
                return Err(MaxentError::NonFiniteFeature { feature: i, outcome: j, value: column[j] });
            }
            row.assign(&column);
        }
        Ok(Self { values })
    }

    pub fn n_features(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_outcomes(&self) -> usize {
        self.values.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Values of feature `i` across all outcomes.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }

    /// Feature vector `f(x_j)` of outcome `j`.
    pub fn column(&self, j: usize) -> ArrayView1<'_, f64> {
        self.values.column(j)
    }

    /// `θ·f(x_j)` for every outcome `j`.
    pub fn scores(&self, theta: ArrayView1<'_, f64>) -> Array1<f64> {
        self.values.t().dot(&theta)
    }

    /// `Σ_j f(x_j) p_j`, the feature expectations under `p`.
    pub fn expectations(&self, p: ArrayView1<'_, f64>) -> Array1<f64> {
        self.values.dot(&p)
    }
}
