//! Feature functions and the ordered feature set of a model.
//!
//! Purpose
//! -------
//! Describe the real-valued statistics `f_i(x)` whose expectations are
//! constrained during fitting, and evaluate them over a sample space.
//!
//! Key behaviors
//! -------------
//! - [`Feature<X>`] evaluates one outcome at a time. Any closure
//!   `Fn(&X) -> R` with `R:`[`FeatureValue`] is a feature, so indicator
//!   closures returning `bool` work directly (`true → 1.0`).
//! - [`VectorizedFeature<X>`] evaluates the whole sample space at once. Any
//!   closure `Fn(&[X]) -> R` with `R:`[`FeatureColumn`] qualifies.
//! - [`FeatureSet`] fixes the evaluation strategy when the model is built;
//!   no runtime type inspection decides it.
//!
//! Invariants & assumptions
//! ------------------------
//! - Feature order is significant: row `i` of the matrix, parameter `θ_i` and
//!   target `K_i` all refer to the `i`-th feature.
//! - Features are pure; the cached matrix is never recomputed.
use ndarray::Array1;

use crate::maxent::errors::{MaxentError, MaxentResult};

/// Scalar types a feature may return.
pub trait FeatureValue {
    fn to_f64(self) -> f64;
}

macro_rules! impl_feature_value_as {
    ($($t:ty),*) => {
        $(impl FeatureValue for $t {
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
        })*
    };
}

impl_feature_value_as!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FeatureValue for bool {
    #[inline]
    fn to_f64(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }
}

/// Sequence types a vectorized feature may return.
pub trait FeatureColumn {
    fn into_column(self) -> Array1<f64>;
}

impl FeatureColumn for Array1<f64> {
    fn into_column(self) -> Array1<f64> {
        self
    }
}

impl<R: FeatureValue> FeatureColumn for Vec<R> {
    fn into_column(self) -> Array1<f64> {
        self.into_iter().map(FeatureValue::to_f64).collect()
    }
}

/// Per-outcome feature function `f(x)`.
pub trait Feature<X> {
    fn eval(&self, x: &X) -> f64;
}

impl<X, R, F> Feature<X> for F
where
    F: Fn(&X) -> R,
    R: FeatureValue,
{
    #[inline]
    fn eval(&self, x: &X) -> f64 {
        self(x).to_f64()
    }
}

/// Feature function evaluated over a whole slice of outcomes.
///
/// The returned column must have one entry per input outcome.
pub trait VectorizedFeature<X> {
    fn eval_all(&self, xs: &[X]) -> Array1<f64>;
}

impl<X, R, F> VectorizedFeature<X> for F
where
    F: Fn(&[X]) -> R,
    R: FeatureColumn,
{
    fn eval_all(&self, xs: &[X]) -> Array1<f64> {
        self(xs).into_column()
    }
}

/// Box a per-outcome feature so features of different types share a `Vec`.
pub fn feature<X, F: Feature<X> + 'static>(f: F) -> Box<dyn Feature<X>> {
    Box::new(f)
}

/// Box a vectorized feature so features of different types share a `Vec`.
pub fn vectorized<X, F: VectorizedFeature<X> + 'static>(f: F) -> Box<dyn VectorizedFeature<X>> {
    Box::new(f)
}

/// Ordered feature functions with a fixed evaluation strategy.
pub enum FeatureSet<X> {
    /// Each feature is called once per outcome.
    PerOutcome(Vec<Box<dyn Feature<X>>>),
    /// Each feature is called once with the full sample space.
    Vectorized(Vec<Box<dyn VectorizedFeature<X>>>),
}

impl<X> FeatureSet<X> {
    pub fn len(&self) -> usize {
        match self {
            FeatureSet::PerOutcome(fs) => fs.len(),
            FeatureSet::Vectorized(fs) => fs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_vectorized(&self) -> bool {
        matches!(self, FeatureSet::Vectorized(_))
    }

    /// Evaluate feature `i` over every outcome.
    ///
    /// # Errors
    /// - [`MaxentError::ShapeMismatch`] if a vectorized feature returns a
    ///   column whose length differs from `xs.len()`.
    pub fn eval_feature(&self, i: usize, xs: &[X]) -> MaxentResult<Array1<f64>> {
        match self {
            FeatureSet::PerOutcome(fs) => Ok(xs.iter().map(|x| fs[i].eval(x)).collect()),
            FeatureSet::Vectorized(fs) => {
                let column = fs[i].eval_all(xs);
                if column.len() != xs.len() {
                    return Err(MaxentError::ShapeMismatch {
                        what: "vectorized feature output",
                        expected: xs.len(),
                        found: column.len(),
                    });
                }
                Ok(column)
            }
        }
    }

    /// Evaluate every feature at a single outcome `x`, in feature order.
    ///
    /// Vectorized features receive a one-element slice.
    ///
    /// # Errors
    /// - [`MaxentError::ShapeMismatch`] for a malformed vectorized output.
    /// - [`MaxentError::NonFiniteFeature`] (with `outcome = 0`) for NaN/±inf.
    pub fn eval_at(&self, x: &X) -> MaxentResult<Array1<f64>> {
        let xs = std::slice::from_ref(x);
        let mut out = Array1::zeros(self.len());
        for (i, slot) in out.iter_mut().enumerate() {
            let value = self.eval_feature(i, xs)?[0];
            if !value.is_finite() {
                return Err(MaxentError::NonFiniteFeature { feature: i, outcome: 0, value });
            }
            *slot = value;
        }
        Ok(out)
    }
}

impl<X> std::fmt::Debug for FeatureSet<X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_vectorized() { "Vectorized" } else { "PerOutcome" };
        write!(f, "FeatureSet::{kind}({} features)", self.len())
    }
}
