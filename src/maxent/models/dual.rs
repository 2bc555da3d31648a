//! Entropy dual: log-partition function, model expectations, dual value and
//! gradient.
//!
//! For parameters `θ` and log-weights `a_j = θ·f(x_j) + ln p0(x_j)`:
//!
//! - `ln Z(θ) = ln Σ_j exp(a_j)`, evaluated with the maximum shifted out;
//! - `p_θ(x_j) = exp(a_j − ln Z(θ))`;
//! - `L(θ) = ln Z(θ) − θ·K + Σ_i θ_i² / (2σ²)`;
//! - `∇L(θ) = E_θ[f] − K + θ / σ²`.
//!
//! The smoothing terms are present only when a variance `σ²` is set. `L` is
//! convex, and its minimizer is the maximum-entropy (or minimum-divergence)
//! solution for targets `K`. Without a prior `ln p0 ≡ 0`.
//!
//! Every evaluation is a bulk matrix–vector product over the cached
//! [`FeatureMatrix`]; nothing is recomputed from the feature functions.
use ndarray::{Array1, ArrayView1};

use crate::{
    maxent::{
        core::matrix::FeatureMatrix,
        errors::{MaxentError, MaxentResult},
    },
    optimization::{
        dual_optimizer::{validation::validate_theta, Grad, Objective, Theta},
        errors::{OptError, OptResult},
        numerical_stability::{log_softmax, log_sum_exp, softmax},
    },
};

/// Borrowed view of a model's fixed data, evaluating the dual at any `θ`.
#[derive(Debug, Clone, Copy)]
pub struct EntropyDual<'m> {
    matrix: &'m FeatureMatrix,
    log_prior: Option<&'m Array1<f64>>,
    sigma2: Option<f64>,
}

impl<'m> EntropyDual<'m> {
    /// `log_prior`, when given, must already be normalized and have one
    /// entry per outcome.
    pub fn new(
        matrix: &'m FeatureMatrix, log_prior: Option<&'m Array1<f64>>, sigma2: Option<f64>,
    ) -> Self {
        Self { matrix, log_prior, sigma2 }
    }

    pub fn n_features(&self) -> usize {
        self.matrix.n_features()
    }

    /// `a_j = θ·f(x_j) + ln p0(x_j)` for every outcome.
    pub fn log_weights(&self, theta: ArrayView1<'_, f64>) -> Array1<f64> {
        let mut a = self.matrix.scores(theta);
        if let Some(lp) = self.log_prior {
            a += lp;
        }
        a
    }

    /// `ln Z(θ)`.
    ///
    /// # Errors
    /// [`MaxentError::NumericalInstability`] if `Z` under- or overflows.
    pub fn log_partition(&self, theta: ArrayView1<'_, f64>) -> MaxentResult<f64> {
        checked_lse(log_sum_exp(self.log_weights(theta).view()))
    }

    /// `ln p_θ(x_j)` for every outcome. Outcomes with zero prior mass
    /// get `-inf`.
    pub fn log_probdist(&self, theta: ArrayView1<'_, f64>) -> MaxentResult<Array1<f64>> {
        let (log_p, lse) = log_softmax(self.log_weights(theta).view());
        checked_lse(lse)?;
        Ok(log_p)
    }

    /// `p_θ(x_j)` for every outcome; sums to one.
    pub fn probdist(&self, theta: ArrayView1<'_, f64>) -> MaxentResult<Array1<f64>> {
        let (p, lse) = softmax(self.log_weights(theta).view());
        checked_lse(lse)?;
        Ok(p)
    }

    /// Model expectations `E_θ[f_i]`.
    pub fn expectations(&self, theta: ArrayView1<'_, f64>) -> MaxentResult<Array1<f64>> {
        let p = self.probdist(theta)?;
        Ok(self.matrix.expectations(p.view()))
    }

    /// Dual value `L(θ)` for targets `K`.
    pub fn value(
        &self, theta: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>,
    ) -> MaxentResult<f64> {
        let mut l = self.log_partition(theta)? - theta.dot(&targets);
        if let Some(s2) = self.sigma2 {
            l += theta.dot(&theta) / (2.0 * s2);
        }
        Ok(l)
    }

    /// Dual gradient `∇L(θ)` for targets `K`.
    pub fn gradient(
        &self, theta: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>,
    ) -> MaxentResult<Array1<f64>> {
        let mut g = self.expectations(theta)? - &targets;
        if let Some(s2) = self.sigma2 {
            g.scaled_add(1.0 / s2, &theta);
        }
        Ok(g)
    }

    /// Shannon entropy `−Σ p ln p` (natural log), with `0 ln 0 = 0`.
    pub fn entropy(&self, theta: ArrayView1<'_, f64>) -> MaxentResult<f64> {
        let log_p = self.log_probdist(theta)?;
        Ok(-log_p.iter().filter(|lp| lp.is_finite()).map(|&lp| lp.exp() * lp).sum::<f64>())
    }

    /// `KL(p_θ ‖ p0)`; against the uniform distribution when no prior is set.
    pub fn kl_divergence(&self, theta: ArrayView1<'_, f64>) -> MaxentResult<f64> {
        let log_p = self.log_probdist(theta)?;
        let uniform = -(self.matrix.n_outcomes() as f64).ln();
        let mut kl = 0.0;
        for (j, &lp) in log_p.iter().enumerate() {
            if lp.is_finite() {
                let lp0 = self.log_prior.map_or(uniform, |prior| prior[j]);
                kl += lp.exp() * (lp - lp0);
            }
        }
        Ok(kl)
    }
}

impl Objective for EntropyDual<'_> {
    type Data = Array1<f64>;

    fn value(&self, theta: &Theta, targets: &Self::Data) -> OptResult<f64> {
        Ok(EntropyDual::value(self, theta.view(), targets.view())?)
    }

    fn check(&self, theta: &Theta, targets: &Self::Data) -> OptResult<()> {
        validate_theta(theta, self.n_features())?;
        if targets.len() != self.n_features() {
            return Err(OptError::ObjectiveError {
                text: format!(
                    "targets have length {}, expected {}",
                    targets.len(),
                    self.n_features()
                ),
            });
        }
        Ok(())
    }

    fn grad(&self, theta: &Theta, targets: &Self::Data) -> OptResult<Grad> {
        Ok(self.gradient(theta.view(), targets.view())?)
    }
}

/// Turn a non-finite log-partition value into a descriptive error.
fn checked_lse(lse: f64) -> MaxentResult<f64> {
    if lse.is_finite() {
        return Ok(lse);
    }
    let reason = if lse.is_nan() {
        "log-weights contain NaN".to_string()
    } else if lse > 0.0 {
        "partition function overflowed".to_string()
    } else {
        "partition function underflowed: every outcome has zero weight".to_string()
    };
    Err(MaxentError::NumericalInstability { reason })
}
