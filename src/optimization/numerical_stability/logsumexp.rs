//! Max-shifted log-sum-exp and softmax.
//!
//! Both helpers subtract the largest finite input before exponentiating, so
//! logits of any magnitude produce a finite result as long as at least one
//! of them is finite. Entries equal to `-inf` contribute zero mass.
//!
//! Non-finite outputs are not errors here; callers decide how to report them.
//! - all inputs `-inf` (or empty): `log_sum_exp` returns `-inf`.
//! - any input `NaN` or `+inf`: `log_sum_exp` returns `NaN` or `+inf`.
use ndarray::{Array1, ArrayView1, Zip};

/// `ln Σ exp(a_i)` with the maximum shifted out.
pub fn log_sum_exp(a: ArrayView1<'_, f64>) -> f64 {
    match shift(a) {
        Ok((max, sum)) => max + sum.ln(),
        Err(lse) => lse,
    }
}

/// Normalized `exp(a_i − max) / Σ exp(a_j − max)` written into `out`;
/// returns `lse`.
///
/// The normalization divides by the shifted sum rather than subtracting
/// `lse`, since `max + ln(sum)` rounds away the low bits once `|max|` is
/// large. When `lse` is not finite, `out` is left untouched.
pub fn softmax_into(a: ArrayView1<'_, f64>, out: &mut Array1<f64>) -> f64 {
    let (max, sum) = match shift(a) {
        Ok(pair) => pair,
        Err(lse) => return lse,
    };
    Zip::from(&mut *out).and(a).for_each(|o, &v| *o = (v - max).exp());
    *out /= sum;
    max + sum.ln()
}

/// Allocating variant of [`softmax_into`].
pub fn softmax(a: ArrayView1<'_, f64>) -> (Array1<f64>, f64) {
    let mut out = Array1::zeros(a.len());
    let lse = softmax_into(a, &mut out);
    (out, lse)
}

/// `a_i − lse` computed as `(a_i − max) − ln(sum)`; returns it with `lse`.
///
/// When `lse` is not finite the returned vector is all `NaN`.
pub fn log_softmax(a: ArrayView1<'_, f64>) -> (Array1<f64>, f64) {
    match shift(a) {
        Ok((max, sum)) => {
            let log_sum = sum.ln();
            (a.mapv(|v| (v - max) - log_sum), max + log_sum)
        }
        Err(lse) => (Array1::from_elem(a.len(), f64::NAN), lse),
    }
}

/// Largest entry and `Σ exp(a_i − max)`, or the non-finite `lse` when no
/// entry is finite or one is `NaN` / `+inf`.
fn shift(a: ArrayView1<'_, f64>) -> Result<(f64, f64), f64> {
    let max = a.fold(f64::NEG_INFINITY, |m, &v| if v > m || v.is_nan() { v } else { m });
    if !max.is_finite() {
        // -inf: nothing has mass. NaN / +inf: propagate.
        return Err(if max.is_nan() || max > 0.0 { max } else { f64::NEG_INFINITY });
    }
    let sum: f64 = a.iter().map(|&v| (v - max).exp()).sum();
    Ok((max, sum))
}
