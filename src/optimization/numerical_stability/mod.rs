//! numerical_stability — overflow-safe reductions used by the entropy dual.
//!
//! Purpose
//! -------
//! Evaluate `ln Σ exp(a_i)` and the matching softmax without overflow or
//! underflow, whatever the scale of the logits `a_i = θ·f(x_i) + ln p0(x_i)`.
//!
//! Conventions
//! -----------
//! - Helpers are pure and never log; non-finite results are returned as-is
//!   and turned into errors by the model layer.
//! - `-inf` logits are legal and mean "zero prior mass".

pub mod logsumexp;

pub use self::logsumexp::{log_softmax, log_sum_exp, softmax, softmax_into};

pub mod prelude {
    pub use super::logsumexp::{log_softmax, log_sum_exp, softmax, softmax_into};
}
