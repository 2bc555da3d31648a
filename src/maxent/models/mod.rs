//! models — the entropy dual and the user-facing [`Model`].
//!
//! - [`EntropyDual`] evaluates `ln Z(θ)`, the distribution, expectations and
//!   the dual value/gradient against a cached feature matrix, and implements
//!   the optimizer's `Objective` trait.
//! - [`Model`] owns the sample space and features, runs the fit and answers
//!   distribution queries.

pub mod dual;
pub mod model;

pub use self::dual::EntropyDual;
pub use self::model::Model;

pub mod prelude {
    pub use super::{EntropyDual, Model};
}
