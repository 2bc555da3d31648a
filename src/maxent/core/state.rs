//! Fit lifecycle of a model.

/// Where a model stands with respect to its last fit.
///
/// - `Unfit`: freshly built, or parameters/prior/smoothing changed since.
/// - `Fitted`: the last `fit` converged; distribution queries are allowed.
/// - `FitFailed`: the last `fit` stopped early; parameters hold the best
///   point found and remain inspectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitState {
    #[default]
    Unfit,
    Fitted,
    FitFailed,
}

impl FitState {
    pub fn is_fitted(self) -> bool {
        self == FitState::Fitted
    }
}

impl std::fmt::Display for FitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FitState::Unfit => "unfit",
            FitState::Fitted => "fitted",
            FitState::FitFailed => "fit failed",
        };
        f.write_str(s)
    }
}
