//! Integration tests for maximum-entropy model fitting.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: feature functions over a sample space,
//!   feature matrix construction, L-BFGS minimization of the entropy dual,
//!   and queries on the fitted distribution.
//! - Use the classic machine-translation example from Berger, Della Pietra &
//!   Della Pietra (1996), whose solution is known in closed form.
//!
//! Coverage
//! --------
//! - `maxent::models::model::Model`: construction (per-outcome and
//!   vectorized), `fit`, `probdist`, `expectations`, `entropy`, `dual_value`,
//!   priors, the fit lifecycle and error paths.
//! - `optimization::dual_optimizer`: both line searches, iteration caps and
//!   the dual lower bound.
//!
//! Exclusions
//! ----------
//! - Python bindings; those are exercised from Python.
//! - Low-level helpers (log-sum-exp, validation, adapters) covered by unit
//!   tests.
use approx::assert_abs_diff_eq;
use ndarray::{Array1, array};
use proptest::prelude::*;

use maxentropy::{
    maxent::{
        core::{
            features::{feature, vectorized},
            options::FitOptions,
            state::FitState,
        },
        errors::MaxentError,
        models::model::Model,
    },
    optimization::dual_optimizer::{LineSearcher, SolverOptions, Tolerances},
};

const SAMPLESPACE: [&str; 5] = ["dans", "en", "à", "au cours de", "pendant"];

/// Expected translation probabilities, in `SAMPLESPACE` order.
const BERGER_P: [f64; 5] = [0.185857, 0.114143, 0.314143, 0.192929, 0.192929];

fn berger_targets() -> Array1<f64> {
    array![1.0, 0.3, 0.5]
}

/// Purpose
/// -------
/// Build the Berger model: `f0` is 1 everywhere, `f1` flags "dans"/"en",
/// `f2` flags "dans"/"à".
fn berger_model() -> Model<&'static str> {
    Model::new(
        SAMPLESPACE.to_vec(),
        vec![
            feature(|x: &&str| SAMPLESPACE.contains(x)),
            feature(|x: &&str| *x == "dans" || *x == "en"),
            feature(|x: &&str| *x == "dans" || *x == "à"),
        ],
    )
    .expect("valid model")
}

fn with_line_searcher(model: Model<&'static str>, ls: LineSearcher) -> Model<&'static str> {
    let tols = Tolerances::new(Some(1e-8), None, Some(500)).expect("valid tolerances");
    let solver = SolverOptions::new(tols, ls, None).expect("valid solver options");
    model.with_options(FitOptions::new(solver, Some(-100.0)).expect("valid fit options"))
}

#[test]
// Purpose
// -------
// The fitted Berger model satisfies every constraint, is a proper
// distribution, and matches the known solution.
fn berger_fit_matches_constraints_and_known_solution() {
    // Arrange
    let mut model = berger_model();
    let k = berger_targets();

    // Act
    let outcome = model.fit(&k).expect("Berger targets are feasible");

    // Assert
    assert!(outcome.converged, "{}", outcome.status);
    assert_eq!(model.state(), FitState::Fitted);

    let e = model.expectations().expect("fitted");
    for i in 0..3 {
        assert_abs_diff_eq!(e[i], k[i], epsilon = 1e-6);
    }

    let p = model.probdist().expect("fitted");
    assert_abs_diff_eq!(p.sum(), 1.0, epsilon = 1e-12);
    assert!(p.iter().all(|&pj| pj >= 0.0));
    for (pj, expected) in p.iter().zip(BERGER_P) {
        assert_abs_diff_eq!(*pj, expected, epsilon = 1e-4);
    }
    assert_abs_diff_eq!(p[3], p[4], epsilon = 1e-12);
}

#[test]
fn both_line_searches_reach_the_same_distribution() {
    let mut mt = with_line_searcher(berger_model(), LineSearcher::MoreThuente);
    let mut hz = with_line_searcher(berger_model(), LineSearcher::HagerZhang);

    mt.fit(&berger_targets()).expect("More-Thuente fit");
    hz.fit(&berger_targets()).expect("Hager-Zhang fit");

    let (p_mt, p_hz) = (mt.probdist().expect("fitted"), hz.probdist().expect("fitted"));
    for (a, b) in p_mt.iter().zip(p_hz.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
    }
}

#[test]
// Purpose
// -------
// Without a prior the dual at the optimum equals the entropy of the fitted
// distribution.
fn dual_at_optimum_equals_entropy() {
    let mut model = berger_model();
    model.fit(&berger_targets()).expect("feasible");

    let h = model.entropy().expect("fitted");
    let l = model.dual_value().expect("fitted");

    assert_abs_diff_eq!(h, l, epsilon = 1e-7);
    assert_abs_diff_eq!(h, 1.559132, epsilon = 1e-5);
    assert!(h <= (5f64).ln());
}

#[test]
fn queries_before_fit_are_rejected() {
    let model = berger_model();

    assert_eq!(model.probdist(), Err(MaxentError::NotFitted));
    assert_eq!(model.expectations(), Err(MaxentError::NotFitted));
    assert_eq!(model.dual_value(), Err(MaxentError::NotFitted));

    let p = model.probdist_at(&Array1::zeros(3)).expect("explicit parameters");
    assert_abs_diff_eq!(p[0], 0.2, epsilon = 1e-15);
}

#[test]
// Purpose
// -------
// Targets outside the range of a feature make the dual unbounded below: the
// fit fails, and the best parameters seen remain available.
fn infeasible_targets_report_convergence_failure() {
    // Arrange: f2 is an indicator, so its mean cannot exceed 1.
    let mut model = berger_model();

    // Act
    let err = model.fit(&array![1.0, 0.3, 1.2]).expect_err("infeasible targets");

    // Assert
    assert!(matches!(err, MaxentError::ConvergenceFailure { .. }), "{err}");
    assert_eq!(model.state(), FitState::FitFailed);
    assert!(model.params().iter().all(|v| v.is_finite()));
    assert!(model.params()[2] > 0.0);
    assert_eq!(model.probdist(), Err(MaxentError::NotFitted));
    assert!(model.probdist_at(model.params()).is_ok());
}

#[test]
fn iteration_cap_reports_convergence_failure() {
    let tols = Tolerances::new(Some(1e-14), None, Some(2)).expect("valid tolerances");
    let solver = SolverOptions::new(tols, LineSearcher::MoreThuente, None).expect("valid");
    let mut model =
        berger_model().with_options(FitOptions::new(solver, None).expect("valid options"));

    let err = model.fit(&berger_targets()).expect_err("two iterations are not enough");

    match err {
        MaxentError::ConvergenceFailure { status, iterations, .. } => {
            assert!(status.contains("MaxIters"), "{status}");
            assert_eq!(iterations, Some(2));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
// Purpose
// -------
// A second fit warm-starts from the first solution and lands on the same
// parameters; after a reset it reaches the same distribution again.
fn refitting_is_stable() {
    let mut model = berger_model();
    model.fit(&berger_targets()).expect("feasible");
    let first_params = model.params().clone();
    let first_p = model.probdist().expect("fitted");

    model.fit(&berger_targets()).expect("feasible");
    for (a, b) in model.params().iter().zip(first_params.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
    }

    model.reset_params();
    assert_eq!(model.state(), FitState::Unfit);
    model.fit(&berger_targets()).expect("feasible");
    let p = model.probdist().expect("fitted");
    for (a, b) in p.iter().zip(first_p.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
    }
}

#[test]
fn constant_feature_with_matching_target_needs_no_iterations() {
    let mut model =
        Model::new(SAMPLESPACE.to_vec(), vec![feature(|_: &&str| 1.0)]).expect("valid model");

    let outcome = model.fit(&array![1.0]).expect("trivially feasible");

    assert_eq!(outcome.iterations, 0);
    assert_eq!(model.params(), &array![0.0]);
    let p = model.probdist().expect("fitted");
    assert!(p.iter().all(|&pj| (pj - 0.2).abs() < 1e-15));
}

#[test]
// Purpose
// -------
// Vectorized features produce the same matrix and the same fitted model as
// their per-outcome counterparts.
fn vectorized_features_match_per_outcome_features() {
    let mut vec_model = Model::vectorized(
        SAMPLESPACE.to_vec(),
        vec![
            vectorized(|xs: &[&str]| vec![1.0; xs.len()]),
            vectorized(|xs: &[&str]| {
                xs.iter().map(|x| *x == "dans" || *x == "en").collect::<Vec<_>>()
            }),
            vectorized(|xs: &[&str]| {
                xs.iter().map(|x| *x == "dans" || *x == "à").collect::<Vec<_>>()
            }),
        ],
    )
    .expect("valid model");
    let mut plain = berger_model();

    assert_eq!(vec_model.feature_matrix(), plain.feature_matrix());

    vec_model.fit(&berger_targets()).expect("feasible");
    plain.fit(&berger_targets()).expect("feasible");
    let (a, b) = (vec_model.probdist().expect("fitted"), plain.probdist().expect("fitted"));
    for (x, y) in a.iter().zip(b.iter()) {
        assert_abs_diff_eq!(*x, *y, epsilon = 1e-10);
    }
}

#[test]
fn wrong_length_vectorized_output_is_rejected() {
    let err = Model::vectorized(
        SAMPLESPACE.to_vec(),
        vec![vectorized(|xs: &[&str]| vec![1.0; xs.len() - 1])],
    )
    .expect_err("short column");

    assert!(matches!(err, MaxentError::ShapeMismatch { expected: 5, found: 4, .. }), "{err}");
}

#[test]
fn non_finite_feature_values_are_rejected_at_construction() {
    let err = Model::new(
        SAMPLESPACE.to_vec(),
        vec![
            feature(|_: &&str| 1.0),
            feature(|x: &&str| if *x == "en" { f64::NAN } else { 0.0 }),
        ],
    )
    .expect_err("NaN feature");

    assert!(
        matches!(err, MaxentError::NonFiniteFeature { feature: 1, outcome: 1, .. }),
        "{err}"
    );
}

#[test]
// Purpose
// -------
// With a prior the model minimizes divergence: constraints still hold,
// excluded outcomes keep zero mass, and the dual at the optimum is the
// negative KL divergence from the prior.
fn prior_gives_minimum_divergence_solution() {
    // Arrange: "pendant" is excluded and "au cours de" is favoured.
    let prior = array![1.0, 1.0, 1.0, 3.0, 0.0].mapv(f64::ln);
    let mut model = berger_model().with_prior(prior).expect("valid prior");

    // Act
    model.fit(&berger_targets()).expect("feasible under the prior");

    // Assert
    let p = model.probdist().expect("fitted");
    assert_eq!(p[4], 0.0);
    assert_abs_diff_eq!(p.sum(), 1.0, epsilon = 1e-12);
    let e = model.expectations().expect("fitted");
    assert_abs_diff_eq!(e[1], 0.3, epsilon = 1e-6);
    assert_abs_diff_eq!(e[2], 0.5, epsilon = 1e-6);
    let kl = model.kl_divergence().expect("fitted");
    assert!(kl >= 0.0);
    assert_abs_diff_eq!(model.dual_value().expect("fitted"), -kl, epsilon = 1e-7);
}

#[test]
fn changing_the_prior_invalidates_the_fit() {
    let mut model = berger_model();
    model.fit(&berger_targets()).expect("feasible");

    model.set_prior(Some(Array1::zeros(5))).expect("uniform prior");

    assert_eq!(model.state(), FitState::Unfit);
    assert!(matches!(
        model.set_prior(Some(Array1::from_elem(5, f64::NEG_INFINITY))),
        Err(MaxentError::InvalidPrior { .. })
    ));
}

#[test]
fn smoothing_trades_constraint_fit_for_smaller_parameters() {
    let mut plain = berger_model();
    let mut smooth = berger_model().with_smoothing(0.1).expect("valid sigma2");

    plain.fit(&berger_targets()).expect("feasible");
    smooth.fit(&berger_targets()).expect("smoothed dual is bounded");

    let norm = |v: &Array1<f64>| v.dot(v).sqrt();
    assert!(norm(smooth.params()) < norm(plain.params()));
    let p = smooth.probdist().expect("fitted");
    assert_abs_diff_eq!(p.sum(), 1.0, epsilon = 1e-12);
}

#[test]
// Purpose
// -------
// Verbose mode reports every iteration through `log` and leaves the fit
// itself unchanged.
fn verbose_fit_logs_each_iteration_and_matches_quiet_fit() {
    // Arrange
    let k = berger_targets();
    let mut quiet = berger_model();
    let mut loud = berger_model();
    loud.set_verbose(true);

    // Act
    let (quiet_run, quiet_log) = capture::messages_during(|| quiet.fit(&k).cloned());
    let (loud_run, loud_log) = capture::messages_during(|| loud.fit(&k).cloned());
    let quiet_outcome = quiet_run.expect("feasible targets");
    let loud_outcome = loud_run.expect("feasible targets");

    // Assert
    let iter_lines = loud_log.iter().filter(|m| m.starts_with("iter ")).count();
    assert!(loud_outcome.iterations > 0);
    assert_eq!(iter_lines, loud_outcome.iterations, "{loud_log:#?}");
    assert!(loud_log.iter().any(|m| m.starts_with("init: dual(theta0)")), "{loud_log:#?}");
    assert!(loud_log.iter().any(|m| m.starts_with("converged after")), "{loud_log:#?}");
    assert!(quiet_log.iter().all(|m| !m.starts_with("iter ")), "{quiet_log:#?}");

    assert_eq!(loud_outcome.iterations, quiet_outcome.iterations);
    assert_eq!(loud.params(), quiet.params());
}

#[test]
// Purpose
// -------
// Parameters left behind by a diverging fit can be of order 1e15; the
// distribution they give must still sum to one.
fn failed_fit_parameters_give_a_normalized_distribution() {
    // Arrange: f0 is 1 everywhere, so its mean cannot be 0.5.
    let mut model = berger_model();
    let _ = model.fit(&array![0.5, 0.3, 0.2]).expect_err("infeasible targets");

    // Act
    let p = model.probdist_at(model.params()).expect("finite parameters");

    // Assert
    assert_eq!(model.state(), FitState::FitFailed);
    assert_abs_diff_eq!(p.sum(), 1.0, epsilon = 1e-12);
    assert!(p.iter().all(|&pj| (0.0..=1.0).contains(&pj)));
}

proptest! {
    #[test]
    // Purpose
    // -------
    // Any finite parameter vector gives a proper distribution.
    fn probdist_at_is_a_distribution(theta in prop::collection::vec(-50.0f64..50.0, 3)) {
        let model = berger_model();
        let p = model.probdist_at(&Array1::from(theta)).expect("finite parameters");

        prop_assert!((p.sum() - 1.0).abs() < 1e-12);
        prop_assert!(p.iter().all(|&pj| (0.0..=1.0).contains(&pj)));
    }

    #[test]
    fn probdist_at_is_a_distribution_for_huge_parameters(
        theta in prop::collection::vec(-1e16f64..1e16, 3)
    ) {
        let model = berger_model();
        let p = model.probdist_at(&Array1::from(theta)).expect("finite parameters");

        prop_assert!((p.sum() - 1.0).abs() < 1e-12);
        prop_assert!(p.iter().all(|&pj| (0.0..=1.0).contains(&pj)));
    }
}

/// Test logger that keeps `info` and above, tagged with the logging thread
/// so parallel tests do not see each other's records.
mod capture {
    use std::{
        sync::{Mutex, Once},
        thread::{self, ThreadId},
    };

    use log::{Level, LevelFilter, Log, Metadata, Record};

    struct CaptureLog;

    static LOGGER: CaptureLog = CaptureLog;
    static INSTALL: Once = Once::new();
    static RECORDS: Mutex<Vec<(ThreadId, String)>> = Mutex::new(Vec::new());

    impl Log for CaptureLog {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Info
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                let mut records = RECORDS.lock().unwrap_or_else(|e| e.into_inner());
                records.push((thread::current().id(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    /// Run `f` and return its result with the messages this thread logged.
    pub fn messages_during<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        INSTALL.call_once(|| {
            log::set_logger(&LOGGER).expect("no other logger installed");
            log::set_max_level(LevelFilter::Info);
        });
        let id = thread::current().id();
        take(id);
        let out = f();
        (out, take(id))
    }

    fn take(id: ThreadId) -> Vec<String> {
        let mut records = RECORDS.lock().unwrap_or_else(|e| e.into_inner());
        let (mine, rest) = records.drain(..).partition::<Vec<_>, _>(|(t, _)| *t == id);
        *records = rest;
        mine.into_iter().map(|(_, m)| m).collect()
    }
}
