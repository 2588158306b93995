//! Top-level scenarios exercising the three subsystems together, matching
//! the worked examples a caller assembling generators, a presentation, or a
//! dispatcher would actually run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use semigroups::coxeter::{Side, ToddCoxeterEngine};
use semigroups::dispatcher::CongruenceDispatcher;
use semigroups::element::transformation::Transformation;
use semigroups::reporting::{NoopReporter, Reporter};
use semigroups::semigroup::algs::froidure_pin::FroidurePinEngine;

fn t(degree: usize, vals: Vec<usize>) -> Transformation {
    Transformation::from_vec(degree, vals).unwrap()
}

#[test]
fn two_generator_transformation_semigroup_has_three_elements() {
    let gens = vec![t(3, vec![1, 0, 0]), t(3, vec![0, 1, 2])];
    let mut fp = FroidurePinEngine::new(gens).unwrap();
    assert_eq!(fp.size(), 3);
    assert_eq!(fp.nr_idempotents(2), 2);
}

#[test]
fn free_monogenic_monoid_up_to_identity_has_two_elements() {
    let gen = t(2, vec![1, 0]);
    let mut fp = FroidurePinEngine::new(vec![gen]).unwrap();
    assert_eq!(fp.size(), 2);
    assert_eq!(fp.nrrules(), 1);
}

#[test]
fn todd_coxeter_trivial_presentation_has_four_classes() {
    // <a, b | a^2 = a, b^2 = b, aba = a> has 4 cosets.
    let mut engine = ToddCoxeterEngine::new(
        2,
        vec![
            (vec![0, 0], vec![0]),
            (vec![1, 1], vec![1]),
            (vec![0, 1, 0], vec![0]),
        ],
        vec![],
        Side::TwoSided,
    )
    .unwrap();
    assert_eq!(engine.nr_classes(), 4);
}

#[test]
fn prefilled_todd_coxeter_is_a_no_op_when_extra_is_empty() {
    let gens = vec![t(3, vec![1, 0, 0]), t(3, vec![0, 1, 2])];
    let mut fp = FroidurePinEngine::new(gens).unwrap();
    let size = fp.size();
    let table = fp.right_cayley().clone();

    let mut engine = ToddCoxeterEngine::new(table.n_cols(), vec![], vec![], Side::Right).unwrap();
    engine.prefill(table).unwrap();
    assert_eq!(engine.nr_classes(), size);
}

#[test]
fn race_equivalence_dispatcher_matches_direct_prefilled_engine() {
    let gens = vec![t(3, vec![1, 0, 0]), t(3, vec![0, 1, 2])];
    let mut fp_for_dispatcher = FroidurePinEngine::new(gens.clone()).unwrap();
    let extra = vec![(vec![0], vec![1])];

    let mut via_dispatcher = CongruenceDispatcher::from_semigroup(
        &mut fp_for_dispatcher,
        extra.clone(),
        Side::Right,
        8,
    )
    .unwrap();

    let mut fp_direct = FroidurePinEngine::new(gens).unwrap();
    let table = fp_direct.right_cayley().clone();
    let mut direct = ToddCoxeterEngine::new(table.n_cols(), vec![], extra, Side::Right).unwrap();
    direct.prefill(table).unwrap();

    assert_eq!(via_dispatcher.nr_classes(), direct.nr_classes());
}

#[test]
fn cancellation_leaves_the_engine_in_a_consistent_not_done_state() {
    let kill = Arc::new(AtomicBool::new(false));
    let mut engine = ToddCoxeterEngine::new(
        2,
        vec![(vec![0, 1], vec![1, 0])],
        vec![],
        Side::TwoSided,
    )
    .unwrap()
    .with_kill_flag(Arc::clone(&kill));

    kill.store(true, Ordering::Relaxed);
    engine.run_bounded(Some(1));
    assert!(!engine.is_done());

    // The engine remains usable for further bounded runs after cancellation
    // is lifted, rather than being left in a poisoned state.
    kill.store(false, Ordering::Relaxed);
    engine.run_bounded(Some(5));
}

#[test]
fn noop_reporter_accepts_every_algorithm_record() {
    // Exercises the Reporter trait object boundary directly, since neither
    // engine's own tests construct a ReportRecord by hand.
    use semigroups::reporting::{Algorithm, ReportRecord};
    let reporter: Box<dyn Reporter> = Box::new(NoopReporter);
    reporter.report(ReportRecord {
        algorithm: Algorithm::FroidurePin,
        phase: "wave",
        count: 4,
        elapsed: std::time::Duration::from_millis(1),
        thread: None,
    });
    reporter.report(ReportRecord {
        algorithm: Algorithm::ToddCoxeter,
        phase: "lookahead",
        count: 0,
        elapsed: std::time::Duration::from_millis(1),
        thread: None,
    });
}

#[test]
fn dispatcher_from_presentation_needs_no_semigroup() {
    let mut dispatcher = CongruenceDispatcher::from_presentation(
        2,
        vec![
            (vec![0, 0], vec![0]),
            (vec![1, 1], vec![1]),
            (vec![0, 1, 0], vec![0]),
        ],
        vec![],
        Side::TwoSided,
    )
    .unwrap();
    assert_eq!(dispatcher.nr_classes(), 4);
}
