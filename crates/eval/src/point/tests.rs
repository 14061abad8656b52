use approx::assert_relative_eq;

use mads_core::{FixedVariables, Point, SpaceError, Tolerance};

use super::{EvalPoint, GenStep};
use crate::{
    eval::{EvalError, EvalKind, EvalStatus, FailReason, HNorm},
    output::{
        BbOutput,
        BbOutputType::{self, ConstraintPb, Objective},
    },
    tag::{TagRegistry, ThreadAlgoId},
};

const TYPES: [BbOutputType; 2] = [Objective, ConstraintPb];

fn unevaluated(coords: &[f64]) -> EvalPoint {
    EvalPoint::new(Point::new(coords.to_vec()).expect("valid point"), GenStep::Poll)
}

/// Runs the full harness contract on one slot: dispatch, then outputs.
fn evaluate(point: &mut EvalPoint, kind: EvalKind, f: f64, constraint: f64) {
    point.start_eval(kind).expect("dispatch");
    point.inc_number_eval();
    point
        .complete_eval(kind, BbOutput::from_values([f, constraint]), &TYPES, HNorm::L2)
        .expect("completion");
}

#[test]
fn fresh_point_is_unevaluated() {
    let point = unevaluated(&[1.0, 2.0]);

    assert_eq!(point.status(EvalKind::Blackbox), EvalStatus::NotEvaluated);
    assert_eq!(point.status(EvalKind::Surrogate), EvalStatus::NotEvaluated);
    assert_eq!(point.f(), None);
    assert_eq!(point.h(), None);
    assert!(!point.is_eval_ok());
    assert!(!point.is_feasible(&Tolerance::default()));
    assert!(!point.has_bb_eval());
    assert!(!point.has_sgte_eval());
    assert_eq!(point.number_eval(), 0);
    assert_eq!(point.tag(), None);
}

#[test]
fn harness_contract_populates_f_and_h() {
    let mut point = unevaluated(&[1.0, 2.0]);
    evaluate(&mut point, EvalKind::Blackbox, 3.0, -1.0);

    assert!(point.is_eval_ok());
    assert!(point.has_bb_eval());
    assert_relative_eq!(point.f().unwrap(), 3.0);
    assert_relative_eq!(point.h().unwrap(), 0.0);
    assert!(point.is_feasible(&Tolerance::default()));
    assert_eq!(point.number_eval(), 1);
}

#[test]
fn infeasible_point_reports_its_violation() {
    let mut point = unevaluated(&[1.0, 2.0]);
    evaluate(&mut point, EvalKind::Blackbox, 3.0, 2.0);

    assert!(point.is_eval_ok());
    assert!(!point.is_feasible(&Tolerance::default()));
    assert_relative_eq!(point.h().unwrap(), 2.0);
}

#[test]
fn failed_outputs_must_be_reported_as_failed() {
    let mut point = unevaluated(&[1.0]);
    point.start_eval(EvalKind::Blackbox).unwrap();

    // The blackbox printed garbage for the objective.
    let err = point
        .complete_eval(
            EvalKind::Blackbox,
            BbOutput::parse("bug 0.0"),
            &TYPES,
            HNorm::L2,
        )
        .unwrap_err();
    assert!(matches!(err, EvalError::UndefinedOutput { index: 0, .. }));

    // The slot is still open, so the harness records the failure.
    point
        .fail_eval(EvalKind::Blackbox, FailReason::Blackbox)
        .expect("record failure");
    assert_eq!(point.status(EvalKind::Blackbox), EvalStatus::Failed);
    assert_eq!(point.f(), None);
}

#[test]
fn reset_reopens_a_finished_slot_for_resampling() {
    let mut point = unevaluated(&[1.0, 2.0]);
    evaluate(&mut point, EvalKind::Blackbox, 3.0, -1.0);

    // A noisy blackbox gets re-sampled: reopen, then run a second attempt.
    point.reset_eval(EvalKind::Blackbox).expect("reopen");
    assert_eq!(point.status(EvalKind::Blackbox), EvalStatus::NotEvaluated);
    assert_eq!(point.f(), None);
    assert_eq!(point.number_eval(), 1, "samples are counted across attempts");

    evaluate(&mut point, EvalKind::Blackbox, 2.5, -1.0);
    assert_relative_eq!(point.f().unwrap(), 2.5);
    assert_eq!(point.number_eval(), 2);
}

#[test]
fn reset_refuses_an_attempt_still_underway() {
    let mut point = unevaluated(&[1.0]);
    point.start_eval(EvalKind::Blackbox).unwrap();

    let err = point.reset_eval(EvalKind::Blackbox).unwrap_err();
    assert!(matches!(
        err,
        EvalError::InvalidTransition {
            from: EvalStatus::InProgress,
            ..
        }
    ));
}

#[test]
fn reset_reopens_a_failed_slot() {
    let mut point = unevaluated(&[1.0]);
    point.start_eval(EvalKind::Blackbox).unwrap();
    point
        .fail_eval(EvalKind::Blackbox, FailReason::Blackbox)
        .unwrap();

    point.reset_eval(EvalKind::Blackbox).expect("reopen");
    point.start_eval(EvalKind::Blackbox).expect("second dispatch");
}

#[test]
fn cancellation_never_leaves_in_progress() {
    let mut point = unevaluated(&[1.0]);
    point.start_eval(EvalKind::Blackbox).unwrap();
    point
        .fail_eval(EvalKind::Blackbox, FailReason::Cancelled)
        .unwrap();

    assert_eq!(point.status(EvalKind::Blackbox), EvalStatus::Failed);
}

#[test]
fn user_rejection_is_terminal() {
    let mut point = unevaluated(&[1.0]);
    point.start_eval(EvalKind::Blackbox).unwrap();
    point.reject_eval(EvalKind::Blackbox).unwrap();

    assert_eq!(point.status(EvalKind::Blackbox), EvalStatus::UserRejected);
    assert!(matches!(
        point.start_eval(EvalKind::Blackbox),
        Err(EvalError::InvalidTransition { .. })
    ));
}

#[test]
fn surrogate_slot_is_independent_of_the_true_slot() {
    let mut point = unevaluated(&[1.0, 2.0]);
    evaluate(&mut point, EvalKind::Blackbox, 3.0, 0.0);
    evaluate(&mut point, EvalKind::Surrogate, 2.5, 0.0);

    assert!(point.has_bb_eval());
    assert!(point.has_sgte_eval());
    // The true slot stays authoritative.
    assert_relative_eq!(point.f().unwrap(), 3.0);
    assert_relative_eq!(point.slot(EvalKind::Surrogate).f().unwrap(), 2.5);
}

#[test]
fn clear_sgte_leaves_the_true_result_untouched() {
    let mut point = unevaluated(&[1.0, 2.0]);
    evaluate(&mut point, EvalKind::Blackbox, 3.0, 0.0);
    evaluate(&mut point, EvalKind::Surrogate, 2.5, 0.0);

    point.clear_sgte();

    assert!(!point.has_sgte_eval());
    assert_eq!(point.status(EvalKind::Surrogate), EvalStatus::NotEvaluated);
    assert!(point.is_eval_ok());
    assert_relative_eq!(point.f().unwrap(), 3.0);
    assert_relative_eq!(point.h().unwrap(), 0.0);
}

#[test]
fn promote_sgte_moves_the_result_and_clears_the_slot() {
    let mut point = unevaluated(&[1.0, 2.0]);
    evaluate(&mut point, EvalKind::Surrogate, 2.5, 0.0);

    point.promote_sgte().expect("promotion");

    assert!(point.is_eval_ok());
    assert_relative_eq!(point.f().unwrap(), 2.5);
    assert!(!point.has_sgte_eval());
    assert_eq!(point.status(EvalKind::Surrogate), EvalStatus::NotEvaluated);
}

#[test]
fn promote_sgte_requires_a_completed_surrogate() {
    let mut point = unevaluated(&[1.0]);
    assert!(matches!(
        point.promote_sgte(),
        Err(EvalError::InvalidTransition {
            from: EvalStatus::NotEvaluated,
            ..
        })
    ));
}

#[test]
fn number_eval_counts_every_dispatch() {
    let mut point = unevaluated(&[1.0]);
    point.inc_number_eval();
    point.inc_number_eval();
    assert_eq!(point.number_eval(), 2);
}

#[test]
fn reset_tag_clears_tag_and_counter() {
    let registry = TagRegistry::new();
    let mut point = unevaluated(&[1.0]);
    point.update_tag(&registry);
    point.inc_number_eval();

    point.reset_tag();
    assert_eq!(point.tag(), None);
    assert_eq!(point.number_eval(), 0);
}

#[test]
fn update_tag_draws_from_the_owning_instance() {
    let registry = TagRegistry::new();
    let algo = ThreadAlgoId(3);

    let mut point = unevaluated(&[1.0]);
    point.set_thread_algo(algo);
    point.update_tag(&registry);

    let tag = point.tag().expect("tag assigned");
    assert_eq!(registry.range_of(algo), Some((tag, tag)));
    assert_eq!(point.thread_algo(), Some(algo));
}

#[test]
fn identical_coordinates_receive_distinct_tags() {
    let registry = TagRegistry::new();
    let mut a = unevaluated(&[1.0, 2.0]);
    let mut b = unevaluated(&[1.0, 2.0]);

    a.update_tag(&registry);
    b.update_tag(&registry);

    assert_eq!(a, b, "structurally the same point");
    assert_ne!(a.tag(), b.tag());
    assert_ne!(a.cache_key(), b.cache_key());
}

#[test]
fn generation_metadata_is_recorded() {
    let direction = Point::new(vec![1.0, 0.0]).unwrap();
    let registry = TagRegistry::new();
    let parent = registry.allocate();

    let mut point = unevaluated(&[1.0, 2.0])
        .with_direction(direction.clone(), 0.5)
        .with_point_from(parent);

    assert_eq!(point.gen_step(), GenStep::Poll);
    assert_eq!(point.direction(), Some(&direction));
    assert_relative_eq!(point.angle().unwrap(), 0.5);
    assert_eq!(point.point_from(), Some(parent));

    point.set_gen_step(GenStep::Search);
    point.set_angle(1.25);
    point.set_point_from(None);
    assert_eq!(point.gen_step(), GenStep::Search);
    assert_relative_eq!(point.angle().unwrap(), 1.25);
    assert_eq!(point.point_from(), None, "dangling lineage becomes unknown");
}

#[test]
fn projections_preserve_results_and_metadata() {
    let fixed = FixedVariables::new(3, [(1, 5.0)]).expect("valid fixed variables");
    let tol = Tolerance::default();
    let registry = TagRegistry::new();

    let mut sub = unevaluated(&[1.0, 2.0]);
    evaluate(&mut sub, EvalKind::Blackbox, 3.0, 0.0);
    sub.update_tag(&registry);

    let full = sub.to_full_space(&fixed).expect("projection");
    assert_eq!(full.x().coords(), &[1.0, 5.0, 2.0]);
    assert!(full.is_eval_ok());
    assert_relative_eq!(full.f().unwrap(), 3.0);
    assert_eq!(full.tag(), sub.tag());
    assert_eq!(full.number_eval(), sub.number_eval());

    let back = full.to_sub_space(&fixed, &tol).expect("inverse projection");
    assert_eq!(back.x(), sub.x());

    assert!(matches!(
        sub.to_sub_space(&fixed, &tol),
        Err(SpaceError::DimensionMismatch { .. })
    ));
}

#[test]
fn is_defined_checks_the_declared_dimension() {
    let point = unevaluated(&[1.0, 2.0]);
    assert!(point.is_defined(2));
    assert!(!point.is_defined(3));
}

#[test]
fn display_shows_coordinates_status_and_values() {
    let mut point = unevaluated(&[1.0, 2.0]);
    assert_eq!(point.to_string(), "( 1 2 ) NOT_EVALUATED");

    evaluate(&mut point, EvalKind::Blackbox, 3.0, 0.0);
    assert_eq!(point.to_string(), "( 1 2 ) EVAL_OK f = 3 h = 0");
}
