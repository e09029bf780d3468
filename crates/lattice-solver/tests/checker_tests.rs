//! End-to-end checks through `Checker::check`: structural rules, union and
//! intersection duals, variable bound recording, coinductive cycles, and the
//! ground-relation cache.

use crate::builder::TableBuilder;
use crate::check::{AssumptionSet, Checker, MAX_CHECK_DEPTH};
use crate::result::{CheckResult, ErrorKind};
use crate::test_support::*;
use crate::trace::{Frame, Trace};
use lattice_core::{Constraints, Relation, Symbol, Type};

fn run(checker: &mut Checker<'_, TableBuilder>, sub: Type, sup: Type) -> CheckResult {
    checker.check(
        &Relation::new(sub, sup),
        &mut Constraints::empty(),
        &mut AssumptionSet::default(),
        &mut Trace::new(),
    )
}

fn error_of(result: &CheckResult) -> &ErrorKind {
    &result.as_failure().expect("expected a failure").error
}

#[test]
fn identical_types_are_subtypes() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);
    assert!(run(&mut checker, ty("Integer"), ty("Integer")).is_success());
    assert!(run(&mut checker, Type::var("A"), Type::var("A")).is_success());
    assert!(
        run(
            &mut checker,
            Type::generic("Comparable", vec![ty("Integer")]),
            Type::generic("Comparable", vec![ty("Integer")]),
        )
        .is_success()
    );
}

#[test]
fn any_absorbs_both_sides() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);
    assert!(run(&mut checker, Type::Any, ty("Integer")).is_success());
    assert!(run(&mut checker, ty("Integer"), Type::Any).is_success());
    assert!(run(&mut checker, Type::Any, Type::Any).is_success());
}

#[test]
fn structural_width_subtyping() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);
    init_tracing();

    assert!(run(&mut checker, ty("Integer"), ty("Numeric")).is_success());
    assert!(run(&mut checker, ty("Dog"), ty("Animal")).is_success());

    let result = run(&mut checker, ty("Numeric"), ty("Integer"));
    match error_of(&result) {
        ErrorKind::MethodMissing { name } => assert_eq!(name.as_str(), "succ"),
        other => panic!("expected MethodMissing, got {other}"),
    }
}

#[test]
fn unrelated_types_fail_with_the_missing_method() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    let result = run(&mut checker, ty("String"), ty("Numeric"));
    match error_of(&result) {
        ErrorKind::MethodMissing { name } => assert_eq!(name.as_str(), "abs"),
        other => panic!("expected MethodMissing, got {other}"),
    }
}

#[test]
fn failure_trace_records_the_derivation_path() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    // Missing method: fails before any method pair is compared.
    let result = run(&mut checker, ty("String"), ty("Numeric"));
    let failure = result.as_failure().expect("expected a failure");
    assert_eq!(
        failure.trace.frames(),
        &[Frame::Types {
            sub: ty("String"),
            sup: ty("Numeric"),
        }]
    );

    // Arity mismatch: fails inside a method-type comparison.
    let result = run(&mut checker, ty("Strict"), ty("Animal"));
    let failure = result.as_failure().expect("expected a failure");
    let frames = failure.trace.frames();
    assert_eq!(frames.len(), 3);
    assert!(matches!(frames[0], Frame::Types { .. }));
    assert!(matches!(frames[1], Frame::Methods { .. }));
    assert!(matches!(frames[2], Frame::MethodTypes { .. }));
}

#[test]
fn failure_inside_a_method_check_keeps_outer_frames() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    // Fails in the contravariant parameter sub-check String <: Numeric; the
    // reported derivation must still start at the top-level relation.
    let result = run(
        &mut checker,
        ty("Integer"),
        Type::generic("Comparable", vec![ty("String")]),
    );
    let failure = result.as_failure().expect("expected a failure");
    match &failure.error {
        ErrorKind::MethodMissing { name } => assert_eq!(name.as_str(), "abs"),
        other => panic!("expected MethodMissing, got {other}"),
    }

    let frames = failure.trace.frames();
    assert_eq!(frames.len(), 4);
    assert_eq!(
        frames[0],
        Frame::Types {
            sub: ty("Integer"),
            sup: Type::generic("Comparable", vec![ty("String")]),
        }
    );
    assert!(matches!(frames[1], Frame::Methods { .. }));
    assert!(matches!(frames[2], Frame::MethodTypes { .. }));
    assert_eq!(
        frames[3],
        Frame::Types {
            sub: ty("String"),
            sup: ty("Numeric"),
        }
    );
}

#[test]
fn sub_union_requires_every_member() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    assert!(
        run(
            &mut checker,
            Type::union([ty("Integer"), ty("Numeric")]),
            ty("Numeric"),
        )
        .is_success()
    );

    let result = run(
        &mut checker,
        Type::union([ty("Integer"), ty("String")]),
        ty("Numeric"),
    );
    assert!(matches!(
        error_of(&result),
        ErrorKind::MethodMissing { .. }
    ));
}

#[test]
fn super_union_accepts_any_member() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    assert!(
        run(
            &mut checker,
            ty("Integer"),
            Type::union([ty("String"), ty("Numeric")]),
        )
        .is_success()
    );
    assert!(
        run(
            &mut checker,
            Type::union([ty("Integer"), ty("String")]),
            Type::union([ty("Numeric"), ty("String")]),
        )
        .is_success()
    );
    assert!(
        run(
            &mut checker,
            ty("Animal"),
            Type::union([ty("String"), ty("Numeric")]),
        )
        .is_failure()
    );
}

#[test]
fn sub_intersection_needs_one_member() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    assert!(
        run(
            &mut checker,
            Type::intersection([ty("Integer"), ty("String")]),
            ty("Numeric"),
        )
        .is_success()
    );
    assert!(
        run(
            &mut checker,
            Type::intersection([ty("String"), ty("Animal")]),
            ty("Numeric"),
        )
        .is_failure()
    );
}

#[test]
fn super_intersection_needs_every_member() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    assert!(
        run(
            &mut checker,
            ty("Integer"),
            Type::intersection([ty("Numeric"), ty("Integer")]),
        )
        .is_success()
    );
    assert!(
        run(
            &mut checker,
            ty("String"),
            Type::intersection([ty("Numeric"), ty("String")]),
        )
        .is_failure()
    );
}

#[test]
fn super_variable_records_a_lower_bound() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);
    let a = Symbol::new("A");
    let mut constraints = Constraints::with_domain([a.clone()]);

    let result = checker.check(
        &Relation::new(ty("Integer"), Type::Var(a.clone())),
        &mut constraints,
        &mut AssumptionSet::default(),
        &mut Trace::new(),
    );
    assert!(result.is_success());
    assert_eq!(constraints.lower_bounds(&a), &[ty("Integer")]);
    assert!(constraints.upper_bounds(&a).is_empty());
}

#[test]
fn sub_variable_records_an_upper_bound() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);
    let a = Symbol::new("A");
    let mut constraints = Constraints::with_domain([a.clone()]);

    let result = checker.check(
        &Relation::new(Type::Var(a.clone()), ty("Numeric")),
        &mut constraints,
        &mut AssumptionSet::default(),
        &mut Trace::new(),
    );
    assert!(result.is_success());
    assert_eq!(constraints.upper_bounds(&a), &[ty("Numeric")]);
    assert!(constraints.lower_bounds(&a).is_empty());
}

#[test]
fn out_of_domain_variable_is_an_unknown_pair() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    let result = run(&mut checker, ty("Integer"), Type::var("A"));
    assert!(matches!(error_of(&result), ErrorKind::UnknownPair { .. }));

    let result = run(&mut checker, Type::var("A"), ty("Integer"));
    assert!(matches!(error_of(&result), ErrorKind::UnknownPair { .. }));
}

#[test]
fn matching_name_pins_an_open_generic_argument() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);
    let a = Symbol::new("A");
    let mut constraints = Constraints::with_domain([a.clone()]);

    let result = checker.check(
        &Relation::new(
            Type::generic("Comparable", vec![Type::Var(a.clone())]),
            Type::generic("Comparable", vec![ty("Integer")]),
        ),
        &mut constraints,
        &mut AssumptionSet::default(),
        &mut Trace::new(),
    );
    assert!(result.is_success());
    assert_eq!(constraints.lower_bounds(&a), &[ty("Integer")]);
    assert_eq!(constraints.upper_bounds(&a), &[ty("Integer")]);
}

#[test]
fn ground_generic_arguments_are_invariant() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    // Integer <: Numeric, but the argument position does not covary.
    let result = run(
        &mut checker,
        Type::generic("Comparable", vec![ty("Integer")]),
        Type::generic("Comparable", vec![ty("Numeric")]),
    );
    assert!(matches!(error_of(&result), ErrorKind::UnknownPair { .. }));
}

#[test]
fn nominal_against_generic_interface() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    // Integer#cmp takes Numeric, so any Comparable up to Numeric is honored.
    assert!(
        run(
            &mut checker,
            ty("Integer"),
            Type::generic("Comparable", vec![ty("Integer")]),
        )
        .is_success()
    );
    assert!(
        run(
            &mut checker,
            ty("Integer"),
            Type::generic("Comparable", vec![ty("Numeric")]),
        )
        .is_success()
    );
    assert!(
        run(
            &mut checker,
            ty("Integer"),
            Type::generic("Comparable", vec![ty("String")]),
        )
        .is_failure()
    );
}

#[test]
fn recursive_shapes_close_coinductively() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    // Left#step: () -> Left and Right#step: () -> Right are bisimilar, so
    // the check terminates (and holds) instead of chasing the cycle.
    assert!(run(&mut checker, ty("Left"), ty("Right")).is_success());
    assert!(run(&mut checker, ty("Right"), ty("Left")).is_success());
    assert!(run(&mut checker, ty("Left"), ty("Numeric")).is_failure());
}

#[test]
#[should_panic(expected = "depth limit")]
fn deep_union_nesting_hits_the_depth_guard() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    // Member recursion stays inside check0 and never pushes trace frames,
    // so the guard must count it explicitly instead of overflowing the
    // stack.
    let mut nested = ty("Integer");
    for _ in 0..(MAX_CHECK_DEPTH * 2) {
        nested = Type::union([nested]);
    }
    let _ = run(&mut checker, nested, ty("Numeric"));
}

#[test]
fn ground_results_are_cached_and_reused() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);
    assert_eq!(checker.cache_size(), 0);

    let first = run(&mut checker, ty("Integer"), ty("Numeric"));
    assert!(first.is_success());
    let cached_after_first = checker.cache_size();
    assert!(cached_after_first > 0);

    let second = run(&mut checker, ty("Integer"), ty("Numeric"));
    assert!(second.is_success());
    assert_eq!(checker.cache_size(), cached_after_first);
}

#[test]
fn cached_failures_replay_identically() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    let first = run(&mut checker, ty("String"), ty("Numeric"));
    let second = run(&mut checker, ty("String"), ty("Numeric"));
    assert_eq!(first, second);
}

#[test]
fn variable_relations_are_not_cached() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);
    let a = Symbol::new("A");
    let mut constraints = Constraints::with_domain([a.clone()]);

    let result = checker.check(
        &Relation::new(ty("Integer"), Type::Var(a)),
        &mut constraints,
        &mut AssumptionSet::default(),
        &mut Trace::new(),
    );
    assert!(result.is_success());
    assert_eq!(checker.cache_size(), 0);
}

#[test]
fn holds_is_a_fresh_boolean_entry_point() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);
    assert!(checker.holds(&ty("Dog"), &ty("Animal")));
    assert!(!checker.holds(&ty("Animal"), &ty("Dog")));
}
