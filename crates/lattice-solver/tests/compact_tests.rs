//! Reducing candidate sets to a minimal antichain of most-general types.

use crate::check::Checker;
use crate::test_support::*;
use lattice_core::Type;

#[test]
fn singletons_and_duplicates() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    assert_eq!(checker.compact(&[ty("Integer")]), vec![ty("Integer")]);
    assert_eq!(
        checker.compact(&[ty("Integer"), ty("Integer")]),
        vec![ty("Integer")]
    );
    assert_eq!(checker.compact(&[]), Vec::<Type>::new());
}

#[test]
fn any_is_dropped_unless_it_is_all_there_is() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    assert_eq!(
        checker.compact(&[Type::Any, ty("Integer")]),
        vec![ty("Integer")]
    );
    assert_eq!(checker.compact(&[Type::Any]), vec![Type::Any]);
    assert_eq!(checker.compact(&[Type::Any, Type::Any]), vec![Type::Any]);
}

#[test]
fn subsumed_candidates_collapse_into_their_supertype() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    assert_eq!(
        checker.compact(&[ty("Integer"), ty("Numeric"), ty("String")]),
        vec![ty("Numeric"), ty("String")]
    );
}

#[test]
fn a_later_supertype_evicts_earlier_subtypes() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    assert_eq!(
        checker.compact(&[ty("Integer"), ty("Numeric")]),
        vec![ty("Numeric")]
    );
    // Order of survivors follows first appearance of each representative.
    assert_eq!(
        checker.compact(&[ty("String"), ty("Integer"), ty("Numeric")]),
        vec![ty("String"), ty("Numeric")]
    );
}

#[test]
fn unrelated_candidates_all_survive() {
    let builder = standard_builder();
    let mut checker = Checker::new(&builder);

    assert_eq!(
        checker.compact(&[ty("Dog"), ty("String")]),
        vec![ty("Dog"), ty("String")]
    );
}
