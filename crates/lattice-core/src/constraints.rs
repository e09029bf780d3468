//! Per-variable bound accumulation.
//!
//! A `Constraints` value is supplied by the caller of a subtype check and
//! mutated in place across the many recursive sub-checks of one top-level
//! invocation: later branches see the bounds earlier branches recorded. A
//! separate inference pass solves the accumulated bounds into concrete types;
//! this crate only records them.
//!
//! Callers running concurrent top-level checks must supply distinct
//! `Constraints` instances.

use crate::symbol::Symbol;
use crate::types::Type;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Lower/upper bound accumulator for a set of open type variables.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Constraints {
    domain: FxHashSet<Symbol>,
    lower: FxHashMap<Symbol, Vec<Type>>,
    upper: FxHashMap<Symbol, Vec<Type>>,
}

impl Constraints {
    /// A store with no open variables. Checks against an empty store are
    /// context-free and therefore cacheable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A store whose listed variables are open for bound recording.
    pub fn with_domain(vars: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            domain: vars.into_iter().collect(),
            lower: FxHashMap::default(),
            upper: FxHashMap::default(),
        }
    }

    /// `true` when no variables are open for solving.
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    pub fn domain_contains(&self, name: &Symbol) -> bool {
        self.domain.contains(name)
    }

    /// Records `ty <: name`.
    pub fn add_lower(&mut self, name: &Symbol, ty: Type) {
        debug_assert!(self.domain.contains(name), "{name} is not an open variable");
        self.lower.entry(name.clone()).or_default().push(ty);
    }

    /// Records `name <: ty`.
    pub fn add_upper(&mut self, name: &Symbol, ty: Type) {
        debug_assert!(self.domain.contains(name), "{name} is not an open variable");
        self.upper.entry(name.clone()).or_default().push(ty);
    }

    /// Records `ty` as both a lower and an upper bound of `name`, pinning the
    /// variable. Used by the matching-name generic-argument rule.
    pub fn add_equal(&mut self, name: &Symbol, ty: Type) {
        self.add_lower(name, ty.clone());
        self.add_upper(name, ty);
    }

    /// Bounds recorded so far, in recording order.
    pub fn lower_bounds(&self, name: &Symbol) -> &[Type] {
        self.lower.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn upper_bounds(&self, name: &Symbol) -> &[Type] {
        self.upper.get(name).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_has_empty_domain() {
        assert!(Constraints::empty().is_empty());
        assert!(!Constraints::with_domain([Symbol::new("A")]).is_empty());
    }

    #[test]
    fn bounds_accumulate_in_order() {
        let a = Symbol::new("A");
        let mut constraints = Constraints::with_domain([a.clone()]);
        constraints.add_lower(&a, Type::name("Integer"));
        constraints.add_lower(&a, Type::name("Float"));
        assert_eq!(
            constraints.lower_bounds(&a),
            &[Type::name("Integer"), Type::name("Float")]
        );
        assert!(constraints.upper_bounds(&a).is_empty());
    }

    #[test]
    fn add_equal_records_both_directions() {
        let a = Symbol::new("A");
        let mut constraints = Constraints::with_domain([a.clone()]);
        constraints.add_equal(&a, Type::name("String"));
        assert_eq!(constraints.lower_bounds(&a), &[Type::name("String")]);
        assert_eq!(constraints.upper_bounds(&a), &[Type::name("String")]);
    }
}
