//! Top-level coinductive decision procedure.
//!
//! `Checker::check` decides `sub <: super` by recursive descent over the two
//! type expressions. Three mechanisms keep it terminating and fast:
//!
//! - **Coinductive assumption set**: relations currently being proved. When a
//!   recursive nominal structure leads back to an in-flight relation, the
//!   re-encountered obligation counts as already proved.
//! - **Ground-relation cache**: results for relations with no free variables
//!   are reused across top-level calls. Variable-containing relations depend
//!   on caller-supplied bounds and are never cached.
//! - **Depth guard**: pathological nesting (deeply nested unions and
//!   intersections) is cut off before it can overflow the stack.
//!
//! The assumption set and trace are call-stack-local: created fresh per
//! top-level invocation and threaded through recursive calls. A `Checker` is
//! single-threaded; concurrent checks need separate instances or external
//! locking, and separate `Constraints` stores.

use crate::builder::SignatureBuilder;
use crate::result::{CheckResult, ErrorKind};
use crate::trace::{Frame, Trace};
use lattice_core::{Constraints, Relation, Substitution, Type};
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use tracing::{debug, trace, trace_span};

/// Relations currently being proved on this call chain.
pub type AssumptionSet = FxHashSet<Relation>;

/// Maximum judgement depth before a check is considered pathological.
///
/// Well-formed inputs stay far below this: recursion is bounded by the
/// structural depth of the two types plus coinductive cycles, which the
/// assumption set cuts.
pub const MAX_CHECK_DEPTH: usize = 100;

/// The subtyping checker. Owns the ground-relation result cache for its
/// entire lifetime; the cache only grows.
pub struct Checker<'a, B: SignatureBuilder> {
    builder: &'a B,
    cache: FxHashMap<Relation, CheckResult>,
}

impl<'a, B: SignatureBuilder> Checker<'a, B> {
    pub fn new(builder: &'a B) -> Self {
        Self {
            builder,
            cache: FxHashMap::default(),
        }
    }

    pub fn builder(&self) -> &B {
        self.builder
    }

    /// Number of cached ground relations.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Decides `relation`, recording any inferred variable bounds into
    /// `constraints`.
    ///
    /// `assumption` and `trace` are threaded through recursive calls; a
    /// top-level caller passes fresh values (see [`Checker::holds`]).
    pub fn check(
        &mut self,
        relation: &Relation,
        constraints: &mut Constraints,
        assumption: &mut AssumptionSet,
        trace: &mut Trace,
    ) -> CheckResult {
        let _span = trace_span!("check", relation = %relation).entered();
        let prefix = trace.size();

        // Cached results are only valid when no variables are open: success
        // under open variables is contextual.
        if constraints.is_empty() {
            if let Some(cached) = self.cache.get(relation) {
                debug!(relation = %relation, "cache hit");
                return match cached {
                    CheckResult::Success => CheckResult::Success,
                    CheckResult::Failure(failure) => {
                        CheckResult::Failure(failure.merged_onto(trace))
                    }
                };
            }
        }

        if assumption.contains(relation) {
            trace!(relation = %relation, "assumed; closing coinductive cycle");
            return CheckResult::Success;
        }

        assumption.insert(relation.clone());
        let result = trace.scoped(
            Frame::Types {
                sub: relation.sub_type.clone(),
                sup: relation.super_type.clone(),
            },
            |trace| {
                let depth = trace.size();
                self.check0(relation, constraints, assumption, trace, depth)
            },
        );
        assumption.remove(relation);

        debug!(relation = %relation, success = result.is_success(), "checked");

        if relation.is_ground() {
            // The cached copy keeps only this relation's own frames; serving
            // it later re-attaches the new caller's frames via `merged_onto`.
            self.cache
                .insert(relation.clone(), result.clone().dropped_prefix(prefix));
        }
        result
    }

    /// Convenience entry point: fresh assumption set and trace, discarding
    /// the derivation. Used internally by `compact` and interface resolution.
    pub fn holds(&mut self, sub: &Type, sup: &Type) -> bool {
        self.check(
            &Relation::new(sub.clone(), sup.clone()),
            &mut Constraints::empty(),
            &mut AssumptionSet::default(),
            &mut Trace::new(),
        )
        .is_success()
    }

    /// Shape dispatch, in priority order. Union/intersection branches recurse
    /// through `check0` directly so they share this relation's assumption
    /// frame instead of opening their own cache entries; `depth` counts those
    /// frameless recursions too, so the guard fires on pathological nesting
    /// the trace alone would not see.
    fn check0(
        &mut self,
        relation: &Relation,
        constraints: &mut Constraints,
        assumption: &mut AssumptionSet,
        trace: &mut Trace,
        depth: usize,
    ) -> CheckResult {
        assert!(
            depth < MAX_CHECK_DEPTH,
            "subtype check exceeded depth limit ({MAX_CHECK_DEPTH}): {relation}"
        );

        let sub = &relation.sub_type;
        let sup = &relation.super_type;

        if self.same_type(relation, assumption) {
            return CheckResult::Success;
        }

        if sub.is_any() || sup.is_any() {
            return CheckResult::Success;
        }

        if let Type::Var(name) = sup {
            return if constraints.domain_contains(name) {
                constraints.add_lower(name, sub.clone());
                CheckResult::Success
            } else {
                CheckResult::failure(
                    ErrorKind::UnknownPair {
                        relation: relation.clone(),
                    },
                    trace,
                )
            };
        }

        if let Type::Var(name) = sub {
            return if constraints.domain_contains(name) {
                constraints.add_upper(name, sup.clone());
                CheckResult::Success
            } else {
                CheckResult::failure(
                    ErrorKind::UnknownPair {
                        relation: relation.clone(),
                    },
                    trace,
                )
            };
        }

        if let Type::Union(members) = sub {
            // A union value could be any branch, so every branch must qualify.
            for member in members {
                let result = self.check0(
                    &Relation::new(member.clone(), sup.clone()),
                    constraints,
                    assumption,
                    trace,
                    depth + 1,
                );
                if result.is_failure() {
                    return result;
                }
            }
            return CheckResult::Success;
        }

        if let Type::Union(members) = sup {
            return self.check_any_member(
                members.iter().map(|member| Relation::new(sub.clone(), member.clone())),
                relation,
                constraints,
                assumption,
                trace,
                depth,
            );
        }

        if let Type::Intersection(members) = sub {
            // An intersection value satisfies all facets at once, so matching
            // any one of them suffices.
            return self.check_any_member(
                members.iter().map(|member| Relation::new(member.clone(), sup.clone())),
                relation,
                constraints,
                assumption,
                trace,
                depth,
            );
        }

        if let Type::Intersection(members) = sup {
            for member in members {
                let result = self.check0(
                    &Relation::new(sub.clone(), member.clone()),
                    constraints,
                    assumption,
                    trace,
                    depth + 1,
                );
                if result.is_failure() {
                    return result;
                }
            }
            return CheckResult::Success;
        }

        if let (
            Type::Name {
                name: sub_name,
                args: sub_args,
            },
            Type::Name {
                name: sup_name,
                args: sup_args,
            },
        ) = (sub, sup)
        {
            if sub_name == sup_name {
                return self.check_same_name_args(
                    relation, sub_args, sup_args, constraints, assumption, trace, depth,
                );
            }
            let sub_interface = self.resolve(sub);
            let super_interface = self.resolve(sup);
            return self.check_interface(
                &sub_interface,
                &super_interface,
                constraints,
                assumption,
                trace,
            );
        }

        CheckResult::failure(
            ErrorKind::UnknownPair {
                relation: relation.clone(),
            },
            trace,
        )
    }

    /// Existential rule shared by super-union and sub-intersection: the first
    /// succeeding branch wins; otherwise the first failure governs.
    fn check_any_member(
        &mut self,
        branches: impl Iterator<Item = Relation>,
        relation: &Relation,
        constraints: &mut Constraints,
        assumption: &mut AssumptionSet,
        trace: &mut Trace,
        depth: usize,
    ) -> CheckResult {
        let mut first_failure = None;
        for branch in branches {
            let result = self.check0(&branch, constraints, assumption, trace, depth + 1);
            if result.is_success() {
                return result;
            }
            if first_failure.is_none() {
                first_failure = Some(result);
            }
        }
        first_failure.unwrap_or_else(|| {
            CheckResult::failure(
                ErrorKind::UnknownPair {
                    relation: relation.clone(),
                },
                trace,
            )
        })
    }

    /// Matching nominal names: any generic argument that is still an open
    /// variable is pinned to the opposite side (equality in both directions),
    /// and the check re-runs under the resulting substitution. Generic
    /// positions are invariant while unresolved.
    fn check_same_name_args(
        &mut self,
        relation: &Relation,
        sub_args: &[Type],
        sup_args: &[Type],
        constraints: &mut Constraints,
        assumption: &mut AssumptionSet,
        trace: &mut Trace,
        depth: usize,
    ) -> CheckResult {
        let mut subst = Substitution::new();
        for (sub_arg, sup_arg) in sub_args.iter().zip(sup_args.iter()) {
            match (sub_arg, sup_arg) {
                (Type::Var(name), _) if constraints.domain_contains(name) => {
                    subst.insert(name.clone(), sup_arg.clone());
                    constraints.add_equal(name, sup_arg.clone());
                }
                (_, Type::Var(name)) if constraints.domain_contains(name) => {
                    subst.insert(name.clone(), sub_arg.clone());
                    constraints.add_equal(name, sub_arg.clone());
                }
                _ => {}
            }
        }

        if subst.is_empty() {
            // No open variable to bind: re-dispatching the identical relation
            // cannot make progress, so the pair is not reducible.
            return CheckResult::failure(
                ErrorKind::UnknownPair {
                    relation: relation.clone(),
                },
                trace,
            );
        }

        let narrowed = Relation::new(
            subst.apply(&relation.sub_type),
            subst.apply(&relation.super_type),
        );
        self.check0(&narrowed, constraints, assumption, trace, depth + 1)
    }

    /// Syntactic equality, extended with the coinductive rule (both
    /// directions in flight count as equal) and pointwise equality of
    /// same-name generic arguments.
    fn same_type(&self, relation: &Relation, assumption: &AssumptionSet) -> bool {
        if assumption.contains(relation) && assumption.contains(&relation.flip()) {
            return true;
        }

        if relation.sub_type == relation.super_type {
            return true;
        }

        if let (
            Type::Name {
                name: sub_name,
                args: sub_args,
            },
            Type::Name {
                name: sup_name,
                args: sup_args,
            },
        ) = (&relation.sub_type, &relation.super_type)
        {
            return sub_name == sup_name
                && sub_args.len() == sup_args.len()
                && sub_args.iter().zip(sup_args.iter()).all(|(sub, sup)| {
                    self.same_type(&Relation::new(sub.clone(), sup.clone()), assumption)
                });
        }

        false
    }

    /// Reduces a set of candidate types (e.g. merged from several branches of
    /// control flow) to a minimal antichain of most-general representatives.
    ///
    /// `Any` is dropped unless it would leave the set empty. A candidate is
    /// dropped when an earlier-kept candidate equals it or is its supertype;
    /// candidates it subsumes are evicted in turn.
    pub fn compact(&mut self, types: &[Type]) -> Vec<Type> {
        if types.is_empty() {
            return Vec::new();
        }
        let candidates: Vec<&Type> = types.iter().filter(|ty| !ty.is_any()).collect();
        if candidates.is_empty() {
            return vec![Type::Any];
        }

        let mut kept: Vec<Type> = Vec::new();
        'candidates: for candidate in candidates {
            for existing in &kept {
                if existing == candidate || self.holds(candidate, existing) {
                    continue 'candidates;
                }
            }
            let mut retained = Vec::with_capacity(kept.len() + 1);
            for existing in kept {
                if !self.holds(&existing, candidate) {
                    retained.push(existing);
                }
            }
            retained.push(candidate.clone());
            kept = retained;
        }
        kept
    }
}
