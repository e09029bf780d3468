//! Method and parameter compatibility.
//!
//! `check_interface` walks the super interface's method table; each matched
//! method pair goes through the ∀-super/∃-sub overload rule: a caller may
//! invoke the super method through any declared overload, so every super
//! overload must be honored by at least one sub overload.
//!
//! Per signature pair, parameters are contravariant (sub/super roles swap),
//! return types covariant, and a block's parameters and return type are both
//! consumed by the method and so both check contravariantly.

use crate::builder::SignatureBuilder;
use crate::check::{AssumptionSet, Checker};
use crate::interface::{Instantiated, Method, MethodType, ParamKind, Params};
use crate::result::{CheckResult, ErrorKind};
use crate::trace::{Frame, Trace};
use lattice_core::{Constraints, Relation, Substitution, Symbol, Type};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Parameter-type pairs produced by `match_params`, `(sub, super)` per entry.
type TypePairs = SmallVec<[(Type, Type); 8]>;

impl<'a, B: SignatureBuilder> Checker<'a, B> {
    /// Every method the super interface declares must exist in the sub
    /// interface with a compatible signature. The first mismatch governs.
    pub(crate) fn check_interface(
        &mut self,
        sub_interface: &Instantiated,
        super_interface: &Instantiated,
        constraints: &mut Constraints,
        assumption: &mut AssumptionSet,
        trace: &mut Trace,
    ) -> CheckResult {
        let mut method_pairs = Vec::new();
        for (name, super_method) in &super_interface.methods {
            match sub_interface.methods.get(name) {
                Some(sub_method) => method_pairs.push((sub_method, super_method)),
                None => {
                    return CheckResult::failure(
                        ErrorKind::MethodMissing { name: name.clone() },
                        trace,
                    );
                }
            }
        }

        for (sub_method, super_method) in method_pairs {
            let name = sub_method.name.clone();
            let result =
                self.check_method(&name, sub_method, super_method, constraints, assumption, trace);
            if result.is_failure() {
                return result;
            }
        }
        CheckResult::Success
    }

    /// ∀-super/∃-sub overload matching.
    pub(crate) fn check_method(
        &mut self,
        name: &Symbol,
        sub_method: &Method,
        super_method: &Method,
        constraints: &mut Constraints,
        assumption: &mut AssumptionSet,
        trace: &mut Trace,
    ) -> CheckResult {
        let frame = Frame::Methods {
            sub: sub_method.clone(),
            sup: super_method.clone(),
        };
        trace.scoped(frame, |trace| {
            for super_type in &super_method.types {
                let mut first_failure = None;
                let mut satisfied = false;

                for sub_type in &sub_method.types {
                    let frame = Frame::MethodTypes {
                        sub: sub_type.clone(),
                        sup: super_type.clone(),
                    };
                    let result = trace.scoped(frame, |trace| {
                        self.check_overload(name, sub_type, super_type, constraints, assumption, trace)
                    });
                    if result.is_success() {
                        satisfied = true;
                        break;
                    }
                    if first_failure.is_none() {
                        first_failure = Some(result);
                    }
                }

                if !satisfied {
                    return first_failure.unwrap_or_else(|| {
                        CheckResult::failure(
                            ErrorKind::ParameterMismatch { name: name.clone() },
                            trace,
                        )
                    });
                }
            }
            CheckResult::Success
        })
    }

    /// One candidate overload pair, dispatched on type-parameter arities.
    fn check_overload(
        &mut self,
        name: &Symbol,
        sub_type: &MethodType,
        super_type: &MethodType,
        constraints: &mut Constraints,
        assumption: &mut AssumptionSet,
        trace: &mut Trace,
    ) -> CheckResult {
        if super_type.type_params.is_empty() && sub_type.type_params.is_empty() {
            return self.check_method_type(name, sub_type, super_type, constraints, assumption, trace);
        }

        if super_type.type_params.is_empty() {
            return self.check_poly_against_mono(
                name, sub_type, super_type, constraints, assumption, trace,
            );
        }

        if super_type.type_params.len() == sub_type.type_params.len() {
            // Consistent renaming: both binders get the same fresh variables.
            let fresh: Vec<Type> = sub_type
                .type_params
                .iter()
                .map(|param| Type::Var(Symbol::fresh(param.as_str())))
                .collect();
            let sub_instantiated =
                sub_type.instantiate(&Substitution::from_pairs(&sub_type.type_params, &fresh));
            let super_instantiated =
                super_type.instantiate(&Substitution::from_pairs(&super_type.type_params, &fresh));
            return self.check_method_type(
                name,
                &sub_instantiated,
                &super_instantiated,
                constraints,
                assumption,
                trace,
            );
        }

        CheckResult::failure(ErrorKind::PolyMethodSubtyping { name: name.clone() }, trace)
    }

    /// Polymorphic sub overload against a monomorphic super overload:
    /// instantiate the sub binder with fresh variables, unify them
    /// positionally against the super signature, and check the substituted
    /// signature directly.
    fn check_poly_against_mono(
        &mut self,
        name: &Symbol,
        sub_type: &MethodType,
        super_type: &MethodType,
        constraints: &mut Constraints,
        assumption: &mut AssumptionSet,
        trace: &mut Trace,
    ) -> CheckResult {
        let fresh_names: Vec<Symbol> = sub_type
            .type_params
            .iter()
            .map(|param| Symbol::fresh(param.as_str()))
            .collect();
        let fresh_args: Vec<Type> = fresh_names.iter().cloned().map(Type::Var).collect();
        let sub_instantiated =
            sub_type.instantiate(&Substitution::from_pairs(&sub_type.type_params, &fresh_args));

        let pairs = match match_method_type(name, &sub_instantiated, super_type, trace) {
            Ok(pairs) => pairs,
            Err(failure) => return failure,
        };

        let fresh_set: FxHashSet<&Symbol> = fresh_names.iter().collect();
        let mut unifier = Substitution::new();
        for (sub_side, super_side) in &pairs {
            match (sub_side, super_side) {
                (Type::Var(var), other) if fresh_set.contains(var) => {
                    unifier.insert(var.clone(), other.clone());
                }
                (other, Type::Var(var)) if fresh_set.contains(var) => {
                    unifier.insert(var.clone(), other.clone());
                }
                _ => {}
            }
        }

        self.check_method_type(
            name,
            &sub_instantiated.instantiate(&unifier),
            super_type,
            constraints,
            assumption,
            trace,
        )
    }

    /// Signature compatibility: a conjunction that short-circuits on the
    /// first failure.
    pub(crate) fn check_method_type(
        &mut self,
        name: &Symbol,
        sub_type: &MethodType,
        super_type: &MethodType,
        constraints: &mut Constraints,
        assumption: &mut AssumptionSet,
        trace: &mut Trace,
    ) -> CheckResult {
        // 1. Parameters: contravariant.
        let result = self.check_method_params(
            name,
            &sub_type.params,
            &super_type.params,
            constraints,
            assumption,
            trace,
        );
        if result.is_failure() {
            return result;
        }

        // 2. Block presence: both or neither.
        match (&sub_type.block, &super_type.block) {
            (None, None) => {}
            (Some(sub_block), Some(super_block)) => {
                // 3. Block parameters: roles pre-swapped, so the caller's
                // block (typed by the super signature) accepts whatever the
                // sub method yields.
                let result = self.check_method_params(
                    name,
                    &super_block.params,
                    &sub_block.params,
                    constraints,
                    assumption,
                    trace,
                );
                if result.is_failure() {
                    return result;
                }

                // 4. Block return: flows back into the method, so it is
                // consumed contravariantly like a parameter.
                let result = self.check(
                    &Relation::new(
                        super_block.return_type.clone(),
                        sub_block.return_type.clone(),
                    ),
                    constraints,
                    assumption,
                    trace,
                );
                if result.is_failure() {
                    return result;
                }
            }
            _ => {
                return CheckResult::failure(
                    ErrorKind::BlockMismatch { name: name.clone() },
                    trace,
                );
            }
        }

        // 5. Return type: covariant.
        self.check(
            &Relation::new(sub_type.return_type.clone(), super_type.return_type.clone()),
            constraints,
            assumption,
            trace,
        )
    }

    /// Pairs the two parameter lists and checks each pair with sub/super
    /// roles swapped.
    fn check_method_params(
        &mut self,
        name: &Symbol,
        sub_params: &Params,
        super_params: &Params,
        constraints: &mut Constraints,
        assumption: &mut AssumptionSet,
        trace: &mut Trace,
    ) -> CheckResult {
        let pairs = match match_params(name, sub_params, super_params, trace) {
            Ok(pairs) => pairs,
            Err(failure) => return failure,
        };

        for (sub_param, super_param) in pairs {
            let result = self.check(
                &Relation::new(super_param, sub_param),
                constraints,
                assumption,
                trace,
            );
            if result.is_failure() {
                return result;
            }
        }
        CheckResult::Success
    }
}

/// Best-effort positional unification of two whole signatures: parameter
/// pairs, the return-type pair, and block pairs when both declare a block.
/// Produces the pair list the fresh-variable unifier scans.
fn match_method_type(
    name: &Symbol,
    sub_type: &MethodType,
    super_type: &MethodType,
    trace: &Trace,
) -> Result<TypePairs, CheckResult> {
    let mut pairs = match_params(name, &sub_type.params, &super_type.params, trace)?;
    pairs.push((sub_type.return_type.clone(), super_type.return_type.clone()));

    match (&sub_type.block, &super_type.block) {
        (None, None) => {}
        (Some(sub_block), Some(super_block)) => {
            pairs.extend(match_params(
                name,
                &super_block.params,
                &sub_block.params,
                trace,
            )?);
            pairs.push((
                super_block.return_type.clone(),
                sub_block.return_type.clone(),
            ));
        }
        _ => {
            return Err(CheckResult::failure(
                ErrorKind::BlockMismatch { name: name.clone() },
                trace,
            ));
        }
    }

    Ok(pairs)
}

/// Pairs positional and keyword parameters, or fails immediately when no
/// compatible pairing exists. Entries are `(sub, super)`; the caller applies
/// the contravariant swap.
fn match_params(
    name: &Symbol,
    sub_params: &Params,
    super_params: &Params,
    trace: &Trace,
) -> Result<TypePairs, CheckResult> {
    let mismatch =
        || CheckResult::failure(ErrorKind::ParameterMismatch { name: name.clone() }, trace);

    let mut pairs = TypePairs::new();
    let mut sub_flat: VecDeque<(ParamKind, Type)> = sub_params.flat_positionals().into();
    let mut super_flat: VecDeque<(ParamKind, Type)> = super_params.flat_positionals().into();

    if let Some(super_rest) = &super_params.rest {
        // A super rest can absorb arbitrarily many arguments, so the sub
        // side must declare a rest of its own.
        let Some(sub_rest) = &sub_params.rest else {
            return Err(mismatch());
        };
        while let Some((_, sub_ty)) = sub_flat.pop_front() {
            match super_flat.pop_front() {
                Some((_, super_ty)) => pairs.push((sub_ty, super_ty)),
                None => pairs.push((sub_ty, super_rest.clone())),
            }
        }
        while let Some((_, super_ty)) = super_flat.pop_front() {
            pairs.push((sub_rest.clone(), super_ty));
        }
        pairs.push((sub_rest.clone(), super_rest.clone()));
    } else if let Some(sub_rest) = &sub_params.rest {
        // Extra sub parameters beyond the super arity are harmless; super
        // slots beyond the sub's finite arity land on the sub rest.
        loop {
            match (sub_flat.pop_front(), super_flat.pop_front()) {
                (Some((_, sub_ty)), Some((_, super_ty))) => pairs.push((sub_ty, super_ty)),
                (None, Some((_, super_ty))) => pairs.push((sub_rest.clone(), super_ty)),
                (_, None) => break,
            }
        }
    } else if sub_flat.len() >= super_flat.len() {
        while let Some((sub_kind, sub_ty)) = sub_flat.pop_front() {
            match super_flat.pop_front() {
                Some((_, super_ty)) => pairs.push((sub_ty, super_ty)),
                // A required sub parameter the super contract never
                // guarantees callers will supply.
                None if sub_kind == ParamKind::Required => return Err(mismatch()),
                None => break,
            }
        }
    } else {
        return Err(mismatch());
    }

    let sub_keywords = sub_params.flat_keywords();
    let super_keywords = super_params.flat_keywords();

    for (keyword, super_ty) in &super_keywords {
        if let Some(sub_ty) = sub_keywords.get(keyword) {
            pairs.push((sub_ty.clone(), super_ty.clone()));
        } else if let Some(sub_rest_keywords) = &sub_params.rest_keywords {
            pairs.push((sub_rest_keywords.clone(), super_ty.clone()));
        } else {
            return Err(mismatch());
        }
    }

    // A sub method cannot impose a mandatory keyword the super contract
    // does not guarantee callers will supply.
    for keyword in sub_params.required_keywords.keys() {
        if !super_params.required_keywords.contains_key(keyword) {
            return Err(mismatch());
        }
    }

    if let (Some(sub_rest_keywords), Some(super_rest_keywords)) =
        (&sub_params.rest_keywords, &super_params.rest_keywords)
    {
        pairs.push((sub_rest_keywords.clone(), super_rest_keywords.clone()));
    }

    Ok(pairs)
}
