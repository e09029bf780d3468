//! Variable substitution over types.

use crate::symbol::Symbol;
use crate::types::Type;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A map from type-variable names to replacement types.
///
/// Used to bind fresh variables during polymorphic-overload instantiation and
/// to propagate solved generic-argument equalities.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Substitution {
    map: FxHashMap<Symbol, Type>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs each name in `params` with the corresponding entry of `args`.
    /// Extra entries on either side are ignored.
    pub fn from_pairs(params: &[Symbol], args: &[Type]) -> Self {
        let mut subst = Self::new();
        for (param, arg) in params.iter().zip(args.iter()) {
            subst.insert(param.clone(), arg.clone());
        }
        subst
    }

    pub fn insert(&mut self, name: Symbol, ty: Type) {
        self.map.insert(name, ty);
    }

    pub fn get(&self, name: &Symbol) -> Option<&Type> {
        self.map.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Replaces every `Var` bound by this substitution, rebuilding composite
    /// types as needed. Unbound variables pass through unchanged.
    pub fn apply(&self, ty: &Type) -> Type {
        if self.map.is_empty() {
            return ty.clone();
        }
        match ty {
            Type::Any | Type::Class(_) | Type::Instance(_) => ty.clone(),
            Type::Var(name) => match self.map.get(name) {
                Some(replacement) => replacement.clone(),
                None => ty.clone(),
            },
            Type::Name { name, args } => Type::Name {
                name: name.clone(),
                args: args.iter().map(|arg| self.apply(arg)).collect(),
            },
            Type::Union(members) => {
                Type::Union(members.iter().map(|member| self.apply(member)).collect())
            }
            Type::Intersection(members) => {
                Type::Intersection(members.iter().map(|member| self.apply(member)).collect())
            }
        }
    }
}
