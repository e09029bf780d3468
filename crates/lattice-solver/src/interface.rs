//! The structural interface model: parameters, method signatures, and the
//! name-keyed method tables the resolver produces.
//!
//! Method tables use `IndexMap` so iteration follows declaration order; the
//! checking rules do not depend on table order, but diagnostics must be
//! reproducible, so evaluation order is fixed to insertion order throughout.

use bitflags::bitflags;
use indexmap::IndexMap;
use lattice_core::{Substitution, Symbol, Type};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Arity class of one flattened positional parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    Required,
    Optional,
}

/// The full parameter list of one method overload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub required: Vec<Type>,
    pub optional: Vec<Type>,
    pub rest: Option<Type>,
    pub required_keywords: IndexMap<Symbol, Type>,
    pub optional_keywords: IndexMap<Symbol, Type>,
    pub rest_keywords: Option<Type>,
}

impl Params {
    /// A parameter list with only required positionals.
    pub fn positional(required: Vec<Type>) -> Self {
        Self {
            required,
            ..Self::default()
        }
    }

    /// Required then optional positionals as one arity-tagged sequence.
    pub fn flat_positionals(&self) -> Vec<(ParamKind, Type)> {
        self.required
            .iter()
            .map(|ty| (ParamKind::Required, ty.clone()))
            .chain(
                self.optional
                    .iter()
                    .map(|ty| (ParamKind::Optional, ty.clone())),
            )
            .collect()
    }

    /// Required then optional keywords as one table.
    pub fn flat_keywords(&self) -> IndexMap<Symbol, Type> {
        self.required_keywords
            .iter()
            .chain(self.optional_keywords.iter())
            .map(|(name, ty)| (name.clone(), ty.clone()))
            .collect()
    }

    pub fn apply(&self, subst: &Substitution) -> Self {
        Self {
            required: self.required.iter().map(|ty| subst.apply(ty)).collect(),
            optional: self.optional.iter().map(|ty| subst.apply(ty)).collect(),
            rest: self.rest.as_ref().map(|ty| subst.apply(ty)),
            required_keywords: apply_keywords(&self.required_keywords, subst),
            optional_keywords: apply_keywords(&self.optional_keywords, subst),
            rest_keywords: self.rest_keywords.as_ref().map(|ty| subst.apply(ty)),
        }
    }

    fn collect_free_variables(&self, out: &mut BTreeSet<Symbol>) {
        for ty in self
            .required
            .iter()
            .chain(self.optional.iter())
            .chain(self.rest.iter())
            .chain(self.required_keywords.values())
            .chain(self.optional_keywords.values())
            .chain(self.rest_keywords.iter())
        {
            out.extend(ty.free_variables());
        }
    }
}

fn apply_keywords(keywords: &IndexMap<Symbol, Type>, subst: &Substitution) -> IndexMap<Symbol, Type> {
    keywords
        .iter()
        .map(|(name, ty)| (name.clone(), subst.apply(ty)))
        .collect()
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut sep = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            if first {
                first = false;
                Ok(())
            } else {
                f.write_str(", ")
            }
        };
        f.write_str("(")?;
        for ty in &self.required {
            sep(f)?;
            write!(f, "{ty}")?;
        }
        for ty in &self.optional {
            sep(f)?;
            write!(f, "?{ty}")?;
        }
        if let Some(rest) = &self.rest {
            sep(f)?;
            write!(f, "*{rest}")?;
        }
        for (name, ty) in &self.required_keywords {
            sep(f)?;
            write!(f, "{name}: {ty}")?;
        }
        for (name, ty) in &self.optional_keywords {
            sep(f)?;
            write!(f, "?{name}: {ty}")?;
        }
        if let Some(rest) = &self.rest_keywords {
            sep(f)?;
            write!(f, "**{rest}")?;
        }
        f.write_str(")")
    }
}

/// One concrete callable signature among possibly several declared for the
/// same method name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodType {
    /// Declared type parameters. Empty means monomorphic.
    pub type_params: Vec<Symbol>,
    pub params: Params,
    /// Signature required of a block the method yields to, if any.
    pub block: Option<Box<MethodType>>,
    pub return_type: Type,
}

impl MethodType {
    pub fn new(params: Params, return_type: Type) -> Self {
        Self {
            type_params: Vec::new(),
            params,
            block: None,
            return_type,
        }
    }

    pub fn is_polymorphic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Applies `subst` throughout the signature. Type parameters that were
    /// substituted away are removed from the binder; the rest stay declared.
    pub fn instantiate(&self, subst: &Substitution) -> Self {
        Self {
            type_params: self
                .type_params
                .iter()
                .filter(|param| subst.get(param).is_none())
                .cloned()
                .collect(),
            params: self.params.apply(subst),
            block: self
                .block
                .as_ref()
                .map(|block| Box::new(block.instantiate(subst))),
            return_type: subst.apply(&self.return_type),
        }
    }

    /// Free variables of the signature, excluding its own type parameters.
    pub fn free_variables(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_free_variables(&mut out);
        for param in &self.type_params {
            out.remove(param);
        }
        out
    }

    fn collect_free_variables(&self, out: &mut BTreeSet<Symbol>) {
        self.params.collect_free_variables(out);
        if let Some(block) = &self.block {
            block.collect_free_variables(out);
        }
        out.extend(self.return_type.free_variables());
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.type_params.is_empty() {
            f.write_str("[")?;
            for (i, param) in self.type_params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{param}")?;
            }
            f.write_str("] ")?;
        }
        write!(f, "{}", self.params)?;
        if let Some(block) = &self.block {
            write!(f, " {{ {} -> {} }}", block.params, block.return_type)?;
        }
        write!(f, " -> {}", self.return_type)
    }
}

bitflags! {
    /// Attributes attached to a method by the signature builder.
    ///
    /// The checker never branches on these; they ride along for downstream
    /// diagnostics.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MethodFlags: u8 {
        /// The method overrides its super method with an incompatible signature.
        const INCOMPATIBLE = 1 << 0;
        /// The method is not callable from outside the receiver.
        const PRIVATE = 1 << 1;
    }
}

// bitflags generates no serde impls; flags travel as their raw bits.
impl Serialize for MethodFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for MethodFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_bits_truncate(u8::deserialize(deserializer)?))
    }
}

/// A named method: an ordered overload list plus builder-supplied metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: Symbol,
    /// Overloads in declaration order. Evaluation order of overload checks
    /// follows this order.
    pub types: Vec<MethodType>,
    /// The method this one overrides, when the builder knows it.
    pub super_method: Option<Box<Method>>,
    pub flags: MethodFlags,
}

impl Method {
    pub fn new(name: impl AsRef<str>, types: Vec<MethodType>) -> Self {
        Self {
            name: Symbol::new(name),
            types,
            super_method: None,
            flags: MethodFlags::empty(),
        }
    }

    pub fn instantiate(&self, subst: &Substitution) -> Self {
        Self {
            name: self.name.clone(),
            types: self
                .types
                .iter()
                .map(|method_type| method_type.instantiate(subst))
                .collect(),
            super_method: self
                .super_method
                .as_ref()
                .map(|method| Box::new(method.instantiate(subst))),
            flags: self.flags,
        }
    }
}

/// The resolved structural surface of a type at a point of use.
///
/// Immutable once built; rebuilt per resolution, since the self/instance/
/// module bindings differ between points of use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instantiated {
    /// The type this interface was resolved from.
    pub ty: Type,
    pub methods: IndexMap<Symbol, Method>,
}

impl Instantiated {
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }
}
