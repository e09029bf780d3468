//! The algebraic type grammar the subtyping engine operates on.
//!
//! `Type` is a closed tagged union, structurally comparable and hashable.
//! Values are immutable and constructed upstream (by a parser or signature
//! builder); the engine only reads, substitutes into, and pairs them.
//!
//! Union and intersection members live in `BTreeSet`s: sets because member
//! order carries no meaning, B-tree sets so iteration (and therefore the
//! evaluation order of generated sub-checks) is deterministic. Flattening of
//! nested unions/intersections is a construction-time concern upstream and is
//! never performed here.

use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A type expression.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Type {
    /// The gradual-typing escape hatch: compatible with everything on both
    /// sides of a relation.
    Any,

    /// A free type variable. Identity is by name.
    Var(Symbol),

    /// A nominal generic reference: a class, module, or user interface,
    /// possibly applied to type arguments.
    Name { name: Symbol, args: Vec<Type> },

    /// A value that could be any one of the members.
    Union(BTreeSet<Type>),

    /// A value that satisfies all of the members simultaneously.
    Intersection(BTreeSet<Type>),

    /// The singleton (class/module object) type of a nominal name.
    /// Opaque to the checker: it cannot be resolved to an interface.
    Class(Symbol),

    /// The instance type of a nominal name. Opaque to the checker.
    Instance(Symbol),
}

impl Type {
    /// A nominal reference without type arguments.
    pub fn name(name: impl AsRef<str>) -> Self {
        Self::Name {
            name: Symbol::new(name),
            args: Vec::new(),
        }
    }

    /// A nominal reference applied to type arguments.
    pub fn generic(name: impl AsRef<str>, args: Vec<Type>) -> Self {
        Self::Name {
            name: Symbol::new(name),
            args,
        }
    }

    pub fn var(name: impl AsRef<str>) -> Self {
        Self::Var(Symbol::new(name))
    }

    pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
        Self::Union(members.into_iter().collect())
    }

    pub fn intersection(members: impl IntoIterator<Item = Type>) -> Self {
        Self::Intersection(members.into_iter().collect())
    }

    /// The set of free type-variable names in this type.
    pub fn free_variables(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_free_variables(&mut out);
        out
    }

    fn collect_free_variables(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Type::Any | Type::Class(_) | Type::Instance(_) => {}
            Type::Var(name) => {
                out.insert(name.clone());
            }
            Type::Name { args, .. } => {
                for arg in args {
                    arg.collect_free_variables(out);
                }
            }
            Type::Union(members) | Type::Intersection(members) => {
                for member in members {
                    member.collect_free_variables(out);
                }
            }
        }
    }

    /// `true` when the type contains no free variables.
    pub fn is_ground(&self) -> bool {
        match self {
            Type::Any | Type::Class(_) | Type::Instance(_) => true,
            Type::Var(_) => false,
            Type::Name { args, .. } => args.iter().all(Type::is_ground),
            Type::Union(members) | Type::Intersection(members) => {
                members.iter().all(Type::is_ground)
            }
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::Var(name) => write!(f, "{name}"),
            Type::Name { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    f.write_str("[")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str("]")?;
                }
                Ok(())
            }
            Type::Union(members) => write_joined(f, members, " | "),
            Type::Intersection(members) => write_joined(f, members, " & "),
            Type::Class(name) => write!(f, "singleton({name})"),
            Type::Instance(name) => write!(f, "instance({name})"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, members: &BTreeSet<Type>, sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{member}")?;
    }
    f.write_str(")")
}
