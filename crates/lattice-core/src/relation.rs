//! The `sub <: super` judgement pair.

use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered pair asserting `sub_type <: super_type`.
///
/// Direction matters for equality and hashing: `A <: B` and `B <: A` are
/// distinct judgements.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub sub_type: Type,
    pub super_type: Type,
}

impl Relation {
    pub fn new(sub_type: Type, super_type: Type) -> Self {
        Self {
            sub_type,
            super_type,
        }
    }

    /// The reversed pair.
    ///
    /// Used only by the coinductive `same_type` check (both directions being
    /// in flight means the two types are assumed equal), never for judging a
    /// relation directly.
    pub fn flip(&self) -> Self {
        Self {
            sub_type: self.super_type.clone(),
            super_type: self.sub_type.clone(),
        }
    }

    /// `true` when neither side contains a free variable.
    ///
    /// Only ground relations may be cached: the truth of a relation with open
    /// variables depends on caller-supplied bounds.
    pub fn is_ground(&self) -> bool {
        self.sub_type.is_ground() && self.super_type.is_ground()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <: {}", self.sub_type, self.super_type)
    }
}
