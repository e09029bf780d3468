//! Outcome of a subtype check.
//!
//! Incompatibilities are data, never error propagation: every component that
//! detects a mismatch returns a `CheckResult::Failure` immediately, and
//! composite rules pick the governing failure deterministically. Recorded
//! bounds travel through the caller's `Constraints` store, so success carries
//! no payload of its own.

use crate::trace::Trace;
use lattice_core::{Relation, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a check failed. The fixed taxonomy consumed by callers; internal
/// invariant violations panic instead of extending this.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The relation was not reducible by any structural rule.
    UnknownPair { relation: Relation },
    /// The super interface declares a method the sub interface lacks.
    MethodMissing { name: Symbol },
    /// Positional or keyword parameters cannot be paired compatibly.
    ParameterMismatch { name: Symbol },
    /// One side requires a block the other lacks, or block pairing failed.
    BlockMismatch { name: Symbol },
    /// Polymorphic overloads with unequal, nonzero type-parameter arities.
    PolyMethodSubtyping { name: Symbol },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnknownPair { relation } => write!(f, "unknown pair: {relation}"),
            ErrorKind::MethodMissing { name } => write!(f, "method missing: {name}"),
            ErrorKind::ParameterMismatch { name } => write!(f, "parameter mismatch: {name}"),
            ErrorKind::BlockMismatch { name } => write!(f, "block mismatch: {name}"),
            ErrorKind::PolyMethodSubtyping { name } => {
                write!(f, "polymorphic method subtyping: {name}")
            }
        }
    }
}

/// A failed judgement: the kind of mismatch plus the derivation frames that
/// led to it, fixed at the moment of failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub error: ErrorKind,
    pub trace: Trace,
}

impl Failure {
    /// Trims the snapshot to the frames recorded after `depth`. Used to
    /// normalize a failure before caching: the cached copy keeps only the
    /// frames below the cached relation, and a later cache hit prepends the
    /// new caller's frames instead.
    pub fn dropped_prefix(mut self, depth: usize) -> Self {
        self.trace.drop_prefix(depth);
        self
    }

    /// Re-attaches an outer caller's frames in front of the snapshot. Used
    /// when a cached failure is reported under a new context.
    pub fn merged_onto(&self, outer: &Trace) -> Self {
        Self {
            error: self.error.clone(),
            trace: self.trace.merged_onto(outer),
        }
    }
}

/// Result of a subtype check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CheckResult {
    /// The relation holds. Any inferred bounds were recorded into the
    /// caller-supplied constraint store along the way.
    Success,
    Failure(Failure),
}

impl CheckResult {
    /// A failure carrying a snapshot of the current trace.
    pub fn failure(error: ErrorKind, trace: &Trace) -> Self {
        Self::Failure(Failure {
            error,
            trace: trace.clone(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Self::Success => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// On failure, trims the trace snapshot to frames after `depth`.
    pub fn dropped_prefix(self, depth: usize) -> Self {
        match self {
            Self::Success => Self::Success,
            Self::Failure(failure) => Self::Failure(failure.dropped_prefix(depth)),
        }
    }
}
