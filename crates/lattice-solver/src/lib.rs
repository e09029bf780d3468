//! Coinductive structural subtype checker for the lattice type system.
//!
//! Given two type expressions over the [`lattice_core::Type`] grammar, the
//! [`Checker`] decides whether one is usable where the other is expected,
//! producing either proof of success (with any inferred type-variable bounds
//! recorded into the caller's [`lattice_core::Constraints`]) or a precise
//! failure with an explanatory derivation trace.
//!
//! The engine combines:
//! - A recursive decision procedure with a ground-relation result cache
//! - A coinductive assumption set for cyclic/recursive type graphs
//! - Structural interface resolution through a [`SignatureBuilder`]
//! - Method/parameter matching with contravariant parameters, covariant
//!   returns, and rank-limited polymorphic overload instantiation

// Structural interface model: params, method signatures, method tables
pub mod interface;
pub use interface::{Instantiated, Method, MethodFlags, MethodType, ParamKind, Params};

// Template interfaces produced by the signature builder
pub mod template;
pub use template::Template;

// The signature-builder boundary and an in-memory implementation
pub mod builder;
pub use builder::{SignatureBuilder, TableBuilder};

// Derivation traces
pub mod trace;
pub use trace::{Frame, Trace};

// Check outcomes and the failure taxonomy
pub mod result;
pub use result::{CheckResult, ErrorKind, Failure};

// The coinductive decision procedure
pub mod check;
pub use check::{AssumptionSet, Checker, MAX_CHECK_DEPTH};

// Method & parameter matcher (impl blocks on Checker)
mod method;

// Interface resolver (impl blocks on Checker)
mod resolve;

// Test modules live under ../tests and are loaded here so they can exercise
// crate-private entry points; autotests is off in Cargo.toml.
#[cfg(test)]
#[path = "../tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "../tests/checker_tests.rs"]
mod checker_tests;

#[cfg(test)]
#[path = "../tests/method_match_tests.rs"]
mod method_match_tests;

#[cfg(test)]
#[path = "../tests/resolve_tests.rs"]
mod resolve_tests;

#[cfg(test)]
#[path = "../tests/compact_tests.rs"]
mod compact_tests;
