//! Foundational types for the lattice structural subtyping engine.
//!
//! This crate provides the data model every other lattice crate operates on:
//! - Identifiers (`Symbol`) with fresh-name generation
//! - The algebraic type grammar (`Type`)
//! - Subtyping judgements (`Relation`)
//! - Variable-to-type maps (`Substitution`)
//! - The caller-supplied bound accumulator (`Constraints`)

// Identifiers for type names, variables, and method names
pub mod symbol;
pub use symbol::Symbol;

// The closed type grammar
pub mod types;
pub use types::Type;

// The `sub <: super` judgement pair
pub mod relation;
pub use relation::Relation;

// Variable substitution over types
pub mod subst;
pub use subst::Substitution;

// Per-variable lower/upper bound accumulation
pub mod constraints;
pub use constraints::Constraints;
