//! Identifiers for type names, type variables, and method names.
//!
//! `Symbol` is a cheaply clonable, hashable string handle. It stands in for a
//! full interner: the engine compares and hashes names constantly but never
//! needs numeric ids, so a shared `Arc<str>` keeps the API simple while
//! avoiding per-clone allocation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter backing [`Symbol::fresh`].
static NEXT_FRESH_ID: AtomicU64 = AtomicU64::new(0);

/// A name: qualified type name, type variable, method name, or keyword.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A globally unique variable name derived from `base`.
    ///
    /// Fresh names append a `'` marker and a monotonically increasing id, so
    /// they cannot collide with names produced by a parser or with variables
    /// in a caller's open constraint domain.
    pub fn fresh(base: &str) -> Self {
        let id = NEXT_FRESH_ID.fetch_add(1, Ordering::Relaxed);
        Self(Arc::from(format!("{base}'{id}").as_str()))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self(Arc::from(name.as_str())))
    }
}
