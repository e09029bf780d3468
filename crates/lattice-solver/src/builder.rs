//! The signature-builder boundary.
//!
//! Building templates out of declared class/module/interface definitions is
//! a separate concern; the checker only needs the three operations below.

use crate::template::Template;
use lattice_core::Symbol;
use rustc_hash::{FxHashMap, FxHashSet};

/// Source of template interfaces for nominal names.
pub trait SignatureBuilder {
    /// The template declared for `name`, or `None` when the name is unknown.
    fn build(&self, name: &Symbol) -> Option<Template>;

    /// `true` when `name` is declared as a class. Used only to pick the
    /// module/class encoding when resolving a bare `Name`.
    fn is_class(&self, name: &Symbol) -> bool;

    /// `true` when `name` is declared as a module.
    fn is_module(&self, name: &Symbol) -> bool;
}

/// An in-memory builder backed by a name-to-template table.
///
/// Suitable for tests and small embeddings; a production frontend implements
/// [`SignatureBuilder`] on top of its own declaration store.
#[derive(Clone, Debug, Default)]
pub struct TableBuilder {
    templates: FxHashMap<Symbol, Template>,
    modules: FxHashSet<Symbol>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `template` as a class.
    pub fn insert_class(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Registers `template` as a module.
    pub fn insert_module(&mut self, template: Template) {
        self.modules.insert(template.name.clone());
        self.templates.insert(template.name.clone(), template);
    }
}

impl SignatureBuilder for TableBuilder {
    fn build(&self, name: &Symbol) -> Option<Template> {
        self.templates.get(name).cloned()
    }

    fn is_class(&self, name: &Symbol) -> bool {
        self.templates.contains_key(name) && !self.modules.contains(name)
    }

    fn is_module(&self, name: &Symbol) -> bool {
        self.modules.contains(name)
    }
}
