//! Template interfaces handed back by the signature builder.
//!
//! A template is the declared shape of a nominal name before any point of
//! use is known. Its method signatures may mention the reserved receiver
//! variables [`Template::SELF`], [`Template::INSTANCE`], and
//! [`Template::MODULE`]; instantiation substitutes those plus the declared
//! type parameters, yielding the concrete [`Instantiated`] surface.

use crate::interface::Instantiated;
use crate::interface::Method;
use indexmap::IndexMap;
use lattice_core::{Substitution, Symbol, Type};
use serde::{Deserialize, Serialize};

/// The declared interface of a nominal name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: Symbol,
    /// Generic parameters, positionally matched against `Name` arguments.
    pub type_params: Vec<Symbol>,
    pub methods: IndexMap<Symbol, Method>,
}

impl Template {
    /// Reserved variable naming the receiver's own type.
    ///
    /// The `%` prefix keeps the reserved names out of the namespace a parser
    /// can produce for user type parameters.
    pub const SELF: &'static str = "%self";
    /// Reserved variable naming the receiver's instance type.
    pub const INSTANCE: &'static str = "%instance";
    /// Reserved variable naming the receiver's class/module type.
    pub const MODULE: &'static str = "%module";

    pub fn new(name: impl AsRef<str>, type_params: Vec<Symbol>) -> Self {
        Self {
            name: Symbol::new(name),
            type_params,
            methods: IndexMap::new(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    /// Resolves the template at a point of use.
    ///
    /// `self_type` replaces [`Template::SELF`]; type arguments replace the
    /// declared type parameters positionally. `instance_type` and
    /// `module_type` replace their reserved variables when supplied and
    /// leave them free otherwise, so the caller can detect signatures that
    /// still depend on an unknown receiver binding.
    ///
    /// # Panics
    ///
    /// Panics when `args` does not match the declared type-parameter arity;
    /// a partial substitution would leave parameters dangling in the
    /// resulting signatures.
    pub fn instantiate(
        &self,
        self_type: &Type,
        args: &[Type],
        instance_type: Option<&Type>,
        module_type: Option<&Type>,
    ) -> Instantiated {
        assert!(
            args.len() == self.type_params.len(),
            "{}: expected {} type argument(s), got {}",
            self.name,
            self.type_params.len(),
            args.len()
        );

        let mut subst = Substitution::from_pairs(&self.type_params, args);
        subst.insert(Symbol::new(Self::SELF), self_type.clone());
        if let Some(ty) = instance_type {
            subst.insert(Symbol::new(Self::INSTANCE), ty.clone());
        }
        if let Some(ty) = module_type {
            subst.insert(Symbol::new(Self::MODULE), ty.clone());
        }

        Instantiated {
            ty: self_type.clone(),
            methods: self
                .methods
                .iter()
                .map(|(name, method)| (name.clone(), method.instantiate(&subst)))
                .collect(),
        }
    }
}
