//! Interface resolution: turning a type expression into its structural
//! method table.
//!
//! Nominal names instantiate the builder's template with self/instance/module
//! bindings for the point of use. Unions intersect their members' method
//! sets behind a shared placeholder for the receiver, so member-specific
//! signatures cannot leak a false identity. Intersections union their
//! members' method sets, favoring the more specific signature on collision.
//!
//! Resolving `Any`, a variable, or a bare class/instance reference is a
//! caller error: those shapes must be substituted down to a `Name` first.

use crate::builder::SignatureBuilder;
use crate::check::{AssumptionSet, Checker};
use crate::interface::{Instantiated, Method, MethodFlags};
use crate::trace::Trace;
use indexmap::IndexMap;
use lattice_core::{Constraints, Symbol, Type};

impl<'a, B: SignatureBuilder> Checker<'a, B> {
    /// Resolves `ty` to its structural interface.
    ///
    /// # Panics
    ///
    /// Panics when `ty` is `Any`, a variable, or a class/instance reference;
    /// these cannot be resolved and reaching here with one is a programmer
    /// error, not a type mismatch.
    pub fn resolve(&mut self, ty: &Type) -> Instantiated {
        self.resolve_with(ty, ty, None, None)
    }

    fn resolve_with(
        &mut self,
        ty: &Type,
        self_type: &Type,
        instance_type: Option<&Type>,
        module_type: Option<&Type>,
    ) -> Instantiated {
        match ty {
            Type::Any | Type::Var(_) | Type::Class(_) | Type::Instance(_) => {
                panic!("cannot resolve type to interface: {ty}")
            }

            Type::Name { name, args } => {
                let template = match self.builder().build(name) {
                    Some(template) => template,
                    None => panic!("unknown type name: {name}"),
                };
                let instance_default;
                let instance = match instance_type {
                    Some(ty) => Some(ty),
                    None => {
                        instance_default = Type::Instance(name.clone());
                        Some(&instance_default)
                    }
                };
                let module_default;
                let module = match module_type {
                    Some(ty) => Some(ty),
                    None => match self.module_binding(name) {
                        Some(ty) => {
                            module_default = ty;
                            Some(&module_default)
                        }
                        None => None,
                    },
                };
                template.instantiate(self_type, args, instance, module)
            }

            Type::Union(members) => self.resolve_union(ty, members.iter()),

            Type::Intersection(members) => self.resolve_intersection(ty, members.iter()),
        }
    }

    /// The class/module encoding for a bare `Name`, or `None` when the
    /// builder does not classify it.
    fn module_binding(&self, name: &Symbol) -> Option<Type> {
        if self.builder().is_class(name) || self.builder().is_module(name) {
            Some(Type::Class(name.clone()))
        } else {
            None
        }
    }

    /// A union exposes the methods common to all members. Members resolve
    /// behind one shared fresh placeholder for their instance/module
    /// bindings; overloads still mentioning the placeholder depend on the
    /// concrete branch and are unsound to expose, so they are dropped.
    fn resolve_union<'t>(
        &mut self,
        ty: &Type,
        members: impl Iterator<Item = &'t Type>,
    ) -> Instantiated {
        let placeholder = Symbol::fresh("%branch");
        let placeholder_ty = Type::Var(placeholder.clone());

        let mut methods: Option<IndexMap<Symbol, Method>> = None;
        for member in members {
            let mut interface =
                self.resolve_with(member, ty, Some(&placeholder_ty), Some(&placeholder_ty));
            for method in interface.methods.values_mut() {
                method
                    .types
                    .retain(|overload| !overload.free_variables().contains(&placeholder));
            }
            interface.methods.retain(|_, method| !method.types.is_empty());

            methods = Some(match methods {
                None => interface.methods,
                Some(accumulated) => {
                    let mut intersection = IndexMap::new();
                    for (name, method) in interface.methods {
                        let Some(existing) = accumulated.get(&name) else {
                            continue;
                        };
                        if method == *existing {
                            intersection.insert(name, method);
                        } else if self.method_substitutable(&method, existing) {
                            // The new signature honors the accumulated
                            // contract: keep the more general one.
                            intersection.insert(name, existing.clone());
                        } else if self.method_substitutable(existing, &method) {
                            intersection.insert(name, method);
                        }
                        // No consistent relation across members: dropped.
                    }
                    intersection
                }
            });
        }

        Instantiated {
            ty: ty.clone(),
            methods: methods.unwrap_or_default(),
        }
    }

    /// An intersection offers every member's capability. On a name
    /// collision the more specific overload set wins; incomparable sets are
    /// merged into one multi-overload method.
    fn resolve_intersection<'t>(
        &mut self,
        ty: &Type,
        members: impl Iterator<Item = &'t Type>,
    ) -> Instantiated {
        let mut methods: Option<IndexMap<Symbol, Method>> = None;
        for member in members {
            let interface = self.resolve_with(member, member, None, None);

            methods = Some(match methods {
                None => interface.methods,
                Some(mut accumulated) => {
                    for (name, method) in interface.methods {
                        let merged = match accumulated.get(&name) {
                            None => method,
                            Some(existing) if *existing == method => continue,
                            Some(existing) => {
                                if self.method_substitutable(&method, existing) {
                                    method
                                } else if self.method_substitutable(existing, &method) {
                                    continue;
                                } else {
                                    Method {
                                        name: name.clone(),
                                        types: existing
                                            .types
                                            .iter()
                                            .chain(method.types.iter())
                                            .cloned()
                                            .collect(),
                                        super_method: None,
                                        flags: MethodFlags::empty(),
                                    }
                                }
                            }
                        };
                        accumulated.insert(name, merged);
                    }
                    accumulated
                }
            });
        }

        Instantiated {
            ty: ty.clone(),
            methods: methods.unwrap_or_default(),
        }
    }

    /// `true` when `sub` behaviorally satisfies `sup`'s contract. Runs with
    /// fresh state and an empty constraint store, like any standalone check.
    fn method_substitutable(&mut self, sub: &Method, sup: &Method) -> bool {
        self.check_method(
            &sub.name,
            sub,
            sup,
            &mut Constraints::empty(),
            &mut AssumptionSet::default(),
            &mut Trace::new(),
        )
        .is_success()
    }
}
