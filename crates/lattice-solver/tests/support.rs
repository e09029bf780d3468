//! Shared fixtures for the solver test suite.
//!
//! The standard builder declares a small class algebra:
//! - `Integer <: Numeric` structurally (`Integer` has every `Numeric` method)
//! - `Dog <: Animal` structurally
//! - `String` is unrelated to the numeric tower
//! - `Comparable[T]` is a generic module
//! - `Left`/`Right` are mutually shaped recursive classes (`step` returns
//!   the receiver's own class)
//! - `Buffer`/`Socket` share `read` but return their own instance from
//!   `clear`
//! - `Narrow`/`Wide` disagree only in how specific `value`'s return is

use crate::builder::TableBuilder;
use crate::interface::{Method, MethodType, Params};
use crate::template::Template;
use lattice_core::{Symbol, Type};

pub fn ty(name: &str) -> Type {
    Type::name(name)
}

pub fn mono(params: Params, return_type: Type) -> MethodType {
    MethodType::new(params, return_type)
}

pub fn poly(type_params: &[&str], params: Params, return_type: Type) -> MethodType {
    MethodType {
        type_params: type_params.iter().map(Symbol::new).collect(),
        params,
        block: None,
        return_type,
    }
}

/// A niladic method returning `return_type`.
pub fn getter(name: &str, return_type: Type) -> Method {
    Method::new(name, vec![mono(Params::default(), return_type)])
}

pub fn standard_builder() -> TableBuilder {
    let mut builder = TableBuilder::new();

    builder.insert_class(Template::new("Numeric", vec![]).with_method(getter("abs", ty("Numeric"))));
    builder.insert_class(
        Template::new("Integer", vec![])
            .with_method(getter("abs", ty("Numeric")))
            .with_method(getter("succ", ty("Integer")))
            .with_method(Method::new(
                "cmp",
                vec![mono(Params::positional(vec![ty("Numeric")]), ty("Integer"))],
            )),
    );
    builder
        .insert_class(Template::new("String", vec![]).with_method(getter("length", ty("Integer"))));

    builder.insert_class(Template::new("Animal", vec![]).with_method(getter("label", ty("String"))));
    // Same method name as Animal's but with a stricter arity.
    builder.insert_class(
        Template::new("Strict", vec![]).with_method(Method::new(
            "label",
            vec![mono(Params::positional(vec![ty("Integer")]), ty("String"))],
        )),
    );
    builder.insert_class(
        Template::new("Dog", vec![])
            .with_method(getter("label", ty("String")))
            .with_method(getter("bark", ty("String"))),
    );

    builder.insert_module(
        Template::new("Comparable", vec![Symbol::new("T")]).with_method(Method::new(
            "cmp",
            vec![mono(Params::positional(vec![Type::var("T")]), ty("Integer"))],
        )),
    );

    builder.insert_class(Template::new("Left", vec![]).with_method(getter("step", ty("Left"))));
    builder.insert_class(Template::new("Right", vec![]).with_method(getter("step", ty("Right"))));

    builder.insert_class(
        Template::new("Reflective", vec![])
            .with_method(getter("who", Type::var(Template::INSTANCE)))
            .with_method(getter("owner", Type::var(Template::MODULE))),
    );

    builder.insert_class(
        Template::new("Buffer", vec![])
            .with_method(getter("read", ty("String")))
            .with_method(getter("clear", Type::var(Template::INSTANCE))),
    );
    builder.insert_class(
        Template::new("Socket", vec![])
            .with_method(getter("read", ty("String")))
            .with_method(getter("clear", Type::var(Template::INSTANCE))),
    );

    builder.insert_class(Template::new("Narrow", vec![]).with_method(getter("value", ty("Integer"))));
    builder.insert_class(Template::new("Wide", vec![]).with_method(getter("value", ty("Numeric"))));

    builder
}

/// Opt-in log output: run with `RUST_LOG=lattice_solver=trace` to see the
/// derivation.
#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
