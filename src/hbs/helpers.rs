//! Built-in helper libraries
//!
//! | library       | registered by            | helpers                                   |
//! |---------------|--------------------------|-------------------------------------------|
//! | [builtin]     | `Handlebars::new`        | if, unless, with, each, lookup, log, ...  |
//! | [logic]       | [`register_logic`]       | and, or, eq, ne, not, increment, ...      |
//! | [string]      | [`register_string`]      | capitalize, pad_start, replace, split, ...|
//! | [container]   | [`register_container`]   | keys, sort_by, group_by, chunk, ...       |
//!
//! The string and container helpers follow one convention: when used as block helpers, the
//! rendered block body is their first operand, so `{{#upper}}text{{/upper}}` and
//! `{{upper "text"}}` agree. Bad arguments produce a descriptive string rather than an error.

pub mod builtin;
pub mod container;
pub mod logic;
pub mod string;

use crate::hbs::error::RenderError;
use crate::hbs::registry::HelperRegistry;
use crate::hbs::render::HelperOptions;
use hbs_dom::dom::Value;

pub fn register_builtins(registry: &mut HelperRegistry) {
    builtin::register(registry);
}

pub fn register_logic(registry: &mut HelperRegistry) {
    logic::register(registry);
}

pub fn register_string(registry: &mut HelperRegistry) {
    string::register(registry);
}

pub fn register_container(registry: &mut HelperRegistry) {
    container::register(registry);
}

/// Every library
pub fn register_all(registry: &mut HelperRegistry) {
    register_builtins(registry);
    register_logic(registry);
    register_string(registry);
    register_container(registry);
}

/// Register a helper that only looks at its positional arguments
pub(crate) fn register_simple(registry: &mut HelperRegistry, name: &str, f: fn(&[Value]) -> Value) {
    registry.register_fn(name, move |args, _| Ok(f(args)));
}

/// Register a helper over [`operands`], so the block form passes its body first
pub(crate) fn register_operands(
    registry: &mut HelperRegistry,
    name: &str,
    f: fn(&[Value]) -> Value,
) {
    registry.register_fn(name, move |args, options| Ok(f(&operands(args, options)?)));
}

/// The operands of a string or container helper: in block form the rendered body comes first
pub(crate) fn operands(
    args: &[Value],
    options: &mut HelperOptions<'_>,
) -> Result<Vec<Value>, RenderError> {
    if !options.is_block() {
        return Ok(args.to_vec());
    }
    let context = options.context();
    let body = options.render_fn(&context)?;
    let mut all = Vec::with_capacity(args.len() + 1);
    all.push(Value::from(body));
    all.extend_from_slice(args);
    Ok(all)
}

/// Positional argument `i`, `Undefined` when absent
pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or_default()
}

/// Wrap out-of-range indices around `n`, so `-1` is the last position
pub(crate) fn normalize_index(i: i64, n: i64) -> i64 {
    if n == 0 {
        return 0;
    }
    if i < 0 || i > n {
        (i % n + n) % n
    } else {
        i
    }
}

/// The descriptive result of a helper called with the wrong kind of argument
pub(crate) fn bad_argument(helper: &str, expected: &str, found: &Value) -> Value {
    Value::from(format!(
        "{}: expected {}, found {}",
        helper,
        expected,
        found.kind()
    ))
}
