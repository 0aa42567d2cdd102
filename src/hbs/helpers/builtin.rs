//! Core helpers, available in every engine created with `Handlebars::new`

use super::arg;
use crate::hbs::error::RenderError;
use crate::hbs::registry::HelperRegistry;
use crate::hbs::render::HelperOptions;
use hbs_dom::dom::{Array, Value};

type HelperResult = Result<Value, RenderError>;

pub fn register(registry: &mut HelperRegistry) {
    registry.register_fn("if", if_helper);
    registry.register_fn("unless", unless_helper);
    registry.register_fn("with", with_helper);
    registry.register_fn("each", each_helper);
    registry.register_fn("lookup", lookup_helper);
    registry.register_fn("log", log_helper);
    registry.register_fn("helperMissing", helper_missing);
    registry.register_fn("blockHelperMissing", block_helper_missing);
    registry.register_fn("noop", noop_helper);
    registry.register_fn("raw", noop_helper);
    registry.register_fn("isdefined", is_defined_helper);
}

/// Call a function-valued argument with the current context
fn resolve_callable(value: &Value, options: &HelperOptions<'_>) -> HelperResult {
    match value {
        Value::Function(function) => Ok(function.call_values([options.context()])?),
        other => Ok(other.clone()),
    }
}

fn conditional(args: &[Value], options: &mut HelperOptions<'_>, negate: bool) -> HelperResult {
    if args.len() != 1 {
        let message = format!("#{} requires exactly one argument", options.name());
        return Err(RenderError::helper(options.name(), message));
    }
    let condition = resolve_callable(&args[0], options)?;
    let include_zero = options.hash_get("includeZero").is_truthy();
    let falsy = (!include_zero && !condition.is_truthy()) || condition.is_empty();
    let context = options.context();
    let rendered = if falsy != negate {
        options.render_inverse(&context)?
    } else {
        options.render_fn(&context)?
    };
    Ok(Value::from(rendered))
}

pub fn if_helper(args: &[Value], options: &mut HelperOptions<'_>) -> HelperResult {
    conditional(args, options, false)
}

pub fn unless_helper(args: &[Value], options: &mut HelperOptions<'_>) -> HelperResult {
    conditional(args, options, true)
}

pub fn with_helper(args: &[Value], options: &mut HelperOptions<'_>) -> HelperResult {
    if args.len() != 1 {
        return Err(RenderError::helper(
            options.name(),
            "#with requires exactly one argument",
        ));
    }
    let context = resolve_callable(&args[0], options)?;
    let rendered = if context.is_empty() {
        let outer = options.context();
        options.render_inverse(&outer)?
    } else {
        options.render_fn_with(&context, None, &[context.clone()])?
    };
    Ok(Value::from(rendered))
}

/// Iterate arrays and objects
///
/// Each iteration gets a child data frame with `@key`, `@index`, `@first` and `@last`, and
/// the block parameters `item` and `key`. Renders the inverse when nothing was iterated.
pub fn each_helper(args: &[Value], options: &mut HelperOptions<'_>) -> HelperResult {
    if args.is_empty() {
        return Err(RenderError::helper(
            options.name(),
            "Must pass iterator to #each",
        ));
    }
    let target = resolve_callable(&args[0], options)?;
    let mut out = String::new();
    let mut iterations = 0;
    match &target {
        Value::Array(items) => {
            let n = items.size();
            for (index, item) in items.iter().enumerate() {
                let key = Value::from(index);
                each_iteration(options, &mut out, key, index, index + 1 == n, item)?;
                iterations += 1;
            }
        }
        Value::Object(object) => {
            let entries = object.entries();
            let n = entries.len();
            for (index, (key, value)) in entries.into_iter().enumerate() {
                let key = Value::from(key);
                each_iteration(options, &mut out, key, index, index + 1 == n, value)?;
                iterations += 1;
            }
        }
        _ => {}
    }

    if iterations == 0 {
        let context = options.context();
        out = options.render_inverse(&context)?;
    }
    Ok(Value::from(out))
}

fn each_iteration(
    options: &mut HelperOptions<'_>,
    out: &mut String,
    key: Value,
    index: usize,
    last: bool,
    item: Value,
) -> Result<(), RenderError> {
    let frame = options.create_frame();
    frame.set("key", key.clone());
    frame.set("index", index);
    frame.set("first", index == 0);
    frame.set("last", last);
    out.push_str(&options.render_fn_with(&item, Some(frame), &[item.clone(), key])?);
    Ok(())
}

pub fn lookup_helper(args: &[Value], options: &mut HelperOptions<'_>) -> HelperResult {
    let object = arg(args, 0);
    if !object.is_truthy() {
        return Ok(object);
    }
    let field = arg(args, 1).to_output_string();
    Ok(options.lookup_property(&object, &field))
}

/// `{{log value... level="warn"}}`
///
/// The level comes from the `level` hash argument, then `@level`, and defaults to `info`.
pub fn log_helper(args: &[Value], options: &mut HelperOptions<'_>) -> HelperResult {
    let from_hash = options.hash_get("level");
    let from_data = options.data().get("level");
    let level = if !from_hash.is_undefined() && !from_hash.is_null() {
        from_hash
    } else if !from_data.is_undefined() && !from_data.is_null() {
        from_data
    } else {
        Value::from(1)
    };
    options.log(&level, &Array::from_values(args.to_vec()));
    Ok(Value::Undefined)
}

/// Renders nothing for an unknown name without arguments, fails otherwise
pub fn helper_missing(args: &[Value], options: &mut HelperOptions<'_>) -> HelperResult {
    if args.is_empty() {
        log::debug!(target: "hbs", "\"{}\" resolved to nothing", options.name());
        return Ok(Value::Undefined);
    }
    Err(RenderError::helper(
        options.name(),
        format!("Missing helper: \"{}\"", options.name()),
    ))
}

/// Default block semantics for a plain value
///
/// `true` renders the body, `false`, `null` and `undefined` the inverse. Arrays iterate like
/// `each`, rendering the inverse when empty. Any other value becomes the body's context.
pub fn block_helper_missing(args: &[Value], options: &mut HelperOptions<'_>) -> HelperResult {
    let value = arg(args, 0);
    let context = options.context();
    let rendered = match &value {
        Value::Boolean(true) => options.render_fn(&context)?,
        Value::Boolean(false) | Value::Null | Value::Undefined => {
            options.render_inverse(&context)?
        }
        Value::Array(items) if items.is_empty() => options.render_inverse(&context)?,
        Value::Array(_) => return each_helper(&[value], options),
        other => options.render_fn(other)?,
    };
    Ok(Value::from(rendered))
}

/// Renders the block body untouched, see raw blocks
pub fn noop_helper(_args: &[Value], options: &mut HelperOptions<'_>) -> HelperResult {
    let context = options.context();
    Ok(Value::from(options.render_fn(&context)?))
}

/// True when every argument is defined
pub fn is_defined_helper(args: &[Value], _options: &mut HelperOptions<'_>) -> HelperResult {
    Ok(Value::from(
        !args.is_empty() && args.iter().all(|value| !value.is_undefined()),
    ))
}
