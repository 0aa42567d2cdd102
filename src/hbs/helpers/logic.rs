//! Boolean, arithmetic and site helpers

use super::{arg, register_simple};
use crate::hbs::error::RenderError;
use crate::hbs::registry::HelperRegistry;
use crate::hbs::render::HelperOptions;
use chrono::Datelike;
use hbs_dom::dom::Value;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

pub fn register(registry: &mut HelperRegistry) {
    register_simple(registry, "and", and);
    register_simple(registry, "or", or);
    register_simple(registry, "eq", eq);
    register_simple(registry, "ne", ne);
    register_simple(registry, "not", not);
    register_simple(registry, "increment", increment);
    register_simple(registry, "detag", detag);
    register_simple(registry, "year", year);
    registry.register_fn("relativize", relativize);
}

/// True when every argument is truthy
pub fn and(args: &[Value]) -> Value {
    Value::from(args.iter().all(Value::is_truthy))
}

/// True when any argument is truthy
pub fn or(args: &[Value]) -> Value {
    Value::from(args.iter().any(Value::is_truthy))
}

/// True when every argument equals the first
pub fn eq(args: &[Value]) -> Value {
    let Some((first, rest)) = args.split_first() else {
        return Value::from(true);
    };
    Value::from(rest.iter().all(|value| value == first))
}

pub fn ne(args: &[Value]) -> Value {
    Value::from(!eq(args).is_truthy())
}

/// True when any argument is falsy
pub fn not(args: &[Value]) -> Value {
    Value::from(args.iter().any(|value| !value.is_truthy()))
}

pub fn increment(args: &[Value]) -> Value {
    let value = arg(args, 0);
    if value.is_truthy() {
        value.add(&Value::from(1))
    } else {
        Value::from(1)
    }
}

/// Strip HTML tags
pub fn detag(args: &[Value]) -> Value {
    let html = arg(args, 0);
    match html.as_str() {
        Some(text) if html.is_truthy() => Value::from(TAG.replace_all(text, "").into_owned()),
        _ => html,
    }
}

pub fn year(_args: &[Value]) -> Value {
    Value::from(i64::from(chrono::Local::now().year()))
}

/// `{{relativize to from}}`: the path from page `from` to site path `to`
///
/// `from` defaults to `@root.page.url`. Without a page, `to` is prefixed with
/// `@root.site.path`. A `#fragment` on `to` is carried through.
pub fn relativize(args: &[Value], options: &mut HelperOptions<'_>) -> Result<Value, RenderError> {
    let to = arg(args, 0);
    if !to.is_truthy() {
        return Ok(Value::from("#"));
    }
    let Some(to_text) = to.as_str() else {
        return Ok(to);
    };
    if !to_text.starts_with('/') {
        return Ok(to);
    }

    let root = options.data().get("root");
    let mut from = arg(args, 1);
    if args.len() < 2 {
        from = root.lookup("page.url");
    }
    if !from.is_truthy() {
        let site_path = root.lookup("site.path");
        return Ok(if site_path.is_truthy() {
            site_path.add(&to)
        } else {
            to
        });
    }
    let Some(from_text) = from.as_str() else {
        return Ok(to);
    };
    Ok(Value::from(relative_url(to_text, from_text)))
}

fn relative_url(to: &str, from: &str) -> String {
    let (to, hash) = match to.find('#') {
        Some(at) => to.split_at(at),
        None => (to, ""),
    };
    let dirsy = to.ends_with('/');
    if to == from {
        if !hash.is_empty() {
            return hash.to_string();
        }
        if dirsy {
            return "./".to_string();
        }
        return to.rsplit('/').next().unwrap_or(to).to_string();
    }

    // Relative to the directory holding `from`, or `from` itself when it names a directory.
    let base = if from.ends_with('/') {
        from.trim_end_matches('/')
    } else {
        from.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    };
    let base = if base.is_empty() { "/" } else { base };
    let relative = pathdiff::diff_paths(Path::new(to), Path::new(base))
        .map(|path| path.to_string_lossy().replace('\\', "/"))
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| ".".to_string());
    if dirsy {
        format!("{}/{}", relative, hash)
    } else {
        format!("{}{}", relative, hash)
    }
}
