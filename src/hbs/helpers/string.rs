//! Text helpers
//!
//! Indices count characters, not bytes. Negative or out-of-range indices wrap around the
//! length of the text, so `{{slice name -3}}` keeps the last three characters.

use super::{arg, bad_argument, normalize_index, register_operands};
use crate::hbs::escape::escape_expression;
use crate::hbs::registry::HelperRegistry;
use hbs_dom::dom::{json, Array, Value};

const WHITESPACE: &str = " \t\r\n";

pub fn register(registry: &mut HelperRegistry) {
    let helpers: &[(&str, fn(&[Value]) -> Value)] = &[
        ("to_json", to_json),
        ("capitalize", capitalize),
        ("center", center),
        ("ljust", pad_end),
        ("pad_end", pad_end),
        ("rjust", pad_start),
        ("pad_start", pad_start),
        ("starts_with", starts_with),
        ("ends_with", ends_with),
        ("upper", upper),
        ("to_upper", upper),
        ("lower", lower),
        ("to_lower", lower),
        ("strip", strip),
        ("trim", strip),
        ("lstrip", trim_start),
        ("trim_start", trim_start),
        ("rstrip", trim_end),
        ("trim_end", trim_end),
        ("replace", replace),
        ("split", split),
        ("join", join),
        ("repeat", repeat),
        ("zfill", zfill),
        ("remove_prefix", remove_prefix),
        ("remove_suffix", remove_suffix),
        ("escape", escape),
        ("slice", slice),
        ("substr", slice),
        ("safe_anchor_id", safe_anchor_id),
        ("strip_namespace", strip_namespace),
        ("includes", includes),
        ("index_of", index_of),
        ("find", index_of),
        ("rfind", last_index_of),
        ("rindex_of", last_index_of),
        ("last_index_of", last_index_of),
        ("count", count),
        ("expandtabs", expandtabs),
        ("char_at", char_at),
        ("is_alnum", is_alnum),
        ("is_alpha", is_alpha),
        ("is_ascii", is_ascii),
        ("is_decimal", is_digit),
        ("is_digit", is_digit),
        ("is_lower", is_lower),
        ("is_upper", is_upper),
        ("is_printable", is_printable),
        ("is_space", is_space),
        ("is_title", is_title),
        ("swap_case", swap_case),
        ("partition", partition),
        ("rpartition", rpartition),
        ("rsplit", rsplit),
        ("split_lines", split_lines),
        ("implode", join),
        ("explode", split),
    ];
    for (name, helper) in helpers {
        register_operands(registry, name, *helper);
    }
}

/// Run `f` on the text of the first operand, or describe why there is none
fn on_text(helper: &str, args: &[Value], f: impl FnOnce(&str, &[Value]) -> Value) -> Value {
    match args.first().map(|value| (value, value.as_str())) {
        Some((_, Some(text))) => f(text, &args[1..]),
        Some((value, None)) => bad_argument(helper, "a string", value),
        None => bad_argument(helper, "a string", &Value::Undefined),
    }
}

// An optional integer operand. `None` when present but not an integer.
fn int_or(args: &[Value], i: usize, default: i64) -> Option<i64> {
    match args.get(i) {
        None | Some(Value::Undefined) => Some(default),
        Some(value) => value.as_integer(),
    }
}

// An optional string operand. `None` when present but not text.
fn str_or<'a>(args: &'a [Value], i: usize, default: &'a str) -> Option<&'a str> {
    match args.get(i) {
        None | Some(Value::Undefined) => Some(default),
        Some(value) => value.as_str(),
    }
}

fn char_count(text: &str) -> i64 {
    i64::try_from(text.chars().count()).unwrap_or(i64::MAX)
}

// The characters of `text` within `[start, end)`, both normalized
fn char_window(text: &str, start: i64, end: i64) -> String {
    let n = char_count(text);
    let start = normalize_index(start, n);
    let end = normalize_index(end, n);
    if start >= end {
        return String::new();
    }
    text.chars()
        .skip(start as usize)
        .take((end - start) as usize)
        .collect()
}

// Room for `bytes` more bytes, or `None` when the result cannot be allocated
fn reserve(out: &mut String, bytes: Option<usize>) -> Option<()> {
    out.try_reserve(bytes?).ok()
}

// Append `len` characters of `fill`, repeated and cut to size
fn push_padding(out: &mut String, fill: &str, len: i64) -> Option<()> {
    if len <= 0 || fill.is_empty() {
        return Some(());
    }
    let len = usize::try_from(len).ok()?;
    let widest = fill.chars().map(char::len_utf8).max().unwrap_or(1);
    reserve(out, len.checked_mul(widest))?;
    out.extend(fill.chars().cycle().take(len));
    Some(())
}

fn too_large(helper: &str, rest: &[Value]) -> Value {
    bad_argument(helper, "a size that fits in memory", &arg(rest, 0))
}

pub fn to_json(args: &[Value]) -> Value {
    Value::from(json::stringify(&arg(args, 0)))
}

pub fn capitalize(args: &[Value]) -> Value {
    on_text("capitalize", args, |text, _| {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => Value::from(first.to_uppercase().chain(chars).collect::<String>()),
            None => Value::from(""),
        }
    })
}

/// `{{center text width fill}}`
pub fn center(args: &[Value]) -> Value {
    on_text("center", args, |text, rest| {
        let (Some(width), Some(fill)) = (int_or(rest, 0, 0), str_or(rest, 1, " ")) else {
            return Value::from("center: expected an integer width and a string fill");
        };
        let total = width - char_count(text);
        if total <= 0 {
            return Value::from(text);
        }
        let left = total / 2;
        let mut out = String::new();
        let padded = (|| {
            push_padding(&mut out, fill, left)?;
            out.push_str(text);
            push_padding(&mut out, fill, total - left)
        })();
        match padded {
            Some(()) => Value::from(out),
            None => too_large("center", rest),
        }
    })
}

pub fn pad_end(args: &[Value]) -> Value {
    on_text("pad_end", args, |text, rest| {
        let (Some(width), Some(fill)) = (int_or(rest, 0, 0), str_or(rest, 1, " ")) else {
            return Value::from("pad_end: expected an integer width and a string fill");
        };
        let mut out = text.to_string();
        match push_padding(&mut out, fill, width - char_count(text)) {
            Some(()) => Value::from(out),
            None => too_large("pad_end", rest),
        }
    })
}

pub fn pad_start(args: &[Value]) -> Value {
    on_text("pad_start", args, |text, rest| {
        let (Some(width), Some(fill)) = (int_or(rest, 0, 0), str_or(rest, 1, " ")) else {
            return Value::from("pad_start: expected an integer width and a string fill");
        };
        let mut out = String::new();
        match push_padding(&mut out, fill, width - char_count(text)) {
            Some(()) => {
                out.push_str(text);
                Value::from(out)
            }
            None => too_large("pad_start", rest),
        }
    })
}

// `{{starts_with text prefix start end}}` and its mirror
fn affix_test(helper: &str, args: &[Value], test: fn(&str, &str) -> bool) -> Value {
    on_text(helper, args, |text, rest| {
        let Some(affix) = rest.first().and_then(Value::as_str) else {
            return bad_argument(helper, "a string to compare", &arg(rest, 0));
        };
        let n = char_count(text);
        let (Some(start), Some(end)) = (int_or(rest, 1, 0), int_or(rest, 2, n)) else {
            return Value::from(format!("{}: expected integer bounds", helper));
        };
        let window = if start == 0 && end == n {
            text.to_string()
        } else {
            char_window(text, start, end)
        };
        Value::from(test(&window, affix))
    })
}

pub fn starts_with(args: &[Value]) -> Value {
    affix_test("starts_with", args, |text, prefix| text.starts_with(prefix))
}

pub fn ends_with(args: &[Value]) -> Value {
    affix_test("ends_with", args, |text, suffix| text.ends_with(suffix))
}

pub fn upper(args: &[Value]) -> Value {
    on_text("upper", args, |text, _| Value::from(text.to_uppercase()))
}

pub fn lower(args: &[Value]) -> Value {
    on_text("lower", args, |text, _| Value::from(text.to_lowercase()))
}

// Trim any of the characters in the optional second operand, whitespace by default
fn trim_with(helper: &str, args: &[Value], start: bool, end: bool) -> Value {
    on_text(helper, args, |text, rest| {
        let Some(chars) = str_or(rest, 0, WHITESPACE) else {
            return bad_argument(helper, "a string of characters", &arg(rest, 0));
        };
        let strip = |c: char| chars.contains(c);
        let mut out = text;
        if start {
            out = out.trim_start_matches(strip);
        }
        if end {
            out = out.trim_end_matches(strip);
        }
        Value::from(out)
    })
}

pub fn strip(args: &[Value]) -> Value {
    trim_with("strip", args, true, true)
}

pub fn trim_start(args: &[Value]) -> Value {
    trim_with("trim_start", args, true, false)
}

pub fn trim_end(args: &[Value]) -> Value {
    trim_with("trim_end", args, false, true)
}

/// `{{replace text old new count}}` replaces substrings, `count` defaults to all (-1)
///
/// Given an array or object instead of text, replaces matching elements or member values.
pub fn replace(args: &[Value]) -> Value {
    let target = arg(args, 0);
    let old = arg(args, 1);
    let new = arg(args, 2);
    match (&target, &old) {
        (Value::String(_) | Value::SafeString(_), Value::String(_) | Value::SafeString(_)) => {
            on_text("replace", args, |text, rest| {
                let (Some(old), Some(new), Some(count)) =
                    (str_or(rest, 0, ""), str_or(rest, 1, ""), int_or(rest, 2, -1))
                else {
                    return Value::from("replace: expected old and new strings");
                };
                Value::from(replace_text(text, old, new, count))
            })
        }
        (Value::Array(items), _) => Value::from(
            items
                .iter()
                .map(|item| if item == old { new.clone() } else { item })
                .collect::<Array>(),
        ),
        (Value::Object(object), _) => {
            let copy = object.clone_shallow();
            for (key, value) in copy.entries() {
                if value == old {
                    copy.set(key, new.clone());
                }
            }
            Value::from(copy)
        }
        _ => target,
    }
}

fn replace_text(text: &str, old: &str, new: &str, count: i64) -> String {
    if old.is_empty() || count == 0 {
        return text.to_string();
    }
    if count < 0 {
        return text.replace(old, new);
    }
    text.replacen(old, new, usize::try_from(count).unwrap_or(usize::MAX))
}

/// `{{split text sep maxsplit}}`, an empty separator splits into characters
pub fn split(args: &[Value]) -> Value {
    on_text("split", args, |text, rest| {
        let (Some(sep), Some(max)) = (str_or(rest, 0, ""), int_or(rest, 1, -1)) else {
            return Value::from("split: expected a string separator");
        };
        let parts: Vec<Value> = if sep.is_empty() {
            text.chars().map(|c| Value::from(c.to_string())).collect()
        } else if max < 0 {
            text.split(sep).map(Value::from).collect()
        } else {
            let limit = usize::try_from(max).unwrap_or(usize::MAX).saturating_add(1);
            text.splitn(limit, sep).map(Value::from).collect()
        };
        Value::from(Array::from_values(parts))
    })
}

/// `{{join sep items}}`
pub fn join(args: &[Value]) -> Value {
    on_text("join", args, |sep, rest| match rest.first() {
        Some(Value::Array(items)) => Value::from(
            items
                .iter()
                .map(|item| item.to_output_string())
                .collect::<Vec<_>>()
                .join(sep),
        ),
        other => bad_argument("join", "an array", other.unwrap_or(&Value::Undefined)),
    })
}

pub fn repeat(args: &[Value]) -> Value {
    on_text("repeat", args, |text, rest| match int_or(rest, 0, 1) {
        Some(count) if count > 0 => {
            let count = usize::try_from(count).unwrap_or(usize::MAX);
            let mut out = String::new();
            match reserve(&mut out, text.len().checked_mul(count)) {
                Some(()) => {
                    (0..count).for_each(|_| out.push_str(text));
                    Value::from(out)
                }
                None => too_large("repeat", rest),
            }
        }
        Some(_) => Value::from(""),
        None => bad_argument("repeat", "an integer count", &arg(rest, 0)),
    })
}

/// Left-pad with zeros to `width`, keeping a leading sign in front
pub fn zfill(args: &[Value]) -> Value {
    on_text("zfill", args, |text, rest| {
        let Some(width) = int_or(rest, 0, 0) else {
            return bad_argument("zfill", "an integer width", &arg(rest, 0));
        };
        let mut zeros = String::new();
        if push_padding(&mut zeros, "0", width - char_count(text)).is_none() {
            return too_large("zfill", rest);
        }
        let (sign, digits) = match text.chars().next() {
            Some(c @ ('+' | '-')) => (c.to_string(), &text[1..]),
            _ => (String::new(), text),
        };
        Value::from(format!("{}{}{}", sign, zeros, digits))
    })
}

pub fn remove_prefix(args: &[Value]) -> Value {
    on_text("remove_prefix", args, |text, rest| match str_or(rest, 0, "") {
        Some(prefix) => Value::from(text.strip_prefix(prefix).unwrap_or(text)),
        None => bad_argument("remove_prefix", "a string prefix", &arg(rest, 0)),
    })
}

pub fn remove_suffix(args: &[Value]) -> Value {
    on_text("remove_suffix", args, |text, rest| match str_or(rest, 0, "") {
        Some(suffix) => Value::from(text.strip_suffix(suffix).unwrap_or(text)),
        None => bad_argument("remove_suffix", "a string suffix", &arg(rest, 0)),
    })
}

/// HTML-escape, like `{{value}}` does on output
pub fn escape(args: &[Value]) -> Value {
    let value = arg(args, 0);
    Value::from(escape_expression(&value.to_output_string()))
}

/// `{{slice text start stop}}`, `stop` defaults to the end
pub fn slice(args: &[Value]) -> Value {
    on_text("slice", args, |text, rest| {
        let n = char_count(text);
        match (int_or(rest, 0, 0), int_or(rest, 1, n)) {
            (Some(start), Some(stop)) => Value::from(char_window(text, start, stop)),
            _ => Value::from("slice: expected integer bounds"),
        }
    })
}

/// A lowercase fragment id: spaces and underscores become dashes, colons disappear
pub fn safe_anchor_id(args: &[Value]) -> Value {
    on_text("safe_anchor_id", args, |text, _| {
        let id: String = text
            .chars()
            .filter(|c| *c != ':')
            .map(|c| match c {
                ' ' | '_' => '-',
                c => c,
            })
            .flat_map(char::to_lowercase)
            .collect();
        Value::from(id)
    })
}

/// The unqualified part of a qualified name: `ns::vector<ns::item>` gives `vector<ns::item>`
pub fn strip_namespace(args: &[Value]) -> Value {
    on_text("strip_namespace", args, |text, _| {
        let mut depth = 0usize;
        let mut cut = 0;
        for (i, c) in text.char_indices() {
            match c {
                '(' | '[' | '<' => depth += 1,
                ')' | ']' | '>' => depth = depth.saturating_sub(1),
                ':' if depth == 0 => cut = i + 1,
                _ => {}
            }
        }
        Value::from(&text[cut..])
    })
}

/// Position of a substring in characters, or of an element in an array, -1 when absent
pub fn index_of(args: &[Value]) -> Value {
    let target = arg(args, 0);
    let needle = arg(args, 1);
    if let Value::Array(items) = &target {
        let found = items.iter().position(|item| item == needle);
        return Value::from(found.map_or(-1, |i| i as i64));
    }
    on_text("index_of", args, |text, rest| {
        let Some(needle) = rest.first().and_then(Value::as_str) else {
            return bad_argument("index_of", "a string to find", &arg(rest, 0));
        };
        let n = char_count(text);
        let (Some(start), Some(end)) = (int_or(rest, 1, 0), int_or(rest, 2, n)) else {
            return Value::from("index_of: expected integer bounds");
        };
        let start = normalize_index(start, n);
        let window = char_window(text, start, end);
        match window.find(needle) {
            Some(byte) => Value::from(start + char_count(&window[..byte])),
            None => Value::from(-1),
        }
    })
}

pub fn includes(args: &[Value]) -> Value {
    let found = index_of(args);
    match found.as_integer() {
        Some(index) => Value::from(index != -1),
        None => found,
    }
}

/// Occurrences of a substring in `[start, end)`, or of a value among container elements
pub fn count(args: &[Value]) -> Value {
    let target = arg(args, 0);
    let item = arg(args, 1);
    if target.is_string_like() && item.is_string_like() {
        return on_text("count", args, |text, rest| {
            let sub = rest.first().and_then(Value::as_str).unwrap_or_default();
            let n = char_count(text);
            let (Some(start), Some(end)) = (int_or(rest, 1, 0), int_or(rest, 2, n)) else {
                return Value::from("count: expected integer bounds");
            };
            let start = normalize_index(start, n);
            let end = normalize_index(end, n);
            let chars: Vec<char> = text.chars().collect();
            let sub: Vec<char> = sub.chars().collect();
            let matches = (start..end)
                .filter(|&pos| chars[pos as usize..].starts_with(&sub))
                .count();
            Value::from(matches)
        });
    }
    match &target {
        Value::Array(items) => Value::from(items.iter().filter(|v| *v == item).count()),
        Value::Object(object) => Value::from(
            object
                .values()
                .into_iter()
                .filter(|value| *value == item)
                .count(),
        ),
        _ => Value::from(0),
    }
}

/// The last occurrence of a substring starting in `[start, end)`, in characters
pub fn last_index_of(args: &[Value]) -> Value {
    let target = arg(args, 0);
    let needle = arg(args, 1);
    if let Value::Array(items) = &target {
        let found = items.to_vec().iter().rposition(|item| *item == needle);
        return Value::from(found.map_or(-1, |i| i as i64));
    }
    on_text("last_index_of", args, |text, rest| {
        let Some(needle) = rest.first().and_then(Value::as_str) else {
            return bad_argument("last_index_of", "a string to find", &arg(rest, 0));
        };
        let n = char_count(text);
        let (Some(start), Some(end)) = (int_or(rest, 1, 0), int_or(rest, 2, n)) else {
            return Value::from("last_index_of: expected integer bounds");
        };
        let start = normalize_index(start, n);
        let end = normalize_index(end, n).max(start);
        let chars: Vec<char> = text.chars().collect();
        let needle: Vec<char> = needle.chars().collect();
        let found = (start..end)
            .rev()
            .find(|&pos| chars[pos as usize..].starts_with(&needle));
        Value::from(found.unwrap_or(-1))
    })
}

/// Replace every tab with `tabsize` spaces
pub fn expandtabs(args: &[Value]) -> Value {
    on_text("expandtabs", args, |text, rest| {
        let Some(tabsize) = int_or(rest, 0, 8) else {
            return bad_argument("expandtabs", "an integer tab size", &arg(rest, 0));
        };
        let mut out = String::new();
        for piece in text.split_inclusive('\t') {
            let (body, tab) = match piece.strip_suffix('\t') {
                Some(body) => (body, true),
                None => (piece, false),
            };
            out.push_str(body);
            if tab && push_padding(&mut out, " ", tabsize).is_none() {
                return too_large("expandtabs", rest);
            }
        }
        Value::from(out)
    })
}

/// The character at a wrapped index
pub fn char_at(args: &[Value]) -> Value {
    on_text("char_at", args, |text, rest| {
        let Some(index) = rest.first().and_then(Value::as_integer) else {
            return bad_argument("char_at", "an integer index", &arg(rest, 0));
        };
        let index = normalize_index(index, char_count(text));
        text.chars()
            .nth(index as usize)
            .map_or(Value::Null, |c| Value::from(c.to_string()))
    })
}

// Every character of the text satisfies `test`
fn all_chars(helper: &str, args: &[Value], test: fn(char) -> bool) -> Value {
    on_text(helper, args, |text, _| Value::from(text.chars().all(test)))
}

pub fn is_alnum(args: &[Value]) -> Value {
    all_chars("is_alnum", args, |c| c.is_ascii_alphanumeric())
}

pub fn is_alpha(args: &[Value]) -> Value {
    all_chars("is_alpha", args, |c| c.is_ascii_alphabetic())
}

pub fn is_ascii(args: &[Value]) -> Value {
    all_chars("is_ascii", args, |c| c.is_ascii())
}

pub fn is_digit(args: &[Value]) -> Value {
    all_chars("is_digit", args, |c| c.is_ascii_digit())
}

pub fn is_lower(args: &[Value]) -> Value {
    all_chars("is_lower", args, |c| c.is_ascii_lowercase())
}

pub fn is_upper(args: &[Value]) -> Value {
    all_chars("is_upper", args, |c| c.is_ascii_uppercase())
}

pub fn is_printable(args: &[Value]) -> Value {
    all_chars("is_printable", args, |c| matches!(c, ' '..='~'))
}

pub fn is_space(args: &[Value]) -> Value {
    all_chars("is_space", args, |c| matches!(c, ' ' | '\t'..='\r'))
}

/// Every word starts with an uppercase letter followed only by lowercase ones
pub fn is_title(args: &[Value]) -> Value {
    on_text("is_title", args, |text, _| {
        let mut in_word = false;
        let mut titled = false;
        for c in text.chars() {
            if c.is_ascii_uppercase() {
                if in_word {
                    return Value::from(false);
                }
                titled = true;
                in_word = true;
            } else if c.is_ascii_lowercase() {
                if !in_word {
                    return Value::from(false);
                }
            } else {
                in_word = false;
            }
        }
        Value::from(titled)
    })
}

pub fn swap_case(args: &[Value]) -> Value {
    on_text("swap_case", args, |text, _| {
        let swapped: String = text
            .chars()
            .map(|c| {
                if c.is_ascii_uppercase() {
                    c.to_ascii_lowercase()
                } else {
                    c.to_ascii_uppercase()
                }
            })
            .collect();
        Value::from(swapped)
    })
}

// `[before, sep, after]` around the split point, or `[text, "", ""]` without one
fn partition_at(
    helper: &str,
    args: &[Value],
    find: fn(&str, &str) -> Option<usize>,
) -> Value {
    on_text(helper, args, |text, rest| {
        let Some(sep) = rest.first().and_then(Value::as_str).filter(|sep| !sep.is_empty()) else {
            return bad_argument(helper, "a non-empty separator", &arg(rest, 0));
        };
        let parts = match find(text, sep) {
            Some(at) => [&text[..at], sep, &text[at + sep.len()..]],
            None => [text, "", ""],
        };
        Value::from(parts.into_iter().map(Value::from).collect::<Array>())
    })
}

pub fn partition(args: &[Value]) -> Value {
    partition_at("partition", args, |text, sep| text.find(sep))
}

pub fn rpartition(args: &[Value]) -> Value {
    partition_at("rpartition", args, |text, sep| text.rfind(sep))
}

/// Split at most `maxsplit` times counting from the right, keeping left to right order
pub fn rsplit(args: &[Value]) -> Value {
    on_text("rsplit", args, |text, rest| {
        let (Some(sep), Some(max)) = (str_or(rest, 0, " "), int_or(rest, 1, -1)) else {
            return Value::from("rsplit: expected a string separator");
        };
        if sep.is_empty() {
            return bad_argument("rsplit", "a non-empty separator", &arg(rest, 0));
        }
        let mut parts: Vec<Value> = if max < 0 {
            text.split(sep).map(Value::from).collect()
        } else {
            let limit = usize::try_from(max).unwrap_or(usize::MAX).saturating_add(1);
            text.rsplitn(limit, sep).map(Value::from).collect()
        };
        if max >= 0 {
            parts.reverse();
        }
        Value::from(Array::from_values(parts))
    })
}

/// Lines of the text; `\r\n` counts as one break. Pass `true` to keep the breaks.
pub fn split_lines(args: &[Value]) -> Value {
    on_text("split_lines", args, |text, rest| {
        let keep_ends = arg(rest, 0).is_truthy();
        let mut lines = Vec::new();
        let mut rest_of_text = text;
        while !rest_of_text.is_empty() {
            let Some(at) = rest_of_text.find(['\r', '\n']) else {
                lines.push(Value::from(rest_of_text));
                break;
            };
            let width = if rest_of_text[at..].starts_with("\r\n") { 2 } else { 1 };
            let end = if keep_ends { at + width } else { at };
            lines.push(Value::from(&rest_of_text[..end]));
            rest_of_text = &rest_of_text[at + width..];
        }
        Value::from(Array::from_values(lines))
    })
}
