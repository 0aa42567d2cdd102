//! Array and object helpers
//!
//! Most helpers also accept strings, treating them as sequences of characters.

use super::string::{count, replace};
use super::{arg, bad_argument, normalize_index, register_operands};
use crate::hbs::registry::HelperRegistry;
use hbs_dom::dom::{Array, Object, Value};
use std::cmp::Ordering;

pub fn register(registry: &mut HelperRegistry) {
    let helpers: &[(&str, fn(&[Value]) -> Value)] = &[
        ("size", size),
        ("len", size),
        ("keys", keys),
        ("list", keys),
        ("iter", keys),
        ("values", values),
        ("items", items),
        ("entries", items),
        ("has", has),
        ("contains", has),
        ("exist", has),
        ("has_any", has_any),
        ("contains_any", has_any),
        ("exist_any", has_any),
        ("get", get),
        ("get_or", get),
        ("del", delete),
        ("delete", delete),
        ("first", first),
        ("head", first),
        ("front", first),
        ("last", last),
        ("tail", last),
        ("back", last),
        ("reverse", reverse),
        ("reversed", reverse),
        ("update", update),
        ("merge", update),
        ("fill", fill),
        ("count", count),
        ("replace", replace),
        ("sort", sort),
        ("sort_by", sort_by),
        ("at", at),
        ("concat", concat),
        ("unique", unique),
        ("pluck", pluck),
        ("group_by", group_by),
        ("chunk", chunk),
    ];
    for (name, helper) in helpers {
        register_operands(registry, name, *helper);
    }
}

fn order(a: &Value, b: &Value) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

fn chars_of(text: &str) -> Vec<Value> {
    text.chars().map(|c| Value::from(c.to_string())).collect()
}

pub fn size(args: &[Value]) -> Value {
    Value::from(arg(args, 0).size())
}

pub fn keys(args: &[Value]) -> Value {
    match arg(args, 0) {
        Value::Object(object) => Value::from(object.keys()),
        other => other,
    }
}

pub fn values(args: &[Value]) -> Value {
    match arg(args, 0) {
        Value::Object(object) => Value::from(object.values()),
        other => other,
    }
}

/// `[key, value]` pairs of an object, in member order
pub fn items(args: &[Value]) -> Value {
    match arg(args, 0) {
        Value::Object(object) => Value::from(
            object
                .entries()
                .into_iter()
                .map(|(key, value)| Value::from(Array::from_values(vec![Value::from(key), value])))
                .collect::<Array>(),
        ),
        other => other,
    }
}

/// An object member, an array element or a substring is present
pub fn has(args: &[Value]) -> Value {
    let needle = arg(args, 1);
    let found = match arg(args, 0) {
        Value::Object(object) => object.exists(&needle.to_output_string()),
        Value::Array(items) => items.iter().any(|item| item == needle),
        Value::String(text) | Value::SafeString(text) => {
            text.contains(needle.to_output_string().as_str())
        }
        _ => false,
    };
    Value::from(found)
}

/// Any of the keys of an array is an object member or an element of an array
pub fn has_any(args: &[Value]) -> Value {
    let needles = arg(args, 1);
    let Some(needles) = needles.as_array() else {
        return bad_argument("has_any", "an array of keys", &needles);
    };
    let found = match arg(args, 0) {
        Value::Object(object) => needles
            .iter()
            .any(|key| object.exists(&key.to_output_string())),
        Value::Array(items) => {
            let all = items.to_vec();
            needles.iter().any(|needle| all.contains(&needle))
        }
        _ => false,
    };
    Value::from(found)
}

/// A copy without the given member, or without every element equal to the item
pub fn delete(args: &[Value]) -> Value {
    let item = arg(args, 1);
    match arg(args, 0) {
        Value::Array(items) => Value::from(items.iter().filter(|v| *v != item).collect::<Array>()),
        Value::Object(object) => {
            let copy = object.clone_shallow();
            copy.remove(&item.to_output_string());
            Value::from(copy)
        }
        other => other,
    }
}

/// `{{update a b}}`
///
/// Objects take the members of `b` on top of their own. Arrays gain the elements of `b` they
/// do not already hold.
pub fn update(args: &[Value]) -> Value {
    let other = arg(args, 1);
    match (arg(args, 0), &other) {
        (Value::Object(x), Value::Object(y)) => {
            let merged = x.clone_shallow();
            for (key, value) in y.entries() {
                merged.set(key, value);
            }
            Value::from(merged)
        }
        (Value::Array(x), Value::Array(y)) => {
            let mut all = x.to_vec();
            for item in y.iter() {
                if !all.contains(&item) {
                    all.push(item);
                }
            }
            Value::from(Array::from_values(all))
        }
        (target, _) => target,
    }
}

/// `{{fill items value start stop}}`: a copy with `[start, stop)` set to `value`
pub fn fill(args: &[Value]) -> Value {
    let target = arg(args, 0);
    let Some(items) = target.as_array() else {
        return target;
    };
    let value = arg(args, 1);
    let n = items.size() as i64;
    let start = normalize_index(arg(args, 2).as_integer().unwrap_or(0), n);
    let stop = normalize_index(arg(args, 3).as_integer().unwrap_or(n), n);
    Value::from(
        items
            .iter()
            .zip(0..)
            .map(|(item, i)| if (start..stop).contains(&i) { value.clone() } else { item })
            .collect::<Array>(),
    )
}

/// `{{get container key default}}`
pub fn get(args: &[Value]) -> Value {
    let key = arg(args, 1);
    let found = arg(args, 0).get(&key);
    if found.is_undefined() {
        arg(args, 2)
    } else {
        found
    }
}

pub fn first(args: &[Value]) -> Value {
    match arg(args, 0) {
        Value::Array(items) if items.is_empty() => Value::Null,
        Value::Array(items) => items.first(),
        Value::Object(object) => object.entry(0).map_or(Value::Null, |(_, value)| value),
        Value::String(text) | Value::SafeString(text) => {
            text.chars().next().map_or(Value::Null, |c| Value::from(c.to_string()))
        }
        other => other,
    }
}

pub fn last(args: &[Value]) -> Value {
    match arg(args, 0) {
        Value::Array(items) if items.is_empty() => Value::Undefined,
        Value::Array(items) => items.last(),
        Value::Object(object) => object
            .size()
            .checked_sub(1)
            .and_then(|i| object.entry(i))
            .map_or(Value::Undefined, |(_, value)| value),
        Value::String(text) | Value::SafeString(text) => text
            .chars()
            .last()
            .map_or(Value::Undefined, |c| Value::from(c.to_string())),
        other => other,
    }
}

pub fn reverse(args: &[Value]) -> Value {
    match arg(args, 0) {
        Value::Array(items) => {
            let mut all = items.to_vec();
            all.reverse();
            Value::from(Array::from_values(all))
        }
        Value::Object(object) => {
            let mut entries = object.entries();
            entries.reverse();
            Value::from(entries.into_iter().collect::<Object>())
        }
        Value::String(text) | Value::SafeString(text) => {
            Value::from(text.chars().rev().collect::<String>())
        }
        other => other,
    }
}

pub fn sort(args: &[Value]) -> Value {
    match arg(args, 0) {
        Value::Array(items) => {
            let mut all = items.to_vec();
            all.sort_by(order);
            Value::from(Array::from_values(all))
        }
        Value::String(text) | Value::SafeString(text) => {
            let mut chars: Vec<char> = text.chars().collect();
            chars.sort_unstable();
            Value::from(chars.into_iter().collect::<String>())
        }
        other => other,
    }
}

/// Sort objects by one of their members
///
/// Objects come before other values, and objects missing the member come after those that
/// have it.
pub fn sort_by(args: &[Value]) -> Value {
    let target = arg(args, 0);
    let Some(items) = target.as_array() else {
        return bad_argument("sort_by", "an array", &target);
    };
    let key = arg(args, 1).to_output_string();
    let mut all = items.to_vec();
    all.sort_by(|a, b| match (a.as_object(), b.as_object()) {
        (Some(x), Some(y)) => match (x.exists(&key), y.exists(&key)) {
            (true, true) => order(&x.get(&key), &y.get(&key)),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => order(a, b),
    });
    Value::from(Array::from_values(all))
}

/// `{{at range index}}`: a character, an element at a wrapped index, or an object member
pub fn at(args: &[Value]) -> Value {
    let index = arg(args, 1);
    match arg(args, 0) {
        Value::String(text) | Value::SafeString(text) => {
            let Some(i) = index.as_integer() else {
                return bad_argument("at", "an integer index", &index);
            };
            let chars = chars_of(&text);
            let i = normalize_index(i, chars.len() as i64);
            chars.get(i as usize).cloned().unwrap_or(Value::Null)
        }
        Value::Array(items) => {
            let Some(i) = index.as_integer() else {
                return bad_argument("at", "an integer index", &index);
            };
            let i = normalize_index(i, items.size() as i64);
            items.get(i as usize)
        }
        Value::Object(object) => {
            let key = index.to_output_string();
            if object.exists(&key) {
                object.get(&key)
            } else {
                Value::Null
            }
        }
        other => bad_argument("at", "a string, array or object", &other),
    }
}

/// `{{concat a b sep}}`
///
/// Text joins with the optional separator, arrays append, objects merge with members of
/// `b` winning. Anything else adds.
pub fn concat(args: &[Value]) -> Value {
    let a = arg(args, 0);
    let b = arg(args, 1);
    match (&a, &b) {
        (a, b) if a.is_string_like() || b.is_string_like() => {
            let sep = args.get(2).map(Value::to_output_string).unwrap_or_default();
            Value::from(format!(
                "{}{}{}",
                a.to_output_string(),
                sep,
                b.to_output_string()
            ))
        }
        (Value::Array(x), Value::Array(y)) => Value::from(x.concat(y)),
        (Value::Object(x), Value::Object(y)) => {
            let merged = x.clone_shallow();
            for (key, value) in y.entries() {
                merged.set(key, value);
            }
            Value::from(merged)
        }
        (a, b) => a.add(b),
    }
}

/// Sorted elements without duplicates
pub fn unique(args: &[Value]) -> Value {
    let target = arg(args, 0);
    let Some(items) = target.as_array() else {
        return target;
    };
    let mut all = items.to_vec();
    all.sort_by(order);
    all.dedup();
    Value::from(Array::from_values(all))
}

/// The `key` member of every object that has one
pub fn pluck(args: &[Value]) -> Value {
    let target = arg(args, 0);
    let Some(items) = target.as_array() else {
        return bad_argument("pluck", "an array", &target);
    };
    let key = arg(args, 1).to_output_string();
    let plucked: Array = items
        .iter()
        .filter_map(|item| match item.as_object() {
            Some(object) if object.exists(&key) => Some(object.get(&key)),
            _ => None,
        })
        .collect();
    Value::from(plucked)
}

/// An object from each distinct `key` value to the objects carrying it
pub fn group_by(args: &[Value]) -> Value {
    let target = arg(args, 0);
    let Some(items) = target.as_array() else {
        return bad_argument("group_by", "an array", &target);
    };
    let key = arg(args, 1).to_output_string();
    let groups = Object::new();
    for item in items.iter() {
        let Some(object) = item.as_object() else {
            continue;
        };
        if !object.exists(&key) {
            continue;
        }
        let group = object.get(&key).to_output_string();
        match groups.get(&group) {
            Value::Array(members) => {
                // Default arrays are always mutable.
                let _ = members.push(item.clone());
            }
            _ => groups.set(group, Array::from_values(vec![item.clone()])),
        }
    }
    Value::from(groups)
}

/// Split into pieces of `size` elements, characters or members
pub fn chunk(args: &[Value]) -> Value {
    let size = arg(args, 1);
    let Some(n) = size.as_integer().filter(|n| *n > 0) else {
        return bad_argument("chunk", "a positive integer size", &size);
    };
    let n = n as usize;
    match arg(args, 0) {
        Value::Array(items) => {
            let all = items.to_vec();
            Value::from(
                all.chunks(n)
                    .map(|piece| Value::from(Array::from_values(piece.to_vec())))
                    .collect::<Array>(),
            )
        }
        Value::String(text) | Value::SafeString(text) => {
            let chars: Vec<char> = text.chars().collect();
            Value::from(
                chars
                    .chunks(n)
                    .map(|piece| Value::from(piece.iter().collect::<String>()))
                    .collect::<Array>(),
            )
        }
        Value::Object(object) => {
            let entries = object.entries();
            Value::from(
                entries
                    .chunks(n)
                    .map(|piece| Value::from(piece.iter().cloned().collect::<Object>()))
                    .collect::<Array>(),
            )
        }
        other => bad_argument("chunk", "an array, string or object", &other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use rstest::rstest;

    fn i(n: i64) -> Value {
        Value::from(n)
    }

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    fn list(items: &[Value]) -> Value {
        Value::from(items.to_vec())
    }

    fn person(name: &str, team: &str) -> Value {
        Value::from(Object::from([("name", s(name)), ("team", s(team))]))
    }

    #[rstest]
    #[case::size_array(size, vec![list(&[i(1), i(2)])], i(2))]
    #[case::size_string(size, vec![s("héllo")], i(5))]
    #[case::has_array(has, vec![list(&[i(1), i(2)]), i(2)], Value::from(true))]
    #[case::has_object(has, vec![person("a", "b"), s("team")], Value::from(true))]
    #[case::has_missing(has, vec![person("a", "b"), s("age")], Value::from(false))]
    #[case::get_default(get, vec![person("a", "b"), s("age"), i(7)], i(7))]
    #[case::get_index(get, vec![list(&[s("x"), s("y")]), i(1)], s("y"))]
    #[case::first(first, vec![list(&[i(1), i(2)])], i(1))]
    #[case::first_empty(first, vec![list(&[])], Value::Null)]
    #[case::last(last, vec![list(&[i(1), i(2)])], i(2))]
    #[case::last_empty(last, vec![list(&[])], Value::Undefined)]
    #[case::reverse(reverse, vec![list(&[i(1), i(2), i(3)])], list(&[i(3), i(2), i(1)]))]
    #[case::reverse_string(reverse, vec![s("abc")], s("cba"))]
    #[case::sort(sort, vec![list(&[i(3), i(1), i(2)])], list(&[i(1), i(2), i(3)]))]
    #[case::at_negative(at, vec![list(&[i(1), i(2), i(3)]), i(-1)], i(3))]
    #[case::at_string(at, vec![s("abc"), i(1)], s("b"))]
    #[case::concat_text(concat, vec![s("a"), s("b"), s("-")], s("a-b"))]
    #[case::concat_arrays(concat, vec![list(&[i(1)]), list(&[i(2)])], list(&[i(1), i(2)]))]
    #[case::concat_numbers(concat, vec![i(1), i(2)], i(3))]
    #[case::unique(unique, vec![list(&[i(2), i(1), i(2)])], list(&[i(1), i(2)]))]
    #[case::has_any_object(has_any, vec![person("a", "b"), list(&[s("age"), s("team")])], Value::from(true))]
    #[case::has_any_array(has_any, vec![list(&[i(1), i(2)]), list(&[i(3), i(4)])], Value::from(false))]
    #[case::has_any_bad(has_any, vec![list(&[i(1)]), i(1)], s("has_any: expected an array of keys, found integer"))]
    #[case::delete_array(delete, vec![list(&[i(1), i(2), i(1)]), i(1)], list(&[i(2)]))]
    #[case::delete_scalar(delete, vec![i(5), i(5)], i(5))]
    #[case::update_arrays(update, vec![list(&[i(1), i(2)]), list(&[i(2), i(3)])], list(&[i(1), i(2), i(3)]))]
    #[case::update_scalar(update, vec![i(1), list(&[i(2)])], i(1))]
    #[case::fill(fill, vec![list(&[i(1), i(2), i(3), i(4)]), i(0), i(1), i(3)], list(&[i(1), i(0), i(0), i(4)]))]
    #[case::fill_all(fill, vec![list(&[i(1), i(2)]), s("x")], list(&[s("x"), s("x")]))]
    #[case::fill_scalar(fill, vec![s("ab"), i(0)], s("ab"))]
    #[case::replace_elements(replace, vec![list(&[i(1), i(2), i(1)]), i(1), i(9)], list(&[i(9), i(2), i(9)]))]
    #[case::chunk_bad_size(chunk, vec![list(&[i(1)]), i(0)], s("chunk: expected a positive integer size, found integer"))]
    fn test_container_helpers(
        #[case] helper: fn(&[Value]) -> Value,
        #[case] args: Vec<Value>,
        #[case] expected: Value,
    ) {
        assert_eq!(helper(&args), expected);
    }

    #[test]
    fn test_items_and_object_edits() {
        let object = person("ada", "core");
        assert_eq!(
            items(&[object.clone()]),
            list(&[list(&[s("name"), s("ada")]), list(&[s("team"), s("core")])])
        );
        assert_eq!(items(&[i(3)]), i(3));

        let without = delete(&[object.clone(), s("team")]);
        assert_eq!(keys(&[without]), list(&[s("name")]));
        assert!(object.exists("team"));

        let extra = Value::from(Object::from([("team", s("docs")), ("age", i(36))]));
        let merged = update(&[object.clone(), extra]);
        assert_eq!(keys(&[merged.clone()]), list(&[s("name"), s("team"), s("age")]));
        assert_eq!(merged.get("team"), "docs");
        assert_eq!(object.get("team"), "core");
    }

    #[test]
    fn test_keys_and_values() {
        let object = person("ada", "core");
        assert_eq!(keys(&[object.clone()]), list(&[s("name"), s("team")]));
        assert_eq!(values(&[object]), list(&[s("ada"), s("core")]));
        assert_eq!(keys(&[i(3)]), i(3));
    }

    #[test]
    fn test_sort_by_puts_objects_with_the_key_first() {
        let items = list(&[
            person("cy", "b"),
            i(1),
            Value::from(Object::from([("team", s("z"))])),
            person("al", "a"),
        ]);
        let sorted = sort_by(&[items, s("name")]);
        assert_snapshot!(sorted.to_output_string(), @"[[object Object],[object Object],[object Object],1]");
        assert_eq!(sorted.get(0usize).get("name"), "al");
        assert_eq!(sorted.get(1usize).get("name"), "cy");
        assert!(sorted.get(2usize).get("name").is_undefined());
    }

    #[test]
    fn test_concat_merges_objects() {
        let merged = concat(&[person("a", "x"), Value::from(Object::from([("team", s("y"))]))]);
        assert_eq!(merged.get("name"), "a");
        assert_eq!(merged.get("team"), "y");
    }

    #[test]
    fn test_pluck_and_group_by() {
        let people = list(&[person("a", "red"), person("b", "blue"), person("c", "red")]);
        assert_eq!(pluck(&[people.clone(), s("name")]), list(&[s("a"), s("b"), s("c")]));

        let groups = group_by(&[people, s("team")]);
        assert_eq!(keys(&[groups.clone()]), list(&[s("red"), s("blue")]));
        assert_eq!(groups.get("red").size(), 2);
        assert_eq!(groups.get("blue").get(0usize).get("name"), "b");
    }

    #[test]
    fn test_chunk() {
        let chunks = chunk(&[list(&[i(1), i(2), i(3)]), i(2)]);
        assert_snapshot!(chunks.to_output_string(), @"[[1,2],[3]]");
        let text = chunk(&[s("abcde"), i(2)]);
        assert_snapshot!(text.to_output_string(), @"[ab,cd,e]");
        let members = chunk(&[person("a", "b"), i(1)]);
        assert_eq!(members.size(), 2);
        assert_eq!(members.get(1usize).get("team"), "b");
    }
}
