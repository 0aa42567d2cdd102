//! JSON stringify
//!
//! Output is indented with four spaces. Undefined and Function members are omitted from
//! containers; at the top level they render as `null`. A container reached again while it is
//! still being written is replaced by `"[recursive]"` or `"{recursive}"`.

use crate::dom::value::Value;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::ser::PrettyFormatter;
use std::cell::RefCell;

/// Serialize `value` as indented JSON
pub fn stringify(value: &Value) -> String {
    let path = RefCell::new(Vec::new());
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    match (Json { value, path: &path }).serialize(&mut serializer) {
        Ok(()) => String::from_utf8(out).unwrap_or_default(),
        Err(_) => "null".to_string(),
    }
}

/// Escape `text` for inclusion inside a JSON string literal
pub fn escape(text: &str) -> String {
    let quoted = serde_json::to_string(text).unwrap_or_default();
    quoted
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or_default()
        .to_string()
}

/// A value being written, with the containers currently open above it
struct Json<'a> {
    value: &'a Value,
    path: &'a RefCell<Vec<*const ()>>,
}

impl<'a> Json<'a> {
    fn child(&self, value: &'a Value) -> Json<'a> {
        Json {
            value,
            path: self.path,
        }
    }

    fn enter(&self, addr: *const ()) -> bool {
        let mut path = self.path.borrow_mut();
        if path.contains(&addr) {
            return false;
        }
        path.push(addr);
        true
    }

    fn leave(&self) {
        self.path.borrow_mut().pop();
    }
}

fn is_omitted(value: &Value) -> bool {
    matches!(value, Value::Undefined | Value::Function(_))
}

impl Serialize for Json<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Value::Undefined | Value::Null | Value::Function(_) => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::String(s) | Value::SafeString(s) => serializer.serialize_str(s),
            Value::Array(a) => {
                if !self.enter(a.addr()) {
                    return serializer.serialize_str("[recursive]");
                }
                let elements: Vec<Value> = a.iter().filter(|v| !is_omitted(v)).collect();
                let result = (|| {
                    let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                    for element in &elements {
                        seq.serialize_element(&self.child(element))?;
                    }
                    seq.end()
                })();
                self.leave();
                result
            }
            Value::Object(o) => {
                if !self.enter(o.addr()) {
                    return serializer.serialize_str("{recursive}");
                }
                let entries: Vec<_> = o
                    .entries()
                    .into_iter()
                    .filter(|(_, v)| !is_omitted(v))
                    .collect();
                let result = (|| {
                    let mut map = serializer.serialize_map(Some(entries.len()))?;
                    for (key, element) in &entries {
                        map.serialize_entry(&**key, &self.child(element))?;
                    }
                    map.end()
                })();
                self.leave();
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::array::Array;
    use crate::dom::function::Function;
    use crate::dom::object::Object;

    #[test]
    fn test_top_level_null_forms() {
        assert_eq!(stringify(&Value::Undefined), "null");
        assert_eq!(stringify(&Value::Null), "null");
        let f = Function::new(|_| Ok(Value::Null));
        assert_eq!(stringify(&Value::from(f)), "null");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(stringify(&Value::from(42)), "42");
        assert_eq!(stringify(&Value::from(true)), "true");
        assert_eq!(stringify(&Value::from("a\"b\n")), "\"a\\\"b\\n\"");
    }

    #[test]
    fn test_omits_undefined_and_function_members() {
        let obj = Object::new();
        obj.set("a", 1);
        obj.set("u", Value::Undefined);
        obj.set("f", Function::new(|_| Ok(Value::Null)));
        obj.set("n", Value::Null);
        assert_eq!(
            stringify(&Value::from(obj)),
            "{\n    \"a\": 1,\n    \"n\": null\n}"
        );
    }

    #[test]
    fn test_nested_indentation() {
        let obj = Object::from([("list", Value::from(vec![1, 2]))]);
        insta::assert_snapshot!(stringify(&Value::from(obj)), @r###"
        {
            "list": [
                1,
                2
            ]
        }
        "###);
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(stringify(&Value::from(Array::new())), "[]");
        assert_eq!(stringify(&Value::from(Object::new())), "{}");
    }

    #[test]
    fn test_self_referencing_object() {
        let obj = Object::new();
        obj.set("self", obj.clone());
        let text = stringify(&Value::from(obj));
        assert_eq!(text, "{\n    \"self\": \"{recursive}\"\n}");
    }

    #[test]
    fn test_self_referencing_array() {
        let arr = Array::new();
        arr.push(1).unwrap();
        arr.push(arr.clone()).unwrap();
        let text = stringify(&Value::from(arr));
        assert_eq!(text, "[\n    1,\n    \"[recursive]\"\n]");
    }

    #[test]
    fn test_shared_child_is_not_recursive() {
        let child = Object::from([("k", 1)]);
        let parent = Object::from([("a", child.clone()), ("b", child)]);
        let text = stringify(&Value::from(parent));
        assert!(!text.contains("recursive"));
    }

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(escape("\u{1}\t\\"), "\\u0001\\t\\\\");
    }
}
