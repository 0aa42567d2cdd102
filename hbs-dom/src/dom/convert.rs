//! Conversion of host types into values
//!
//! [`ToValue`] is the customization point through which host-defined types present themselves
//! to templates. The engine only ever sees the resulting [`Value`].
//!
//! JSON numbers have no exact counterpart: integral numbers become Integer, other numbers are
//! kept as their decimal text.

use crate::dom::array::Array;
use crate::dom::function::Function;
use crate::dom::object::Object;
use crate::dom::string::DomString;
use crate::dom::value::Value;
use std::sync::Arc;

/// Types that can be presented to templates as a [`Value`]
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }
}

macro_rules! impl_to_value_via_from {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

impl_to_value_via_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::from(self)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::from(self.as_str())
    }
}

impl ToValue for DomString {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for Array {
    fn to_value(&self) -> Value {
        Value::Array(self.clone())
    }
}

impl ToValue for Object {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl ToValue for Function {
    fn to_value(&self) -> Value {
        Value::Function(self.clone())
    }
}

/// `None` is Undefined, so optional members disappear from templates
impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Undefined,
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        Value::from(self)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Value::Integer(f as i64),
                    _ => Value::from(n.to_string()),
                },
            },
            serde_json::Value::String(s) => Value::from(s.as_str()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (DomString::from(k.as_str()), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Symbol {
        name: String,
        line: u32,
        brief: Option<String>,
    }

    impl ToValue for Symbol {
        fn to_value(&self) -> Value {
            Value::Object(Object::from([
                ("name", self.name.to_value()),
                ("line", self.line.to_value()),
                ("brief", self.brief.to_value()),
            ]))
        }
    }

    #[test]
    fn test_host_struct_conversion() {
        let sym = Symbol {
            name: "f".into(),
            line: 12,
            brief: None,
        };
        let value = sym.to_value();
        assert_eq!(value.get("name"), "f");
        assert_eq!(value.get("line"), 12);
        assert!(value.get("brief").is_undefined());
    }

    #[test]
    fn test_vec_of_host_values() {
        let names = vec!["a".to_string(), "b".to_string()];
        let value = names.to_value();
        assert_eq!(value.size(), 2);
        assert_eq!(value.get(1usize), "b");
    }

    #[test]
    fn test_json_object_conversion() {
        let value = Value::from(json!({"z": 1, "a": [true, null], "m": {"k": "v"}}));
        assert_eq!(value.get_object().unwrap().size(), 3);
        assert_eq!(value.get("z"), 1);
        assert!(value.get("a").get(1usize).is_null());
        assert_eq!(value.lookup("m.k"), "v");
    }

    #[test]
    fn test_json_object_keeps_declaration_order() {
        let value = Value::from(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<String> = value
            .get_object()
            .unwrap()
            .keys()
            .iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_json_numbers() {
        assert_eq!(Value::from(json!(3.0)), 3);
        assert_eq!(Value::from(json!(1.5)), "1.5");
        assert_eq!(Value::from(json!(-7)), -7);
    }
}
