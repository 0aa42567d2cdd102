//! The dynamic value type
//!
//! [`Value`] is a tagged union over the nine kinds a template can observe. Primitives copy by
//! value; Array, Object and Function payloads are shared handles, so cloning a `Value` of those
//! kinds aliases the backing storage.
//!
//! Comparisons:
//!     - primitives compare by value, String and SafeString compare by text
//!     - arrays compare element by element
//!     - objects and functions compare by identity of the backing instance
//!     - values of different kinds order by kind

use crate::dom::array::{Array, ComparePath};
use crate::dom::error::{Error, Result};
use crate::dom::function::Function;
use crate::dom::object::Object;
use crate::dom::string::DomString;
use std::cmp::Ordering;
use std::fmt;

/// The kind tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Undefined,
    Null,
    Boolean,
    Integer,
    String,
    SafeString,
    Array,
    Object,
    Function,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Undefined => "undefined",
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::String => "string",
            Kind::SafeString => "safeString",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Function => "function",
        }
    }

    pub(crate) fn article_name(self) -> String {
        match self {
            Kind::Undefined | Kind::Integer | Kind::Array | Kind::Object => {
                format!("an {}", self.name())
            }
            _ => format!("a {}", self.name()),
        }
    }

    // String and SafeString share a rank so that they order by text.
    fn rank(self) -> u8 {
        match self {
            Kind::Undefined => 0,
            Kind::Null => 1,
            Kind::Boolean => 2,
            Kind::Integer => 3,
            Kind::String | Kind::SafeString => 4,
            Kind::Array => 5,
            Kind::Object => 6,
            Kind::Function => 7,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One dynamic datum
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Integer(i64),
    String(DomString),
    /// Text that bypasses HTML escaping
    SafeString(DomString),
    Array(Array),
    Object(Object),
    Function(Function),
}

/// A key accepted by [`Value::get`] and [`Value::set`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    Name(&'a str),
    Index(usize),
    /// A key that matches nothing, such as a negative index
    Invalid,
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(name: &'a str) -> Self {
        Key::Name(name)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(name: &'a String) -> Self {
        Key::Name(name.as_str())
    }
}

impl<'a> From<&'a DomString> for Key<'a> {
    fn from(name: &'a DomString) -> Self {
        Key::Name(name.as_str())
    }
}

impl From<usize> for Key<'_> {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<i64> for Key<'_> {
    fn from(index: i64) -> Self {
        usize::try_from(index).map_or(Key::Invalid, Key::Index)
    }
}

impl From<i32> for Key<'_> {
    fn from(index: i32) -> Self {
        Key::from(i64::from(index))
    }
}

impl<'a> From<&'a Value> for Key<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Integer(i) => Key::from(*i),
            Value::String(s) | Value::SafeString(s) => Key::Name(s.as_str()),
            _ => Key::Invalid,
        }
    }
}

static EMPTY_STRING: DomString = DomString::new();

impl Value {
    pub fn safe_string(text: impl Into<DomString>) -> Value {
        Value::SafeString(text.into())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Undefined => Kind::Undefined,
            Value::Null => Kind::Null,
            Value::Boolean(_) => Kind::Boolean,
            Value::Integer(_) => Kind::Integer,
            Value::String(_) => Kind::String,
            Value::SafeString(_) => Kind::SafeString,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::Function(_) => Kind::Function,
        }
    }

    /// Kind name for primitives, implementation key for containers
    pub fn type_key(&self) -> &'static str {
        match self {
            Value::Array(a) => a.type_key(),
            Value::Object(o) => o.type_key(),
            Value::Function(f) => f.type_key(),
            other => other.kind().name(),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_safe_string(&self) -> bool {
        matches!(self, Value::SafeString(_))
    }

    /// String or SafeString
    pub fn is_string_like(&self) -> bool {
        matches!(self, Value::String(_) | Value::SafeString(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            Value::Array(_) | Value::Object(_) | Value::Function(_)
        )
    }

    /// Precondition: the value is a Boolean
    pub fn get_bool(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            other => {
                debug_assert!(false, "get_bool on {}", other.kind());
                false
            }
        }
    }

    /// Precondition: the value is an Integer
    pub fn get_integer(&self) -> i64 {
        match self {
            Value::Integer(i) => *i,
            other => {
                debug_assert!(false, "get_integer on {}", other.kind());
                0
            }
        }
    }

    /// Precondition: the value is a String or SafeString
    pub fn get_string(&self) -> &DomString {
        match self {
            Value::String(s) | Value::SafeString(s) => s,
            other => {
                debug_assert!(false, "get_string on {}", other.kind());
                &EMPTY_STRING
            }
        }
    }

    pub fn get_array(&self) -> Result<&Array> {
        match self {
            Value::Array(a) => Ok(a),
            other => Err(other.mismatch(Kind::Array)),
        }
    }

    pub fn get_object(&self) -> Result<&Object> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(other.mismatch(Kind::Object)),
        }
    }

    pub fn get_function(&self) -> Result<&Function> {
        match self {
            Value::Function(f) => Ok(f),
            other => Err(other.mismatch(Kind::Function)),
        }
    }

    fn mismatch(&self, expected: Kind) -> Error {
        Error::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Text of a String or SafeString
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::SafeString(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        self.get_array().ok()
    }

    pub fn as_object(&self) -> Option<&Object> {
        self.get_object().ok()
    }

    pub fn as_function(&self) -> Option<&Function> {
        self.get_function().ok()
    }

    /// Member or element access. Never fails: any miss yields `Undefined`.
    ///
    /// Arrays accept numeric names (`items.0`), objects accept indices as names.
    pub fn get<'k>(&self, key: impl Into<Key<'k>>) -> Value {
        match (self, key.into()) {
            (Value::Object(o), Key::Name(name)) => o.get(name),
            (Value::Object(o), Key::Index(i)) => o.get(&i.to_string()),
            (Value::Array(a), Key::Index(i)) => a.get(i),
            (Value::Array(a), Key::Name(name)) => match name.parse::<usize>() {
                Ok(i) => a.get(i),
                Err(_) if name == "length" => Value::from(a.size()),
                Err(_) => Value::Undefined,
            },
            (Value::String(s) | Value::SafeString(s), Key::Name("length")) => {
                Value::from(s.chars().count())
            }
            _ => Value::Undefined,
        }
    }

    /// Sequential `get` over dot-separated segments
    pub fn lookup(&self, path: &str) -> Value {
        let mut current = self.clone();
        for segment in path.split('.') {
            current = current.get(segment);
            if current.is_undefined() {
                break;
            }
        }
        current
    }

    /// Member or element assignment, valid on Object and Array values
    pub fn set<'k>(&self, key: impl Into<Key<'k>>, value: impl Into<Value>) -> Result<()> {
        match (self, key.into()) {
            (Value::Object(o), Key::Name(name)) => {
                o.set(name, value);
                Ok(())
            }
            (Value::Object(o), Key::Index(i)) => {
                o.set(i.to_string(), value);
                Ok(())
            }
            (Value::Array(a), Key::Index(i)) => a.set(i, value),
            (Value::Array(a), Key::Name(name)) => match name.parse::<usize>() {
                Ok(i) => a.set(i, value),
                Err(_) => Err(Error::message(format!("invalid array index \"{}\"", name))),
            },
            (Value::Array(_), Key::Invalid) => Err(Error::message("invalid array index")),
            (other, _) => Err(other.mismatch(Kind::Object)),
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        match self {
            Value::Object(o) => o.exists(key),
            Value::Array(a) => key.parse::<usize>().is_ok_and(|i| i < a.size()),
            _ => false,
        }
    }

    /// Invoke a Function value
    pub fn call(&self, args: &Array) -> Result<Value> {
        self.get_function()?.call(args)
    }

    /// Character count for strings, element count for containers, zero otherwise
    pub fn size(&self) -> usize {
        match self {
            Value::String(s) | Value::SafeString(s) => s.chars().count(),
            Value::Array(a) => a.size(),
            Value::Object(o) => o.size(),
            _ => 0,
        }
    }

    /// False for Undefined, Null, false, 0 and the empty string. Containers and functions are
    /// truthy even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::String(s) | Value::SafeString(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Handlebars emptiness: an empty array, or any falsy value other than zero
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Array(a) => a.is_empty(),
            Value::Integer(_) => false,
            other => !other.is_truthy(),
        }
    }

    /// `self || other`
    pub fn or(&self, other: &Value) -> Value {
        if self.is_truthy() {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// `self && other`
    pub fn and(&self, other: &Value) -> Value {
        if self.is_truthy() {
            other.clone()
        } else {
            self.clone()
        }
    }

    /// `self + other` with JS-like coercion
    pub fn add(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::SafeString(a), Value::SafeString(b)) => Value::SafeString(a.concat(b)),
            (Value::Array(a), Value::Array(b)) => Value::Array(a.concat(b)),
            (a, b) if a.is_string_like() || b.is_string_like() => {
                let mut text = String::new();
                a.write_js_string(&mut text);
                b.write_js_string(&mut text);
                Value::from(text)
            }
            (a, b) => Value::Integer(a.to_integer().wrapping_add(b.to_integer())),
        }
    }

    // Numeric coercion used by `add`. Non-numeric strings and containers count as zero.
    fn to_integer(&self) -> i64 {
        match self {
            Value::Boolean(b) => i64::from(*b),
            Value::Integer(i) => *i,
            Value::String(s) | Value::SafeString(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    fn write_js_string(&self, out: &mut String) {
        match self {
            Value::Undefined => out.push_str("undefined"),
            Value::Null => out.push_str("null"),
            Value::Array(a) => {
                for (i, element) in a.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    if !element.is_undefined() && !element.is_null() {
                        element.write_js_string(out);
                    }
                }
            }
            Value::Function(_) => out.push_str("[object Function]"),
            other => other.write_output(out, &mut Vec::new()),
        }
    }

    /// The text a template renders for this value, before escaping
    ///
    /// Undefined and Null render empty. Arrays render their elements comma separated inside
    /// brackets, objects render as `[object Object]`.
    pub fn to_output_string(&self) -> String {
        let mut out = String::new();
        self.write_output(&mut out, &mut Vec::new());
        out
    }

    fn write_output(&self, out: &mut String, path: &mut Vec<*const ()>) {
        match self {
            Value::Undefined | Value::Null | Value::Function(_) => {}
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(i) => out.push_str(&i.to_string()),
            Value::String(s) | Value::SafeString(s) => out.push_str(s),
            Value::Array(a) => {
                let addr = a.addr();
                if path.contains(&addr) {
                    return;
                }
                path.push(addr);
                out.push('[');
                for (i, element) in a.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    element.write_output(out, path);
                }
                out.push(']');
                path.pop();
            }
            Value::Object(_) => out.push_str("[object Object]"),
        }
    }

    /// Identity for arrays, objects and functions, `==` for everything else
    pub fn same_as(&self, other: &Value) -> bool {
        match (self.container_addr(), other.container_addr()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self == other,
            _ => false,
        }
    }

    pub(crate) fn container_addr(&self) -> Option<*const ()> {
        match self {
            Value::Array(a) => Some(a.addr()),
            Value::Object(o) => Some(o.addr()),
            Value::Function(f) => Some(f.addr()),
            _ => None,
        }
    }
}

impl Value {
    pub(crate) fn eq_on(&self, other: &Value, path: &mut ComparePath) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (
                Value::String(a) | Value::SafeString(a),
                Value::String(b) | Value::SafeString(b),
            ) => a == b,
            (Value::Array(a), Value::Array(b)) => a.eq_on(b, path),
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }

    pub(crate) fn cmp_on(&self, other: &Value, path: &mut ComparePath) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
            (
                Value::String(a) | Value::SafeString(a),
                Value::String(b) | Value::SafeString(b),
            ) => a.partial_cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp_on(b, path),
            (a, b) if a.kind().rank() == b.kind().rank() => {
                match (a.container_addr(), b.container_addr()) {
                    (Some(x), Some(y)) => x.partial_cmp(&y),
                    _ => Some(Ordering::Equal),
                }
            }
            (a, b) => a.kind().rank().partial_cmp(&b.kind().rank()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.eq_on(other, &mut Vec::new())
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.cmp_on(other, &mut Vec::new())
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        self.as_integer() == Some(*other)
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl std::ops::Add for &Value {
    type Output = Value;

    fn add(self, rhs: &Value) -> Value {
        Value::add(self, rhs)
    }
}

impl std::ops::Add for Value {
    type Output = Value;

    fn add(self, rhs: Value) -> Value {
        Value::add(&self, &rhs)
    }
}

// Human-readable rendering. Containers print one level of children so cycles terminate.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Array(a) => {
                write!(f, "[")?;
                for (i, element) in a.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_summary(f, &element)?;
                }
                write!(f, "]")
            }
            Value::Object(o) => {
                if o.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, (key, value)) in o.entries().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    write_summary(f, value)?;
                }
                write!(f, " }}")
            }
            other => write_summary(f, other),
        }
    }
}

fn write_summary(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Undefined => write!(f, "undefined"),
        Value::Null => write!(f, "null"),
        Value::Boolean(b) => write!(f, "{}", b),
        Value::Integer(i) => write!(f, "{}", i),
        Value::String(s) | Value::SafeString(s) => write!(f, "\"{}\"", s),
        Value::Array(a) if a.is_empty() => write!(f, "[]"),
        Value::Array(_) => write!(f, "[...]"),
        Value::Object(o) if o.is_empty() => write!(f, "{{}}"),
        Value::Object(_) => write!(f, "{{...}}"),
        Value::Function(_) => write!(f, "[function]"),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Value::Integer(i64::from(i))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_wide_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Value::Integer(i64::try_from(i).unwrap_or(i64::MAX))
                }
            }
        )*
    };
}

impl_from_wide_integer!(u64, usize, isize);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(DomString::from(s))
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(DomString::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(DomString::from(s))
    }
}

impl From<DomString> for Value {
    fn from(s: DomString) -> Self {
        Value::String(s)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Undefined, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Undefined, false)]
    #[case(Value::Null, false)]
    #[case(Value::from(false), false)]
    #[case(Value::from(0), false)]
    #[case(Value::from(""), false)]
    #[case(Value::from(true), true)]
    #[case(Value::from(-1), true)]
    #[case(Value::from("0"), true)]
    #[case(Value::from(Array::new()), true)]
    #[case(Value::from(Object::new()), true)]
    fn test_truthiness(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(value.is_truthy(), expected);
    }

    #[rstest]
    #[case(Value::from(0), false)]
    #[case(Value::from(Array::new()), true)]
    #[case(Value::from(vec![1]), false)]
    #[case(Value::from(Object::new()), false)]
    #[case(Value::from(""), true)]
    #[case(Value::Null, true)]
    fn test_handlebars_emptiness(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(value.is_empty(), expected);
    }

    #[test]
    fn test_undefined_is_not_null() {
        assert_ne!(Value::Undefined, Value::Null);
        assert_eq!(Value::default().kind(), Kind::Undefined);
    }

    #[test]
    fn test_get_never_fails() {
        let obj = Value::from(Object::from([("a", 1)]));
        assert_eq!(obj.get("a"), 1);
        assert!(obj.get("b").is_undefined());
        assert!(obj.get(3usize).is_undefined());
        assert!(Value::from(5).get("x").is_undefined());
        assert!(Value::Null.get(0usize).is_undefined());
    }

    #[test]
    fn test_array_index_by_name() {
        let arr = Value::from(vec!["x", "y"]);
        assert_eq!(arr.get("1"), "y");
        assert_eq!(arr.get(0usize), "x");
        assert_eq!(arr.get(-1i64), Value::Undefined);
        assert_eq!(arr.get("length"), 2);
    }

    #[test]
    fn test_lookup_dotted_path() {
        let c = Object::from([("c", "deep")]);
        let b = Object::from([("b", c)]);
        let root = Value::from(Object::from([("a", b)]));
        assert_eq!(root.lookup("a.b.c"), "deep");
        assert!(root.lookup("a.x.c").is_undefined());
    }

    #[test]
    fn test_typed_accessor_mismatch() {
        let err = Value::from(1).get_object().unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: Kind::Object,
                found: Kind::Integer
            }
        );
        assert!(Value::from("s").get_array().is_err());
        assert!(Value::Null.get_function().is_err());
    }

    #[test]
    fn test_set_requires_container() {
        let obj = Value::from(Object::new());
        obj.set("k", 1).unwrap();
        assert_eq!(obj.get("k"), 1);
        assert!(Value::from(1).set("k", 1).is_err());
    }

    #[test]
    fn test_object_alias_sees_mutation() {
        let original = Value::from(Object::new());
        let copy = original.clone();
        copy.set("x", "y").unwrap();
        assert_eq!(original.get("x"), "y");
        assert_eq!(original, copy);
    }

    #[test]
    fn test_primitive_copy_is_independent() {
        let mut a = Value::from("one");
        let b = a.clone();
        a = Value::from("two");
        assert_eq!(b, "one");
        assert_eq!(a, "two");
    }

    #[test]
    fn test_string_kinds_compare_by_text() {
        assert_eq!(Value::from("a"), Value::safe_string("a"));
        assert!(Value::from("a") < Value::from("b"));
    }

    #[test]
    fn test_objects_compare_by_identity() {
        let a = Object::from([("k", 1)]);
        let b = Object::from([("k", 1)]);
        assert_ne!(Value::from(a.clone()), Value::from(b));
        assert_eq!(Value::from(a.clone()), Value::from(a));
    }

    #[test]
    fn test_cross_kind_ordering() {
        assert!(Value::Undefined < Value::Null);
        assert!(Value::from(true) < Value::from(0));
        assert!(Value::from(100) < Value::from("1"));
    }

    #[rstest]
    #[case(Value::from(1), Value::from(2), Value::from(3))]
    #[case(Value::from("a"), Value::from(1), Value::from("a1"))]
    #[case(Value::from(true), Value::from(true), Value::from(2))]
    #[case(Value::from("x"), Value::Undefined, Value::from("xundefined"))]
    #[case(Value::Null, Value::from(4), Value::from(4))]
    fn test_add_coercion(#[case] a: Value, #[case] b: Value, #[case] expected: Value) {
        assert_eq!(&a + &b, expected);
    }

    #[test]
    fn test_add_preserves_safe_string() {
        let sum = Value::safe_string("<b>") + Value::safe_string("</b>");
        assert!(sum.is_safe_string());
        let mixed = Value::safe_string("<b>") + Value::from("x");
        assert!(mixed.is_string());
    }

    #[test]
    fn test_add_concatenates_arrays() {
        let sum = Value::from(vec![1]) + Value::from(vec![2, 3]);
        assert_eq!(sum, Value::from(vec![1, 2, 3]));
    }

    #[test]
    fn test_or_and() {
        let zero = Value::from(0);
        let one = Value::from(1);
        assert_eq!(zero.or(&one), one);
        assert_eq!(one.or(&zero), one);
        assert_eq!(zero.and(&one), zero);
        assert_eq!(one.and(&Value::from("x")), "x");
    }

    #[test]
    fn test_output_string() {
        assert_eq!(Value::Undefined.to_output_string(), "");
        assert_eq!(Value::Null.to_output_string(), "");
        assert_eq!(Value::from(false).to_output_string(), "false");
        assert_eq!(Value::from(vec![1, 2]).to_output_string(), "[1,2]");
        assert_eq!(
            Value::from(Object::new()).to_output_string(),
            "[object Object]"
        );
    }

    #[test]
    fn test_same_as_is_identity_for_handles() {
        let a = Array::from_values(vec![Value::from(1)]);
        let b = Array::from_values(vec![Value::from(1)]);
        assert_eq!(Value::from(a.clone()), Value::from(b.clone()));
        assert!(!Value::from(a.clone()).same_as(&Value::from(b)));
        assert!(Value::from(a.clone()).same_as(&Value::from(a)));
        assert!(Value::from("x").same_as(&Value::from("x")));
        assert!(!Value::from(1).same_as(&Value::from(Object::new())));
    }

    #[test]
    fn test_display_summarizes_children() {
        let inner = Object::from([("z", 1)]);
        let obj = Value::from(Object::from([
            ("a", Value::from(1)),
            ("b", Value::from("s")),
            ("c", Value::from(inner)),
        ]));
        assert_eq!(obj.to_string(), "{ a: 1, b: \"s\", c: {...} }");
    }
}
