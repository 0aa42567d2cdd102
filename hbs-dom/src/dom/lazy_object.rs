//! Objects computed on demand from a host model
//!
//! A [`LazyObject`] wraps a shared model and a context. The model describes its fields by
//! implementing [`LazyFields`]; that mapping is replayed against a [`FieldIo`] whenever the
//! object is queried:
//!
//!     - `get` replays the mapping and converts only the requested field
//!     - `exists` and `size` replay the mapping for names only
//!     - `visit` converts every field once and caches the result
//!
//! The mapping must therefore be pure. Values written with `set` land in an overlay object
//! which shadows the computed fields.
//!
//! ```ignore
//! impl LazyFields for Symbol {
//!     fn map_fields(&self, io: &mut FieldIo<'_>, _: &()) {
//!         io.map("name", &self.name);
//!         io.defer("members", || self.members.clone());
//!     }
//! }
//! let value = Value::from(LazyObject::new(Arc::new(symbol)).into_object());
//! ```

use crate::dom::convert::ToValue;
use crate::dom::object::{Object, ObjectImpl};
use crate::dom::string::DomString;
use crate::dom::value::Value;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Field mapping for a model presented through a [`LazyObject`]
pub trait LazyFields<C = ()>: Send + Sync + 'static {
    fn map_fields(&self, io: &mut FieldIo<'_>, context: &C);
}

enum Mode<'k> {
    Names(Vec<DomString>),
    Find { key: &'k str, found: Option<Value> },
    Collect(Vec<(DomString, Value)>),
}

/// Receives the field mapping of a [`LazyFields`] model
pub struct FieldIo<'k> {
    mode: Mode<'k>,
}

impl<'k> FieldIo<'k> {
    fn names() -> Self {
        FieldIo {
            mode: Mode::Names(Vec::new()),
        }
    }

    fn find(key: &'k str) -> Self {
        FieldIo {
            mode: Mode::Find { key, found: None },
        }
    }

    fn collect() -> Self {
        FieldIo {
            mode: Mode::Collect(Vec::new()),
        }
    }

    /// Whether the mapping still needs the value of `name`
    fn wants(&self, name: &str) -> bool {
        match &self.mode {
            Mode::Names(_) => false,
            Mode::Find { key, found } => found.is_none() && *key == name,
            Mode::Collect(_) => true,
        }
    }

    fn record(&mut self, name: &str, value: Option<Value>) {
        match &mut self.mode {
            Mode::Names(names) => {
                if !names.iter().any(|n| n == name) {
                    names.push(DomString::from(name));
                }
            }
            Mode::Find { found, .. } => {
                if found.is_none() {
                    *found = value;
                }
            }
            Mode::Collect(entries) => {
                let value = value.unwrap_or_default();
                match entries.iter_mut().find(|(k, _)| k == name) {
                    Some(slot) => slot.1 = value,
                    None => entries.push((DomString::from(name), value)),
                }
            }
        }
    }

    /// Declare a field whose value is converted from `value` when requested
    pub fn map<V: ToValue + ?Sized>(&mut self, name: &str, value: &V) {
        let converted = self.wants(name).then(|| value.to_value());
        self.record(name, converted);
    }

    /// Declare a field computed by `f` only when requested
    pub fn defer<V, F>(&mut self, name: &str, f: F)
    where
        V: ToValue,
        F: FnOnce() -> V,
    {
        let converted = self.wants(name).then(|| f().to_value());
        self.record(name, converted);
    }
}

/// An Object adapter whose fields are computed from a model plus a context
pub struct LazyObject<T, C = ()>
where
    T: LazyFields<C>,
    C: Send + Sync + 'static,
{
    model: Arc<T>,
    context: C,
    overlay: Object,
    materialized: OnceCell<Vec<(DomString, Value)>>,
}

impl<T: LazyFields<()>> LazyObject<T, ()> {
    pub fn new(model: Arc<T>) -> Self {
        LazyObject::with_context(model, ())
    }
}

impl<T, C> LazyObject<T, C>
where
    T: LazyFields<C>,
    C: Send + Sync + 'static,
{
    pub fn with_context(model: Arc<T>, context: C) -> Self {
        LazyObject {
            model,
            context,
            overlay: Object::new(),
            materialized: OnceCell::new(),
        }
    }

    /// Wrap in an [`Object`] handle
    pub fn into_object(self) -> Object {
        Object::from_impl(self)
    }

    pub fn model(&self) -> &Arc<T> {
        &self.model
    }

    fn field_names(&self) -> Vec<DomString> {
        let mut io = FieldIo::names();
        self.model.map_fields(&mut io, &self.context);
        match io.mode {
            Mode::Names(names) => names,
            _ => Vec::new(),
        }
    }

    fn find_field(&self, key: &str) -> Option<Value> {
        if let Some(fields) = self.materialized.get() {
            return fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone());
        }
        let mut io = FieldIo::find(key);
        self.model.map_fields(&mut io, &self.context);
        match io.mode {
            Mode::Find { found, .. } => found,
            _ => None,
        }
    }

    fn fields(&self) -> &[(DomString, Value)] {
        self.materialized.get_or_init(|| {
            let mut io = FieldIo::collect();
            self.model.map_fields(&mut io, &self.context);
            match io.mode {
                Mode::Collect(entries) => entries,
                _ => Vec::new(),
            }
        })
    }

    /// Whether enumeration has already cached the computed fields
    pub fn is_materialized(&self) -> bool {
        self.materialized.get().is_some()
    }
}

impl<T, C> ObjectImpl for LazyObject<T, C>
where
    T: LazyFields<C>,
    C: Send + Sync + 'static,
{
    fn type_key(&self) -> &'static str {
        "LazyObject"
    }

    fn size(&self) -> usize {
        let computed = self
            .field_names()
            .iter()
            .filter(|name| !self.overlay.exists(name))
            .count();
        computed + self.overlay.size()
    }

    fn get(&self, key: &str) -> Value {
        if self.overlay.exists(key) {
            return self.overlay.get(key);
        }
        self.find_field(key).unwrap_or_default()
    }

    fn set(&self, key: DomString, value: Value) {
        self.overlay.set(key, value);
    }

    fn visit(&self, f: &mut dyn FnMut(DomString, Value) -> bool) -> bool {
        for (key, value) in self.fields() {
            if self.overlay.exists(key) {
                continue;
            }
            if !f(key.clone(), value.clone()) {
                return false;
            }
        }
        self.overlay.visit(|k, v| f(k, v))
    }

    fn exists(&self, key: &str) -> bool {
        self.overlay.exists(key) || self.field_names().iter().any(|n| n == key)
    }
}

impl<T, C> From<LazyObject<T, C>> for Value
where
    T: LazyFields<C>,
    C: Send + Sync + 'static,
{
    fn from(lazy: LazyObject<T, C>) -> Self {
        Value::Object(lazy.into_object())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Model {
        name: String,
        count: i64,
        expensive_calls: AtomicUsize,
    }

    impl Model {
        fn new() -> Arc<Self> {
            Arc::new(Model {
                name: "widget".into(),
                count: 3,
                expensive_calls: AtomicUsize::new(0),
            })
        }
    }

    impl LazyFields for Model {
        fn map_fields(&self, io: &mut FieldIo<'_>, _: &()) {
            io.map("name", &self.name);
            io.map("count", &self.count);
            io.defer("expensive", || {
                self.expensive_calls.fetch_add(1, Ordering::SeqCst);
                "computed"
            });
        }
    }

    struct Greeting;

    impl LazyFields<String> for Greeting {
        fn map_fields(&self, io: &mut FieldIo<'_>, prefix: &String) {
            io.defer("text", || format!("{}, world", prefix));
        }
    }

    #[test]
    fn test_get_computes_only_requested_field() {
        let model = Model::new();
        let obj = LazyObject::new(model.clone()).into_object();
        assert_eq!(obj.get("name"), "widget");
        assert_eq!(model.expensive_calls.load(Ordering::SeqCst), 0);
        assert_eq!(obj.get("expensive"), "computed");
        assert_eq!(model.expensive_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_size_and_exists_skip_conversion() {
        let model = Model::new();
        let obj = LazyObject::new(model.clone()).into_object();
        assert_eq!(obj.size(), 3);
        assert!(obj.exists("expensive"));
        assert!(!obj.exists("missing"));
        assert_eq!(model.expensive_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_visit_materializes_once() {
        let model = Model::new();
        let obj = LazyObject::new(model.clone()).into_object();
        assert_eq!(obj.keys(), vec!["name", "count", "expensive"]);
        assert_eq!(obj.values().len(), 3);
        assert_eq!(obj.get("expensive"), "computed");
        assert_eq!(model.expensive_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_overlay_shadows_computed_fields() {
        let obj = LazyObject::new(Model::new()).into_object();
        obj.set("name", "override");
        obj.set("extra", true);
        assert_eq!(obj.get("name"), "override");
        assert_eq!(obj.size(), 4);
        assert_eq!(obj.keys(), vec!["count", "expensive", "name", "extra"]);
    }

    #[test]
    fn test_context_is_passed_to_mapping() {
        let obj = LazyObject::with_context(Arc::new(Greeting), "hello".to_string()).into_object();
        assert_eq!(obj.get("text"), "hello, world");
        assert_eq!(obj.type_key(), "LazyObject");
    }
}
