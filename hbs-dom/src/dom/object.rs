//! Objects with reference semantics
//!
//! An [`Object`] is an ordered collection of key/value pairs behind a shared [`ObjectImpl`].
//! Keys keep the position of their first insertion; setting an existing key replaces its value.

use crate::dom::string::DomString;
use crate::dom::value::Value;
use crate::dom::{read_lock, write_lock};
use std::fmt;
use std::sync::{Arc, RwLock};

/// Storage backing an [`Object`]
pub trait ObjectImpl: Send + Sync {
    fn type_key(&self) -> &'static str {
        "Object"
    }

    fn size(&self) -> usize;

    /// Value for `key`, or `Undefined` when absent
    fn get(&self, key: &str) -> Value;

    fn set(&self, key: DomString, value: Value);

    /// Call `f` for each entry in order until it returns `false`.
    /// Returns `false` when the visit was stopped early.
    fn visit(&self, f: &mut dyn FnMut(DomString, Value) -> bool) -> bool;

    fn exists(&self, key: &str) -> bool {
        let mut found = false;
        self.visit(&mut |k, _| {
            found = k == key;
            !found
        });
        found
    }

    /// Remove `key`, returning whether it was present
    fn remove(&self, key: &str) -> bool {
        let _ = key;
        false
    }
}

/// Insertion-ordered vector storage, the implementation behind `Object::new`
#[derive(Default)]
pub struct DefaultObjectImpl {
    entries: RwLock<Vec<(DomString, Value)>>,
}

impl DefaultObjectImpl {
    pub fn new(entries: Vec<(DomString, Value)>) -> Self {
        let imp = DefaultObjectImpl::default();
        for (key, value) in entries {
            imp.set(key, value);
        }
        imp
    }
}

impl ObjectImpl for DefaultObjectImpl {
    fn size(&self) -> usize {
        read_lock(&self.entries).len()
    }

    fn get(&self, key: &str) -> Value {
        read_lock(&self.entries)
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }

    fn set(&self, key: DomString, value: Value) {
        let mut entries = write_lock(&self.entries);
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
    }

    fn visit(&self, f: &mut dyn FnMut(DomString, Value) -> bool) -> bool {
        // Iterate a snapshot so the callback may mutate this object.
        let snapshot = read_lock(&self.entries).clone();
        for (key, value) in snapshot {
            if !f(key, value) {
                return false;
            }
        }
        true
    }

    fn exists(&self, key: &str) -> bool {
        read_lock(&self.entries).iter().any(|(k, _)| k == key)
    }

    fn remove(&self, key: &str) -> bool {
        let mut entries = write_lock(&self.entries);
        let before = entries.len();
        entries.retain(|(k, _)| k != key);
        entries.len() != before
    }
}

/// Shared handle to an object implementation
#[derive(Clone)]
pub struct Object {
    imp: Arc<dyn ObjectImpl>,
}

impl Object {
    /// A new, empty, mutable object
    pub fn new() -> Self {
        Object::from_impl(DefaultObjectImpl::default())
    }

    pub fn from_impl<I: ObjectImpl + 'static>(imp: I) -> Self {
        Object { imp: Arc::new(imp) }
    }

    pub fn from_arc(imp: Arc<dyn ObjectImpl>) -> Self {
        Object { imp }
    }

    pub fn type_key(&self) -> &'static str {
        self.imp.type_key()
    }

    pub fn size(&self) -> usize {
        self.imp.size()
    }

    pub fn len(&self) -> usize {
        self.size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn get(&self, key: &str) -> Value {
        self.imp.get(key)
    }

    pub fn set(&self, key: impl Into<DomString>, value: impl Into<Value>) {
        self.imp.set(key.into(), value.into())
    }

    pub fn exists(&self, key: &str) -> bool {
        self.imp.exists(key)
    }

    pub fn remove(&self, key: &str) -> bool {
        self.imp.remove(key)
    }

    pub fn visit<F>(&self, mut f: F) -> bool
    where
        F: FnMut(DomString, Value) -> bool,
    {
        self.imp.visit(&mut f)
    }

    /// Snapshot of the entries in order
    pub fn entries(&self) -> Vec<(DomString, Value)> {
        let mut out = Vec::with_capacity(self.size());
        self.visit(|k, v| {
            out.push((k, v));
            true
        });
        out
    }

    pub fn keys(&self) -> Vec<DomString> {
        let mut out = Vec::with_capacity(self.size());
        self.visit(|k, _| {
            out.push(k);
            true
        });
        out
    }

    pub fn values(&self) -> Vec<Value> {
        let mut out = Vec::with_capacity(self.size());
        self.visit(|_, v| {
            out.push(v);
            true
        });
        out
    }

    /// The entry at position `index` in visit order
    pub fn entry(&self, index: usize) -> Option<(DomString, Value)> {
        let mut current = 0;
        let mut found = None;
        self.visit(|k, v| {
            if current == index {
                found = Some((k, v));
                return false;
            }
            current += 1;
            true
        });
        found
    }

    /// A new default object holding a copy of this object's entries.
    /// Values are copied shallowly: nested containers stay aliased.
    pub fn clone_shallow(&self) -> Object {
        self.entries().into_iter().collect()
    }

    /// Identity comparison: both handles share one implementation
    pub fn ptr_eq(&self, other: &Object) -> bool {
        self.addr() == other.addr()
    }

    pub(crate) fn addr(&self) -> *const () {
        Arc::as_ptr(&self.imp) as *const ()
    }
}

impl Default for Object {
    fn default() -> Self {
        Object::new()
    }
}

impl<K: Into<DomString>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Object::from_impl(DefaultObjectImpl::new(entries))
    }
}

impl<K: Into<DomString>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Object {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Objects compare by identity
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// Only keys are printed so cyclic graphs can be debugged.
impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.type_key())
            .field("keys", &self.keys())
            .finish()
    }
}
