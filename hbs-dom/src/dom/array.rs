//! Arrays with reference semantics
//!
//! An [`Array`] is a handle over an [`ArrayImpl`]. Cloning the handle aliases the elements;
//! a `set` through one clone is observed by all of them.

use crate::dom::error::{Error, Result};
use crate::dom::value::Value;
use crate::dom::{read_lock, write_lock};
use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Storage backing an [`Array`]
///
/// `get` is only called with `index < size()`. Implementations that cannot be mutated keep
/// the default `set` and `emplace_back`, which report [`Error::NotMutable`].
pub trait ArrayImpl: Send + Sync {
    fn type_key(&self) -> &'static str {
        "Array"
    }

    fn size(&self) -> usize;

    fn get(&self, index: usize) -> Value;

    fn set(&self, index: usize, value: Value) -> Result<()> {
        let _ = (index, value);
        Err(Error::NotMutable {
            type_key: self.type_key(),
        })
    }

    fn emplace_back(&self, value: Value) -> Result<()> {
        let _ = value;
        Err(Error::NotMutable {
            type_key: self.type_key(),
        })
    }
}

/// Growable vector storage, the implementation behind `Array::new`
#[derive(Default)]
pub struct DefaultArrayImpl {
    elements: RwLock<Vec<Value>>,
}

impl DefaultArrayImpl {
    pub fn new(elements: Vec<Value>) -> Self {
        DefaultArrayImpl {
            elements: RwLock::new(elements),
        }
    }
}

impl ArrayImpl for DefaultArrayImpl {
    fn size(&self) -> usize {
        read_lock(&self.elements).len()
    }

    fn get(&self, index: usize) -> Value {
        read_lock(&self.elements)
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    fn set(&self, index: usize, value: Value) -> Result<()> {
        let mut elements = write_lock(&self.elements);
        let size = elements.len();
        match elements.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfRange { index, size }),
        }
    }

    fn emplace_back(&self, value: Value) -> Result<()> {
        write_lock(&self.elements).push(value);
        Ok(())
    }
}

/// Shared handle to an array implementation
#[derive(Clone)]
pub struct Array {
    imp: Arc<dyn ArrayImpl>,
}

impl Array {
    /// A new, empty, mutable array
    pub fn new() -> Self {
        Array::from_impl(DefaultArrayImpl::default())
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Array::from_impl(DefaultArrayImpl::new(values))
    }

    pub fn from_impl<I: ArrayImpl + 'static>(imp: I) -> Self {
        Array { imp: Arc::new(imp) }
    }

    pub fn from_arc(imp: Arc<dyn ArrayImpl>) -> Self {
        Array { imp }
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

    /// Element at `index`, or `Undefined` past the end
    pub fn get(&self, index: usize) -> Value {
        if index < self.imp.size() {
            self.imp.get(index)
        } else {
            Value::Undefined
        }
    }

    /// Checked element access
    pub fn at(&self, index: usize) -> Result<Value> {
        let size = self.imp.size();
        if index < size {
            Ok(self.imp.get(index))
        } else {
            Err(Error::IndexOutOfRange { index, size })
        }
    }

    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        self.imp.set(index, value.into())
    }

    pub fn emplace_back(&self, value: impl Into<Value>) -> Result<()> {
        self.imp.emplace_back(value.into())
    }

    pub fn push(&self, value: impl Into<Value>) -> Result<()> {
        self.emplace_back(value)
    }

    pub fn first(&self) -> Value {
        self.get(0)
    }

    pub fn last(&self) -> Value {
        match self.size() {
            0 => Value::Undefined,
            n => self.get(n - 1),
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            array: self,
            index: 0,
            size: self.size(),
        }
    }

    /// Copy the elements out into a vector
    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().collect()
    }

    /// A new array holding the elements of `self` followed by those of `other`
    pub fn concat(&self, other: &Array) -> Array {
        self.iter().chain(other.iter()).collect()
    }

    /// Identity comparison: both handles share one implementation
    pub fn ptr_eq(&self, other: &Array) -> bool {
        self.addr() == other.addr()
    }

    pub(crate) fn addr(&self) -> *const () {
        Arc::as_ptr(&self.imp) as *const ()
    }
}

impl Default for Array {
    fn default() -> Self {
        Array::new()
    }
}

impl From<Vec<Value>> for Array {
    fn from(elements: Vec<Value>) -> Self {
        Array::from_values(elements)
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Array::from(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Pairs of arrays being compared, outermost first
pub(crate) type ComparePath = Vec<(*const (), *const ())>;

impl Array {
    // A pair reached again while it is still being compared counts as equal.
    pub(crate) fn eq_on(&self, other: &Array, path: &mut ComparePath) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let pair = (self.addr(), other.addr());
        if path.contains(&pair) {
            return true;
        }
        if self.size() != other.size() {
            return false;
        }
        path.push(pair);
        let equal = self
            .iter()
            .zip(other.iter())
            .all(|(a, b)| a.eq_on(&b, path));
        path.pop();
        equal
    }

    pub(crate) fn cmp_on(&self, other: &Array, path: &mut ComparePath) -> Option<Ordering> {
        let pair = (self.addr(), other.addr());
        if self.ptr_eq(other) || path.contains(&pair) {
            return Some(Ordering::Equal);
        }
        path.push(pair);
        let mut result = Some(self.size().cmp(&other.size()));
        for (a, b) in self.iter().zip(other.iter()) {
            match a.cmp_on(&b, path) {
                Some(Ordering::Equal) => continue,
                unequal => {
                    result = unequal;
                    break;
                }
            }
        }
        path.pop();
        result
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.eq_on(other, &mut Vec::new())
    }
}

impl PartialOrd for Array {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.cmp_on(other, &mut Vec::new())
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over the elements of an [`Array`]
///
/// The size is captured when the iterator is created.
pub struct Iter<'a> {
    array: &'a Array,
    index: usize,
    size: usize,
}

impl Iterator for Iter<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.index >= self.size {
            return None;
        }
        let value = self.array.get(self.index);
        self.index += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = Value;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl ArrayImpl for Fixed {
        fn type_key(&self) -> &'static str {
            "Fixed"
        }

        fn size(&self) -> usize {
            2
        }

        fn get(&self, index: usize) -> Value {
            Value::from(index as i64 * 10)
        }
    }

    #[test]
    fn test_push_and_get() {
        let arr = Array::new();
        assert!(arr.is_empty());
        arr.emplace_back(1).unwrap();
        arr.emplace_back("two").unwrap();
        assert_eq!(arr.size(), 2);
        assert_eq!(arr.get(0), Value::from(1));
        assert_eq!(arr.get(1), Value::from("two"));
        assert!(arr.get(2).is_undefined());
    }

    #[test]
    fn test_clone_aliases_storage() {
        let a = Array::new();
        let b = a.clone();
        a.emplace_back(true).unwrap();
        assert_eq!(b.size(), 1);
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn test_set_out_of_range() {
        let arr = Array::from(vec![Value::from(1)]);
        assert_eq!(
            arr.set(3, 0),
            Err(Error::IndexOutOfRange { index: 3, size: 1 })
        );
        arr.set(0, 5).unwrap();
        assert_eq!(arr.get(0), Value::from(5));
    }

    #[test]
    fn test_read_only_impl() {
        let arr = Array::from_impl(Fixed);
        assert_eq!(arr.type_key(), "Fixed");
        assert_eq!(arr.get(1), Value::from(10));
        assert_eq!(
            arr.emplace_back(1),
            Err(Error::NotMutable { type_key: "Fixed" })
        );
    }

    #[test]
    fn test_structural_equality() {
        let a: Array = vec![Value::from(1), Value::from("x")].into();
        let b: Array = vec![Value::from(1), Value::from("x")].into();
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert_ne!(a, Array::new());
    }

    #[test]
    fn test_self_referential_arrays_compare() {
        let a = Array::new();
        a.push(1).unwrap();
        a.push(a.clone()).unwrap();
        let b = Array::new();
        b.push(1).unwrap();
        b.push(b.clone()).unwrap();
        let c = Array::new();
        c.push(2).unwrap();
        c.push(c.clone()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Equal));
        assert_eq!(a.partial_cmp(&c), Some(Ordering::Less));
    }

    #[test]
    fn test_concat_creates_new_array() {
        let a: Array = vec![Value::from(1)].into();
        let b: Array = vec![Value::from(2)].into();
        let c = a.concat(&b);
        assert_eq!(c.to_vec(), vec![Value::from(1), Value::from(2)]);
        assert_eq!(a.size(), 1);
    }
}
