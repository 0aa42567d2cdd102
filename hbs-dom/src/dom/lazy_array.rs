//! Arrays converted element by element on access

use crate::dom::array::{Array, ArrayImpl};
use crate::dom::convert::ToValue;
use crate::dom::value::Value;
use std::sync::Arc;

type Convert<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;

/// A read-only Array over a shared vector of host values
pub struct LazyArray<T: Send + Sync + 'static> {
    elements: Arc<Vec<T>>,
    convert: Convert<T>,
}

impl<T: ToValue + Send + Sync + 'static> LazyArray<T> {
    pub fn new(elements: Arc<Vec<T>>) -> Self {
        LazyArray::with_converter(elements, |element: &T| element.to_value())
    }
}

impl<T: Send + Sync + 'static> LazyArray<T> {
    /// Convert elements with `convert`, which typically captures a context
    pub fn with_converter<F>(elements: Arc<Vec<T>>, convert: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        LazyArray {
            elements,
            convert: Box::new(convert),
        }
    }

    pub fn into_array(self) -> Array {
        Array::from_impl(self)
    }
}

impl<T: Send + Sync + 'static> ArrayImpl for LazyArray<T> {
    fn type_key(&self) -> &'static str {
        "LazyArray"
    }

    fn size(&self) -> usize {
        self.elements.len()
    }

    fn get(&self, index: usize) -> Value {
        self.elements
            .get(index)
            .map(|element| (self.convert)(element))
            .unwrap_or_default()
    }
}

impl<T: Send + Sync + 'static> From<LazyArray<T>> for Value {
    fn from(lazy: LazyArray<T>) -> Self {
        Value::Array(lazy.into_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_converts_on_access() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let arr = LazyArray::with_converter(Arc::new(vec![1, 2, 3]), move |n: &i32| {
            counter.fetch_add(1, Ordering::SeqCst);
            Value::from(n * 10)
        })
        .into_array();
        assert_eq!(arr.size(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(arr.get(2), Value::from(30));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_is_read_only() {
        let arr = LazyArray::new(Arc::new(vec!["a".to_string()])).into_array();
        assert_eq!(arr.get(0), Value::from("a"));
        assert_eq!(
            arr.push("b"),
            Err(Error::NotMutable {
                type_key: "LazyArray"
            })
        );
    }
}
