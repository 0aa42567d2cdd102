//! Reference semantics, cycles and lazy materialization across threads

use hbs_dom::dom::json::{escape, stringify};
use hbs_dom::dom::{Array, FieldIo, LazyFields, LazyObject, Object, ToValue, Value};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn copies_of_containers_alias_storage() {
    let arr = Value::from(Array::new());
    let copy = arr.clone();
    copy.get_array().unwrap().push("x").unwrap();
    assert_eq!(arr.size(), 1);

    let obj = Value::from(Object::new());
    let copy = obj.clone();
    copy.set("k", 1).unwrap();
    assert_eq!(obj.get("k"), 1);
}

#[test]
fn copies_of_primitives_are_independent() {
    let n = Value::from(1);
    let mut m = n.clone();
    m = &m + &Value::from(1);
    assert_eq!(n, 1);
    assert_eq!(m, 2);
}

#[test]
fn mutually_recursive_objects_stringify() {
    let a = Object::new();
    let b = Object::new();
    a.set("b", b.clone());
    b.set("a", a.clone());
    b.set("list", Array::from_values(vec![Value::from(a.clone())]));
    let text = stringify(&Value::from(a));
    assert!(text.contains("\"{recursive}\""));
    assert!(!text.contains("[recursive]"));
}

#[test]
fn array_cycle_through_object() {
    let arr = Array::new();
    let obj = Object::from([("arr", arr.clone())]);
    arr.push(obj).unwrap();
    let text = stringify(&Value::from(arr));
    assert!(text.contains("\"[recursive]\""));
}

struct Counted {
    conversions: AtomicUsize,
}

impl LazyFields for Counted {
    fn map_fields(&self, io: &mut FieldIo<'_>, _: &()) {
        io.defer("a", || {
            self.conversions.fetch_add(1, Ordering::SeqCst);
            1
        });
        io.map("b", "two");
    }
}

#[test]
fn lazy_object_materializes_once_across_threads() {
    let model = Arc::new(Counted {
        conversions: AtomicUsize::new(0),
    });
    let obj = LazyObject::new(model.clone()).into_object();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let obj = obj.clone();
            thread::spawn(move || obj.entries().len())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
    assert_eq!(model.conversions.load(Ordering::SeqCst), 1);
}

#[test]
fn lazy_object_stringifies_like_plain_object() {
    let model = Arc::new(Counted {
        conversions: AtomicUsize::new(0),
    });
    let lazy = Value::from(LazyObject::new(model));
    let plain = Value::from(Object::from([("a", Value::from(1)), ("b", "two".to_value())]));
    assert_eq!(stringify(&lazy), stringify(&plain));
}

#[test]
fn distinct_cyclic_arrays_compare_without_overflow() {
    let a = Array::new();
    a.push(a.clone()).unwrap();
    let b = Array::new();
    b.push(b.clone()).unwrap();
    assert_eq!(Value::from(a.clone()), Value::from(b.clone()));
    assert!(Value::from(a) <= Value::from(b));
}

proptest! {
    #[test]
    fn escaped_json_has_no_raw_controls(text in "\\PC*|[\\x00-\\x1f\"\\\\]*") {
        let escaped = escape(&text);
        prop_assert!(!escaped.chars().any(|c| (c as u32) < 0x20));
    }

    #[test]
    fn stringify_terminates_on_nested_arrays(depth in 0usize..40) {
        let mut value = Value::from(1);
        for _ in 0..depth {
            value = Value::Array(Array::from_values(vec![value]));
        }
        let text = stringify(&value);
        prop_assert_eq!(text.matches('[').count(), depth);
    }
}
