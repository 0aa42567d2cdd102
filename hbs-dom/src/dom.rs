//! Main module for the value model

pub mod array;
pub mod convert;
pub mod error;
pub mod function;
pub mod json;
pub mod lazy_array;
pub mod lazy_object;
pub mod object;
pub mod string;
pub mod value;

pub use array::{Array, ArrayImpl, DefaultArrayImpl};
pub use convert::ToValue;
pub use error::{Error, Result};
pub use function::{Function, FunctionImpl};
pub use lazy_array::LazyArray;
pub use lazy_object::{FieldIo, LazyFields, LazyObject};
pub use object::{DefaultObjectImpl, Object, ObjectImpl};
pub use string::DomString;
pub use value::{Key, Kind, Value};

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// A panic while holding a container lock cannot leave a Vec half-updated in a way
// that matters to readers, so poisoned locks are recovered rather than propagated.
pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
