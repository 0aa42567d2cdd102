//! # hbs-dom
//!
//! The dynamic value model consumed by the hbs template engine.
//!
//! The metadata layer of a documentation generator produces a tree of facts (symbols, names,
//! members, locations). Templates never see those host types directly: they see [`dom::Value`],
//! a JSON-like tagged union with reference semantics for containers.
//!
//! File Layout
//!
//!     src/dom
//!       ├── string.rs         Immutable, shared text buffer
//!       ├── array.rs          Array handle + ArrayImpl trait + default vector impl
//!       ├── object.rs         Object handle + ObjectImpl trait + default ordered impl
//!       ├── function.rs       Native callables stored as values
//!       ├── value.rs          The Value union, comparisons and JS-like operators
//!       ├── lazy_object.rs    Objects whose fields are computed from a host model
//!       ├── lazy_array.rs     Arrays whose elements are converted on access
//!       ├── convert.rs        ToValue customization point for host types
//!       ├── json.rs           JSON stringify and escaping
//!       └── error.rs          Error types for the value model
//!
//! Copying a [`dom::Value`] that holds an Array, Object or Function aliases the backing storage:
//! a `set` through one handle is visible through every other handle. Strings, booleans and
//! integers copy independently.

pub mod dom;
