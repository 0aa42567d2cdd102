//! # hbs
//!
//! A Handlebars-compatible template engine over the [`hbs_dom`] value model.
//!
//!     let mut hbs = Handlebars::new();
//!     hbs.register_partial("item", "<li>{{name}}</li>");
//!     let out = hbs.render("<ul>{{#each items}}{{> item}}{{/each}}</ul>", &context)?;
//!
//! Templates are parsed once into a [`Template`] and may be rendered many times. Rendering
//! walks the tree against a context stack and a data frame, dispatching helpers and partials
//! from the registries held by [`Handlebars`].
//!
//! The crate is organized as:
//!
//!     src/hbs
//!       ├── lexing         Tag scanner and expression tokens
//!       ├── parsing        Whitespace control, expressions and the tree builder
//!       ├── ast.rs         Template tree
//!       ├── render         Evaluator state and the options handed to helpers
//!       ├── helpers        Built-in helper libraries
//!       ├── registry.rs    Helper and partial registries
//!       ├── engine.rs      The public entry point
//!       └── ...            Errors, escaping, logging, render options

pub mod hbs;

pub use hbs::engine::{Handlebars, Template};
pub use hbs::error::{ParseError, RenderError};
pub use hbs::escape::escape_expression;
pub use hbs::options::RenderOptions;
pub use hbs::render::HelperOptions;
pub use hbs_dom::dom;
