//! Template evaluation
//!
//! A render walks a [`Program`](crate::hbs::ast::Program) with a [`RenderState`]:
//!
//!     contexts        the `this` stack, `..` steps one level out
//!     data            the current `@` frame, child frames shallow-copy their parent
//!     block params    names bound by `as |x y|`, innermost first
//!     partial blocks  bodies available as `@partial-block`
//!     inlines         inline partials visible at this point
//!
//! [`state`] owns the stacks and path resolution, [`eval`] dispatches nodes to helpers and
//! partials, and [`helper_options`] is the view of the state handed to helpers.

pub mod eval;
pub mod helper_options;
pub mod state;

pub use helper_options::HelperOptions;
pub use state::{create_frame, RenderState};
