//! Per-render options

use hbs_dom::dom::Object;
use serde::Deserialize;

/// Default nesting limit for partials and blocks
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options controlling a single render
///
/// Deserializable so configuration files can provide everything except `data`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Disable HTML escaping of interpolated values
    pub no_escape: bool,
    /// Fail with `RenderError::MissingField` on paths that do not resolve
    pub strict: bool,
    /// Fail when a path reads through a missing member or from a null context
    pub assume_objects: bool,
    /// Keep the whitespace around tags that stand alone on their line
    pub ignore_standalone: bool,
    /// Do not indent the output of standalone partials
    pub prevent_indent: bool,
    /// Partials without a context argument render against an empty object
    pub explicit_partial_context: bool,
    /// Allow `__proto__` lookups
    pub allow_proto_properties_by_default: bool,
    /// Allow lookups of `constructor` and the legacy accessor methods when they hold functions
    pub allow_proto_methods_by_default: bool,
    /// Maximum nesting of partials and block bodies before the render is aborted
    pub max_depth: usize,
    /// Custom private data merged into the root data frame
    #[serde(skip)]
    pub data: Option<Object>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            no_escape: false,
            strict: false,
            assume_objects: false,
            ignore_standalone: false,
            prevent_indent: false,
            explicit_partial_context: false,
            allow_proto_properties_by_default: false,
            allow_proto_methods_by_default: false,
            max_depth: DEFAULT_MAX_DEPTH,
            data: None,
        }
    }
}

impl RenderOptions {
    pub fn with_data(mut self, data: Object) -> Self {
        self.data = Some(data);
        self
    }
}
