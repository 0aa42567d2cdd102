//! Template tree
//!
//! A parsed template is a [`Program`]: a shared slice of [`Node`]s. Block bodies and partial
//! blocks are programs too, which lets render callbacks hold on to them cheaply.

use hbs_dom::dom::Value;
use std::ops::Range;
use std::sync::Arc;

pub type Program = Arc<[Node]>;

/// A path expression such as `this`, `../name`, `person.address.[street name]` or `@index`
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpr {
    /// `@`-prefixed data variable
    pub data: bool,
    /// Number of leading `..` segments
    pub depth: usize,
    /// Starts with `this`, `.` or `..`, which disables helper lookup
    pub scoped: bool,
    pub parts: Vec<String>,
    /// The path as written
    pub original: String,
}

impl PathExpr {
    /// A single identifier with no prefix, the only form that can name a helper
    pub fn is_simple(&self) -> bool {
        !self.data && !self.scoped && self.depth == 0 && self.parts.len() == 1
    }

    /// True for `this` and `.`
    pub fn is_this(&self) -> bool {
        !self.data && self.scoped && self.depth == 0 && self.parts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Path(PathExpr),
    Literal(Value),
    SubExpr(Box<Call>),
}

/// A head expression followed by positional parameters and `key=value` pairs
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub head: Expr,
    pub params: Vec<Expr>,
    pub hash: Vec<(String, Expr)>,
    pub span: Range<usize>,
}

impl Call {
    /// Name used for helper dispatch and error messages
    pub fn name(&self) -> String {
        match &self.head {
            Expr::Path(path) => path.original.clone(),
            Expr::Literal(value) => value.to_output_string(),
            Expr::SubExpr(call) => call.name(),
        }
    }

    pub fn has_arguments(&self) -> bool {
        !self.params.is_empty() || !self.hash.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub call: Call,
    pub block_params: Vec<String>,
    pub program: Program,
    pub inverse: Option<Program>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartialName {
    Static(String),
    Dynamic(Box<Call>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partial {
    pub name: PartialName,
    /// Explicit context argument
    pub context: Option<Expr>,
    pub hash: Vec<(String, Expr)>,
    /// Leading whitespace of a standalone partial tag, applied to every output line
    pub indent: String,
    /// Body of a `{{#> name}}` partial block
    pub block: Option<Program>,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(Arc<str>),
    Comment(String),
    Mustache { call: Call, escaped: bool },
    Block(Box<Block>),
    Partial(Box<Partial>),
    /// `{{#*inline "name"}}...{{/inline}}`
    Inline { name: String, program: Program },
}
