//! Lexing for templates
//!
//! Lexing happens in two layers. The [`scanner`] splits template source into text runs and
//! tags, honoring escapes, comments and raw blocks. The [`tokens`] layer then tokenizes the
//! inside of a tag (paths, literals, parentheses, hash pairs, block parameters) with logos.

pub mod scanner;
pub mod tokens;

pub use scanner::{scan, Item, Tag, TagKind, TextRun};
pub use tokens::{tokenize, Token};
