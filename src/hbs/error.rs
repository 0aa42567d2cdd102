//! Error types for parsing and rendering

use crate::hbs::location::{Position, SourceLocation};
use hbs_dom::dom;
use std::fmt;

/// A template could not be compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
    /// Byte offset of the offending tag or token
    pub offset: usize,
    /// Numbered source lines around the error, with a `>>` marker on the error line
    pub source_context: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>, source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let position = SourceLocation::new(source).byte_to_position(offset);
        ParseError {
            message: message.into(),
            position,
            offset,
            source_context: format_source_context(source, position),
        }
    }

    /// 1-based line number
    pub fn line(&self) -> usize {
        self.position.line + 1
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    /// The message followed by the source excerpt
    pub fn report(&self) -> String {
        format!("{}\n\n{}", self, self.source_context)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

/// Type alias for parser results
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that abort a render
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The template or one of its partials failed to compile
    Parse(ParseError),
    /// A value model accessor failed, typically a type mismatch
    Dom(dom::Error),
    /// A helper reported a failure
    Helper { name: String, message: String },
    /// A path did not resolve in strict mode
    MissingField { path: String, context: String },
    /// Nested partials or blocks exceeded the configured depth
    RecursionLimit { limit: usize },
}

impl RenderError {
    pub fn helper(name: impl Into<String>, message: impl Into<String>) -> Self {
        RenderError::Helper {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Parse(err) => write!(f, "{}", err),
            RenderError::Dom(err) => write!(f, "{}", err),
            RenderError::Helper { message, .. } => write!(f, "{}", message),
            RenderError::MissingField { path, context } => {
                write!(f, "\"{}\" not defined in {}", path, context)
            }
            RenderError::RecursionLimit { limit } => {
                write!(f, "maximum render depth of {} exceeded", limit)
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Parse(err) => Some(err),
            RenderError::Dom(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for RenderError {
    fn from(err: ParseError) -> Self {
        RenderError::Parse(err)
    }
}

impl From<dom::Error> for RenderError {
    fn from(err: dom::Error) -> Self {
        RenderError::Dom(err)
    }
}

/// Format source code context around an error position
///
/// Shows 2 lines before the error, the error line with >> marker, and 2 lines after.
pub fn format_source_context(source: &str, position: Position) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let error_line = position.line;

    let start_line = error_line.saturating_sub(2);
    let end_line = (error_line + 3).min(lines.len());

    let mut context = String::new();

    for (line_num, line) in lines.iter().enumerate().take(end_line).skip(start_line) {
        let marker = if line_num == error_line { ">>" } else { "  " };
        context.push_str(&format!("{} {:3} | {}\n", marker, line_num + 1, line));
    }

    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_position() {
        let source = "line 1\n{{#if x}}\nline 3";
        let err = ParseError::new("unterminated block \"if\"", source, 7);
        assert_eq!(err.line(), 2);
        assert_eq!(err.column(), 0);
        assert_eq!(err.to_string(), "unterminated block \"if\" - 2:0");
    }

    #[test]
    fn test_format_source_context() {
        let source = "line 1\nline 2\nline 3\nerror line\nline 5\nline 6\nline 7";
        let context = format_source_context(source, Position::new(3, 0));

        assert!(context.contains("line 2"));
        assert!(context.contains(">>   4 | error line"));
        assert!(context.contains("line 6"));
        assert!(!context.contains("line 7"));
    }

    #[test]
    fn test_render_error_from_dom() {
        let err: RenderError = dom::Error::NotMutable { type_key: "Lazy" }.into();
        assert_eq!(err.to_string(), "Lazy is not mutable");
    }
}
