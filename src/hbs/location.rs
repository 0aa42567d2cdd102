//! Position tracking for template sources
//!
//! Tags and expressions carry byte offsets into the template source. Those offsets are only
//! turned into line:column positions when an error is reported.
//!
//! - [`Position`] - A 0-based line:column position
//! - [`SourceLocation`] - Converts byte offsets to positions with a binary search over line starts

use std::fmt;

/// A position in template source (0-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Displays as 1-based `line:column`, the form editors expect
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column)
    }
}

/// Provides fast conversion from byte offsets to line/column positions
pub struct SourceLocation {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl SourceLocation {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a line/column position
    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);

        let column = byte_offset - self.line_starts[line];

        Position::new(line, column)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_to_position() {
        let loc = SourceLocation::new("ab\ncd\n\nef");
        assert_eq!(loc.byte_to_position(0), Position::new(0, 0));
        assert_eq!(loc.byte_to_position(1), Position::new(0, 1));
        assert_eq!(loc.byte_to_position(3), Position::new(1, 0));
        assert_eq!(loc.byte_to_position(6), Position::new(2, 0));
        assert_eq!(loc.byte_to_position(8), Position::new(3, 1));
        assert_eq!(loc.line_count(), 4);
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(Position::new(0, 4).to_string(), "1:4");
    }
}
