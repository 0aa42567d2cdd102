//! Splits template source into text runs and tags
//!
//! Recognized forms:
//!
//!     {{expr}}  {{{expr}}}  {{&expr}}         interpolation
//!     {{! c }}  {{!-- c --}}                  comments
//!     {{#x}} {{^x}} {{else}} {{^}} {{/x}}     blocks
//!     {{> p}}  {{#> p}}  {{#*inline "p"}}     partials
//!     {{{{raw}}}} ... {{{{/raw}}}}            raw blocks
//!
//! A `~` directly inside the opening or closing braces requests whitespace stripping on that
//! side. `\{{` renders a literal `{{`, and `\\{{` renders a backslash followed by the tag.

use crate::hbs::error::{ParseError, ParseResult};
use std::ops::Range;

/// The syntactic form of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Mustache { escaped: bool },
    Comment,
    BlockOpen,
    InverseOpen,
    PartialBlockOpen,
    InlineOpen,
    Else,
    Close,
    Partial,
    RawBlock,
}

impl TagKind {
    /// Tags that may stand alone on a line and take the line's whitespace with them
    pub fn can_stand_alone(&self) -> bool {
        !matches!(self, TagKind::Mustache { .. } | TagKind::RawBlock)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    /// Contents after the sigil, trimmed
    pub body: String,
    /// Byte offset of `body` in the source
    pub body_offset: usize,
    /// Verbatim content of a raw block
    pub raw_content: Option<String>,
    pub strip_before: bool,
    pub strip_after: bool,
    pub span: Range<usize>,
}

/// A run of literal text
///
/// Whitespace control trims the run without losing the original text: the visible part is
/// `text[start..end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl TextRun {
    fn new(text: String) -> Self {
        let end = text.len();
        TextRun {
            text,
            start: 0,
            end,
        }
    }

    pub fn visible(&self) -> &str {
        if self.start >= self.end {
            ""
        } else {
            &self.text[self.start..self.end]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Text(TextRun),
    Tag(Tag),
}

/// Scan `source` into a flat list of text runs and tags
pub fn scan(source: &str) -> ParseResult<Vec<Item>> {
    let mut scanner = Scanner {
        source,
        pos: 0,
        items: Vec::new(),
        text: String::new(),
    };
    scanner.run()?;
    Ok(scanner.items)
}

struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    items: Vec<Item>,
    text: String,
}

impl<'a> Scanner<'a> {
    fn run(&mut self) -> ParseResult<()> {
        while let Some(found) = self.source[self.pos..].find("{{") {
            let open = self.pos + found;
            let before = &self.source[self.pos..open];
            if before.ends_with("\\\\") {
                // `\\{{`: keep one backslash, then a real tag
                self.text.push_str(&before[..before.len() - 1]);
            } else if let Some(stripped) = before.strip_suffix('\\') {
                self.text.push_str(stripped);
                self.text.push_str("{{");
                self.pos = open + 2;
                continue;
            } else {
                self.text.push_str(before);
            }
            self.flush_text();
            let tag = self.scan_tag(open)?;
            self.pos = tag.span.end;
            self.items.push(Item::Tag(tag));
        }
        let rest = &self.source[self.pos..];
        self.text.push_str(rest);
        self.flush_text();
        Ok(())
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.items.push(Item::Text(TextRun::new(text)));
        }
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> ParseError {
        ParseError::new(message, self.source, offset)
    }

    fn scan_tag(&self, open: usize) -> ParseResult<Tag> {
        let s = self.source;
        if s[open..].starts_with("{{{{") {
            return self.scan_raw_block(open);
        }
        let mut i = open + 2;
        let strip_before = s[i..].starts_with('~');
        if strip_before {
            i += 1;
        }

        if s[i..].starts_with("!--") {
            return self.scan_long_comment(open, i + 3, strip_before);
        }
        if s[i..].starts_with('!') {
            let (content_end, end, strip_after) = self.find_close(open, i + 1, "}}", false)?;
            return Ok(Tag {
                kind: TagKind::Comment,
                body: s[i + 1..content_end].to_string(),
                body_offset: i + 1,
                raw_content: None,
                strip_before,
                strip_after,
                span: open..end,
            });
        }
        if s[i..].starts_with('{') {
            let (content_end, end, strip_after) = self.find_close(open, i + 1, "}}}", true)?;
            return Ok(self.tag(
                TagKind::Mustache { escaped: false },
                i + 1,
                content_end,
                strip_before,
                strip_after,
                open..end,
            ));
        }

        let (content_end, end, strip_after) = self.find_close(open, i, "}}", true)?;
        let content = &s[i..content_end];
        let (kind, sigil) = classify(content);
        Ok(self.tag(
            kind,
            i + sigil,
            content_end,
            strip_before,
            strip_after,
            open..end,
        ))
    }

    fn tag(
        &self,
        kind: TagKind,
        body_start: usize,
        body_end: usize,
        strip_before: bool,
        strip_after: bool,
        span: Range<usize>,
    ) -> Tag {
        let raw = &self.source[body_start..body_end];
        let leading = raw.len() - raw.trim_start().len();
        Tag {
            kind,
            body: raw.trim().to_string(),
            body_offset: body_start + leading,
            raw_content: None,
            strip_before,
            strip_after,
            span,
        }
    }

    /// Find `delim` at or after `from`, skipping quoted strings and `[literal]` segments when
    /// `expression` is set. Returns (content end, tag end, strip requested).
    fn find_close(
        &self,
        open: usize,
        from: usize,
        delim: &str,
        expression: bool,
    ) -> ParseResult<(usize, usize, bool)> {
        let bytes = self.source.as_bytes();
        let delim = delim.as_bytes();
        let mut quote: Option<u8> = None;
        let mut in_brackets = false;
        let mut j = from;
        while j < bytes.len() {
            let b = bytes[j];
            if let Some(q) = quote {
                if b == b'\\' {
                    j += 2;
                    continue;
                }
                if b == q {
                    quote = None;
                }
                j += 1;
                continue;
            }
            if in_brackets {
                if b == b']' {
                    in_brackets = false;
                }
                j += 1;
                continue;
            }
            if expression && (b == b'"' || b == b'\'') {
                quote = Some(b);
            } else if expression && b == b'[' {
                in_brackets = true;
            } else if bytes[j..].starts_with(delim) {
                let strip = j > from && bytes[j - 1] == b'~';
                let content_end = if strip { j - 1 } else { j };
                return Ok((content_end, j + delim.len(), strip));
            }
            j += 1;
        }
        Err(self.error("unterminated tag", open))
    }

    fn scan_long_comment(&self, open: usize, from: usize, strip_before: bool) -> ParseResult<Tag> {
        let s = self.source;
        let mut search = from;
        while let Some(found) = s[search..].find("--") {
            let dashes = search + found;
            let after = dashes + 2;
            let (strip_after, end) = if s[after..].starts_with("}}") {
                (false, after + 2)
            } else if s[after..].starts_with("~}}") {
                (true, after + 3)
            } else {
                search = dashes + 1;
                continue;
            };
            return Ok(Tag {
                kind: TagKind::Comment,
                body: s[from..dashes].to_string(),
                body_offset: from,
                raw_content: None,
                strip_before,
                strip_after,
                span: open..end,
            });
        }
        Err(self.error("unterminated comment", open))
    }

    fn scan_raw_block(&self, open: usize) -> ParseResult<Tag> {
        let s = self.source;
        let head_start = open + 4;
        let head_end = s[head_start..]
            .find("}}}}")
            .map(|p| head_start + p)
            .ok_or_else(|| self.error("unterminated raw block tag", open))?;
        let head = s[head_start..head_end].trim();
        let name = head
            .split_whitespace()
            .next()
            .ok_or_else(|| self.error("raw block requires a helper name", open))?;
        let closing = ["{{{{/", name, "}}}}"].concat();
        let content_start = head_end + 4;
        let close_at = s[content_start..]
            .find(&closing)
            .map(|p| content_start + p)
            .ok_or_else(|| self.error(format!("unterminated raw block \"{}\"", name), open))?;
        let leading = s[head_start..head_end].len() - s[head_start..head_end].trim_start().len();
        Ok(Tag {
            kind: TagKind::RawBlock,
            body: head.to_string(),
            body_offset: head_start + leading,
            raw_content: Some(s[content_start..close_at].to_string()),
            strip_before: false,
            strip_after: false,
            span: open..close_at + closing.len(),
        })
    }
}

/// Returns the tag kind and the length of its sigil
fn classify(content: &str) -> (TagKind, usize) {
    if content.starts_with("#>") {
        (TagKind::PartialBlockOpen, 2)
    } else if content.starts_with("#*") {
        (TagKind::InlineOpen, 2)
    } else if content.starts_with('#') {
        (TagKind::BlockOpen, 1)
    } else if content.starts_with('/') {
        (TagKind::Close, 1)
    } else if let Some(rest) = content.strip_prefix('^') {
        if rest.trim().is_empty() {
            (TagKind::Else, 1)
        } else {
            (TagKind::InverseOpen, 1)
        }
    } else if content.starts_with('>') {
        (TagKind::Partial, 1)
    } else if content.starts_with('&') {
        (TagKind::Mustache { escaped: false }, 1)
    } else {
        let leading = content.len() - content.trim_start().len();
        let trimmed = content.trim();
        let is_else = trimmed == "else"
            || (trimmed.starts_with("else")
                && trimmed[4..].starts_with(|c: char| c.is_whitespace()));
        if is_else {
            (TagKind::Else, leading + 4)
        } else {
            (TagKind::Mustache { escaped: true }, 0)
        }
    }
}
