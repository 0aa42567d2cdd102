//! Token definitions for the expression language inside tags
//!
//! The tokens are defined using the logos derive macro. Token payloads are not stored: the
//! parser slices the tag body with the token span, the same way the rest of the pipeline
//! carries `(Token, Range<usize>)` pairs.
use crate::hbs::error::{ParseError, ParseResult};
use logos::Logos;
use std::ops::Range;

/// All possible tokens inside a tag
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("=")]
    Equals,
    #[token("|")]
    Pipe,

    // Quoted string literal, either quote style, with backslash escapes
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r#"'([^'\\]|\\.)*'"#)]
    Str,

    // Integer literal - wins over Path for input both can match
    #[regex(r"-?[0-9]+", priority = 10)]
    Number,

    // Identifiers and paths: `foo`, `../foo.bar`, `@index`, `[literal segment]/x`
    #[regex(r#"@?(\[[^\]]*\]|[^\s()=|"'\[\]])+"#, priority = 1)]
    Path,
}

impl Token {
    /// Check if this token can start an expression
    pub fn starts_expression(&self) -> bool {
        matches!(
            self,
            Token::OpenParen | Token::Str | Token::Number | Token::Path
        )
    }
}

/// Tokenize a tag body. `offset` is the position of `body` in the template source.
pub fn tokenize(body: &str, source: &str, offset: usize) -> ParseResult<Vec<(Token, Range<usize>)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(body);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(ParseError::new(
                    format!("unexpected \"{}\" in expression", &body[span.clone()]),
                    source,
                    offset + span.start,
                ))
            }
        }
    }
    Ok(tokens)
}

/// Strip the quotes from a string literal and resolve backslash escapes
pub fn unquote(literal: &str) -> String {
    let inner = if literal.len() >= 2 {
        &literal[1..literal.len() - 1]
    } else {
        literal
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
