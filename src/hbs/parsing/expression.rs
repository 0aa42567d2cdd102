//! Expression parser for tag bodies
//!
//! A tag body is tokenized by [`tokenize`] and parsed by recursive descent:
//!
//!     call        := expr param* hash* block_params?
//!     param       := expr
//!     hash        := PATH "=" expr
//!     expr        := "(" call ")" | STRING | NUMBER | PATH
//!     block_params:= "as" "|" PATH+ "|"
//!
//! Paths are split into segments here, so the evaluator only ever sees [`PathExpr`]s.

use crate::hbs::ast::{Call, Expr, PartialName, PathExpr};
use crate::hbs::error::{ParseError, ParseResult};
use crate::hbs::lexing::{tokenize, Token};
use crate::hbs::lexing::tokens::unquote;
use hbs_dom::dom::Value;
use std::ops::Range;

/// A parsed `{{> ...}}` body
#[derive(Debug, Clone, PartialEq)]
pub struct PartialHead {
    pub name: PartialName,
    pub context: Option<Expr>,
    pub hash: Vec<(String, Expr)>,
}

/// Parse the body of an interpolation tag
pub fn parse_call(body: &str, source: &str, offset: usize) -> ParseResult<Call> {
    let mut parser = ExprParser::new(body, source, offset)?;
    let call = parser.call()?;
    parser.expect_end()?;
    Ok(call)
}

/// Parse the body of a block opening tag, including its block parameters
pub fn parse_block_open(
    body: &str,
    source: &str,
    offset: usize,
) -> ParseResult<(Call, Vec<String>)> {
    let mut parser = ExprParser::new(body, source, offset)?;
    let call = parser.call()?;
    let params = parser.block_params()?;
    parser.expect_end()?;
    Ok((call, params))
}

/// Parse the body of a partial tag: name, optional context then hash arguments
pub fn parse_partial(body: &str, source: &str, offset: usize) -> ParseResult<PartialHead> {
    let mut parser = ExprParser::new(body, source, offset)?;
    let name = parser.partial_name()?;
    let mut context = None;
    let mut hash = Vec::new();
    while let Some((token, span)) = parser.peek() {
        if parser.is_hash_pair() {
            hash.push(parser.hash_pair()?);
        } else if token.starts_expression() {
            if context.is_some() || !hash.is_empty() {
                return Err(parser.error_at(
                    "partials accept a single context argument",
                    span.start,
                ));
            }
            context = Some(parser.expr()?);
        } else {
            return Err(parser.unexpected(span));
        }
    }
    Ok(PartialHead {
        name,
        context,
        hash,
    })
}

/// Split a path into its components
///
/// `source` and `offset` locate errors in the template.
pub fn parse_path(text: &str, source: &str, offset: usize) -> ParseResult<PathExpr> {
    let invalid = |reason: &str| {
        ParseError::new(format!("invalid path \"{}\": {}", text, reason), source, offset)
    };
    let (data, rest) = match text.strip_prefix('@') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if rest.is_empty() {
        return Err(invalid("empty path"));
    }

    let segments = split_segments(rest).map_err(|reason| invalid(reason))?;

    let mut depth = 0;
    let mut scoped = false;
    let mut parts = Vec::new();
    for (segment, literal) in segments {
        let special = !literal && matches!(segment.as_str(), ".." | "." | "this");
        if special {
            if !parts.is_empty() {
                return Err(invalid("`..`, `.` and `this` must lead the path"));
            }
            scoped = true;
            if segment == ".." {
                depth += 1;
            }
        } else {
            parts.push(segment);
        }
    }

    Ok(PathExpr {
        data,
        depth,
        scoped,
        parts,
        original: text.to_string(),
    })
}

/// Returns each segment and whether it was written as `[literal]`
fn split_segments(path: &str) -> Result<Vec<(String, bool)>, &'static str> {
    let is_sep = |b: u8| b == b'.' || b == b'/';
    let bytes = path.as_bytes();
    let len = bytes.len();
    let mut segments = Vec::new();
    let mut i = 0;
    while i < len {
        let rest = &path[i..];
        let ends_at = |n: usize| i + n == len || is_sep(bytes[i + n]);
        if rest.starts_with('[') {
            let close = rest.find(']').ok_or("unterminated `[` segment")?;
            segments.push((rest[1..close].to_string(), true));
            i += close + 1;
        } else if rest.starts_with("..") && ends_at(2) {
            segments.push(("..".to_string(), false));
            i += 2;
        } else if rest.starts_with('.') && ends_at(1) {
            segments.push((".".to_string(), false));
            i += 1;
        } else {
            let end = rest
                .find(|c: char| c == '.' || c == '/' || c == '[')
                .unwrap_or(rest.len());
            if end == 0 {
                return Err("empty segment");
            }
            segments.push((rest[..end].to_string(), false));
            i += end;
        }
        if i < len && is_sep(bytes[i]) {
            i += 1;
            if i == len {
                return Err("trailing separator");
            }
        }
    }
    Ok(segments)
}

struct ExprParser<'a> {
    body: &'a str,
    source: &'a str,
    offset: usize,
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn new(body: &'a str, source: &'a str, offset: usize) -> ParseResult<Self> {
        let tokens = tokenize(body, source, offset)?;
        Ok(ExprParser {
            body,
            source,
            offset,
            tokens,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<(Token, Range<usize>)> {
        self.tokens.get(self.pos).cloned()
    }

    fn peek_at(&self, ahead: usize) -> Option<Token> {
        self.tokens.get(self.pos + ahead).map(|(token, _)| *token)
    }

    fn text(&self, span: &Range<usize>) -> &'a str {
        &self.body[span.clone()]
    }

    fn error_at(&self, message: impl Into<String>, local: usize) -> ParseError {
        ParseError::new(message, self.source, self.offset + local)
    }

    fn unexpected(&self, span: Range<usize>) -> ParseError {
        self.error_at(
            format!("unexpected \"{}\" in expression", self.text(&span)),
            span.start,
        )
    }

    fn end_offset(&self) -> usize {
        self.body.len()
    }

    fn expect_end(&self) -> ParseResult<()> {
        match self.peek() {
            None => Ok(()),
            Some((_, span)) => Err(self.unexpected(span)),
        }
    }

    fn is_hash_pair(&self) -> bool {
        self.peek_at(0) == Some(Token::Path) && self.peek_at(1) == Some(Token::Equals)
    }

    fn at_block_params(&self) -> bool {
        matches!(self.peek(), Some((Token::Path, span)) if self.text(&span) == "as")
            && self.peek_at(1) == Some(Token::Pipe)
    }

    fn call(&mut self) -> ParseResult<Call> {
        let start = self.peek().map(|(_, span)| span.start).unwrap_or(0);
        if self.peek().is_none() {
            return Err(self.error_at("empty expression", self.end_offset()));
        }
        let head = self.expr()?;
        let mut params = Vec::new();
        let mut hash = Vec::new();
        while let Some((token, span)) = self.peek() {
            if token == Token::CloseParen || self.at_block_params() {
                break;
            }
            if self.is_hash_pair() {
                hash.push(self.hash_pair()?);
            } else if token.starts_expression() {
                if !hash.is_empty() {
                    return Err(self.error_at(
                        "positional arguments must come before hash arguments",
                        span.start,
                    ));
                }
                params.push(self.expr()?);
            } else {
                return Err(self.unexpected(span));
            }
        }
        let end = self
            .pos
            .checked_sub(1)
            .and_then(|last| self.tokens.get(last))
            .map(|(_, span)| span.end)
            .unwrap_or(start);
        Ok(Call {
            head,
            params,
            hash,
            span: self.offset + start..self.offset + end,
        })
    }

    fn hash_pair(&mut self) -> ParseResult<(String, Expr)> {
        let (_, span) = self.tokens[self.pos].clone();
        let key = self.text(&span).to_string();
        self.pos += 2;
        if self.peek().is_none() {
            return Err(self.error_at(
                format!("missing value for hash argument \"{}\"", key),
                span.start,
            ));
        }
        let value = self.expr()?;
        Ok((key, value))
    }

    fn expr(&mut self) -> ParseResult<Expr> {
        let (token, span) = match self.peek() {
            Some(next) => next,
            None => return Err(self.error_at("expected an expression", self.end_offset())),
        };
        self.pos += 1;
        let text = self.text(&span);
        match token {
            Token::OpenParen => {
                if self.peek_at(0) == Some(Token::CloseParen) {
                    return Err(self.error_at("empty subexpression", span.start));
                }
                let call = self.call()?;
                match self.peek() {
                    Some((Token::CloseParen, _)) => {
                        self.pos += 1;
                        Ok(Expr::SubExpr(Box::new(call)))
                    }
                    _ => Err(self.error_at("unterminated subexpression", span.start)),
                }
            }
            Token::Str => Ok(Expr::Literal(Value::from(unquote(text)))),
            Token::Number => match text.parse::<i64>() {
                Ok(n) => Ok(Expr::Literal(Value::Integer(n))),
                Err(_) => Err(self.error_at(
                    format!("integer literal \"{}\" out of range", text),
                    span.start,
                )),
            },
            Token::Path => Ok(match text {
                "true" => Expr::Literal(Value::Boolean(true)),
                "false" => Expr::Literal(Value::Boolean(false)),
                "null" => Expr::Literal(Value::Null),
                "undefined" => Expr::Literal(Value::Undefined),
                _ => Expr::Path(parse_path(text, self.source, self.offset + span.start)?),
            }),
            Token::CloseParen | Token::Equals | Token::Pipe => Err(self.unexpected(span)),
        }
    }

    fn block_params(&mut self) -> ParseResult<Vec<String>> {
        if !self.at_block_params() {
            return Ok(Vec::new());
        }
        let (_, open) = self.tokens[self.pos].clone();
        self.pos += 2;
        let mut names = Vec::new();
        loop {
            match self.peek() {
                Some((Token::Pipe, _)) => {
                    self.pos += 1;
                    break;
                }
                Some((Token::Path, span)) => {
                    let name = self.text(&span);
                    if name.contains(['.', '/', '[', '@']) {
                        return Err(self.error_at(
                            format!("invalid block parameter \"{}\"", name),
                            span.start,
                        ));
                    }
                    names.push(name.to_string());
                    self.pos += 1;
                }
                Some((_, span)) => return Err(self.unexpected(span)),
                None => return Err(self.error_at("unterminated block parameters", open.start)),
            }
        }
        if names.is_empty() {
            return Err(self.error_at("empty block parameters", open.start));
        }
        Ok(names)
    }

    fn partial_name(&mut self) -> ParseResult<PartialName> {
        let (token, span) = match self.peek() {
            Some(next) => next,
            None => return Err(self.error_at("partial requires a name", 0)),
        };
        match token {
            Token::OpenParen => match self.expr()? {
                Expr::SubExpr(call) => Ok(PartialName::Dynamic(call)),
                _ => Err(self.unexpected(span)),
            },
            Token::Path | Token::Number => {
                self.pos += 1;
                let text = self.text(&span);
                let name = text
                    .strip_prefix('[')
                    .and_then(|inner| inner.strip_suffix(']'))
                    .unwrap_or(text);
                Ok(PartialName::Static(name.to_string()))
            }
            Token::Str => {
                self.pos += 1;
                Ok(PartialName::Static(unquote(self.text(&span))))
            }
            _ => Err(self.unexpected(span)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn path(text: &str) -> PathExpr {
        parse_path(text, text, 0).unwrap()
    }

    fn call(body: &str) -> Call {
        parse_call(body, body, 0).unwrap()
    }

    #[rstest]
    #[case("name", false, 0, false, &["name"])]
    #[case("person.name", false, 0, false, &["person", "name"])]
    #[case("person/name", false, 0, false, &["person", "name"])]
    #[case("this", false, 0, true, &[])]
    #[case(".", false, 0, true, &[])]
    #[case("./name", false, 0, true, &["name"])]
    #[case("this.name", false, 0, true, &["name"])]
    #[case("..", false, 1, true, &[])]
    #[case("../../name", false, 2, true, &["name"])]
    #[case("[foo bar].[baz]", false, 0, false, &["foo bar", "baz"])]
    #[case("items.[0]", false, 0, false, &["items", "0"])]
    #[case("[this]", false, 0, false, &["this"])]
    #[case("@index", true, 0, false, &["index"])]
    #[case("@root.title", true, 0, false, &["root", "title"])]
    #[case("@../index", true, 1, true, &["index"])]
    fn test_parse_path(
        #[case] text: &str,
        #[case] data: bool,
        #[case] depth: usize,
        #[case] scoped: bool,
        #[case] parts: &[&str],
    ) {
        let parsed = path(text);
        assert_eq!(parsed.data, data);
        assert_eq!(parsed.depth, depth);
        assert_eq!(parsed.scoped, scoped);
        assert_eq!(parsed.parts, parts);
        assert_eq!(parsed.original, text);
    }

    #[rstest]
    #[case("a.")]
    #[case("a..b")]
    #[case("a/../b")]
    #[case("a.this")]
    #[case("[open")]
    #[case("@")]
    fn test_invalid_paths(#[case] text: &str) {
        let err = parse_path(text, text, 0).unwrap_err();
        assert!(err.message.starts_with("invalid path"), "{}", err.message);
    }

    #[test]
    fn test_simple_path_names_helper() {
        assert!(path("name").is_simple());
        assert!(!path("./name").is_simple());
        assert!(!path("a.b").is_simple());
        assert!(path("this").is_this());
    }

    #[test]
    fn test_call_with_params_and_hash() {
        let parsed = call("link person.url \"title\" 3 class=\"nav\" active=true");
        assert_eq!(parsed.name(), "link");
        assert_eq!(parsed.params.len(), 3);
        assert_eq!(parsed.params[1], Expr::Literal(Value::from("title")));
        assert_eq!(parsed.params[2], Expr::Literal(Value::Integer(3)));
        let keys: Vec<&str> = parsed.hash.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["class", "active"]);
        assert_eq!(parsed.hash[1].1, Expr::Literal(Value::Boolean(true)));
    }

    #[test]
    fn test_nested_subexpressions() {
        let parsed = call("outer (inner (deep 1) x=2) y");
        assert_eq!(parsed.params.len(), 2);
        match &parsed.params[0] {
            Expr::SubExpr(inner) => {
                assert_eq!(inner.name(), "inner");
                assert!(matches!(inner.params[0], Expr::SubExpr(_)));
                assert_eq!(inner.hash.len(), 1);
            }
            other => panic!("expected a subexpression, got {:?}", other),
        }
    }

    #[test]
    fn test_literals() {
        let parsed = call("f null undefined false -4 'single'");
        assert_eq!(
            parsed.params,
            vec![
                Expr::Literal(Value::Null),
                Expr::Literal(Value::Undefined),
                Expr::Literal(Value::Boolean(false)),
                Expr::Literal(Value::Integer(-4)),
                Expr::Literal(Value::from("single")),
            ]
        );
    }

    #[test]
    fn test_block_params() {
        let body = "each items as |item index|";
        let (parsed, params) = parse_block_open(body, body, 0).unwrap();
        assert_eq!(parsed.params.len(), 1);
        assert_eq!(params, ["item", "index"]);
    }

    #[rstest]
    #[case("f x=1 y", "positional arguments must come before hash arguments")]
    #[case("f (g", "unterminated subexpression")]
    #[case("f ()", "empty subexpression")]
    #[case("f )", "unexpected \")\" in expression")]
    #[case("f x=", "missing value for hash argument \"x\"")]
    #[case("", "empty expression")]
    fn test_call_errors(#[case] body: &str, #[case] message: &str) {
        let err = parse_call(body, body, 0).unwrap_err();
        assert_eq!(err.message, message);
    }

    #[test]
    fn test_error_offsets_are_absolute() {
        let source = "hello {{f x=1 y}}";
        let err = parse_call("f x=1 y", source, 8).unwrap_err();
        assert_eq!(err.offset, 14);
    }

    #[test]
    fn test_partial_heads() {
        let head = parse_partial("card person title=\"x\"", "", 0).unwrap();
        assert_eq!(head.name, PartialName::Static("card".to_string()));
        assert!(matches!(head.context, Some(Expr::Path(_))));
        assert_eq!(head.hash.len(), 1);

        let head = parse_partial("(whichPartial)", "", 0).unwrap();
        assert!(matches!(head.name, PartialName::Dynamic(_)));

        let head = parse_partial("@partial-block", "", 0).unwrap();
        assert_eq!(head.name, PartialName::Static("@partial-block".to_string()));

        let head = parse_partial("\"quoted name\"", "", 0).unwrap();
        assert_eq!(head.name, PartialName::Static("quoted name".to_string()));
    }

    #[test]
    fn test_partial_rejects_two_contexts() {
        let err = parse_partial("card a b", "", 0).unwrap_err();
        assert_eq!(err.message, "partials accept a single context argument");
    }
}
