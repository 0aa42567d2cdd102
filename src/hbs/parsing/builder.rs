//! Program builder
//!
//! Folds the flat item list into a tree. Open blocks live on a stack of frames; each frame
//! collects its body and, once an `{{else}}` is seen, its inverse. `{{else if x}}` opens a
//! chained frame that is closed together with its parent.

use super::expression::{parse_block_open, parse_call, parse_partial, PartialHead};
use crate::hbs::ast::{Block, Call, Expr, Node, Partial, PartialName, Program};
use crate::hbs::error::{ParseError, ParseResult};
use crate::hbs::lexing::{Item, Tag, TagKind};
use hbs_dom::dom::Value;
use std::sync::Arc;

enum FrameKind {
    Block {
        call: Call,
        block_params: Vec<String>,
        inverted: bool,
    },
    PartialBlock {
        head: PartialHead,
        span: std::ops::Range<usize>,
    },
    Inline {
        name: String,
    },
}

struct Frame {
    kind: FrameKind,
    /// Name the closing tag must repeat
    name: String,
    open_offset: usize,
    program: Vec<Node>,
    inverse: Option<Vec<Node>>,
    /// Opened by `{{else name ...}}`, closed implicitly by the parent's closing tag
    chained: bool,
}

impl Frame {
    fn new(kind: FrameKind, name: String, open_offset: usize, chained: bool) -> Self {
        Frame {
            kind,
            name,
            open_offset,
            program: Vec::new(),
            inverse: None,
            chained,
        }
    }

    fn current(&mut self) -> &mut Vec<Node> {
        match &mut self.inverse {
            Some(inverse) => inverse,
            None => &mut self.program,
        }
    }

    fn finish(self) -> Node {
        let program: Program = self.program.into();
        let inverse: Option<Program> = self.inverse.map(Into::into);
        match self.kind {
            FrameKind::Block {
                call,
                block_params,
                inverted,
            } => {
                let (program, inverse) = if inverted {
                    (inverse.unwrap_or_else(|| Arc::from(Vec::new())), Some(program))
                } else {
                    (program, inverse)
                };
                Node::Block(Box::new(Block {
                    call,
                    block_params,
                    program,
                    inverse,
                }))
            }
            FrameKind::PartialBlock { head, span } => Node::Partial(Box::new(Partial {
                name: head.name,
                context: head.context,
                hash: head.hash,
                indent: String::new(),
                block: Some(program),
                span,
            })),
            FrameKind::Inline { name } => Node::Inline { name, program },
        }
    }
}

pub struct Builder<'a> {
    source: &'a str,
    root: Vec<Node>,
    stack: Vec<Frame>,
}

impl<'a> Builder<'a> {
    pub fn new(source: &'a str) -> Self {
        Builder {
            source,
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Build the program. `indents` holds the standalone indentation for each item.
    pub fn build(mut self, items: Vec<Item>, indents: Vec<String>) -> ParseResult<Program> {
        for (item, indent) in items.into_iter().zip(indents) {
            match item {
                Item::Text(run) => {
                    let text = run.visible();
                    if !text.is_empty() {
                        let node = Node::Text(Arc::from(text));
                        self.current().push(node);
                    }
                }
                Item::Tag(tag) => self.tag(tag, indent)?,
            }
        }
        if let Some(frame) = self.stack.iter().rev().find(|frame| !frame.chained) {
            return Err(self.error(
                format!("unterminated block \"{}\"", frame.name),
                frame.open_offset,
            ));
        }
        Ok(self.root.into())
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> ParseError {
        ParseError::new(message, self.source, offset)
    }

    fn current(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(frame) => frame.current(),
            None => &mut self.root,
        }
    }

    fn tag(&mut self, tag: Tag, indent: String) -> ParseResult<()> {
        let source = self.source;
        let body = tag.body.as_str();
        let at = tag.body_offset;
        match tag.kind {
            TagKind::Mustache { escaped } => {
                let call = parse_call(body, source, at)?;
                self.current().push(Node::Mustache { call, escaped });
            }
            TagKind::Comment => {
                self.current().push(Node::Comment(tag.body));
            }
            TagKind::BlockOpen | TagKind::InverseOpen => {
                let (call, block_params) = parse_block_open(body, source, at)?;
                let name = call.name();
                let kind = FrameKind::Block {
                    call,
                    block_params,
                    inverted: tag.kind == TagKind::InverseOpen,
                };
                self.stack.push(Frame::new(kind, name, tag.span.start, false));
            }
            TagKind::PartialBlockOpen => {
                let head = parse_partial(body, source, at)?;
                let name = match &head.name {
                    PartialName::Static(name) => name.clone(),
                    PartialName::Dynamic(call) => call.name(),
                };
                let kind = FrameKind::PartialBlock {
                    head,
                    span: tag.span.clone(),
                };
                self.stack.push(Frame::new(kind, name, tag.span.start, false));
            }
            TagKind::InlineOpen => {
                let call = parse_call(body, source, at)?;
                let name = match (call.name().as_str(), call.params.as_slice()) {
                    ("inline", [Expr::Literal(Value::String(name))]) => name.to_string(),
                    _ => {
                        return Err(self.error(
                            "inline partials are declared as {{#*inline \"name\"}}",
                            tag.span.start,
                        ))
                    }
                };
                let kind = FrameKind::Inline { name };
                self.stack
                    .push(Frame::new(kind, "inline".to_string(), tag.span.start, false));
            }
            TagKind::Else => self.else_tag(&tag)?,
            TagKind::Close => self.close(&tag)?,
            TagKind::Partial => {
                let head = parse_partial(body, source, at)?;
                self.current().push(Node::Partial(Box::new(Partial {
                    name: head.name,
                    context: head.context,
                    hash: head.hash,
                    indent,
                    block: None,
                    span: tag.span,
                })));
            }
            TagKind::RawBlock => {
                let call = parse_call(body, source, at)?;
                let content = tag.raw_content.unwrap_or_default();
                let program: Program = if content.is_empty() {
                    Arc::from(Vec::new())
                } else {
                    Arc::from(vec![Node::Text(Arc::from(content))])
                };
                self.current().push(Node::Block(Box::new(Block {
                    call,
                    block_params: Vec::new(),
                    program,
                    inverse: None,
                })));
            }
        }
        Ok(())
    }

    fn else_tag(&mut self, tag: &Tag) -> ParseResult<()> {
        let offset = tag.span.start;
        let chained = if tag.body.is_empty() {
            None
        } else {
            Some(parse_block_open(&tag.body, self.source, tag.body_offset)?)
        };
        let source = self.source;
        let frame = match self.stack.last_mut() {
            Some(frame) if matches!(frame.kind, FrameKind::Block { .. }) => frame,
            _ => return Err(ParseError::new("{{else}} outside of a block", source, offset)),
        };
        if frame.inverse.is_some() {
            return Err(ParseError::new(
                "a block can only have one {{else}} section",
                source,
                offset,
            ));
        }
        frame.inverse = Some(Vec::new());
        if let Some((call, block_params)) = chained {
            let name = call.name();
            let kind = FrameKind::Block {
                call,
                block_params,
                inverted: false,
            };
            self.stack.push(Frame::new(kind, name, offset, true));
        }
        Ok(())
    }

    fn close(&mut self, tag: &Tag) -> ParseResult<()> {
        let offset = tag.span.start;
        while self.stack.last().is_some_and(|frame| frame.chained) {
            if let Some(frame) = self.stack.pop() {
                let node = frame.finish();
                self.current().push(node);
            }
        }
        let frame = match self.stack.pop() {
            Some(frame) => frame,
            None => {
                return Err(self.error(
                    format!("unexpected closing tag {{{{/{}}}}}", tag.body),
                    offset,
                ))
            }
        };
        if frame.name != tag.body {
            return Err(self.error(
                format!("{} doesn't match {}", frame.name, tag.body),
                offset,
            ));
        }
        let node = frame.finish();
        self.current().push(node);
        Ok(())
    }
}
