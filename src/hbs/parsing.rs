//! Template parsing
//!
//!     source --scan--> items --whitespace--> items --build--> Program
//!
//! The [scanner](crate::hbs::lexing::scanner) finds tags, [whitespace] adjusts the text
//! between them, and the [builder] parses each tag body with [expression] and folds the
//! result into a tree. Parsing happens once; the resulting [`Program`] is shared by every
//! render.

pub mod builder;
pub mod expression;
pub mod whitespace;

use crate::hbs::ast::Program;
use crate::hbs::error::ParseResult;
use crate::hbs::lexing::scan;
use builder::Builder;

/// Parse template source into a program
pub fn parse(source: &str) -> ParseResult<Program> {
    parse_with(source, false)
}

/// Parse, optionally keeping the lines of standalone tags intact
pub fn parse_with(source: &str, ignore_standalone: bool) -> ParseResult<Program> {
    let mut items = scan(source)?;
    let indents = whitespace::apply(&mut items, ignore_standalone);
    Builder::new(source).build(items, indents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hbs::ast::Node;
    use proptest::prelude::*;

    #[test]
    fn test_standalone_lines_are_stripped_from_the_tree() {
        let program = parse("{{#if a}}\n  x\n{{/if}}\n").unwrap();
        match &program[0] {
            Node::Block(block) => assert_eq!(block.program[0], Node::Text("  x\n".into())),
            other => panic!("expected a block, got {:?}", other),
        }
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_ignore_standalone_keeps_block_lines() {
        let program = parse_with("{{#if a}}\n  x\n{{/if}}\n", true).unwrap();
        match &program[0] {
            Node::Block(block) => assert_eq!(block.program[0], Node::Text("\n  x\n".into())),
            other => panic!("expected a block, got {:?}", other),
        }
        assert_eq!(program[1], Node::Text("\n".into()));
    }

    proptest! {
        #[test]
        fn parse_never_panics(source in "[a-z{}#/^>!~&.@()= \"'\\[\\]|\n]{0,40}") {
            let _ = parse(&source);
        }
    }
}
