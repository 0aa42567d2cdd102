//! Whitespace control
//!
//! Two passes over the scanned items, both adjusting the visible window of neighbouring text
//! runs rather than the text itself:
//!
//! - standalone lines: a block, comment, partial or `else` tag that is the only non-blank
//!   content of its line removes the line's indentation and line break;
//! - `~` markers trim all whitespace from the adjacent text on the marked side.

use crate::hbs::lexing::{Item, TagKind, TextRun};

/// Apply whitespace control in place
///
/// Returns, per item, the indentation captured by standalone partial tags (empty for others).
/// With `ignore_standalone` only the `~` markers apply.
pub fn apply(items: &mut [Item], ignore_standalone: bool) -> Vec<String> {
    let mut indents = vec![String::new(); items.len()];
    if !ignore_standalone {
        strip_standalone(items, &mut indents);
    }
    trim_markers(items);
    indents
}

fn strip_standalone(items: &mut [Item], indents: &mut [String]) {
    let last = items.len().saturating_sub(1);
    for k in 0..items.len() {
        let tag = match &items[k] {
            Item::Tag(tag) if tag.kind.can_stand_alone() => tag,
            _ => continue,
        };
        let is_partial = tag.kind == TagKind::Partial;

        let indent = match k.checked_sub(1).map(|p| &items[p]) {
            None => Some(""),
            Some(Item::Text(run)) => line_prefix(&run.text, k - 1 == 0),
            Some(Item::Tag(_)) => None,
        };
        let trailing = match items.get(k + 1) {
            None => Some(0),
            Some(Item::Text(run)) => line_break_len(&run.text, k + 1 == last),
            Some(Item::Tag(_)) => None,
        };
        let (indent, trailing) = match (indent, trailing) {
            (Some(indent), Some(trailing)) => (indent.to_string(), trailing),
            _ => continue,
        };

        if k > 0 {
            if let Item::Text(run) = &mut items[k - 1] {
                run.end = run.end.min(run.text.len() - indent.len());
            }
        }
        if let Some(Item::Text(run)) = items.get_mut(k + 1) {
            run.start = run.start.max(trailing);
        }
        if is_partial {
            indents[k] = indent;
        }
    }
}

fn trim_markers(items: &mut [Item]) {
    for k in 0..items.len() {
        let (strip_before, strip_after) = match &items[k] {
            Item::Tag(tag) => (tag.strip_before, tag.strip_after),
            Item::Text(_) => continue,
        };
        if strip_before && k > 0 {
            if let Item::Text(run) = &mut items[k - 1] {
                trim_end(run);
            }
        }
        if strip_after {
            if let Some(Item::Text(run)) = items.get_mut(k + 1) {
                trim_start(run);
            }
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.bytes().all(|b| b == b' ' || b == b'\t')
}

/// The blank tail of the line that precedes a tag, if the line is otherwise empty
///
/// Text with no line break only qualifies at the start of the template.
fn line_prefix(text: &str, at_start: bool) -> Option<&str> {
    match text.rfind('\n') {
        Some(nl) => Some(&text[nl + 1..]).filter(|tail| is_blank(tail)),
        None if at_start && is_blank(text) => Some(text),
        None => None,
    }
}

/// Length of the blank run and line break that follow a tag
///
/// Blank text with no line break only qualifies at the end of the template.
fn line_break_len(text: &str, at_end: bool) -> Option<usize> {
    let blanks = text.len() - text.trim_start_matches([' ', '\t']).len();
    let rest = &text[blanks..];
    if rest.starts_with("\r\n") {
        Some(blanks + 2)
    } else if rest.starts_with('\n') {
        Some(blanks + 1)
    } else if rest.is_empty() && at_end {
        Some(blanks)
    } else {
        None
    }
}

fn trim_end(run: &mut TextRun) {
    let kept = run.visible().trim_end().len();
    run.end = run.start.min(run.end) + kept;
}

fn trim_start(run: &mut TextRun) {
    let kept = run.visible().trim_start().len();
    run.start = run.end.max(run.start) - kept;
}
