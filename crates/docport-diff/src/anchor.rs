//! Comment anchors against rendered plain text.
//!
//! Comments are stored as `(selected_text, start, end)` character ranges
//! into the plain text of a rendered review. Rendering here is a pure
//! function of its inputs, so the same comparison always yields the same
//! plain text. When the document changes, a stored range may no longer
//! cover its text; resolution then relocates it only when the selection is
//! unambiguous and otherwise reports it as invalid, so callers can mark the
//! comment outdated instead of highlighting the wrong words.

use docport_types::CommentAnchor;
use pulldown_cmark::{Event, Parser, TagEnd};
use serde::Serialize;

/// Outcome of resolving an anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeResolution {
    pub valid: bool,
    /// Resolved character range, present when `valid`.
    pub start_offset: Option<usize>,
    pub end_offset: Option<usize>,
    /// `true` if the range differs from the stored one.
    pub relocated: bool,
}

impl RangeResolution {
    fn found(start: usize, end: usize, relocated: bool) -> Self {
        Self {
            valid: true,
            start_offset: Some(start),
            end_offset: Some(end),
            relocated,
        }
    }

    fn invalid() -> Self {
        Self {
            valid: false,
            start_offset: None,
            end_offset: None,
            relocated: false,
        }
    }
}

/// Resolve a stored anchor against the current plain text.
///
/// The stored range wins when it still covers `selected_text`. Otherwise the
/// anchor moves to the single occurrence of `selected_text`, if there is
/// exactly one. Anything else is invalid.
pub fn resolve_range(plain_text: &str, anchor: &CommentAnchor) -> RangeResolution {
    let start = anchor.start_offset;
    let end = anchor.end_offset;

    if start <= end {
        let from = byte_offset(plain_text, start);
        let to = byte_offset(plain_text, end);
        if let (Some(from), Some(to)) = (from, to) {
            if plain_text[from..to] == anchor.selected_text {
                return RangeResolution::found(start, end, false);
            }
        }
    }

    if anchor.selected_text.is_empty() {
        return RangeResolution::invalid();
    }

    let mut matches = plain_text.match_indices(anchor.selected_text.as_str());
    match (matches.next(), matches.next()) {
        (Some((byte, _)), None) => {
            let new_start = plain_text[..byte].chars().count();
            let new_end = new_start + anchor.selected_text.chars().count();
            tracing::debug!(
                old_start = start,
                new_start,
                "comment anchor relocated"
            );
            RangeResolution::found(new_start, new_end, true)
        }
        _ => RangeResolution::invalid(),
    }
}

/// Byte offset of the `index`-th char; `index == char count` maps to the end.
fn byte_offset(text: &str, index: usize) -> Option<usize> {
    text.char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .nth(index)
}

/// Derive the plain-text sequence comment offsets are measured against.
///
/// Text and inline code are kept, HTML tags (including the diff markers)
/// are dropped, line breaks and block ends become `\n`.
pub fn rendered_plain_text(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak | Event::Rule => out.push('\n'),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableRow,
            ) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out
}
