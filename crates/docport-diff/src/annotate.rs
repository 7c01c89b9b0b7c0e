//! Annotated markdown for unified and per-panel review rendering.
//!
//! Unchanged text passes through untouched so the markdown renderer parses
//! it as usual. Added and removed spans are wrapped in `<ins>` / `<del>`
//! inline tags. The renderer treats those tags as raw HTML, so the text
//! placed inside them is escaped.
//!
//! Removed spans get extra treatment because they are not part of the new
//! document and would otherwise vanish or mislead:
//!
//! - markdown images become literal `<img>` elements, since markdown inside
//!   raw HTML is not parsed again downstream;
//! - every line break is preceded by a visible marker glyph;
//! - whitespace-only removals are described by a readable placeholder; any
//!   line breaks they held are kept after it so block structure survives.
//!
//! Spans are wrapped line by line so no tag ever straddles a line break.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::DiffConfig;
use crate::word_diff::WordDiffPart;

static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(\s*<?([^\s<>)]+)>?(?:\s+"([^"]*)")?\s*\)"#)
        .expect("image pattern is valid")
});

/// Rendering options for the annotator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotateOptions {
    /// Glyph placed before each line break inside a removed span.
    pub line_break_marker: String,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            line_break_marker: "\u{21b5}".to_string(),
        }
    }
}

impl From<&DiffConfig> for AnnotateOptions {
    fn from(config: &DiffConfig) -> Self {
        Self {
            line_break_marker: config.line_break_marker.clone(),
        }
    }
}

/// Render word diff parts as annotated markdown.
///
/// Pass the full part list for unified view, or a one-sided subsequence
/// (see [`crate::word_diff::old_side`]) for one panel of a split view.
pub fn annotate(parts: &[WordDiffPart], options: &AnnotateOptions) -> String {
    let mut out = String::new();
    for part in parts {
        if part.is_added() {
            push_added(&mut out, part.value());
        } else if part.is_removed() {
            push_removed(&mut out, part.value(), options);
        } else {
            out.push_str(part.value());
        }
    }
    out
}

fn push_added(out: &mut String, value: &str) {
    for (i, line) in value.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if !line.is_empty() {
            out.push_str("<ins>");
            out.push_str(&escape_html(line));
            out.push_str("</ins>");
        }
    }
}

fn push_removed(out: &mut String, value: &str, options: &AnnotateOptions) {
    if value.trim().is_empty() {
        push_removed_whitespace(out, value, options);
        return;
    }

    let lines: Vec<&str> = value.split('\n').collect();
    let last = lines.len() - 1;
    for (i, line) in lines.into_iter().enumerate() {
        let mut inner = render_removed_line(line);
        if i < last {
            inner.push_str(&options.line_break_marker);
        }
        if !inner.is_empty() {
            out.push_str("<del>");
            out.push_str(&inner);
            out.push_str("</del>");
        }
        if i < last {
            out.push('\n');
        }
    }
}

/// Placeholder, then the marker and the original breaks from the first one on.
fn push_removed_whitespace(out: &mut String, value: &str, options: &AnnotateOptions) {
    out.push_str("<del class=\"diff-whitespace\">");
    out.push_str(&whitespace_placeholder(value));
    match value.find('\n') {
        Some(first_break) => {
            out.push_str(&options.line_break_marker);
            out.push_str("</del>");
            out.push_str(&value[first_break..]);
        }
        None => out.push_str("</del>"),
    }
}

/// Convert images to `<img>` first, then escape the text around them.
fn render_removed_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut cursor = 0;
    for caps in IMAGE.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&escape_html(&line[cursor..whole.start()]));
        out.push_str(&image_element(&caps));
        cursor = whole.end();
    }
    out.push_str(&escape_html(&line[cursor..]));
    out
}

fn image_element(caps: &Captures<'_>) -> String {
    let alt = caps.get(1).map_or("", |m| m.as_str());
    let src = caps.get(2).map_or("", |m| m.as_str());
    match caps.get(3) {
        Some(title) => format!(
            "<img src=\"{}\" alt=\"{}\" title=\"{}\" />",
            escape_attr(src),
            escape_attr(alt),
            escape_attr(title.as_str())
        ),
        None => format!(
            "<img src=\"{}\" alt=\"{}\" />",
            escape_attr(src),
            escape_attr(alt)
        ),
    }
}

/// Human-readable description of removed whitespace.
pub fn whitespace_placeholder(value: &str) -> String {
    let breaks = value.matches('\n').count();
    if breaks > 0 {
        format!("{} removed", plural(breaks, "line break", "line breaks"))
    } else {
        format!(
            "{} removed",
            plural(value.chars().count(), "space", "spaces")
        )
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("1 {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Escape text for placement inside an HTML element.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for placement inside a double-quoted HTML attribute.
pub fn escape_attr(text: &str) -> String {
    escape_html(text).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word_diff::diff_words;

    fn render(parts: &[WordDiffPart]) -> String {
        annotate(parts, &AnnotateOptions::default())
    }

    #[test]
    fn inserted_word_is_wrapped() {
        let parts = diff_words(Some("The quick fox"), Some("The quick brown fox"));
        assert_eq!(render(&parts), "The quick <ins>brown </ins>fox");
    }

    #[test]
    fn new_document_renders_single_insertion() {
        let parts = diff_words(None, Some("Hello"));
        let out = render(&parts);
        assert_eq!(out, "<ins>Hello</ins>");
        assert!(!out.contains("<del>"));
    }

    #[test]
    fn removed_image_becomes_element() {
        let parts = vec![
            WordDiffPart::unchanged("See "),
            WordDiffPart::removed("![alt](http://x/y.png)"),
        ];
        let out = render(&parts);
        assert_eq!(out, "See <del><img src=\"http://x/y.png\" alt=\"alt\" /></del>");
        assert!(!out.contains("!["));
    }

    #[test]
    fn removed_image_keeps_title_and_escapes_text() {
        let parts = vec![WordDiffPart::removed(
            "a < b ![pic \"1\"](img.png \"Caption\") & c",
        )];
        let expected = concat!(
            "<del>a &lt; b ",
            "<img src=\"img.png\" alt=\"pic &quot;1&quot;\" title=\"Caption\" />",
            " &amp; c</del>"
        );
        assert_eq!(render(&parts), expected);
    }

    #[test]
    fn added_image_left_as_markdown() {
        let parts = vec![WordDiffPart::added("![a](b.png)")];
        assert_eq!(render(&parts), "<ins>![a](b.png)</ins>");
    }

    #[test]
    fn tag_text_is_escaped() {
        let parts = vec![
            WordDiffPart::unchanged("<b>kept</b> "),
            WordDiffPart::removed("<script>"),
            WordDiffPart::added("a & b"),
        ];
        assert_eq!(
            render(&parts),
            "<b>kept</b> <del>&lt;script&gt;</del><ins>a &amp; b</ins>"
        );
    }

    #[test]
    fn removed_line_breaks_get_marker() {
        let parts = vec![WordDiffPart::removed("first\nsecond")];
        assert_eq!(render(&parts), "<del>first↵</del>\n<del>second</del>");
    }

    #[test]
    fn blank_line_inside_removed_span() {
        let parts = vec![WordDiffPart::removed("a\n\nb")];
        assert_eq!(render(&parts), "<del>a↵</del>\n<del>↵</del>\n<del>b</del>");
    }

    #[test]
    fn custom_marker() {
        let options = AnnotateOptions {
            line_break_marker: "¶".into(),
        };
        let parts = vec![WordDiffPart::removed("x\ny")];
        assert_eq!(annotate(&parts, &options), "<del>x¶</del>\n<del>y</del>");
    }

    #[test]
    fn whitespace_only_removals_use_placeholder() {
        let parts = vec![
            WordDiffPart::unchanged("para one"),
            WordDiffPart::removed("\n\n"),
            WordDiffPart::unchanged("para two"),
        ];
        assert_eq!(
            render(&parts),
            "para one<del class=\"diff-whitespace\">2 line breaks removed↵</del>\n\npara two"
        );
        assert_eq!(whitespace_placeholder("\n"), "1 line break removed");
        assert_eq!(whitespace_placeholder(" "), "1 space removed");
        assert_eq!(whitespace_placeholder("   "), "3 spaces removed");
    }

    #[test]
    fn removed_spaces_have_no_marker() {
        let parts = vec![
            WordDiffPart::unchanged("a"),
            WordDiffPart::removed("  "),
            WordDiffPart::unchanged("b"),
        ];
        assert_eq!(
            render(&parts),
            "a<del class=\"diff-whitespace\">2 spaces removed</del>b"
        );
    }

    #[test]
    fn removed_break_with_indent_keeps_original_whitespace() {
        let parts = vec![WordDiffPart::removed("  \n  ")];
        assert_eq!(
            render(&parts),
            "<del class=\"diff-whitespace\">1 line break removed↵</del>\n  "
        );
    }

    #[test]
    fn changed_image_url_keeps_old_image_visible() {
        let parts = diff_words(
            Some("See ![alt](http://x/y.png) here"),
            Some("See ![alt](http://x/z.png) here"),
        );
        let expected = concat!(
            "See <del><img src=\"http://x/y.png\" alt=\"alt\" /></del>",
            "<ins>![alt](http://x/z.png)</ins> here"
        );
        assert_eq!(render(&parts), expected);
    }

    #[test]
    fn changed_link_url_replaces_whole_link() {
        let parts = diff_words(
            Some("Go [docs](http://a/one) now"),
            Some("Go [docs](http://a/two) now"),
        );
        assert_eq!(
            render(&parts),
            "Go <del>[docs](http://a/one)</del><ins>[docs](http://a/two)</ins> now"
        );
    }

    #[test]
    fn multiline_addition_wrapped_per_line() {
        let parts = vec![WordDiffPart::added("one\n\ntwo")];
        assert_eq!(render(&parts), "<ins>one</ins>\n\n<ins>two</ins>");
    }

    #[test]
    fn annotation_is_deterministic() {
        let parts = diff_words(Some("alpha beta\ngamma"), Some("alpha delta\ngamma ![i](j)"));
        assert_eq!(render(&parts), render(&parts));
    }
}
