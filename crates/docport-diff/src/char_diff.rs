//! Character-level highlighting for replace-paired lines.
//!
//! The differ strips the longest common prefix and suffix and highlights
//! whatever remains in the middle of each side. This is deliberately not a
//! full edit script: one highlighted span per side is easier to read in a
//! split view than scattered single-character marks.

use serde::Serialize;

use crate::similarity::SimilarityGate;

/// A run of characters within one side of a line pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CharSegment {
    pub text: String,
    pub highlight: bool,
}

impl CharSegment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            highlight: false,
        }
    }

    fn marked(text: &str) -> Self {
        Self {
            text: text.to_string(),
            highlight: true,
        }
    }
}

/// Segments for both sides of a line pair.
///
/// Concatenating the text of either side gives back that side's line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CharDiff {
    pub old: Vec<CharSegment>,
    pub new: Vec<CharSegment>,
}

/// How a changed line in split view is highlighted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "segments", rename_all = "lowercase")]
pub enum LineHighlight {
    /// Unchanged line.
    None,
    /// The whole line is marked.
    Whole,
    /// Only the differing middle is marked.
    Segments(Vec<CharSegment>),
}

/// Diff two lines by common prefix and suffix.
pub fn diff_chars(old: &str, new: &str) -> CharDiff {
    if old == new {
        return CharDiff {
            old: vec![CharSegment::plain(old)],
            new: vec![CharSegment::plain(new)],
        };
    }

    let prefix = common_prefix_bytes(old, new);
    // The suffix may not reach back into the prefix on either side.
    let suffix = common_suffix_bytes(&old[prefix..], &new[prefix..]);

    CharDiff {
        old: segments(old, prefix, suffix),
        new: segments(new, prefix, suffix),
    }
}

/// Highlight a replace-pair: a char diff if the gate passes, otherwise the
/// whole line on both sides.
pub fn highlight_pair(
    old: &str,
    new: &str,
    gate: &SimilarityGate,
) -> (LineHighlight, LineHighlight) {
    if gate.is_similar(old, new) {
        let diff = diff_chars(old, new);
        (
            LineHighlight::Segments(diff.old),
            LineHighlight::Segments(diff.new),
        )
    } else {
        (LineHighlight::Whole, LineHighlight::Whole)
    }
}

fn segments(line: &str, prefix: usize, suffix: usize) -> Vec<CharSegment> {
    let middle_end = line.len() - suffix;
    let mut out = Vec::with_capacity(3);
    if prefix > 0 {
        out.push(CharSegment::plain(&line[..prefix]));
    }
    if middle_end > prefix {
        out.push(CharSegment::marked(&line[prefix..middle_end]));
    }
    if suffix > 0 {
        out.push(CharSegment::plain(&line[middle_end..]));
    }
    out
}

/// Byte length of the longest common prefix, on char boundaries.
fn common_prefix_bytes(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map_or_else(|| a.len().min(b.len()), |((idx, _), _)| idx)
}

/// Byte length of the longest common suffix, on char boundaries.
fn common_suffix_bytes(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(ca, cb)| ca == cb)
        .map(|(ca, _)| ca.len_utf8())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn joined(segments: &[CharSegment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    fn highlighted(segments: &[CharSegment]) -> Vec<&str> {
        segments
            .iter()
            .filter(|s| s.highlight)
            .map(|s| s.text.as_str())
            .collect()
    }

    #[test]
    fn identical_is_one_plain_segment() {
        let diff = diff_chars("same", "same");
        assert_eq!(diff.old, vec![CharSegment::plain("same")]);
        assert_eq!(diff.new, vec![CharSegment::plain("same")]);
    }

    #[test]
    fn middle_span_highlighted() {
        let diff = diff_chars("The quick fox", "The slow fox");
        assert_eq!(highlighted(&diff.old), vec!["quick"]);
        assert_eq!(highlighted(&diff.new), vec!["slow"]);
        assert_eq!(diff.old[0].text, "The ");
        assert_eq!(diff.old[2].text, " fox");
    }

    #[test]
    fn disjoint_strings_fully_highlighted() {
        let diff = diff_chars("abc", "xyz");
        assert_eq!(diff.old, vec![CharSegment::marked("abc")]);
        assert_eq!(diff.new, vec![CharSegment::marked("xyz")]);
    }

    #[test]
    fn prefix_and_suffix_never_overlap() {
        // "aa" vs "aaa": prefix 2 on the shorter side leaves no room for a suffix.
        let diff = diff_chars("aa", "aaa");
        assert_eq!(joined(&diff.old), "aa");
        assert_eq!(joined(&diff.new), "aaa");
        assert!(highlighted(&diff.old).is_empty());
        assert_eq!(highlighted(&diff.new), vec!["a"]);
    }

    #[test]
    fn pure_insertion_in_middle() {
        let diff = diff_chars("abef", "abcdef");
        assert!(highlighted(&diff.old).is_empty());
        assert_eq!(highlighted(&diff.new), vec!["cd"]);
    }

    #[test]
    fn multibyte_boundaries_respected() {
        let diff = diff_chars("héllo wörld", "héllo wérld");
        assert_eq!(highlighted(&diff.old), vec!["ö"]);
        assert_eq!(highlighted(&diff.new), vec!["é"]);
    }

    #[test]
    fn empty_side_reconstructs() {
        let diff = diff_chars("", "new");
        assert_eq!(joined(&diff.old), "");
        assert_eq!(diff.new, vec![CharSegment::marked("new")]);
    }

    #[test]
    fn gate_rejects_dissimilar_pair() {
        let gate = SimilarityGate::default();
        let (old, new) = highlight_pair("b", "x", &gate);
        assert_eq!(old, LineHighlight::Whole);
        assert_eq!(new, LineHighlight::Whole);
    }

    #[test]
    fn gate_accepts_similar_pair() {
        let gate = SimilarityGate::default();
        let (old, _) = highlight_pair("color: red;", "color: blue;", &gate);
        match old {
            LineHighlight::Segments(segs) => assert_eq!(joined(&segs), "color: red;"),
            other => panic!("expected segments, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn segments_reconstruct_lines(old in "[ab\u{e9}]{0,8}", new in "[ab\u{e9}]{0,8}") {
            let diff = diff_chars(&old, &new);
            prop_assert_eq!(joined(&diff.old), old);
            prop_assert_eq!(joined(&diff.new), new);
            prop_assert!(diff.old.iter().filter(|s| s.highlight).count() <= 1);
        }
    }
}
