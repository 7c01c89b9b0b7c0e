//! Word-level diff over full document bodies.
//!
//! Text is split into runs of word characters, runs of whitespace, and
//! single punctuation characters. Inline markdown images and links are kept
//! whole, so a changed target replaces the entire image or link instead of
//! landing inside its `(...)`. The token sequences are diffed with Myers
//! and then normalized so the output reads naturally and never depends on
//! which of several equally short edit scripts the algorithm happened to
//! pick:
//!
//! - inside a changed region, removals come before additions;
//! - a run of only additions (or only removals) is slid right past equal
//!   tokens with the same text, so `"The quick fox"` to
//!   `"The quick brown fox"` reports `"brown "` as added rather than
//!   `" brown"`;
//! - adjacent parts of the same kind are merged.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use similar::{capture_diff_slices, Algorithm, DiffTag};

/// Inline image `![alt](src)` or link `[text](url)`, on a single line.
static INLINE_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!?\[[^\]\n]*\]\([^)\n]*\)").expect("inline target pattern is valid")
});

/// One run of text in a word diff.
///
/// A part is unchanged, added, or removed; never both added and removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WordDiffPart {
    value: String,
    added: bool,
    removed: bool,
}

impl WordDiffPart {
    pub fn unchanged(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            added: false,
            removed: false,
        }
    }

    pub fn added(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            added: true,
            removed: false,
        }
    }

    pub fn removed(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            added: false,
            removed: true,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_added(&self) -> bool {
        self.added
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn is_unchanged(&self) -> bool {
        !self.added && !self.removed
    }

    fn tag(&self) -> Tag {
        if self.added {
            Tag::Added
        } else if self.removed {
            Tag::Removed
        } else {
            Tag::Equal
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tag {
    Equal,
    Removed,
    Added,
}

/// Compute the word diff between two bodies.
///
/// `None` on the old side means the document is new: the whole new text is
/// added. `None` on the new side means it was deleted: the whole old text is
/// removed.
pub fn diff_words(old: Option<&str>, new: Option<&str>) -> Vec<WordDiffPart> {
    match (old, new) {
        (None, None) => Vec::new(),
        (None, Some(new)) => single(WordDiffPart::added(new)),
        (Some(old), None) => single(WordDiffPart::removed(old)),
        (Some(old), Some(new)) if old == new => single(WordDiffPart::unchanged(old)),
        (Some(old), Some(new)) => diff_tokens(old, new),
    }
}

fn single(part: WordDiffPart) -> Vec<WordDiffPart> {
    if part.value.is_empty() {
        Vec::new()
    } else {
        vec![part]
    }
}

fn diff_tokens(old: &str, new: &str) -> Vec<WordDiffPart> {
    let old_tokens = tokenize(old);
    let new_tokens = tokenize(new);
    let ops = capture_diff_slices(Algorithm::Myers, &old_tokens, &new_tokens);

    let mut items: Vec<(Tag, &str)> = Vec::with_capacity(old_tokens.len() + new_tokens.len());
    for op in &ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            items.extend(old_tokens[old_range].iter().map(|t| (Tag::Equal, *t)));
        } else {
            items.extend(old_tokens[old_range].iter().map(|t| (Tag::Removed, *t)));
            items.extend(new_tokens[new_range].iter().map(|t| (Tag::Added, *t)));
        }
    }

    removals_first(&mut items);
    slide_runs_right(&mut items);
    removals_first(&mut items);
    merge(&items)
}

/// Split text into word runs, whitespace runs, and single punctuation chars.
///
/// Inline images and links are emitted as one token each.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut cursor = 0;
    for target in INLINE_TARGET.find_iter(text) {
        split_plain(&text[cursor..target.start()], &mut tokens);
        tokens.push(target.as_str());
        cursor = target.end();
    }
    split_plain(&text[cursor..], &mut tokens);
    tokens
}

fn split_plain<'a>(text: &'a str, tokens: &mut Vec<&'a str>) {
    #[derive(PartialEq)]
    enum Class {
        Word,
        Space,
        Punct,
    }

    fn class_of(c: char) -> Class {
        if c.is_alphanumeric() || c == '_' {
            Class::Word
        } else if c.is_whitespace() {
            Class::Space
        } else {
            Class::Punct
        }
    }

    let mut start = 0usize;
    let mut current: Option<Class> = None;

    for (idx, c) in text.char_indices() {
        let class = class_of(c);
        let continues = match &current {
            Some(prev) => *prev == class && class != Class::Punct,
            None => true,
        };
        if !continues {
            tokens.push(&text[start..idx]);
            start = idx;
        }
        current = Some(class);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
}

/// Reorder every maximal changed region so removals precede additions.
fn removals_first(items: &mut [(Tag, &str)]) {
    let mut i = 0;
    while i < items.len() {
        if items[i].0 == Tag::Equal {
            i += 1;
            continue;
        }
        let start = i;
        while i < items.len() && items[i].0 != Tag::Equal {
            i += 1;
        }
        // Stable: relative order within each kind is kept.
        items[start..i].sort_by_key(|(tag, _)| *tag == Tag::Added);
    }
}

/// Slide single-kind change runs right while the token after the run equals
/// the run's first token.
fn slide_runs_right(items: &mut [(Tag, &str)]) {
    let mut i = 0;
    while i < items.len() {
        let tag = items[i].0;
        if tag == Tag::Equal {
            i += 1;
            continue;
        }
        let mut start = i;
        let mut end = i;
        while end < items.len() && items[end].0 == tag {
            end += 1;
        }
        while end < items.len() && items[end].0 == Tag::Equal && items[start].1 == items[end].1 {
            items[start].0 = Tag::Equal;
            items[end].0 = tag;
            start += 1;
            end += 1;
        }
        i = end;
    }
}

fn merge(items: &[(Tag, &str)]) -> Vec<WordDiffPart> {
    let mut parts: Vec<WordDiffPart> = Vec::new();
    for (tag, text) in items {
        if let Some(last) = parts.last_mut() {
            if last.tag() == *tag {
                last.value.push_str(text);
                continue;
            }
        }
        parts.push(match tag {
            Tag::Equal => WordDiffPart::unchanged(*text),
            Tag::Removed => WordDiffPart::removed(*text),
            Tag::Added => WordDiffPart::added(*text),
        });
    }
    parts
}

/// Parts visible in the old version (unchanged and removed), for split view.
pub fn old_side(parts: &[WordDiffPart]) -> Vec<WordDiffPart> {
    parts.iter().filter(|p| !p.added).cloned().collect()
}

/// Parts visible in the new version (unchanged and added), for split view.
pub fn new_side(parts: &[WordDiffPart]) -> Vec<WordDiffPart> {
    parts.iter().filter(|p| !p.removed).cloned().collect()
}

/// Concatenate the parts that make up the old text.
pub fn reconstruct_old(parts: &[WordDiffPart]) -> String {
    parts.iter().filter(|p| !p.added).map(|p| p.value.as_str()).collect()
}

/// Concatenate the parts that make up the new text.
pub fn reconstruct_new(parts: &[WordDiffPart]) -> String {
    parts.iter().filter(|p| !p.removed).map(|p| p.value.as_str()).collect()
}

/// Word counts of a diff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDiffStats {
    pub added_words: usize,
    pub removed_words: usize,
}

impl WordDiffStats {
    pub fn from_parts(parts: &[WordDiffPart]) -> Self {
        let words = |p: &WordDiffPart| p.value.split_whitespace().count();
        Self {
            added_words: parts.iter().filter(|p| p.added).map(words).sum(),
            removed_words: parts.iter().filter(|p| p.removed).map(words).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn inserted_word_slides_to_natural_position() {
        let parts = diff_words(Some("The quick fox"), Some("The quick brown fox"));
        assert_eq!(
            parts,
            vec![
                WordDiffPart::unchanged("The quick "),
                WordDiffPart::added("brown "),
                WordDiffPart::unchanged("fox"),
            ]
        );
    }

    #[test]
    fn removed_word_slides_the_same_way() {
        let parts = diff_words(Some("The quick brown fox"), Some("The quick fox"));
        assert_eq!(
            parts,
            vec![
                WordDiffPart::unchanged("The quick "),
                WordDiffPart::removed("brown "),
                WordDiffPart::unchanged("fox"),
            ]
        );
    }

    #[test]
    fn replacement_lists_removal_first() {
        let parts = diff_words(Some("a cat sat"), Some("a dog sat"));
        assert_eq!(
            parts,
            vec![
                WordDiffPart::unchanged("a "),
                WordDiffPart::removed("cat"),
                WordDiffPart::added("dog"),
                WordDiffPart::unchanged(" sat"),
            ]
        );
    }

    #[test]
    fn new_document_is_all_added() {
        assert_eq!(diff_words(None, Some("Hello")), vec![WordDiffPart::added("Hello")]);
    }

    #[test]
    fn deleted_document_is_all_removed() {
        assert_eq!(diff_words(Some("Bye"), None), vec![WordDiffPart::removed("Bye")]);
    }

    #[test]
    fn absent_or_empty_yields_nothing() {
        assert!(diff_words(None, None).is_empty());
        assert!(diff_words(None, Some("")).is_empty());
        assert!(diff_words(Some(""), Some("")).is_empty());
    }

    #[test]
    fn identical_text_is_one_unchanged_part() {
        assert_eq!(
            diff_words(Some("same text"), Some("same text")),
            vec![WordDiffPart::unchanged("same text")]
        );
    }

    #[test]
    fn tokenizer_splits_punctuation() {
        assert_eq!(
            tokenize("Hello, world!! foo_bar  x"),
            vec!["Hello", ",", " ", "world", "!", "!", " ", "foo_bar", "  ", "x"]
        );
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn tokenizer_keeps_images_and_links_whole() {
        assert_eq!(
            tokenize("See ![a](b.png) and [c](http://d/e), ok"),
            vec!["See", " ", "![a](b.png)", " ", "and", " ", "[c](http://d/e)", ",", " ", "ok"]
        );
        assert_eq!(tokenize("[unclosed](x"), vec!["[", "unclosed", "]", "(", "x"]);
    }

    #[test]
    fn changed_image_target_replaces_whole_image() {
        let parts = diff_words(
            Some("See ![alt](http://x/y.png) here"),
            Some("See ![alt](http://x/z.png) here"),
        );
        assert_eq!(
            parts,
            vec![
                WordDiffPart::unchanged("See "),
                WordDiffPart::removed("![alt](http://x/y.png)"),
                WordDiffPart::added("![alt](http://x/z.png)"),
                WordDiffPart::unchanged(" here"),
            ]
        );
    }

    #[test]
    fn punctuation_change_is_isolated() {
        let parts = diff_words(Some("Hello, world"), Some("Hello; world"));
        assert!(parts.contains(&WordDiffPart::removed(",")));
        assert!(parts.contains(&WordDiffPart::added(";")));
    }

    #[test]
    fn one_sided_views_filter_parts() {
        let parts = diff_words(Some("a cat sat"), Some("a dog sat"));
        assert_eq!(reconstruct_new(&new_side(&parts)), "a dog sat");
        assert_eq!(reconstruct_old(&old_side(&parts)), "a cat sat");
        assert!(new_side(&parts).iter().all(|p| !p.is_removed()));
    }

    #[test]
    fn stats_count_words() {
        let parts = diff_words(Some("one two"), Some("one three four"));
        let stats = WordDiffStats::from_parts(&parts);
        assert_eq!(stats.removed_words, 1);
        assert_eq!(stats.added_words, 2);
    }

    proptest! {
        #[test]
        fn parts_reconstruct_both_texts(old in "[ab ,\n]{0,16}", new in "[ab ,\n]{0,16}") {
            let parts = diff_words(Some(old.as_str()), Some(new.as_str()));
            prop_assert_eq!(reconstruct_old(&parts), old);
            prop_assert_eq!(reconstruct_new(&parts), new);
            prop_assert!(parts.iter().all(|p| !(p.is_added() && p.is_removed())));
        }

        #[test]
        fn word_diff_is_idempotent(old in "[ab \n]{0,16}", new in "[ab \n]{0,16}") {
            prop_assert_eq!(
                diff_words(Some(old.as_str()), Some(new.as_str())),
                diff_words(Some(old.as_str()), Some(new.as_str()))
            );
        }
    }
}
