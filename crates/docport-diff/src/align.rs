//! Side-by-side alignment of old and new lines for split view.
//!
//! The aligner walks both documents in lockstep using the per-side change
//! maps of a line diff. Replace blocks (a run of deletions directly followed
//! by a run of additions) are paired row by row in order; no attempt is made
//! to re-match lines by similarity.

use serde::Serialize;

use crate::line_diff::{DiffLine, Hunk, LineDiffMaps, LineKind};

/// One row of a split view.
///
/// At least one side is always present; the constructors are the only way
/// to build a pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AlignedPair {
    old: Option<DiffLine>,
    new: Option<DiffLine>,
}

impl AlignedPair {
    /// A row with lines on both sides.
    pub fn both(old: DiffLine, new: DiffLine) -> Self {
        Self {
            old: Some(old),
            new: Some(new),
        }
    }

    /// A row with only an old-side line.
    pub fn old_only(old: DiffLine) -> Self {
        Self {
            old: Some(old),
            new: None,
        }
    }

    /// A row with only a new-side line.
    pub fn new_only(new: DiffLine) -> Self {
        Self {
            old: None,
            new: Some(new),
        }
    }

    pub fn old(&self) -> Option<&DiffLine> {
        self.old.as_ref()
    }

    pub fn new(&self) -> Option<&DiffLine> {
        self.new.as_ref()
    }

    /// Returns `true` if this row pairs a deletion with an addition.
    pub fn is_replace(&self) -> bool {
        matches!(
            (&self.old, &self.new),
            (Some(DiffLine::Deletion { .. }), Some(DiffLine::Addition { .. }))
        )
    }
}

/// Align full documents for split view.
///
/// `old_lines` and `new_lines` are the complete documents; `maps` tells which
/// of their lines were deleted or added. Every line of both sides appears in
/// exactly one returned pair, in document order.
pub fn align_lines<S: AsRef<str>>(
    maps: &LineDiffMaps,
    old_lines: &[S],
    new_lines: &[S],
) -> Vec<AlignedPair> {
    let mut pairs = Vec::with_capacity(old_lines.len().max(new_lines.len()));
    let (mut i, mut j) = (0usize, 0usize);

    let deleted =
        |idx: usize| idx < old_lines.len() && maps.old_kind(idx + 1) == LineKind::Deletion;
    let added =
        |idx: usize| idx < new_lines.len() && maps.new_kind(idx + 1) == LineKind::Addition;

    while i < old_lines.len() || j < new_lines.len() {
        if deleted(i) {
            let del_start = i;
            while deleted(i) {
                i += 1;
            }
            let add_start = j;
            while added(j) {
                j += 1;
            }
            let dels = (del_start..i).map(|k| deletion(old_lines[k].as_ref(), k));
            let adds = (add_start..j).map(|k| addition(new_lines[k].as_ref(), k));
            pair_block(&mut pairs, dels.collect(), adds.collect());
        } else if added(j) {
            while added(j) {
                pairs.push(AlignedPair::new_only(addition(new_lines[j].as_ref(), j)));
                j += 1;
            }
        } else if i < old_lines.len() && j < new_lines.len() {
            pairs.push(AlignedPair::both(
                context(old_lines[i].as_ref(), i, j),
                context(new_lines[j].as_ref(), i, j),
            ));
            i += 1;
            j += 1;
        } else if i < old_lines.len() {
            // Maps disagree with the documents: the new side ran out first.
            // Keep the line rather than drop it.
            pairs.push(AlignedPair::old_only(deletion(old_lines[i].as_ref(), i)));
            i += 1;
        } else {
            pairs.push(AlignedPair::new_only(addition(new_lines[j].as_ref(), j)));
            j += 1;
        }
    }

    pairs
}

/// Align the lines of a single hunk, for rendering without full content.
pub fn align_hunk(hunk: &Hunk) -> Vec<AlignedPair> {
    let mut pairs = Vec::with_capacity(hunk.lines.len());
    let mut idx = 0usize;
    let lines = &hunk.lines;

    while idx < lines.len() {
        match &lines[idx] {
            DiffLine::Context { .. } => {
                pairs.push(AlignedPair::both(lines[idx].clone(), lines[idx].clone()));
                idx += 1;
            }
            DiffLine::Deletion { .. } => {
                let mut dels = Vec::new();
                while let Some(line @ DiffLine::Deletion { .. }) = lines.get(idx) {
                    dels.push(line.clone());
                    idx += 1;
                }
                let mut adds = Vec::new();
                while let Some(line @ DiffLine::Addition { .. }) = lines.get(idx) {
                    adds.push(line.clone());
                    idx += 1;
                }
                pair_block(&mut pairs, dels, adds);
            }
            DiffLine::Addition { .. } => {
                pairs.push(AlignedPair::new_only(lines[idx].clone()));
                idx += 1;
            }
        }
    }

    pairs
}

/// Pair the i-th deletion with the i-th addition; excess rows are one-sided.
fn pair_block(pairs: &mut Vec<AlignedPair>, dels: Vec<DiffLine>, adds: Vec<DiffLine>) {
    let mut dels = dels.into_iter();
    let mut adds = adds.into_iter();
    loop {
        match (dels.next(), adds.next()) {
            (Some(d), Some(a)) => pairs.push(AlignedPair::both(d, a)),
            (Some(d), None) => pairs.push(AlignedPair::old_only(d)),
            (None, Some(a)) => pairs.push(AlignedPair::new_only(a)),
            (None, None) => break,
        }
    }
}

fn context(content: &str, old_idx: usize, new_idx: usize) -> DiffLine {
    DiffLine::Context {
        content: content.to_string(),
        old_line_number: old_idx + 1,
        new_line_number: new_idx + 1,
    }
}

fn deletion(content: &str, idx: usize) -> DiffLine {
    DiffLine::Deletion {
        content: content.to_string(),
        old_line_number: idx + 1,
    }
}

fn addition(content: &str, idx: usize) -> DiffLine {
    DiffLine::Addition {
        content: content.to_string(),
        new_line_number: idx + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextLines;
    use crate::line_diff::diff_lines;
    use proptest::prelude::*;

    fn align(old: &[&str], new: &[&str]) -> Vec<AlignedPair> {
        let hunks = diff_lines(old, new, ContextLines::Full);
        align_lines(&LineDiffMaps::from_hunks(&hunks), old, new)
    }

    fn contents(pairs: &[AlignedPair]) -> Vec<(Option<&str>, Option<&str>)> {
        pairs
            .iter()
            .map(|p| (p.old().map(DiffLine::content), p.new().map(DiffLine::content)))
            .collect()
    }

    #[test]
    fn replace_pair_is_aligned() {
        let pairs = align(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(
            contents(&pairs),
            vec![
                (Some("a"), Some("a")),
                (Some("b"), Some("x")),
                (Some("c"), Some("c")),
            ]
        );
        assert!(pairs[1].is_replace());
        assert!(!pairs[0].is_replace());
    }

    #[test]
    fn uneven_replace_block_pads_shorter_side() {
        let pairs = align(&["a", "b1", "b2", "z"], &["a", "x1", "z"]);
        assert_eq!(
            contents(&pairs),
            vec![
                (Some("a"), Some("a")),
                (Some("b1"), Some("x1")),
                (Some("b2"), None),
                (Some("z"), Some("z")),
            ]
        );
    }

    #[test]
    fn pure_insertion_is_one_sided() {
        let pairs = align(&["a", "c"], &["a", "b", "c"]);
        assert_eq!(
            contents(&pairs),
            vec![(Some("a"), Some("a")), (None, Some("b")), (Some("c"), Some("c"))]
        );
    }

    #[test]
    fn context_pair_carries_both_numbers() {
        let pairs = align(&["x", "same"], &["same"]);
        let last = pairs.last().unwrap();
        assert_eq!(last.old().and_then(DiffLine::old_line_number), Some(2));
        assert_eq!(last.new().and_then(DiffLine::new_line_number), Some(1));
    }

    #[test]
    fn inconsistent_maps_never_drop_lines() {
        let maps = LineDiffMaps::default();
        let pairs = align_lines(&maps, &["a", "b", "c"], &["a"]);
        assert_eq!(pairs.len(), 3);
        assert!(pairs[2].new().is_none());
    }

    #[test]
    fn hunk_alignment_pairs_index_wise() {
        let hunks = diff_lines(&["a", "b", "c"], &["a", "x", "y", "c"], ContextLines::Radius(0));
        let pairs = align_hunk(&hunks[0]);
        assert_eq!(
            contents(&pairs),
            vec![(Some("b"), Some("x")), (None, Some("y"))]
        );
    }

    proptest! {
        #[test]
        fn every_line_appears_exactly_once(
            old in prop::collection::vec("[abcd]", 0..12),
            new in prop::collection::vec("[abcd]", 0..12),
        ) {
            let hunks = diff_lines(&old, &new, ContextLines::Full);
            let pairs = align_lines(&LineDiffMaps::from_hunks(&hunks), &old, &new);

            let olds: Vec<usize> = pairs
                .iter()
                .filter_map(|p| p.old())
                .filter_map(DiffLine::old_line_number)
                .collect();
            let news: Vec<usize> = pairs
                .iter()
                .filter_map(|p| p.new())
                .filter_map(DiffLine::new_line_number)
                .collect();
            prop_assert_eq!(olds, (1..=old.len()).collect::<Vec<_>>());
            prop_assert_eq!(news, (1..=new.len()).collect::<Vec<_>>());
            prop_assert!(pairs.iter().all(|p| p.old().is_some() || p.new().is_some()));
        }
    }
}
