//! Line-level diff: structural comparison of document bodies.
//!
//! Uses the `similar` crate (Myers diff algorithm) to compute a minimal edit
//! script over lines, then groups it into hunks with context lines.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffTag};

use crate::config::ContextLines;

/// The kind of a line in a diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Context,
    Addition,
    Deletion,
}

/// A single line in a diff hunk.
///
/// Line numbers are 1-based. Each variant carries exactly the numbers that
/// exist for it: context lines live on both sides, additions only in the new
/// version, deletions only in the old one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DiffLine {
    /// A line present in both old and new.
    #[serde(rename_all = "camelCase")]
    Context {
        content: String,
        old_line_number: usize,
        new_line_number: usize,
    },
    /// A line added in the new version.
    #[serde(rename_all = "camelCase")]
    Addition {
        content: String,
        new_line_number: usize,
    },
    /// A line removed from the old version.
    #[serde(rename_all = "camelCase")]
    Deletion {
        content: String,
        old_line_number: usize,
    },
}

impl DiffLine {
    pub fn kind(&self) -> LineKind {
        match self {
            DiffLine::Context { .. } => LineKind::Context,
            DiffLine::Addition { .. } => LineKind::Addition,
            DiffLine::Deletion { .. } => LineKind::Deletion,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            DiffLine::Context { content, .. }
            | DiffLine::Addition { content, .. }
            | DiffLine::Deletion { content, .. } => content,
        }
    }

    /// Line number in the old version, if the line exists there.
    pub fn old_line_number(&self) -> Option<usize> {
        match self {
            DiffLine::Context {
                old_line_number, ..
            }
            | DiffLine::Deletion {
                old_line_number, ..
            } => Some(*old_line_number),
            DiffLine::Addition { .. } => None,
        }
    }

    /// Line number in the new version, if the line exists there.
    pub fn new_line_number(&self) -> Option<usize> {
        match self {
            DiffLine::Context {
                new_line_number, ..
            }
            | DiffLine::Addition {
                new_line_number, ..
            } => Some(*new_line_number),
            DiffLine::Deletion { .. } => None,
        }
    }

    /// Returns `true` for additions and deletions.
    pub fn is_change(&self) -> bool {
        !matches!(self, DiffLine::Context { .. })
    }
}

/// A contiguous region of changes in a diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// Stable identifier derived from the hunk's position.
    pub id: String,
    /// First old line covered (1-based). When the hunk has no old lines this
    /// is the number of old lines preceding it.
    pub old_start: usize,
    /// Number of old-side lines in this hunk.
    pub old_lines: usize,
    /// First new line covered, with the same convention as `old_start`.
    pub new_start: usize,
    /// Number of new-side lines in this hunk.
    pub new_lines: usize,
    /// The individual lines, deletions before additions within each change.
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// The unified-diff header, e.g. `@@ -1,3 +1,4 @@`.
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }

    /// Number of added lines.
    pub fn additions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.kind() == LineKind::Addition)
            .count()
    }

    /// Number of removed lines.
    pub fn deletions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.kind() == LineKind::Deletion)
            .count()
    }
}

/// Split a document body into lines.
///
/// Splits on `\n` only and keeps a trailing empty line, so joining the
/// result with `\n` gives back the input. The empty string has no lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').collect()
    }
}

/// Compute the line diff between two documents given as lines.
///
/// Returns no hunks when the inputs are identical. Within every changed
/// region all deletions come before all additions, and the output is a pure
/// function of the inputs.
pub fn diff_lines<S: AsRef<str>>(old: &[S], new: &[S], context: ContextLines) -> Vec<Hunk> {
    let old: Vec<&str> = old.iter().map(|s| s.as_ref()).collect();
    let new: Vec<&str> = new.iter().map(|s| s.as_ref()).collect();

    let flat = flatten_edit_script(&old, &new);
    if !flat.iter().any(DiffLine::is_change) {
        return Vec::new();
    }

    let groups = match context {
        ContextLines::Full => vec![0..flat.len()],
        ContextLines::Radius(radius) => group_by_radius(&flat, radius),
    };

    let mut hunks = Vec::with_capacity(groups.len());
    let mut old_before = 0usize;
    let mut new_before = 0usize;
    let mut cursor = 0usize;

    for (index, group) in groups.into_iter().enumerate() {
        for line in &flat[cursor..group.start] {
            count_sides(line, &mut old_before, &mut new_before);
        }
        let lines = flat[group.clone()].to_vec();
        let hunk = build_hunk(index, lines, old_before, new_before);
        old_before += hunk.old_lines;
        new_before += hunk.new_lines;
        cursor = group.end;
        hunks.push(hunk);
    }

    tracing::trace!(
        old_lines = old.len(),
        new_lines = new.len(),
        hunks = hunks.len(),
        "line diff computed"
    );

    hunks
}

/// Produce every line of both inputs in edit-script order.
///
/// Adjacent non-equal operations are merged into one changed region whose
/// deletions are emitted before its additions.
fn flatten_edit_script(old: &[&str], new: &[&str]) -> Vec<DiffLine> {
    let ops = capture_diff_slices(Algorithm::Myers, old, new);
    let mut out = Vec::with_capacity(old.len().max(new.len()));
    let mut pending_old: Option<Range<usize>> = None;
    let mut pending_new: Option<Range<usize>> = None;

    for op in &ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            flush_change(&mut out, old, new, pending_old.take(), pending_new.take());
            for (o, n) in old_range.zip(new_range) {
                out.push(DiffLine::Context {
                    content: old[o].to_string(),
                    old_line_number: o + 1,
                    new_line_number: n + 1,
                });
            }
        } else {
            extend_range(&mut pending_old, old_range);
            extend_range(&mut pending_new, new_range);
        }
    }
    flush_change(&mut out, old, new, pending_old, pending_new);
    out
}

fn extend_range(pending: &mut Option<Range<usize>>, range: Range<usize>) {
    *pending = match pending.take() {
        Some(existing) => Some(existing.start.min(range.start)..existing.end.max(range.end)),
        None => Some(range),
    };
}

fn flush_change(
    out: &mut Vec<DiffLine>,
    old: &[&str],
    new: &[&str],
    old_range: Option<Range<usize>>,
    new_range: Option<Range<usize>>,
) {
    for o in old_range.unwrap_or_default() {
        out.push(DiffLine::Deletion {
            content: old[o].to_string(),
            old_line_number: o + 1,
        });
    }
    for n in new_range.unwrap_or_default() {
        out.push(DiffLine::Addition {
            content: new[n].to_string(),
            new_line_number: n + 1,
        });
    }
}

/// Select the lines within `radius` of a change and group contiguous
/// selections into hunk ranges over `flat`.
fn group_by_radius(flat: &[DiffLine], radius: usize) -> Vec<Range<usize>> {
    let len = flat.len();
    let mut keep = vec![false; len];

    for (i, line) in flat.iter().enumerate() {
        if line.is_change() {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(len);
            for slot in &mut keep[lo..hi] {
                *slot = true;
            }
        }
    }

    let mut groups = Vec::new();
    let mut start = None;
    for (i, kept) in keep.iter().enumerate() {
        match (*kept, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                groups.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        groups.push(s..len);
    }
    groups
}

fn count_sides(line: &DiffLine, old: &mut usize, new: &mut usize) {
    if line.old_line_number().is_some() {
        *old += 1;
    }
    if line.new_line_number().is_some() {
        *new += 1;
    }
}

fn build_hunk(index: usize, lines: Vec<DiffLine>, old_before: usize, new_before: usize) -> Hunk {
    let mut old_lines = 0usize;
    let mut new_lines = 0usize;
    for line in &lines {
        count_sides(line, &mut old_lines, &mut new_lines);
    }
    Hunk {
        id: format!("hunk-{index}"),
        old_start: if old_lines == 0 { old_before } else { old_before + 1 },
        old_lines,
        new_start: if new_lines == 0 { new_before } else { new_before + 1 },
        new_lines,
        lines,
    }
}

/// Per-side lookup of changed lines, flattened from hunks.
///
/// The old map holds deletions keyed by old line number and the new map
/// holds additions keyed by new line number. Lines missing from a map are
/// context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineDiffMaps {
    pub old: BTreeMap<usize, DiffLine>,
    pub new: BTreeMap<usize, DiffLine>,
}

impl LineDiffMaps {
    pub fn from_hunks(hunks: &[Hunk]) -> Self {
        let mut maps = Self::default();
        for line in hunks.iter().flat_map(|h| &h.lines) {
            match line {
                DiffLine::Deletion {
                    old_line_number, ..
                } => {
                    maps.old.insert(*old_line_number, line.clone());
                }
                DiffLine::Addition {
                    new_line_number, ..
                } => {
                    maps.new.insert(*new_line_number, line.clone());
                }
                DiffLine::Context { .. } => {}
            }
        }
        maps
    }

    /// Kind of the old-side line with this 1-based number.
    pub fn old_kind(&self, line_number: usize) -> LineKind {
        self.old
            .get(&line_number)
            .map_or(LineKind::Context, DiffLine::kind)
    }

    /// Kind of the new-side line with this 1-based number.
    pub fn new_kind(&self, line_number: usize) -> LineKind {
        self.new
            .get(&line_number)
            .map_or(LineKind::Context, DiffLine::kind)
    }
}
