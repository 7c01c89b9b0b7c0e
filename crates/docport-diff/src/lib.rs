//! Diff engine for docport reviews.
//!
//! Compares two versions of a document (markdown body plus front matter)
//! and renders the result for the review UI, either as one annotated column
//! or as two aligned panels. Everything here is synchronous and pure: the
//! same inputs always produce byte-identical output, which keeps the
//! character offsets of stored comment anchors meaningful across renders.
//!
//! # Key Types
//!
//! - [`Hunk`] / [`DiffLine`] -- Line-level diff with per-side line numbers
//! - [`AlignedPair`] -- One row of a split view
//! - [`CharSegment`] / [`SimilarityGate`] -- Character highlighting of replaced lines
//! - [`WordDiffPart`] -- Word-level diff of full bodies
//! - [`DiffEngine`] / [`Comparison`] -- Unified, split, and hunk-only rendering
//! - [`RangeResolution`] -- Comment anchor resolution against rendered text

pub mod align;
pub mod anchor;
pub mod annotate;
pub mod char_diff;
pub mod config;
pub mod error;
pub mod line_diff;
pub mod metadata;
pub mod presentation;
pub mod similarity;
pub mod word_diff;

pub use align::{align_hunk, align_lines, AlignedPair};
pub use anchor::{rendered_plain_text, resolve_range, RangeResolution};
pub use annotate::{annotate, AnnotateOptions};
pub use char_diff::{diff_chars, highlight_pair, CharDiff, CharSegment, LineHighlight};
pub use config::{ContextLines, DiffConfig};
pub use error::{DiffError, DiffResult};
pub use line_diff::{diff_lines, split_lines, DiffLine, Hunk, LineDiffMaps, LineKind};
pub use metadata::{diff_metadata, FieldComparison, MetadataDiff};
pub use presentation::{
    compare, Comparison, ComparisonRequest, DiffEngine, HunkView, HunksOnlyView, SplitRow,
    SplitView, UnifiedView, ViewMode, UNAVAILABLE_PLACEHOLDER,
};
pub use similarity::{is_similar, SimilarityGate};
pub use word_diff::{diff_words, WordDiffPart, WordDiffStats};
