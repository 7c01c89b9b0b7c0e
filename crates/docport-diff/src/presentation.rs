//! Review rendering: turns two document versions into a unified or split
//! comparison.
//!
//! Each call is independent and pure. Degenerate requests never fail: they
//! produce [`Comparison::Empty`], a hunk-only rendering, or an explicit
//! [`Comparison::Unavailable`] placeholder.

use docport_types::{DocumentMetadata, DocumentVersion};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::align::{align_hunk, align_lines, AlignedPair};
use crate::anchor::rendered_plain_text;
use crate::annotate::{annotate, escape_html, AnnotateOptions};
use crate::char_diff::{highlight_pair, LineHighlight};
use crate::config::{ContextLines, DiffConfig};
use crate::error::DiffResult;
use crate::line_diff::{diff_lines, split_lines, DiffLine, Hunk, LineDiffMaps};
use crate::metadata::{diff_metadata, MetadataDiff};
use crate::similarity::SimilarityGate;
use crate::word_diff::{diff_words, new_side, old_side, WordDiffStats};

/// Placeholder shown when neither content nor hunks can be rendered.
pub const UNAVAILABLE_PLACEHOLDER: &str = "Diff unavailable for this content.";

/// How a comparison is laid out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// One column with insertions and deletions inline.
    #[default]
    Unified,
    /// Old and new side by side.
    Split,
}

/// A request from the branch-comparison endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonRequest {
    /// Base version; absent for a newly created document.
    pub old: Option<DocumentVersion>,
    /// Head version; absent for a deleted document.
    pub new: Option<DocumentVersion>,
    /// Structural hunks computed elsewhere, used when the full content is
    /// missing or too large.
    pub hunks: Option<Vec<Hunk>>,
    pub mode: ViewMode,
}

impl ComparisonRequest {
    pub fn new(
        old: Option<DocumentVersion>,
        new: Option<DocumentVersion>,
        mode: ViewMode,
    ) -> Self {
        Self {
            old,
            new,
            hunks: None,
            mode,
        }
    }

    /// A request carrying only structural hunks.
    pub fn hunks_only(hunks: Vec<Hunk>) -> Self {
        Self {
            hunks: Some(hunks),
            ..Default::default()
        }
    }

    pub fn with_hunks(mut self, hunks: Vec<Hunk>) -> Self {
        self.hunks = Some(hunks);
        self
    }

    /// Decode a request from JSON.
    pub fn from_json(json: &str) -> DiffResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn has_content(&self) -> bool {
        let present = |v: &Option<DocumentVersion>| v.as_ref().is_some_and(|d| !d.is_blank());
        present(&self.old) || present(&self.new)
    }

    fn supplied_hunks(&self) -> Option<&[Hunk]> {
        self.hunks.as_deref().filter(|h| !h.is_empty())
    }
}

/// Single-column rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedView {
    pub markdown: String,
    pub metadata: MetadataDiff,
    pub stats: WordDiffStats,
}

impl UnifiedView {
    /// Plain text that comment anchors on this view are measured against.
    pub fn plain_text(&self) -> String {
        rendered_plain_text(&self.markdown)
    }
}

/// One aligned row of a split view with its highlighting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRow {
    pub pair: AlignedPair,
    pub old_highlight: LineHighlight,
    pub new_highlight: LineHighlight,
}

/// Side-by-side rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitView {
    pub old_markdown: String,
    pub new_markdown: String,
    pub metadata: MetadataDiff,
    pub rows: Vec<SplitRow>,
    pub hunks: Vec<Hunk>,
    pub stats: WordDiffStats,
}

impl SplitView {
    pub fn old_plain_text(&self) -> String {
        rendered_plain_text(&self.old_markdown)
    }

    pub fn new_plain_text(&self) -> String {
        rendered_plain_text(&self.new_markdown)
    }

    pub fn lines_added(&self) -> usize {
        self.hunks.iter().map(Hunk::additions).sum()
    }

    pub fn lines_removed(&self) -> usize {
        self.hunks.iter().map(Hunk::deletions).sum()
    }
}

/// One hunk rendered without the surrounding document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkView {
    pub id: String,
    pub header: String,
    /// Split-view rows.
    pub rows: Vec<SplitRow>,
    /// Unified-view lines, one annotated markdown string per diff line.
    pub lines: Vec<String>,
}

/// Rendering built from structural hunks only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HunksOnlyView {
    pub hunks: Vec<HunkView>,
    pub metadata: MetadataDiff,
}

/// The result of a comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Comparison {
    /// Nothing to compare.
    Empty,
    /// Content could not be rendered in any form.
    Unavailable { placeholder: String },
    Unified(UnifiedView),
    Split(SplitView),
    HunksOnly(HunksOnlyView),
}

/// Stateless comparison engine holding validated configuration.
#[derive(Clone, Debug)]
pub struct DiffEngine {
    config: DiffConfig,
    gate: SimilarityGate,
    annotate: AnnotateOptions,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::from_valid_config(DiffConfig::default())
    }
}

impl DiffEngine {
    /// Create an engine, validating the configuration.
    pub fn new(config: DiffConfig) -> DiffResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: DiffConfig) -> Self {
        Self {
            gate: SimilarityGate::new(config.similarity_threshold_percent),
            annotate: AnnotateOptions::from(&config),
            config,
        }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Render a comparison request.
    pub fn compare(&self, request: &ComparisonRequest) -> Comparison {
        let hunks = request.supplied_hunks();

        if !request.has_content() {
            return match hunks {
                Some(hunks) => {
                    debug!(hunks = hunks.len(), "no document content, rendering hunks only");
                    Comparison::HunksOnly(self.hunks_only(hunks, request))
                }
                None => {
                    debug!("comparison has no content");
                    Comparison::Empty
                }
            };
        }

        let old_body = request.old.as_ref().map(|d| d.body.as_str());
        let new_body = request.new.as_ref().map(|d| d.body.as_str());
        let oversized = [old_body, new_body]
            .into_iter()
            .flatten()
            .any(|body| !self.config.fits(body));

        if oversized {
            return match hunks {
                Some(hunks) => {
                    debug!(
                        limit = self.config.max_content_bytes,
                        hunks = hunks.len(),
                        "content over size limit, rendering hunks only"
                    );
                    Comparison::HunksOnly(self.hunks_only(hunks, request))
                }
                None => {
                    warn!(
                        limit = self.config.max_content_bytes,
                        "content over size limit and no hunks supplied"
                    );
                    Comparison::Unavailable {
                        placeholder: UNAVAILABLE_PLACEHOLDER.to_string(),
                    }
                }
            };
        }

        debug!(mode = ?request.mode, "rendering comparison");
        match request.mode {
            ViewMode::Unified => Comparison::Unified(self.unified(
                old_body,
                new_body,
                metadata_of(&request.old),
                metadata_of(&request.new),
            )),
            ViewMode::Split => Comparison::Split(self.split(
                old_body,
                new_body,
                metadata_of(&request.old),
                metadata_of(&request.new),
            )),
        }
    }

    /// Unified rendering of two bodies.
    pub fn unified(
        &self,
        old_body: Option<&str>,
        new_body: Option<&str>,
        old_meta: Option<&DocumentMetadata>,
        new_meta: Option<&DocumentMetadata>,
    ) -> UnifiedView {
        let parts = diff_words(old_body, new_body);
        UnifiedView {
            markdown: annotate(&parts, &self.annotate),
            metadata: diff_metadata(old_meta, new_meta),
            stats: WordDiffStats::from_parts(&parts),
        }
    }

    /// Split rendering of two bodies.
    pub fn split(
        &self,
        old_body: Option<&str>,
        new_body: Option<&str>,
        old_meta: Option<&DocumentMetadata>,
        new_meta: Option<&DocumentMetadata>,
    ) -> SplitView {
        let old_lines = split_lines(old_body.unwrap_or_default());
        let new_lines = split_lines(new_body.unwrap_or_default());
        let hunks = diff_lines(&old_lines, &new_lines, self.config.context);
        let maps = LineDiffMaps::from_hunks(&hunks);
        let rows = align_lines(&maps, &old_lines, &new_lines)
            .into_iter()
            .map(|pair| self.row(pair))
            .collect();

        let parts = diff_words(old_body, new_body);
        SplitView {
            old_markdown: annotate(&old_side(&parts), &self.annotate),
            new_markdown: annotate(&new_side(&parts), &self.annotate),
            metadata: diff_metadata(old_meta, new_meta),
            rows,
            hunks,
            stats: WordDiffStats::from_parts(&parts),
        }
    }

    /// Structural hunks with the fallback context radius, suitable for
    /// handing to later hunk-only renderings.
    pub fn structural_hunks(&self, old_body: &str, new_body: &str) -> Vec<Hunk> {
        diff_lines(
            &split_lines(old_body),
            &split_lines(new_body),
            ContextLines::Radius(self.config.fallback_context_lines),
        )
    }

    fn hunks_only(&self, hunks: &[Hunk], request: &ComparisonRequest) -> HunksOnlyView {
        HunksOnlyView {
            hunks: hunks.iter().map(|h| self.hunk_view(h)).collect(),
            metadata: diff_metadata(metadata_of(&request.old), metadata_of(&request.new)),
        }
    }

    fn hunk_view(&self, hunk: &Hunk) -> HunkView {
        HunkView {
            id: hunk.id.clone(),
            header: hunk.header(),
            rows: align_hunk(hunk).into_iter().map(|p| self.row(p)).collect(),
            lines: hunk.lines.iter().map(|l| self.hunk_line(l)).collect(),
        }
    }

    /// One hunk line as annotated markdown. An empty changed line shows the
    /// line-break marker so it stays visible.
    fn hunk_line(&self, line: &DiffLine) -> String {
        let text = match line.content() {
            "" if line.is_change() => self.annotate.line_break_marker.clone(),
            content => escape_html(content),
        };
        match line {
            DiffLine::Context { .. } => text,
            DiffLine::Addition { .. } => format!("<ins>{text}</ins>"),
            DiffLine::Deletion { .. } => format!("<del>{text}</del>"),
        }
    }

    fn row(&self, pair: AlignedPair) -> SplitRow {
        let (old_highlight, new_highlight) = match (pair.old(), pair.new()) {
            (
                Some(DiffLine::Deletion { content: old, .. }),
                Some(DiffLine::Addition { content: new, .. }),
            ) => highlight_pair(old, new, &self.gate),
            (Some(DiffLine::Deletion { .. }), _) => (LineHighlight::Whole, LineHighlight::None),
            (_, Some(DiffLine::Addition { .. })) => (LineHighlight::None, LineHighlight::Whole),
            _ => (LineHighlight::None, LineHighlight::None),
        };
        SplitRow {
            pair,
            old_highlight,
            new_highlight,
        }
    }
}

/// Render a request with the default configuration.
pub fn compare(request: &ComparisonRequest) -> Comparison {
    DiffEngine::default().compare(request)
}

fn metadata_of(version: &Option<DocumentVersion>) -> Option<&DocumentMetadata> {
    version.as_ref().map(|d| &d.metadata)
}
