use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// How much unchanged context a line diff keeps around each change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextLines {
    /// Keep every line: a changed document yields exactly one hunk spanning
    /// both sides in full.
    Full,
    /// Keep at most this many unchanged lines before and after each change,
    /// splitting distant changes into separate hunks.
    Radius(usize),
}

/// Configuration for the comparison engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Percentage of the shorter line's characters that must also occur in
    /// the longer line before a replace-pair gets a character diff. The
    /// comparison is strict: a line pair sitting exactly at the threshold is
    /// not similar.
    pub similarity_threshold_percent: u8,
    /// Context kept by the split-view line diff.
    pub context: ContextLines,
    /// Context kept when rendering caller-supplied hunks only.
    pub fallback_context_lines: usize,
    /// Bodies larger than this (in bytes, either side) skip full rendering
    /// and use the hunk fallback when hunks are available.
    pub max_content_bytes: usize,
    /// Glyph placed before each line break inside a removed span.
    pub line_break_marker: String,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            similarity_threshold_percent: 40,
            context: ContextLines::Full,
            fallback_context_lines: 3,
            max_content_bytes: 512 * 1024,
            line_break_marker: "\u{21b5}".to_string(),
        }
    }
}

impl DiffConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> DiffResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is within its supported range.
    pub fn validate(&self) -> DiffResult<()> {
        if self.similarity_threshold_percent == 0 || self.similarity_threshold_percent > 100 {
            return Err(DiffError::InvalidConfig(format!(
                "similarity_threshold_percent must be in 1..=100, got {}",
                self.similarity_threshold_percent
            )));
        }
        if self.line_break_marker.is_empty() {
            return Err(DiffError::InvalidConfig(
                "line_break_marker must not be empty".to_string(),
            ));
        }
        if self.max_content_bytes == 0 {
            return Err(DiffError::InvalidConfig(
                "max_content_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns `true` if `text` is small enough for full rendering.
    pub fn fits(&self, text: &str) -> bool {
        text.len() <= self.max_content_bytes
    }
}
