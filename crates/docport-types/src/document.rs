use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// One snapshot of a document as seen by the review engine.
///
/// The comparison endpoint hands the engine two of these: the base version
/// (absent for newly created documents) and the head version (absent for
/// deletions).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersion {
    /// Markdown body.
    #[serde(default)]
    pub body: String,
    /// Structured front matter.
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl DocumentVersion {
    /// Create a version with the given body and empty metadata.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            metadata: DocumentMetadata::default(),
        }
    }

    /// Attach metadata to this version.
    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns `true` if neither the body nor any metadata field carries content.
    pub fn is_blank(&self) -> bool {
        self.body.is_empty() && self.metadata.is_empty()
    }

    /// Decode a version from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, TypeError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Front matter attached to a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl DocumentMetadata {
    /// Returns `true` if every field is empty.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.category.is_empty()
            && self.tags.is_empty()
    }

    /// The display value of a single field. Tags are joined with `", "`.
    pub fn field_value(&self, field: MetadataField) -> String {
        match field {
            MetadataField::Title => self.title.clone(),
            MetadataField::Description => self.description.clone(),
            MetadataField::Category => self.category.clone(),
            MetadataField::Tags => self.tags.join(", "),
        }
    }
}

/// The metadata fields compared by the review engine, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataField {
    Title,
    Description,
    Category,
    Tags,
}

impl MetadataField {
    /// All fields in display order.
    pub const ALL: [MetadataField; 4] = [
        MetadataField::Title,
        MetadataField::Description,
        MetadataField::Category,
        MetadataField::Tags,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            MetadataField::Title => "Title",
            MetadataField::Description => "Description",
            MetadataField::Category => "Category",
            MetadataField::Tags => "Tags",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> DocumentMetadata {
        DocumentMetadata {
            title: "Getting started".into(),
            description: "First steps".into(),
            category: "guides".into(),
            tags: vec!["intro".into(), "setup".into()],
        }
    }

    #[test]
    fn blank_version() {
        assert!(DocumentVersion::default().is_blank());
        assert!(!DocumentVersion::new("text").is_blank());
        let meta_only = DocumentVersion::default().with_metadata(sample_metadata());
        assert!(!meta_only.is_blank());
    }

    #[test]
    fn tags_joined_for_display() {
        let meta = sample_metadata();
        assert_eq!(meta.field_value(MetadataField::Tags), "intro, setup");
        assert_eq!(meta.field_value(MetadataField::Title), "Getting started");
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let doc = DocumentVersion::from_json(r#"{"body":"hello"}"#).unwrap();
        assert_eq!(doc.body, "hello");
        assert!(doc.metadata.is_empty());
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = DocumentVersion::from_json("{not json").unwrap_err();
        assert!(matches!(err, TypeError::Serialization(_)));
    }

    #[test]
    fn field_serializes_lowercase() {
        let json = serde_json::to_string(&MetadataField::Category).unwrap();
        assert_eq!(json, "\"category\"");
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(format!("{}", MetadataField::Description), "Description");
    }
}
