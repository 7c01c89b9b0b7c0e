//! Field-by-field comparison of document front matter.
//!
//! Metadata values are short and semantically atomic, so they are compared
//! whole rather than lexically diffed: a changed field shows its old value
//! struck and its new value highlighted.

use std::collections::BTreeSet;

use docport_types::{DocumentMetadata, MetadataField};
use serde::Serialize;

use crate::annotate::escape_html;

/// Comparison of a single metadata field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldComparison {
    pub field: MetadataField,
    /// Display value in the old version (empty if the version is absent).
    pub old: String,
    /// Display value in the new version (empty if the version is absent).
    pub new: String,
    pub changed: bool,
}

impl FieldComparison {
    /// Single-column rendering: `<del>old</del> <ins>new</ins>` when the
    /// field changed, the value once otherwise.
    pub fn render_unified(&self) -> String {
        if !self.changed {
            return escape_html(&self.new);
        }
        let mut pieces = Vec::with_capacity(2);
        if !self.old.is_empty() {
            pieces.push(format!("<del>{}</del>", escape_html(&self.old)));
        }
        if !self.new.is_empty() {
            pieces.push(format!("<ins>{}</ins>", escape_html(&self.new)));
        }
        pieces.join(" ")
    }

    /// Old panel of a split view.
    pub fn render_old_panel(&self) -> String {
        panel(&self.old, self.changed, "del")
    }

    /// New panel of a split view.
    pub fn render_new_panel(&self) -> String {
        panel(&self.new, self.changed, "ins")
    }
}

fn panel(value: &str, changed: bool, tag: &str) -> String {
    if changed && !value.is_empty() {
        format!("<{tag}>{}</{tag}>", escape_html(value))
    } else {
        escape_html(value)
    }
}

/// Comparison of all metadata fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDiff {
    /// One entry per field, in [`MetadataField::ALL`] order.
    pub fields: Vec<FieldComparison>,
    /// Tags present only in the new version, sorted.
    pub tags_added: Vec<String>,
    /// Tags present only in the old version, sorted.
    pub tags_removed: Vec<String>,
}

impl MetadataDiff {
    /// Returns `true` if any field changed.
    pub fn has_changes(&self) -> bool {
        self.fields.iter().any(|f| f.changed)
    }

    /// Returns `true` if the given field changed.
    pub fn is_changed(&self, field: MetadataField) -> bool {
        self.field(field).is_some_and(|f| f.changed)
    }

    pub fn field(&self, field: MetadataField) -> Option<&FieldComparison> {
        self.fields.iter().find(|f| f.field == field)
    }

    /// The fields that changed, in display order.
    pub fn changed_fields(&self) -> Vec<MetadataField> {
        self.fields
            .iter()
            .filter(|f| f.changed)
            .map(|f| f.field)
            .collect()
    }
}

/// Compare metadata of two versions. An absent version has empty metadata.
///
/// Tags are compared as a set: reordering them is not a change.
pub fn diff_metadata(
    old: Option<&DocumentMetadata>,
    new: Option<&DocumentMetadata>,
) -> MetadataDiff {
    let empty = DocumentMetadata::default();
    let old = old.unwrap_or(&empty);
    let new = new.unwrap_or(&empty);

    let old_tags: BTreeSet<&String> = old.tags.iter().collect();
    let new_tags: BTreeSet<&String> = new.tags.iter().collect();

    let fields = MetadataField::ALL
        .iter()
        .map(|&field| {
            let old_value = old.field_value(field);
            let new_value = new.field_value(field);
            let changed = match field {
                MetadataField::Tags => old_tags != new_tags,
                _ => old_value != new_value,
            };
            FieldComparison {
                field,
                old: old_value,
                new: new_value,
                changed,
            }
        })
        .collect();

    MetadataDiff {
        fields,
        tags_added: new_tags.difference(&old_tags).map(|t| t.to_string()).collect(),
        tags_removed: old_tags.difference(&new_tags).map(|t| t.to_string()).collect(),
    }
}
