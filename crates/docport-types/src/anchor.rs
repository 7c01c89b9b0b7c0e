use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A persisted comment location within rendered plain text.
///
/// Offsets count characters (Unicode scalar values) of the rendered plain
/// text; `end_offset` is exclusive. Anchors are stored by the comment
/// service and only read here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAnchor {
    pub selected_text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl CommentAnchor {
    /// Create an anchor, rejecting ranges whose start lies after their end.
    pub fn new(
        selected_text: impl Into<String>,
        start_offset: usize,
        end_offset: usize,
    ) -> Result<Self, TypeError> {
        if start_offset > end_offset {
            return Err(TypeError::InvalidAnchorRange {
                start: start_offset,
                end: end_offset,
            });
        }
        Ok(Self {
            selected_text: selected_text.into(),
            start_offset,
            end_offset,
        })
    }

    /// Number of characters covered by the stored range.
    pub fn span_len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }
}
