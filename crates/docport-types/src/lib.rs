//! Foundation types for the docport review engine.
//!
//! These are the values exchanged with the engine's collaborators: the
//! content service supplies [`DocumentVersion`] snapshots and the comment
//! service persists [`CommentAnchor`] triples.
//!
//! # Key Types
//!
//! - [`DocumentVersion`] — Body text plus front matter of one document revision
//! - [`DocumentMetadata`] — Title, description, category and tags
//! - [`MetadataField`] — Field selector used for field-by-field comparison
//! - [`CommentAnchor`] — Persisted character range within rendered text

pub mod anchor;
pub mod document;
pub mod error;

pub use anchor::CommentAnchor;
pub use document::{DocumentMetadata, DocumentVersion, MetadataField};
pub use error::TypeError;
