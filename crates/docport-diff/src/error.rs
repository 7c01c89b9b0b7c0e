//! Error types for the diff crate.
//!
//! Rendering itself never fails: degenerate inputs produce empty or
//! placeholder results. These errors cover setup work around it, such as
//! loading configuration or decoding a comparison request.

/// Errors that can occur while preparing a comparison.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The configuration source could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DiffError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
