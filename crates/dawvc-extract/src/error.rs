//! Error types for the extract crate.

use std::path::PathBuf;

/// Errors raised while turning a path into a decoded project.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The path does not exist or is not a regular file.
    #[error("project file not found: {0}")]
    NotFound(PathBuf),

    /// The file extension is not one the decoder accepts.
    #[error("not a project file (unsupported extension): {0}")]
    UnsupportedExtension(PathBuf),

    /// The file exists but has no content.
    #[error("project file is empty: {0}")]
    Empty(PathBuf),

    /// The content could not be decoded into a project.
    #[error("failed to decode project {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// I/O error while reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for decode results.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// A State Document whose shape deviates from the fixed-key schema.
///
/// This signals a decoder/extractor contract violation, not a user error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema mismatch at `{path}`: {reason}")]
    SchemaMismatch { path: String, reason: String },
}

impl SchemaError {
    pub(crate) fn mismatch(path: &str, reason: impl Into<String>) -> Self {
        let path = if path.is_empty() { "<root>" } else { path };
        SchemaError::SchemaMismatch {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for schema validation results.
pub type SchemaResult<T> = Result<T, SchemaError>;
