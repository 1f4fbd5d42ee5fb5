//! Error types for the diff crate.

/// Errors that can occur while configuring the diff engine.
///
/// Comparing two documents never fails; only configuration is validated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiffError {
    /// A matcher weight or threshold is out of range.
    #[error("invalid matcher config: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
