use dawvc_extract::{DecodeError, SchemaError};

/// Errors from staging, committing and querying a repository.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `commit` was called with an empty staging area.
    #[error("Nothing to commit")]
    NothingToCommit,

    #[error("not a daw repository (no {0} found); run `daw init` first")]
    NotInitialized(String),

    #[error("repository already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("unknown commit: {0}")]
    UnknownCommit(String),

    /// The project file could not be decoded; nothing was staged.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An extracted document does not have the fixed schema shape.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("repository lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
