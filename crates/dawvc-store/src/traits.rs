//! The [`Persistence`] trait: storage for one working tree's documents.

use std::path::Path;

use dawvc_types::{Commit, StagedEntry};

use crate::config::RepoConfig;
use crate::error::StoreResult;
use crate::state::RepoState;

/// Storage for the `state`, `commits` and `staged` documents of one working
/// tree, plus its configuration.
///
/// Each `save_*` replaces the whole document atomically: a reader sees
/// either the previous or the new version, never a partial write. Callers
/// serialize read-modify-write cycles themselves.
pub trait Persistence: Send + Sync {
    /// Whether the documents exist.
    fn is_initialized(&self) -> StoreResult<bool>;

    /// Root of the working tree the documents describe, if it lives on disk.
    /// Project keys are made relative to it.
    fn work_tree(&self) -> Option<&Path> {
        None
    }

    /// Create empty documents and write `config`.
    ///
    /// Fails with `AlreadyInitialized` if documents already exist.
    fn initialize(&self, config: &RepoConfig) -> StoreResult<()>;

    /// The stored configuration.
    fn load_config(&self) -> StoreResult<RepoConfig>;

    fn load_state(&self) -> StoreResult<RepoState>;
    fn save_state(&self, state: &RepoState) -> StoreResult<()>;

    /// Full history, oldest first.
    fn load_commits(&self) -> StoreResult<Vec<Commit>>;
    fn save_commits(&self, commits: &[Commit]) -> StoreResult<()>;

    /// Staged entries in the order they were added.
    fn load_staged(&self) -> StoreResult<Vec<StagedEntry>>;
    fn save_staged(&self, staged: &[StagedEntry]) -> StoreResult<()>;
}
