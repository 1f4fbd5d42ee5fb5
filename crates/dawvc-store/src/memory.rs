//! In-memory persistence for tests and ephemeral use.

use std::sync::RwLock;

use dawvc_types::{Commit, StagedEntry};

use crate::config::RepoConfig;
use crate::error::{StoreError, StoreResult};
use crate::state::RepoState;
use crate::traits::Persistence;

#[derive(Debug, Default)]
struct Documents {
    config: RepoConfig,
    state: RepoState,
    commits: Vec<Commit>,
    staged: Vec<StagedEntry>,
}

/// A [`Persistence`] backend holding every document behind a `RwLock`.
///
/// Data is lost when the value is dropped.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    documents: RwLock<Option<Documents>>,
}

impl InMemoryPersistence {
    /// Create an uninitialized store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Documents) -> T) -> StoreResult<T> {
        let guard = self.documents.read().map_err(|_| StoreError::LockPoisoned)?;
        let documents = guard.as_ref().ok_or_else(not_initialized)?;
        Ok(f(documents))
    }

    fn write(&self, f: impl FnOnce(&mut Documents)) -> StoreResult<()> {
        let mut guard = self.documents.write().map_err(|_| StoreError::LockPoisoned)?;
        let documents = guard.as_mut().ok_or_else(not_initialized)?;
        f(documents);
        Ok(())
    }
}

fn not_initialized() -> StoreError {
    StoreError::NotInitialized("in-memory repository".into())
}

impl Persistence for InMemoryPersistence {
    fn is_initialized(&self) -> StoreResult<bool> {
        let guard = self.documents.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(guard.is_some())
    }

    fn initialize(&self, config: &RepoConfig) -> StoreResult<()> {
        let mut guard = self.documents.write().map_err(|_| StoreError::LockPoisoned)?;
        if guard.is_some() {
            return Err(StoreError::AlreadyInitialized("in-memory repository".into()));
        }
        *guard = Some(Documents {
            config: config.clone(),
            ..Default::default()
        });
        Ok(())
    }

    fn load_config(&self) -> StoreResult<RepoConfig> {
        self.read(|d| d.config.clone())
    }

    fn load_state(&self) -> StoreResult<RepoState> {
        self.read(|d| d.state.clone())
    }

    fn save_state(&self, state: &RepoState) -> StoreResult<()> {
        self.write(|d| d.state = state.clone())
    }

    fn load_commits(&self) -> StoreResult<Vec<Commit>> {
        self.read(|d| d.commits.clone())
    }

    fn save_commits(&self, commits: &[Commit]) -> StoreResult<()> {
        self.write(|d| d.commits = commits.to_vec())
    }

    fn load_staged(&self) -> StoreResult<Vec<StagedEntry>> {
        self.read(|d| d.staged.clone())
    }

    fn save_staged(&self, staged: &[StagedEntry]) -> StoreResult<()> {
        self.write(|d| d.staged = staged.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dawvc_types::StateValue;

    #[test]
    fn uninitialized_store_rejects_access() {
        let store = InMemoryPersistence::new();
        assert!(!store.is_initialized().unwrap());
        assert!(matches!(store.load_staged(), Err(StoreError::NotInitialized(_))));
        assert!(matches!(store.save_state(&RepoState::default()), Err(StoreError::NotInitialized(_))));
    }

    #[test]
    fn initialize_twice_fails() {
        let store = InMemoryPersistence::new();
        store.initialize(&RepoConfig::default()).unwrap();
        assert!(store.is_initialized().unwrap());
        assert!(matches!(
            store.initialize(&RepoConfig::default()),
            Err(StoreError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn documents_start_empty_and_save_replaces() {
        let store = InMemoryPersistence::new();
        store.initialize(&RepoConfig::default()).unwrap();
        assert!(store.load_commits().unwrap().is_empty());
        assert!(store.load_staged().unwrap().is_empty());
        assert_eq!(store.load_state().unwrap(), RepoState::default());

        let entry = StagedEntry::new("a.json", StateValue::empty_mapping());
        store.save_staged(&[entry.clone()]).unwrap();
        assert_eq!(store.load_staged().unwrap(), vec![entry]);
        store.save_staged(&[]).unwrap();
        assert!(store.load_staged().unwrap().is_empty());
    }
}
