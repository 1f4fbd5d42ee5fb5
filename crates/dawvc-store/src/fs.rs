//! Filesystem persistence under `<root>/.daw/`.
//!
//! ```text
//! .daw/
//!   state.json     RepoState
//!   commits.json   [Commit]
//!   staged.json    [StagedEntry]
//!   config.toml    RepoConfig
//! ```
//!
//! Every write goes to a temporary file in `.daw/` which is then renamed over
//! the target, so a crash leaves either the old or the new document.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use dawvc_types::{Commit, StagedEntry};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{RepoConfig, RepoLayout};
use crate::error::{StoreError, StoreResult};
use crate::state::RepoState;
use crate::traits::Persistence;

/// A [`Persistence`] backend writing JSON documents into the layout's
/// metadata directory.
#[derive(Clone, Debug)]
pub struct FsPersistence {
    layout: RepoLayout,
}

impl FsPersistence {
    /// Create a backend for `layout`. Nothing is touched on disk until
    /// [`Persistence::initialize`] or the first load.
    pub fn new(layout: RepoLayout) -> Self {
        Self { layout }
    }

    /// The working tree and metadata paths this backend writes to.
    pub fn layout(&self) -> &RepoLayout {
        &self.layout
    }

    fn ensure_initialized(&self) -> StoreResult<()> {
        if self.layout.meta_dir.is_dir() {
            Ok(())
        } else {
            Err(StoreError::NotInitialized(
                self.layout.meta_dir.display().to_string(),
            ))
        }
    }

    fn load_json<T: DeserializeOwned>(&self, path: &Path) -> StoreResult<T> {
        self.ensure_initialized()?;
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))
    }

    fn save_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> StoreResult<()> {
        self.ensure_initialized()?;
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.replace(path, &bytes)
    }

    fn replace(&self, path: &Path, bytes: &[u8]) -> StoreResult<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.layout.meta_dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        debug!(path = %path.display(), bytes = bytes.len(), "wrote document");
        Ok(())
    }
}

impl Persistence for FsPersistence {
    fn is_initialized(&self) -> StoreResult<bool> {
        Ok(self.layout.meta_dir.is_dir())
    }

    fn work_tree(&self) -> Option<&Path> {
        Some(self.layout.root.as_path())
    }

    fn initialize(&self, config: &RepoConfig) -> StoreResult<()> {
        if self.layout.meta_dir.exists() {
            return Err(StoreError::AlreadyInitialized(
                self.layout.root.display().to_string(),
            ));
        }
        fs::create_dir_all(&self.layout.meta_dir)?;
        self.save_state(&RepoState::default())?;
        self.save_commits(&[])?;
        self.save_staged(&[])?;
        self.replace(&self.layout.config_file(), config.to_toml_string()?.as_bytes())?;
        Ok(())
    }

    fn load_config(&self) -> StoreResult<RepoConfig> {
        self.ensure_initialized()?;
        let path = self.layout.config_file();
        match fs::read_to_string(&path) {
            Ok(text) => RepoConfig::from_toml_str(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "config file missing, using defaults");
                Ok(RepoConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn load_state(&self) -> StoreResult<RepoState> {
        self.load_json(&self.layout.state_file())
    }

    fn save_state(&self, state: &RepoState) -> StoreResult<()> {
        self.save_json(&self.layout.state_file(), state)
    }

    fn load_commits(&self) -> StoreResult<Vec<Commit>> {
        self.load_json(&self.layout.commits_file())
    }

    fn save_commits(&self, commits: &[Commit]) -> StoreResult<()> {
        self.save_json(&self.layout.commits_file(), commits)
    }

    fn load_staged(&self) -> StoreResult<Vec<StagedEntry>> {
        self.load_json(&self.layout.staged_file())
    }

    fn save_staged(&self, staged: &[StagedEntry]) -> StoreResult<()> {
        self.save_json(&self.layout.staged_file(), staged)
    }
}
