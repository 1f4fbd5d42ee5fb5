//! The staging/commit state machine and its read-only queries.
//!
//! A working tree is `Clean` when nothing is staged and `Staged` otherwise.
//! `add` appends a staged entry; `commit` moves every staged entry into a new
//! immutable [`Commit`] and returns to `Clean`. Status and diff queries never
//! mutate anything.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use dawvc_diff::{ChangeNode, ChangeSet, DiffEngine};
use dawvc_extract::{extract, validate_document, ProjectDecoder};
use dawvc_types::{Commit, CommitHash, StagedEntry, StateValue};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{project_key, RepoConfig};
use crate::error::{StoreError, StoreResult};
use crate::state::RepoState;
use crate::traits::Persistence;

/// Comparison of one project against its history.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectStatus {
    pub path: String,
    /// Whether any commit records this path.
    pub tracked: bool,
    /// Latest staged snapshot against the last committed one, if staged.
    pub staged: Option<ChangeSet>,
    /// Freshly extracted working copy against the last committed snapshot.
    pub working: ChangeSet,
}

impl ProjectStatus {
    /// Nothing staged differs from history and the working copy matches it.
    pub fn is_clean(&self) -> bool {
        self.working.is_empty() && self.staged.as_ref().map_or(true, ChangeSet::is_empty)
    }
}

/// What one commit changed for one path.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PathChange {
    pub path: String,
    /// `true` when no earlier commit recorded this path.
    pub is_new: bool,
    pub changes: ChangeSet,
}

/// A commit together with its per-path change sets.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommitDetail {
    pub commit: Commit,
    pub paths: Vec<PathChange>,
}

/// A version-controlled working tree.
pub struct Repository<P: Persistence> {
    persistence: P,
    config: RepoConfig,
    engine: DiffEngine,
    decoder: Box<dyn ProjectDecoder>,
    write_lock: Mutex<()>,
}

impl<P: Persistence> std::fmt::Debug for Repository<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P: Persistence> Repository<P> {
    /// Initialize a new repository and open it.
    pub fn init(persistence: P, config: RepoConfig) -> StoreResult<Self> {
        config.validate()?;
        persistence.initialize(&config)?;
        info!("initialized repository");
        Ok(Self::with_config(persistence, config))
    }

    /// Open an initialized repository, loading its configuration.
    pub fn open(persistence: P) -> StoreResult<Self> {
        if !persistence.is_initialized()? {
            return Err(StoreError::NotInitialized(".daw".into()));
        }
        let config = persistence.load_config()?;
        Ok(Self::with_config(persistence, config))
    }

    fn with_config(persistence: P, config: RepoConfig) -> Self {
        Self {
            engine: DiffEngine::new(config.matcher.clone()),
            decoder: Box::new(config.decoder()),
            config,
            persistence,
            write_lock: Mutex::new(()),
        }
    }

    /// Replace the project decoder.
    pub fn with_decoder(mut self, decoder: impl ProjectDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// Settings loaded when the repository was opened.
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// The backend holding this repository's documents.
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// The diff engine configured from `[matcher]`.
    pub fn engine(&self) -> &DiffEngine {
        &self.engine
    }

    /// The key `path` is staged and committed under.
    pub fn key_for(&self, path: &Path) -> String {
        project_key(self.persistence.work_tree(), path)
    }

    /// Where `path` is read from: relative paths resolve against the
    /// working tree when there is one.
    fn locate(&self, path: &Path) -> PathBuf {
        match self.persistence.work_tree() {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    // ---- Staging and committing ----

    /// Decode and extract `path` into a validated State Document.
    pub fn snapshot(&self, path: &Path) -> StoreResult<StateValue> {
        let project = self.decoder.decode(&self.locate(path))?;
        let state = extract(&project);
        validate_document(&state)?;
        Ok(state)
    }

    /// Stage the current contents of a project file.
    ///
    /// Nothing is staged if decoding or validation fails.
    pub fn add(&self, path: &Path) -> StoreResult<StagedEntry> {
        let state = self.snapshot(path)?;
        self.stage(self.key_for(path), state)
    }

    /// Stage an already extracted State Document under `path`.
    pub fn stage(&self, path: impl Into<String>, state: StateValue) -> StoreResult<StagedEntry> {
        validate_document(&state)?;
        let entry = StagedEntry::new(path, state);

        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut staged = self.persistence.load_staged()?;
        staged.push(entry.clone());
        self.persistence.save_staged(&staged)?;

        info!(path = %entry.path, staged = staged.len(), "staged project");
        Ok(entry)
    }

    /// Staged entries in the order they were added.
    pub fn staged(&self) -> StoreResult<Vec<StagedEntry>> {
        self.persistence.load_staged()
    }

    /// Commit everything staged, stamped with the current time.
    pub fn commit(&self, message: &str) -> StoreResult<Commit> {
        self.commit_at(message, Utc::now())
    }

    /// Commit everything staged with an explicit timestamp.
    ///
    /// Fails with `NothingToCommit`, leaving history untouched, when the
    /// staging area is empty.
    pub fn commit_at(&self, message: &str, timestamp: DateTime<Utc>) -> StoreResult<Commit> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;

        let staged = self.persistence.load_staged()?;
        if staged.is_empty() {
            return Err(StoreError::NothingToCommit);
        }

        let mut commits = self.persistence.load_commits()?;
        let taken: HashSet<CommitHash> = commits.iter().map(|c| c.hash).collect();
        let hash = (0u32..)
            .map(|nonce| CommitHash::generate(timestamp, nonce))
            .find(|hash| !taken.contains(hash))
            .ok_or_else(|| StoreError::Serialization("commit hash space exhausted".into()))?;

        let commit = Commit {
            hash,
            message: message.to_string(),
            timestamp,
            changes: staged,
        };
        commits.push(commit.clone());
        self.persistence.save_commits(&commits)?;

        let mut state = self.persistence.load_state()?;
        state.record(&commit);
        self.persistence.save_state(&state)?;
        self.persistence.save_staged(&[])?;

        info!(hash = %commit.hash, entries = commit.changes.len(), "created commit");
        Ok(commit)
    }

    // ---- History ----

    /// History oldest first; with a limit, only the most recent `limit`.
    pub fn log(&self, limit: Option<usize>) -> StoreResult<Vec<Commit>> {
        let mut commits = self.persistence.load_commits()?;
        if let Some(limit) = limit {
            let skip = commits.len().saturating_sub(limit);
            commits.drain(..skip);
        }
        Ok(commits)
    }

    /// Head commit and per-path fingerprints.
    pub fn state(&self) -> StoreResult<RepoState> {
        self.persistence.load_state()
    }

    /// Look up a commit by its hex hash.
    ///
    /// Text that is not a well-formed hash is reported as `UnknownCommit`
    /// like any hash missing from history.
    pub fn find_commit(&self, hash: &str) -> StoreResult<Commit> {
        let wanted: CommitHash = hash
            .trim()
            .parse()
            .map_err(|_| StoreError::UnknownCommit(hash.to_string()))?;
        self.persistence
            .load_commits()?
            .into_iter()
            .find(|c| c.hash == wanted)
            .ok_or_else(|| StoreError::UnknownCommit(hash.to_string()))
    }

    /// The State Document recorded for `path` by the most recent commit
    /// that includes it.
    pub fn baseline(&self, path: &str) -> StoreResult<Option<StateValue>> {
        let commits = self.persistence.load_commits()?;
        Ok(latest_snapshot(&commits, path))
    }

    /// The most recently staged State Document for `path`.
    pub fn staged_state(&self, path: &str) -> StoreResult<Option<StateValue>> {
        let staged = self.persistence.load_staged()?;
        Ok(staged
            .into_iter()
            .rev()
            .find(|entry| entry.path == path)
            .map(|entry| entry.state))
    }

    // ---- Comparisons ----

    /// Working copy of `path` against its last committed snapshot.
    ///
    /// A never-committed project compares against an empty document.
    pub fn diff_working(&self, path: &Path) -> StoreResult<ChangeSet> {
        let key = self.key_for(path);
        let working = self.snapshot(path)?;
        let baseline = self.baseline(&key)?.unwrap_or_else(StateValue::empty_mapping);
        Ok(self.engine.diff(&baseline, &working))
    }

    /// Latest staged snapshot of `path` against its last committed snapshot,
    /// or `None` when nothing is staged for it.
    pub fn diff_staged(&self, path: &Path) -> StoreResult<Option<ChangeSet>> {
        let key = self.key_for(path);
        let Some(staged) = self.staged_state(&key)? else {
            return Ok(None);
        };
        let baseline = self.baseline(&key)?.unwrap_or_else(StateValue::empty_mapping);
        Ok(Some(self.engine.diff(&baseline, &staged)))
    }

    /// Staged and working-copy comparisons for `path`.
    pub fn status(&self, path: &Path) -> StoreResult<ProjectStatus> {
        let key = self.key_for(path);
        let state = self.persistence.load_state()?;
        let working_doc = self.snapshot(path)?;

        let working = if state.fingerprint(&key) == Some(working_doc.fingerprint().as_str()) {
            debug!(path = %key, "working copy matches committed fingerprint");
            ChangeSet::new(ChangeNode::Unchanged)
        } else {
            let baseline = self.baseline(&key)?.unwrap_or_else(StateValue::empty_mapping);
            self.engine.diff(&baseline, &working_doc)
        };

        Ok(ProjectStatus {
            tracked: state.is_tracked(&key),
            staged: self.diff_staged(path)?,
            working,
            path: key,
        })
    }

    /// A commit and, for each path it records, the changes against the
    /// previous committed snapshot of that path.
    pub fn show(&self, hash: &str) -> StoreResult<CommitDetail> {
        let commit = self.find_commit(hash)?;
        let commits = self.persistence.load_commits()?;
        let position = commits
            .iter()
            .position(|c| c.hash == commit.hash)
            .ok_or_else(|| StoreError::UnknownCommit(hash.to_string()))?;
        let history = &commits[..position];

        let paths = commit
            .paths()
            .into_iter()
            .filter_map(|path| {
                let entry = commit.entry_for(path)?;
                let previous = latest_snapshot(history, path);
                let baseline = previous.clone().unwrap_or_else(StateValue::empty_mapping);
                Some(PathChange {
                    path: path.to_string(),
                    is_new: previous.is_none(),
                    changes: self.engine.diff(&baseline, &entry.state),
                })
            })
            .collect();

        Ok(CommitDetail { commit, paths })
    }
}

fn latest_snapshot(commits: &[Commit], path: &str) -> Option<StateValue> {
    commits
        .iter()
        .rev()
        .find_map(|c| c.entry_for(path))
        .map(|entry| entry.state.clone())
}
