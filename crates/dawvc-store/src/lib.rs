//! Staging and commit store for DAW version control.
//!
//! Owns the three persisted documents of a working tree (`state`, `commits`,
//! `staged`) and the [`Repository`] state machine that moves snapshots from
//! the staging area into immutable commits.
//!
//! # Key Types
//!
//! - [`Persistence`] -- Storage trait for the per-tree documents
//! - [`InMemoryPersistence`] / [`FsPersistence`] -- Backends (ephemeral and `.daw/` on disk)
//! - [`Repository`] -- `add`, `commit`, `log`, `status`, `diff`, `show`
//! - [`RepoConfig`] / [`RepoLayout`] -- `.daw/config.toml` settings and on-disk paths
//! - [`RepoState`] -- Head commit and per-path fingerprints

pub mod config;
pub mod error;
pub mod fs;
pub mod memory;
pub mod repository;
pub mod state;
pub mod traits;

pub use config::{project_key, DecoderConfig, RepoConfig, RepoLayout, META_DIR};
pub use error::{StoreError, StoreResult};
pub use fs::FsPersistence;
pub use memory::InMemoryPersistence;
pub use repository::{CommitDetail, PathChange, ProjectStatus, Repository};
pub use state::RepoState;
pub use traits::Persistence;
