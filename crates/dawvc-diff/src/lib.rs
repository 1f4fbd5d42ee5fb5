//! Diff engine for DAW version control.
//!
//! Compares two State Documents and produces a [`ChangeSet`]: a tree that
//! mirrors the documents' shape with Added/Removed/Modified/Unchanged tags at
//! every node. Collections of channels carry no stable identifier, so
//! sequence elements are paired by the [`EntityMatcher`] using similarity
//! scoring instead of position.
//!
//! # Key Types
//!
//! - [`MatcherConfig`] -- Threshold and weights for entity similarity
//! - [`EntityMatcher`] / [`MatchResult`] -- Greedy threshold pairing of sibling entities
//! - [`DiffEngine`] -- Recursive document comparison
//! - [`ChangeSet`] / [`ChangeNode`] -- Tree-shaped diff result
//! - [`ChangeRecord`] -- Flattened, path-addressed change for rendering
//!
//! Every type here is immutable once built and `Send + Sync`, so independent
//! comparisons can run on separate threads without coordination.

pub mod change;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;

pub use change::{ChangeKind, ChangeNode, ChangeRecord, ChangeSet, EntryChange, FieldChange};
pub use config::MatcherConfig;
pub use engine::{diff, entity_label, DiffEngine};
pub use error::{DiffError, DiffResult};
pub use matcher::{EntityMatcher, MatchResult, MatchedPair};
