//! Foundation types for DAW version control.
//!
//! This crate provides the data model shared by every other crate in the
//! workspace: the State Document a decoded project is normalized into, and the
//! staging/commit records that carry those documents through history.
//!
//! # Key Types
//!
//! - [`StateValue`] -- Recursive State Document node (Scalar | Mapping | Sequence)
//! - [`Scalar`] -- Primitive leaf (null, bool, int, float, string)
//! - [`Mapping`] -- Insertion-ordered, order-insensitive string-keyed map
//! - [`ProjectMetadata`] -- Fixed-key project header (title, tempo, ppq, ...)
//! - [`StagedEntry`] -- A project snapshot awaiting the next commit
//! - [`Commit`] / [`CommitHash`] -- Immutable, hashed, timestamped history record

pub mod commit;
pub mod error;
pub mod mapping;
pub mod metadata;
pub mod value;

pub use commit::{Commit, CommitHash, StagedEntry};
pub use error::TypeError;
pub use mapping::Mapping;
pub use metadata::ProjectMetadata;
pub use value::{Scalar, StateValue, ValueKind};
