//! State extraction for DAW version control.
//!
//! Turns a decoded project into the canonical State Document and guards the
//! boundary where ill-formed input is rejected.
//!
//! # Key Types
//!
//! - [`ProjectHandle`] -- Named accessors the extractor reads from
//! - [`DecodedProject`] -- Typed project objects produced by a decoder
//! - [`ProjectDecoder`] / [`JsonDumpDecoder`] -- Path-to-project decoding boundary
//! - [`extract`] -- Project handle to State Document
//! - [`validate_document`] -- Fixed-key schema check for State Documents
//!
//! # Document Shape
//!
//! ```text
//! { metadata: { title, artists, genre, version, tempo, ppq },
//!   modules:  { channels: { rack_settings, groups, channels: { samplers, instruments, layers, automations } } } }
//! ```
//!
//! The `patterns`, `mixer`, `playlist` and `arrangements` modules are known to
//! the schema but not yet extracted; they are absent keys, never `null`.

pub mod channels;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod project;
pub mod schema;

pub use decoder::{JsonDumpDecoder, ProjectDecoder};
pub use error::{DecodeError, DecodeResult, SchemaError, SchemaResult};
pub use extractor::{extract, normalize_path, UNEXTRACTED_MODULES};
pub use project::{
    Automation, AutomationLfo, BaseChannel, ChannelRack, Content, DecodedProject, DisplayGroup,
    Envelope, Filter, Fx, Instrument, Layer, Lfo, Playback, ProjectHandle, Reverb, Sampler,
    Stretching, Tracking,
};
pub use schema::validate_document;
