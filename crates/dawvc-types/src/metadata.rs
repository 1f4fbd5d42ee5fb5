//! Project header metadata.

use serde::{Deserialize, Serialize};

use crate::value::StateValue;

/// Fixed-key project header extracted once per project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub title: String,
    pub artists: String,
    pub genre: String,
    pub version: String,
    /// Beats per minute, always positive.
    pub tempo: f64,
    /// Pulses per quarter note, always positive.
    pub ppq: u32,
}

impl ProjectMetadata {
    /// The keys of the metadata mapping, in document order.
    pub const KEYS: [&'static str; 6] = ["title", "artists", "genre", "version", "tempo", "ppq"];

    /// Render the metadata as a State Document mapping.
    pub fn to_value(&self) -> StateValue {
        StateValue::mapping([
            ("title", StateValue::from(self.title.as_str())),
            ("artists", StateValue::from(self.artists.as_str())),
            ("genre", StateValue::from(self.genre.as_str())),
            ("version", StateValue::from(self.version.as_str())),
            ("tempo", StateValue::from(self.tempo)),
            ("ppq", StateValue::from(self.ppq)),
        ])
    }
}
