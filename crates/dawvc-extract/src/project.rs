//! Typed project objects as yielded by a format decoder.
//!
//! These mirror what a capability-rich project decoder exposes for a channel
//! rack: plain data with optional sub-objects. Every field defaults, so a
//! decoder may leave out whatever its format does not carry.

use std::collections::BTreeMap;

use dawvc_types::ProjectMetadata;
use serde::{Deserialize, Serialize};

/// Named accessors the State Extractor reads a project through.
///
/// The extractor never sees raw bytes; any decoder that can answer these
/// accessors can feed the version-control core.
pub trait ProjectHandle {
    fn metadata(&self) -> &ProjectMetadata;
    fn channel_rack(&self) -> &ChannelRack;
}

/// A fully decoded project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedProject {
    pub metadata: ProjectMetadata,
    #[serde(default)]
    pub channels: ChannelRack,
}

impl ProjectHandle for DecodedProject {
    fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    fn channel_rack(&self) -> &ChannelRack {
        &self.channels
    }
}

/// The channel rack: rack-wide settings, display groups, and channels by kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelRack {
    pub height: Option<i64>,
    pub fit_to_steps: Option<bool>,
    pub swing: Option<i64>,
    pub groups: Vec<DisplayGroup>,
    pub samplers: Vec<Sampler>,
    pub instruments: Vec<Instrument>,
    pub layers: Vec<Layer>,
    pub automations: Vec<Automation>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayGroup {
    pub name: Option<String>,
}

/// Properties shared by every channel kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseChannel {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub internal_name: Option<String>,
    pub enabled: Option<bool>,
    pub locked: Option<bool>,
    pub volume: Option<i64>,
    pub pan: Option<i64>,
    /// Packed RGBA.
    pub color: Option<u32>,
    pub icon: Option<i64>,
    pub zipped: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sampler {
    #[serde(flatten)]
    pub base: BaseChannel,
    pub sample_path: Option<String>,
    pub content: Option<Content>,
    pub fx: Option<Fx>,
    pub envelopes: Option<BTreeMap<String, Envelope>>,
    pub filter: Option<Filter>,
    pub playback: Option<Playback>,
    pub stretching: Option<Stretching>,
    pub lfos: Option<BTreeMap<String, Lfo>>,
    pub tracking: Option<BTreeMap<String, Tracking>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instrument {
    #[serde(flatten)]
    pub base: BaseChannel,
    /// Name of the hosted plugin.
    pub plugin: Option<String>,
    pub pitch_shift: Option<i64>,
    /// Mixer insert the channel is routed to.
    pub insert: Option<i64>,
    pub tracking: Option<BTreeMap<String, Tracking>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layer {
    #[serde(flatten)]
    pub base: BaseChannel,
    pub crossfade: Option<bool>,
    pub random: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Automation {
    #[serde(flatten)]
    pub base: BaseChannel,
    pub lfo: Option<AutomationLfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationLfo {
    pub amount: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Content {
    pub declick_mode: Option<String>,
    pub keep_on_disk: Option<bool>,
    pub resample: Option<bool>,
    pub load_regions: Option<bool>,
    pub load_slices: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fx {
    pub reverb: Option<Reverb>,
    pub boost: Option<i64>,
    pub clip: Option<bool>,
    pub crossfade: Option<i64>,
    pub cutoff: Option<i64>,
    pub fade_in: Option<i64>,
    pub fade_out: Option<i64>,
    pub fade_stereo: Option<bool>,
    pub fix_trim: Option<bool>,
    pub freq_tilt: Option<i64>,
    pub resonance: Option<i64>,
    pub stereo_delay: Option<i64>,
    pub reverse: Option<bool>,
    pub inverted: Option<bool>,
    pub normalize: Option<bool>,
    /// Ring modulation as (mix, frequency).
    pub ringmod: Option<(i64, i64)>,
    pub pogo: Option<i64>,
    pub start: Option<i64>,
    pub trim: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reverb {
    pub mix: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub mod_x: Option<i64>,
    pub mod_y: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playback {
    pub ping_pong_loop: Option<bool>,
    pub start_offset: Option<i64>,
    pub use_loop_points: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stretching {
    pub mode: Option<String>,
    pub multiplier: Option<i64>,
    pub pitch: Option<i64>,
    pub time: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tracking {
    pub middle_value: Option<i64>,
    pub mod_x: Option<i64>,
    pub mod_y: Option<i64>,
    pub pan: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub amount: Option<i64>,
    pub attack: Option<i64>,
    pub decay: Option<i64>,
    pub sustain: Option<i64>,
    pub release: Option<i64>,
    pub attack_tension: Option<i64>,
    pub decay_tension: Option<i64>,
    pub release_tension: Option<i64>,
    pub enabled: Option<bool>,
    pub synced: Option<bool>,
    pub hold: Option<i64>,
    pub predelay: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lfo {
    pub amount: Option<i64>,
    pub attack: Option<i64>,
    pub predelay: Option<i64>,
    pub retrig: Option<bool>,
    pub shape: Option<String>,
    pub speed: Option<i64>,
    pub synced: Option<bool>,
}
