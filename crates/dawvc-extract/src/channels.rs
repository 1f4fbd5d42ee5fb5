//! Channel rack extraction.
//!
//! Absent optional sub-objects become `{}` rather than `null` or a missing
//! key. Numeric and boolean fields are copied verbatim.

use std::collections::BTreeMap;

use dawvc_types::StateValue;

use crate::extractor::normalize_path;
use crate::project::{
    Automation, BaseChannel, ChannelRack, Content, DisplayGroup, Envelope, Filter, Fx,
    Instrument, Layer, Lfo, Playback, Reverb, Sampler, Stretching, Tracking,
};

/// Extract the `channels` module document.
pub fn extract_channel_rack(rack: &ChannelRack) -> StateValue {
    StateValue::mapping([
        (
            "rack_settings",
            StateValue::mapping([
                ("height", StateValue::from(rack.height)),
                ("fit_to_steps", StateValue::from(rack.fit_to_steps)),
                ("swing", StateValue::from(rack.swing)),
            ]),
        ),
        (
            "groups",
            StateValue::Sequence(rack.groups.iter().map(group).collect()),
        ),
        (
            "channels",
            StateValue::mapping([
                ("samplers", StateValue::Sequence(rack.samplers.iter().map(sampler).collect())),
                (
                    "instruments",
                    StateValue::Sequence(rack.instruments.iter().map(instrument).collect()),
                ),
                ("layers", StateValue::Sequence(rack.layers.iter().map(layer).collect())),
                (
                    "automations",
                    StateValue::Sequence(rack.automations.iter().map(automation).collect()),
                ),
            ]),
        ),
    ])
}

fn or_empty<T>(value: Option<&T>, render: impl FnOnce(&T) -> StateValue) -> StateValue {
    value.map_or_else(StateValue::empty_mapping, render)
}

fn keyed<T>(value: Option<&BTreeMap<String, T>>, render: fn(&T) -> StateValue) -> StateValue {
    match value {
        Some(map) => StateValue::mapping(map.iter().map(|(k, v)| (k.clone(), render(v)))),
        None => StateValue::empty_mapping(),
    }
}

fn group(group: &DisplayGroup) -> StateValue {
    StateValue::mapping([("name", StateValue::from(group.name.as_deref()))])
}

fn base(channel: &BaseChannel) -> StateValue {
    StateValue::mapping([
        ("name", StateValue::from(channel.name.as_deref())),
        ("display_name", StateValue::from(channel.display_name.as_deref())),
        ("internal_name", StateValue::from(channel.internal_name.as_deref())),
        ("enabled", StateValue::from(channel.enabled)),
        ("locked", StateValue::from(channel.locked)),
        ("volume", StateValue::from(channel.volume)),
        ("pan", StateValue::from(channel.pan)),
        ("color", StateValue::from(channel.color)),
        ("icon", StateValue::from(channel.icon)),
        ("zipped", StateValue::from(channel.zipped)),
    ])
}

fn sampler(sampler: &Sampler) -> StateValue {
    StateValue::mapping([
        ("base", base(&sampler.base)),
        ("sample_path", normalize_path(sampler.sample_path.as_deref())),
        ("content", or_empty(sampler.content.as_ref(), content)),
        ("fx", or_empty(sampler.fx.as_ref(), fx)),
        ("envelopes", keyed(sampler.envelopes.as_ref(), envelope)),
        ("filter", or_empty(sampler.filter.as_ref(), filter)),
        ("playback", or_empty(sampler.playback.as_ref(), playback)),
        ("stretching", or_empty(sampler.stretching.as_ref(), stretching)),
        ("lfos", keyed(sampler.lfos.as_ref(), lfo)),
        ("tracking", keyed(sampler.tracking.as_ref(), tracking)),
    ])
}

fn instrument(instrument: &Instrument) -> StateValue {
    StateValue::mapping([
        ("base", base(&instrument.base)),
        ("plugin", StateValue::from(instrument.plugin.as_deref())),
        ("pitch_shift", StateValue::from(instrument.pitch_shift)),
        ("insert", StateValue::from(instrument.insert)),
        ("tracking", keyed(instrument.tracking.as_ref(), tracking)),
    ])
}

fn layer(layer: &Layer) -> StateValue {
    StateValue::mapping([
        ("base", base(&layer.base)),
        ("crossfade", StateValue::from(layer.crossfade)),
        ("random", StateValue::from(layer.random)),
    ])
}

fn automation(automation: &Automation) -> StateValue {
    StateValue::mapping([
        ("base", base(&automation.base)),
        ("lfo", StateValue::from(automation.lfo.as_ref().and_then(|l| l.amount))),
    ])
}

fn content(content: &Content) -> StateValue {
    StateValue::mapping([
        ("declick_mode", StateValue::from(content.declick_mode.as_deref())),
        ("keep_on_disk", StateValue::from(content.keep_on_disk)),
        ("resample", StateValue::from(content.resample)),
        ("load_regions", StateValue::from(content.load_regions)),
        ("load_slices", StateValue::from(content.load_slices)),
    ])
}

fn fx(fx: &Fx) -> StateValue {
    let ringmod = fx
        .ringmod
        .map(|(mix, freq)| StateValue::Sequence(vec![mix.into(), freq.into()]));
    StateValue::mapping([
        ("reverb", or_empty(fx.reverb.as_ref(), reverb)),
        ("boost", StateValue::from(fx.boost)),
        ("clip", StateValue::from(fx.clip)),
        ("crossfade", StateValue::from(fx.crossfade)),
        ("cutoff", StateValue::from(fx.cutoff)),
        ("fade_in", StateValue::from(fx.fade_in)),
        ("fade_out", StateValue::from(fx.fade_out)),
        ("fade_stereo", StateValue::from(fx.fade_stereo)),
        ("fix_trim", StateValue::from(fx.fix_trim)),
        ("freq_tilt", StateValue::from(fx.freq_tilt)),
        ("resonance", StateValue::from(fx.resonance)),
        ("stereo_delay", StateValue::from(fx.stereo_delay)),
        ("reverse", StateValue::from(fx.reverse)),
        ("inverted", StateValue::from(fx.inverted)),
        ("normalize", StateValue::from(fx.normalize)),
        ("ringmod", StateValue::from(ringmod)),
        ("pogo", StateValue::from(fx.pogo)),
        ("start", StateValue::from(fx.start)),
        ("trim", StateValue::from(fx.trim)),
    ])
}

fn reverb(reverb: &Reverb) -> StateValue {
    StateValue::mapping([
        ("mix", StateValue::from(reverb.mix)),
        ("type", StateValue::from(reverb.kind.as_deref())),
    ])
}

fn filter(filter: &Filter) -> StateValue {
    StateValue::mapping([
        ("type", StateValue::from(filter.kind.as_deref())),
        ("mod_x", StateValue::from(filter.mod_x)),
        ("mod_y", StateValue::from(filter.mod_y)),
    ])
}

fn playback(playback: &Playback) -> StateValue {
    StateValue::mapping([
        ("ping_pong_loop", StateValue::from(playback.ping_pong_loop)),
        ("start_offset", StateValue::from(playback.start_offset)),
        ("use_loop_points", StateValue::from(playback.use_loop_points)),
    ])
}

fn stretching(stretching: &Stretching) -> StateValue {
    StateValue::mapping([
        ("mode", StateValue::from(stretching.mode.as_deref())),
        ("multiplier", StateValue::from(stretching.multiplier)),
        ("pitch", StateValue::from(stretching.pitch)),
        ("time", StateValue::from(stretching.time)),
    ])
}

fn tracking(tracking: &Tracking) -> StateValue {
    StateValue::mapping([
        ("middle_value", StateValue::from(tracking.middle_value)),
        ("mod_x", StateValue::from(tracking.mod_x)),
        ("mod_y", StateValue::from(tracking.mod_y)),
        ("pan", StateValue::from(tracking.pan)),
    ])
}

fn envelope(envelope: &Envelope) -> StateValue {
    StateValue::mapping([
        ("amount", StateValue::from(envelope.amount)),
        ("attack", StateValue::from(envelope.attack)),
        ("decay", StateValue::from(envelope.decay)),
        ("sustain", StateValue::from(envelope.sustain)),
        ("release", StateValue::from(envelope.release)),
        ("attack_tension", StateValue::from(envelope.attack_tension)),
        ("decay_tension", StateValue::from(envelope.decay_tension)),
        ("release_tension", StateValue::from(envelope.release_tension)),
        ("enabled", StateValue::from(envelope.enabled)),
        ("synced", StateValue::from(envelope.synced)),
        ("hold", StateValue::from(envelope.hold)),
        ("predelay", StateValue::from(envelope.predelay)),
    ])
}

fn lfo(lfo: &Lfo) -> StateValue {
    StateValue::mapping([
        ("amount", StateValue::from(lfo.amount)),
        ("attack", StateValue::from(lfo.attack)),
        ("predelay", StateValue::from(lfo.predelay)),
        ("retrig", StateValue::from(lfo.retrig)),
        ("shape", StateValue::from(lfo.shape.as_deref())),
        ("speed", StateValue::from(lfo.speed)),
        ("synced", StateValue::from(lfo.synced)),
    ])
}
