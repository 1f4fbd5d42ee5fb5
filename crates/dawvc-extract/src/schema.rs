//! Fixed-key schema of the State Document.
//!
//! Documents are validated at the boundary (after extraction and after loading
//! persisted snapshots) so the diff engine only ever compares comparable
//! shapes.

use dawvc_types::{Mapping, ProjectMetadata, Scalar, StateValue};

use crate::error::{SchemaError, SchemaResult};

pub const ROOT_KEYS: &[&str] = &["metadata", "modules"];
pub const KNOWN_MODULES: &[&str] = &["channels", "patterns", "mixer", "playlist", "arrangements"];
pub const CHANNEL_MODULE_KEYS: &[&str] = &["rack_settings", "groups", "channels"];
pub const RACK_KEYS: &[&str] = &["height", "fit_to_steps", "swing"];
pub const GROUP_KEYS: &[&str] = &["name"];
pub const COLLECTION_KEYS: &[&str] = &["samplers", "instruments", "layers", "automations"];
pub const BASE_KEYS: &[&str] = &[
    "name",
    "display_name",
    "internal_name",
    "enabled",
    "locked",
    "volume",
    "pan",
    "color",
    "icon",
    "zipped",
];
pub const SAMPLER_KEYS: &[&str] = &[
    "base",
    "sample_path",
    "content",
    "fx",
    "envelopes",
    "filter",
    "playback",
    "stretching",
    "lfos",
    "tracking",
];
pub const INSTRUMENT_KEYS: &[&str] = &["base", "plugin", "pitch_shift", "insert", "tracking"];
pub const LAYER_KEYS: &[&str] = &["base", "crossfade", "random"];
pub const AUTOMATION_KEYS: &[&str] = &["base", "lfo"];
pub const CONTENT_KEYS: &[&str] = &["declick_mode", "keep_on_disk", "resample", "load_regions", "load_slices"];
pub const FX_KEYS: &[&str] = &[
    "reverb",
    "boost",
    "clip",
    "crossfade",
    "cutoff",
    "fade_in",
    "fade_out",
    "fade_stereo",
    "fix_trim",
    "freq_tilt",
    "resonance",
    "stereo_delay",
    "reverse",
    "inverted",
    "normalize",
    "ringmod",
    "pogo",
    "start",
    "trim",
];
pub const REVERB_KEYS: &[&str] = &["mix", "type"];
pub const FILTER_KEYS: &[&str] = &["type", "mod_x", "mod_y"];
pub const PLAYBACK_KEYS: &[&str] = &["ping_pong_loop", "start_offset", "use_loop_points"];
pub const STRETCHING_KEYS: &[&str] = &["mode", "multiplier", "pitch", "time"];
pub const TRACKING_KEYS: &[&str] = &["middle_value", "mod_x", "mod_y", "pan"];
pub const ENVELOPE_KEYS: &[&str] = &[
    "amount",
    "attack",
    "decay",
    "sustain",
    "release",
    "attack_tension",
    "decay_tension",
    "release_tension",
    "enabled",
    "synced",
    "hold",
    "predelay",
];
pub const LFO_KEYS: &[&str] = &["amount", "attack", "predelay", "retrig", "shape", "speed", "synced"];

/// Validate a full project State Document against the fixed-key schema.
pub fn validate_document(doc: &StateValue) -> SchemaResult<()> {
    let root = exact(doc, "", ROOT_KEYS)?;
    validate_metadata(field(root, "", "metadata")?)?;

    let modules = mapping(field(root, "", "modules")?, "modules")?;
    for (name, module) in modules.iter() {
        let path = join("modules", name);
        match name {
            "channels" => validate_channel_module(module, &path)?,
            other if KNOWN_MODULES.contains(&other) => {
                mapping(module, &path)?;
            }
            other => return Err(SchemaError::mismatch("modules", format!("unknown module `{other}`"))),
        }
    }
    Ok(())
}

fn validate_metadata(value: &StateValue) -> SchemaResult<()> {
    let metadata = exact(value, "metadata", &ProjectMetadata::KEYS)?;
    for key in ["title", "artists", "genre", "version"] {
        scalar(field(metadata, "metadata", key)?, &join("metadata", key))?;
    }
    match field(metadata, "metadata", "tempo")?.as_f64() {
        Some(tempo) if tempo > 0.0 => {}
        _ => return Err(SchemaError::mismatch("metadata.tempo", "expected a positive number")),
    }
    match field(metadata, "metadata", "ppq")?.as_scalar() {
        Some(Scalar::Int(ppq)) if *ppq > 0 => Ok(()),
        _ => Err(SchemaError::mismatch("metadata.ppq", "expected a positive integer")),
    }
}

fn validate_channel_module(value: &StateValue, path: &str) -> SchemaResult<()> {
    let module = exact(value, path, CHANNEL_MODULE_KEYS)?;

    let rack_path = join(path, "rack_settings");
    scalars(exact(field(module, path, "rack_settings")?, &rack_path, RACK_KEYS)?, &rack_path)?;

    let groups_path = join(path, "groups");
    for (i, group) in sequence(field(module, path, "groups")?, &groups_path)?.iter().enumerate() {
        let group_path = format!("{groups_path}[{i}]");
        scalars(exact(group, &group_path, GROUP_KEYS)?, &group_path)?;
    }

    let collections_path = join(path, "channels");
    let collections = exact(field(module, path, "channels")?, &collections_path, COLLECTION_KEYS)?;
    for (name, entity_keys) in [
        ("samplers", SAMPLER_KEYS),
        ("instruments", INSTRUMENT_KEYS),
        ("layers", LAYER_KEYS),
        ("automations", AUTOMATION_KEYS),
    ] {
        let list_path = join(&collections_path, name);
        for (i, entity) in sequence(field(collections, &collections_path, name)?, &list_path)?
            .iter()
            .enumerate()
        {
            validate_entity(entity, &format!("{list_path}[{i}]"), name, entity_keys)?;
        }
    }
    Ok(())
}

fn validate_entity(value: &StateValue, path: &str, kind: &str, keys: &[&str]) -> SchemaResult<()> {
    let entity = exact(value, path, keys)?;
    let base_path = join(path, "base");
    scalars(exact(field(entity, path, "base")?, &base_path, BASE_KEYS)?, &base_path)?;

    match kind {
        "samplers" => {
            scalar(field(entity, path, "sample_path")?, &join(path, "sample_path"))?;
            optional(entity, path, "content", CONTENT_KEYS)?;
            optional(entity, path, "filter", FILTER_KEYS)?;
            optional(entity, path, "playback", PLAYBACK_KEYS)?;
            optional(entity, path, "stretching", STRETCHING_KEYS)?;
            keyed(entity, path, "envelopes", ENVELOPE_KEYS)?;
            keyed(entity, path, "lfos", LFO_KEYS)?;
            keyed(entity, path, "tracking", TRACKING_KEYS)?;
            validate_fx(field(entity, path, "fx")?, &join(path, "fx"))
        }
        "instruments" => {
            for key in ["plugin", "pitch_shift", "insert"] {
                scalar(field(entity, path, key)?, &join(path, key))?;
            }
            keyed(entity, path, "tracking", TRACKING_KEYS)
        }
        _ => {
            for key in keys.iter().filter(|k| **k != "base") {
                scalar(field(entity, path, key)?, &join(path, key))?;
            }
            Ok(())
        }
    }
}

fn validate_fx(value: &StateValue, path: &str) -> SchemaResult<()> {
    let fx = mapping(value, path)?;
    if fx.is_empty() {
        return Ok(());
    }
    let fx = exact(value, path, FX_KEYS)?;
    optional(fx, path, "reverb", REVERB_KEYS)?;
    for (key, item) in fx.iter() {
        let item_path = join(path, key);
        match key {
            "reverb" => {}
            "ringmod" => {
                if let Some(parts) = item.as_sequence() {
                    if parts.len() != 2 || parts.iter().any(|p| p.as_scalar().is_none()) {
                        return Err(SchemaError::mismatch(&item_path, "expected a pair of scalars"));
                    }
                } else {
                    scalar(item, &item_path)?;
                }
            }
            _ => scalar(item, &item_path)?,
        }
    }
    Ok(())
}

/// An optional sub-object: `{}` or a mapping with exactly `keys`, all scalar.
fn optional(parent: &Mapping, parent_path: &str, key: &str, keys: &[&str]) -> SchemaResult<()> {
    let path = join(parent_path, key);
    let value = field(parent, parent_path, key)?;
    if mapping(value, &path)?.is_empty() {
        return Ok(());
    }
    scalars(exact(value, &path, keys)?, &path)
}

/// A mapping from target names to sub-objects with exactly `keys`.
fn keyed(parent: &Mapping, parent_path: &str, key: &str, keys: &[&str]) -> SchemaResult<()> {
    let path = join(parent_path, key);
    for (target, item) in mapping(field(parent, parent_path, key)?, &path)?.iter() {
        let item_path = join(&path, target);
        scalars(exact(item, &item_path, keys)?, &item_path)?;
    }
    Ok(())
}

fn field<'a>(parent: &'a Mapping, parent_path: &str, key: &str) -> SchemaResult<&'a StateValue> {
    parent
        .get(key)
        .ok_or_else(|| SchemaError::mismatch(parent_path, format!("missing key `{key}`")))
}

fn mapping<'a>(value: &'a StateValue, path: &str) -> SchemaResult<&'a Mapping> {
    value
        .as_mapping()
        .ok_or_else(|| SchemaError::mismatch(path, format!("expected mapping, found {}", value.kind())))
}

fn sequence<'a>(value: &'a StateValue, path: &str) -> SchemaResult<&'a [StateValue]> {
    value
        .as_sequence()
        .ok_or_else(|| SchemaError::mismatch(path, format!("expected sequence, found {}", value.kind())))
}

fn scalar(value: &StateValue, path: &str) -> SchemaResult<()> {
    match value.as_scalar() {
        Some(_) => Ok(()),
        None => Err(SchemaError::mismatch(path, format!("expected scalar, found {}", value.kind()))),
    }
}

fn scalars(mapping: &Mapping, path: &str) -> SchemaResult<()> {
    for (key, value) in mapping.iter() {
        scalar(value, &join(path, key))?;
    }
    Ok(())
}

/// A mapping whose key set is exactly `keys`.
fn exact<'a>(value: &'a StateValue, path: &str, keys: &[&str]) -> SchemaResult<&'a Mapping> {
    let found = mapping(value, path)?;
    if let Some(extra) = found.keys().find(|k| !keys.contains(k)) {
        return Err(SchemaError::mismatch(path, format!("unexpected key `{extra}`")));
    }
    if let Some(missing) = keys.iter().find(|k| !found.contains_key(k)) {
        return Err(SchemaError::mismatch(path, format!("missing key `{missing}`")));
    }
    Ok(found)
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
