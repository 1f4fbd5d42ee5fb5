//! Project handle to State Document.

use dawvc_types::StateValue;
use tracing::debug;

use crate::channels::extract_channel_rack;
use crate::project::ProjectHandle;

/// Modules the schema knows about but the extractor does not produce yet.
///
/// They are left out of `modules` entirely so that documents written today
/// stay comparable with documents that carry them later.
pub const UNEXTRACTED_MODULES: [&str; 4] = ["patterns", "mixer", "playlist", "arrangements"];

/// Extract the complete State Document of a decoded project.
///
/// Total and side-effect free: every decoded handle yields a document.
pub fn extract<H: ProjectHandle + ?Sized>(project: &H) -> StateValue {
    let metadata = project.metadata().to_value();
    let channels = extract_channel_rack(project.channel_rack());

    debug!(
        title = %project.metadata().title,
        samplers = project.channel_rack().samplers.len(),
        instruments = project.channel_rack().instruments.len(),
        layers = project.channel_rack().layers.len(),
        automations = project.channel_rack().automations.len(),
        skipped = ?UNEXTRACTED_MODULES,
        "extracted project state"
    );

    StateValue::mapping([
        ("metadata", metadata),
        ("modules", StateValue::mapping([("channels", channels)])),
    ])
}

/// Normalize a path-like field to forward slashes, or `null` when blank.
pub fn normalize_path(path: Option<&str>) -> StateValue {
    match path.map(str::trim) {
        Some(p) if !p.is_empty() => StateValue::from(p.replace('\\', "/")),
        _ => StateValue::null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{BaseChannel, ChannelRack, DecodedProject, Sampler};
    use dawvc_types::ProjectMetadata;

    fn project() -> DecodedProject {
        DecodedProject {
            metadata: ProjectMetadata {
                title: "Try it out".into(),
                artists: "Demo".into(),
                genre: "Electronic".into(),
                version: "20.8.4".into(),
                tempo: 140.0,
                ppq: 96,
            },
            channels: ChannelRack {
                samplers: vec![Sampler {
                    base: BaseChannel {
                        name: Some("Kick".into()),
                        ..Default::default()
                    },
                    ..Default::default()
                }],
                ..Default::default()
            },
        }
    }

    #[test]
    fn document_has_metadata_and_channel_module() {
        let doc = extract(&project());
        assert_eq!(doc.get_path("metadata.tempo"), Some(&StateValue::from(140.0)));
        assert_eq!(doc.get_path("metadata.ppq"), Some(&StateValue::from(96u32)));
        assert!(doc.get_path("modules.channels.channels.samplers").is_some());
    }

    #[test]
    fn unextracted_modules_are_absent() {
        let doc = extract(&project());
        let modules = doc.get("modules").and_then(StateValue::as_mapping).unwrap();
        for name in UNEXTRACTED_MODULES {
            assert!(!modules.contains_key(name), "{name} should be absent");
        }
    }

    #[test]
    fn extraction_is_deterministic() {
        let p = project();
        assert_eq!(extract(&p).fingerprint(), extract(&p).fingerprint());
    }

    #[test]
    fn normalize_path_variants() {
        assert_eq!(
            normalize_path(Some(r"C:\Samples\kick.wav")),
            StateValue::from("C:/Samples/kick.wav")
        );
        assert_eq!(normalize_path(Some("  ")), StateValue::null());
        assert_eq!(normalize_path(None), StateValue::null());
        assert_eq!(
            normalize_path(Some("path/to/sample.wav")),
            StateValue::from("path/to/sample.wav")
        );
    }
}
