//! The decoding boundary between project files and the core.
//!
//! Binary project formats are decoded by external tooling. The core accepts
//! anything implementing [`ProjectDecoder`]; [`JsonDumpDecoder`] reads the
//! JSON dump such tooling emits, which is the serde form of
//! [`DecodedProject`].

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{DecodeError, DecodeResult};
use crate::project::DecodedProject;

/// Turns a project path into a decoded project.
///
/// Implementations must reject missing files, foreign extensions, empty
/// files, and undecodable content with a [`DecodeError`], and must not
/// produce a partially decoded project.
pub trait ProjectDecoder: Send + Sync {
    /// Decode the project file at `path`.
    fn decode(&self, path: &Path) -> DecodeResult<DecodedProject>;
}

/// Decoder for JSON project dumps.
#[derive(Clone, Debug)]
pub struct JsonDumpDecoder {
    extensions: Vec<String>,
}

impl Default for JsonDumpDecoder {
    fn default() -> Self {
        Self::new(["json"])
    }
}

impl JsonDumpDecoder {
    /// Create a decoder accepting the given file extensions (without dot).
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.into().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Accepted extensions, lowercased and without the dot.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .is_some_and(|e| self.extensions.iter().any(|allowed| *allowed == e))
    }
}

impl ProjectDecoder for JsonDumpDecoder {
    fn decode(&self, path: &Path) -> DecodeResult<DecodedProject> {
        if !path.is_file() {
            return Err(DecodeError::NotFound(path.to_path_buf()));
        }
        if !self.accepts(path) {
            return Err(DecodeError::UnsupportedExtension(path.to_path_buf()));
        }

        let bytes = fs::read(path)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(DecodeError::Empty(path.to_path_buf()));
        }

        let project: DecodedProject =
            serde_json::from_slice(&bytes).map_err(|e| DecodeError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        check_metadata(path, &project)?;
        debug!(path = %path.display(), bytes = bytes.len(), "decoded project dump");
        Ok(project)
    }
}

fn check_metadata(path: &Path, project: &DecodedProject) -> DecodeResult<()> {
    let tempo = project.metadata.tempo;
    if !tempo.is_finite() || tempo <= 0.0 {
        return Err(DecodeError::Corrupt {
            path: path.to_path_buf(),
            reason: format!("tempo must be positive, got {tempo}"),
        });
    }
    if project.metadata.ppq == 0 {
        return Err(DecodeError::Corrupt {
            path: path.to_path_buf(),
            reason: "ppq must be positive".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"{
        "metadata": {"title": "Demo", "artists": "A", "genre": "G", "version": "21.0.0", "tempo": 128.0, "ppq": 96},
        "channels": {"samplers": [{"name": "Kick", "internal_name": "Sampler", "sample_path": "kick.wav"}]}
    }"#;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn decodes_valid_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "song.json", VALID);

        let project = JsonDumpDecoder::default().decode(&path).unwrap();
        assert_eq!(project.metadata.tempo, 128.0);
        assert_eq!(project.channels.samplers.len(), 1);
        assert_eq!(project.channels.samplers[0].base.name.as_deref(), Some("Kick"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = JsonDumpDecoder::default()
            .decode(Path::new("nonexistent.json"))
            .unwrap_err();
        assert!(matches!(err, DecodeError::NotFound(_)));
    }

    #[test]
    fn foreign_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "test.txt", VALID);
        let err = JsonDumpDecoder::default().decode(&path).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedExtension(_)));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "song.JSON", VALID);
        assert!(JsonDumpDecoder::new([".json"]).decode(&path).is_ok());
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "empty.json", "");
        let err = JsonDumpDecoder::default().decode(&path).unwrap_err();
        assert!(matches!(err, DecodeError::Empty(_)));
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "broken.json", "{ not json");
        let err = JsonDumpDecoder::default().decode(&path).unwrap_err();
        assert!(matches!(err, DecodeError::Corrupt { .. }));
    }

    #[test]
    fn non_positive_tempo_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "zero.json", &VALID.replace("128.0", "0.0"));
        let err = JsonDumpDecoder::default().decode(&path).unwrap_err();
        assert!(matches!(err, DecodeError::Corrupt { reason, .. } if reason.contains("tempo")));
    }
}
