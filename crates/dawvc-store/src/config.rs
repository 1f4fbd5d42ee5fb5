//! Repository layout and `.daw/config.toml`.

use std::path::{Component, Path, PathBuf};

use dawvc_diff::MatcherConfig;
use dawvc_extract::JsonDumpDecoder;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Name of the metadata directory inside a working tree.
pub const META_DIR: &str = ".daw";

/// Where a working tree and its metadata live on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoLayout {
    pub root: PathBuf,
    pub meta_dir: PathBuf,
}

impl RepoLayout {
    /// Layout for a working tree rooted at `root`, with metadata in
    /// `root/.daw`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let meta_dir = root.join(META_DIR);
        Self { root, meta_dir }
    }

    /// Path of the persisted [`RepoState`](crate::RepoState).
    pub fn state_file(&self) -> PathBuf {
        self.meta_dir.join("state.json")
    }

    /// Path of the commit history.
    pub fn commits_file(&self) -> PathBuf {
        self.meta_dir.join("commits.json")
    }

    /// Path of the staging area.
    pub fn staged_file(&self) -> PathBuf {
        self.meta_dir.join("staged.json")
    }

    /// Path of the repository configuration.
    pub fn config_file(&self) -> PathBuf {
        self.meta_dir.join("config.toml")
    }
}

/// The key a project path is staged and committed under.
///
/// Separators are normalized to `/`, `.` and `..` segments are resolved
/// lexically, and an absolute path inside `root` is made relative to it, so
/// the same file named several ways maps to one history. Paths outside the
/// working tree keep their absolute form.
pub fn project_key(root: Option<&Path>, path: &Path) -> String {
    let path = normalize(Path::new(&path.to_string_lossy().replace('\\', "/")));
    let key = match root.map(normalize) {
        Some(root) if path.is_absolute() => match path.strip_prefix(&root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => path,
        },
        _ => path,
    };
    key.to_string_lossy().replace('\\', "/")
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Accepted project-dump extensions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub extensions: Vec<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["json".into()],
        }
    }
}

/// Per-repository settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub matcher: MatcherConfig,
    pub decoder: DecoderConfig,
}

impl RepoConfig {
    /// Parse and validate `config.toml` contents. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as `config.toml` contents.
    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Reject invalid matcher settings and an empty extension list.
    pub fn validate(&self) -> StoreResult<()> {
        self.matcher
            .validate()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        if self.decoder.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(StoreError::Config(
                "decoder.extensions must name at least one extension".into(),
            ));
        }
        Ok(())
    }

    /// The project decoder these settings describe.
    pub fn decoder(&self) -> JsonDumpDecoder {
        JsonDumpDecoder::new(self.decoder.extensions.iter().map(|e| e.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths_live_under_meta_dir() {
        let layout = RepoLayout::new("/work/song");
        assert_eq!(layout.meta_dir, PathBuf::from("/work/song/.daw"));
        assert_eq!(layout.staged_file(), PathBuf::from("/work/song/.daw/staged.json"));
        assert_eq!(layout.config_file(), PathBuf::from("/work/song/.daw/config.toml"));
    }

    #[test]
    fn project_key_normalizes_separators() {
        assert_eq!(project_key(None, Path::new("./songs/demo.json")), "songs/demo.json");
        assert_eq!(project_key(None, Path::new("songs\\demo.json")), "songs/demo.json");
        assert_eq!(project_key(None, Path::new("demo.json")), "demo.json");
    }

    #[test]
    fn project_key_resolves_dot_segments() {
        assert_eq!(project_key(None, Path::new("sub/../song.json")), "song.json");
        assert_eq!(project_key(None, Path::new("a/./b/../song.json")), "a/song.json");
        assert_eq!(project_key(None, Path::new("../song.json")), "../song.json");
        assert_eq!(project_key(None, Path::new("/../song.json")), "/song.json");
    }

    #[test]
    fn project_key_is_relative_to_root() {
        let root = Path::new("/work/tree");
        assert_eq!(project_key(Some(root), Path::new("/work/tree/song.json")), "song.json");
        assert_eq!(project_key(Some(root), Path::new("/work/tree/sub/../song.json")), "song.json");
        assert_eq!(project_key(Some(root), Path::new("song.json")), "song.json");
        assert_eq!(project_key(Some(Path::new("/work/tree/.")), Path::new("/work/tree/a.json")), "a.json");
        assert_eq!(project_key(Some(root), Path::new("/elsewhere/song.json")), "/elsewhere/song.json");
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = RepoConfig::default().to_toml_string().unwrap();
        assert!(text.contains("[matcher]"));
        assert!(text.contains("[decoder]"));
        assert_eq!(RepoConfig::from_toml_str(&text).unwrap(), RepoConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config = RepoConfig::from_toml_str("[matcher]\nthreshold = 0.7\n").unwrap();
        assert_eq!(config.matcher.threshold, 0.7);
        assert_eq!(config.matcher.name_weight, 0.3);
        assert_eq!(config.decoder.extensions, vec!["json".to_string()]);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let err = RepoConfig::from_toml_str("[matcher]\nthreshold = 1.5\n").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn empty_extension_list_is_rejected() {
        let err = RepoConfig::from_toml_str("[decoder]\nextensions = []\n").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn decoder_uses_configured_extensions() {
        let config = RepoConfig {
            decoder: DecoderConfig {
                extensions: vec!["flpdump".into(), " json ".into()],
            },
            ..Default::default()
        };
        assert_eq!(config.decoder().extensions(), ["flpdump", "json"]);
    }
}
