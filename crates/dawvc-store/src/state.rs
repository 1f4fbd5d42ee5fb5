//! The repository `state` document.

use std::collections::BTreeMap;

use dawvc_types::{Commit, CommitHash};
use serde::{Deserialize, Serialize};

/// Where history currently ends and what each tracked project last looked
/// like when committed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoState {
    /// Hash of the most recent commit.
    pub head: Option<CommitHash>,
    /// Project path to the fingerprint of its latest committed State Document.
    pub tracked: BTreeMap<String, String>,
}

impl RepoState {
    /// Advance the head to `commit` and refresh fingerprints of every path
    /// it records.
    pub fn record(&mut self, commit: &Commit) {
        self.head = Some(commit.hash);
        for path in commit.paths() {
            if let Some(entry) = commit.entry_for(path) {
                self.tracked.insert(path.to_string(), entry.state.fingerprint());
            }
        }
    }

    /// Whether any commit has recorded `path`.
    pub fn is_tracked(&self, path: &str) -> bool {
        self.tracked.contains_key(path)
    }

    /// Fingerprint of the last committed State Document for `path`.
    pub fn fingerprint(&self, path: &str) -> Option<&str> {
        self.tracked.get(path).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dawvc_types::{StagedEntry, StateValue};

    #[test]
    fn record_advances_head_and_tracks_latest_entry() {
        let first = StateValue::mapping([("v", StateValue::from(1i64))]);
        let second = StateValue::mapping([("v", StateValue::from(2i64))]);
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let commit = Commit {
            hash: CommitHash::generate(timestamp, 0),
            message: "two adds".into(),
            timestamp,
            changes: vec![
                StagedEntry::new("song.json", first),
                StagedEntry::new("song.json", second.clone()),
            ],
        };

        let mut state = RepoState::default();
        state.record(&commit);

        assert_eq!(state.head, Some(commit.hash));
        assert!(state.is_tracked("song.json"));
        assert_eq!(state.fingerprint("song.json"), Some(second.fingerprint().as_str()));
        assert!(!state.is_tracked("other.json"));
    }

    #[test]
    fn empty_state_serializes_as_object() {
        let json = serde_json::to_string(&RepoState::default()).unwrap();
        let back: RepoState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RepoState::default());
        let from_empty: RepoState = serde_json::from_str("{}").unwrap();
        assert_eq!(from_empty, RepoState::default());
    }
}
