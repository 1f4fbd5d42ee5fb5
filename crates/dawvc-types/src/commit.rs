//! Staged snapshots, commits, and commit identifiers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;
use crate::value::StateValue;

/// An 8-character lowercase hexadecimal commit identifier.
///
/// Hashes are derived from the commit time and a nonce, not from content.
/// They are opaque keys: uniqueness within a history is enforced by the
/// store, which bumps the nonce on collision.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitHash([u8; 4]);

impl CommitHash {
    /// Length of the hex form.
    pub const HEX_LEN: usize = 8;

    /// Derive a hash from a timestamp and nonce.
    pub fn generate(timestamp: DateTime<Utc>, nonce: u32) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"dawvc-commit-v1:");
        hasher.update(&timestamp.timestamp().to_le_bytes());
        hasher.update(&timestamp.timestamp_subsec_nanos().to_le_bytes());
        hasher.update(&nonce.to_le_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&digest.as_bytes()[..4]);
        Self(bytes)
    }

    /// Lowercase hex form, `HEX_LEN` characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the lowercase hex form.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != Self::HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: Self::HEX_LEN,
                actual: s.len(),
            });
        }
        if s.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(TypeError::InvalidHex(s.to_string()));
        }
        let decoded = hex::decode(s).map_err(|_| TypeError::InvalidHex(s.to_string()))?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitHash({})", self.to_hex())
    }
}

impl FromStr for CommitHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for CommitHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CommitHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A project snapshot awaiting inclusion in the next commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedEntry {
    /// Project path relative to the working tree root.
    pub path: String,
    /// The extracted State Document.
    pub state: StateValue,
}

impl StagedEntry {
    /// Stage `state` under `path`.
    pub fn new(path: impl Into<String>, state: StateValue) -> Self {
        Self {
            path: path.into(),
            state,
        }
    }
}

/// An immutable history record of one or more staged snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: CommitHash,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub changes: Vec<StagedEntry>,
}

impl Commit {
    /// The snapshot this commit recorded for `path`.
    ///
    /// When a path was staged more than once before committing, the last
    /// staged entry wins.
    pub fn entry_for(&self, path: &str) -> Option<&StagedEntry> {
        self.changes.iter().rev().find(|entry| entry.path == path)
    }

    /// Distinct paths recorded by this commit, in first-staged order.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        for entry in &self.changes {
            if !paths.contains(&entry.path.as_str()) {
                paths.push(&entry.path);
            }
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn generated_hash_is_eight_lowercase_hex_chars() {
        let hash = CommitHash::generate(ts(1_700_000_000), 0);
        let text = hash.to_string();
        assert_eq!(text.len(), 8);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hash_depends_on_time_and_nonce() {
        let a = CommitHash::generate(ts(1_700_000_000), 0);
        let b = CommitHash::generate(ts(1_700_000_001), 0);
        let c = CommitHash::generate(ts(1_700_000_000), 1);
        assert_eq!(a, CommitHash::generate(ts(1_700_000_000), 0));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(matches!(
            CommitHash::from_hex("abc"),
            Err(TypeError::InvalidLength { expected: 8, actual: 3 })
        ));
        assert!(matches!(CommitHash::from_hex("zzzzzzzz"), Err(TypeError::InvalidHex(_))));
        assert!(matches!(CommitHash::from_hex("ABCDEF01"), Err(TypeError::InvalidHex(_))));
        assert_eq!(CommitHash::from_hex("abcdef01").unwrap().to_hex(), "abcdef01");
    }

    #[test]
    fn commit_serializes_hash_as_string() {
        let commit = Commit {
            hash: CommitHash::from_hex("0badc0de").unwrap(),
            message: "first".into(),
            timestamp: ts(0),
            changes: vec![StagedEntry::new("song.json", StateValue::empty_mapping())],
        };
        let json = serde_json::to_value(&commit).unwrap();
        assert_eq!(json["hash"], "0badc0de");
        let back: Commit = serde_json::from_value(json).unwrap();
        assert_eq!(back, commit);
    }

    #[test]
    fn entry_for_prefers_last_staged() {
        let commit = Commit {
            hash: CommitHash::generate(ts(5), 0),
            message: "twice".into(),
            timestamp: ts(5),
            changes: vec![
                StagedEntry::new("a.json", StateValue::from(1i64)),
                StagedEntry::new("b.json", StateValue::from(2i64)),
                StagedEntry::new("a.json", StateValue::from(3i64)),
            ],
        };
        assert_eq!(commit.entry_for("a.json").unwrap().state, StateValue::from(3i64));
        assert!(commit.entry_for("c.json").is_none());
        assert_eq!(commit.paths(), vec!["a.json", "b.json"]);
    }
}
