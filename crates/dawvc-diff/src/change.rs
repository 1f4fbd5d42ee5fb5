//! Change Set types.
//!
//! A [`ChangeSet`] mirrors the shape of the compared documents. Mapping and
//! sequence nodes cache whether anything below them differs, so renderers can
//! skip unchanged subtrees without walking them.

use std::fmt;

use dawvc_types::StateValue;
use serde::Serialize;

/// One node of a change tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChangeNode {
    /// Equal on both sides (including absent vs `{}`).
    Unchanged,
    /// Present only in the new document.
    Added { value: StateValue },
    /// Present only in the old document.
    Removed { value: StateValue },
    /// Present on both sides with different scalar values or node kinds.
    Modified { old: StateValue, new: StateValue },
    /// Both sides are mappings; per-key changes over the union of keys.
    Mapping { changed: bool, fields: Vec<FieldChange> },
    /// Both sides are entity collections; matched, added, and removed entries.
    Sequence { changed: bool, entries: Vec<EntryChange> },
}

impl ChangeNode {
    /// Returns `true` if this node or any descendant differs.
    pub fn is_changed(&self) -> bool {
        match self {
            ChangeNode::Unchanged => false,
            ChangeNode::Added { .. } | ChangeNode::Removed { .. } | ChangeNode::Modified { .. } => true,
            ChangeNode::Mapping { changed, .. } | ChangeNode::Sequence { changed, .. } => *changed,
        }
    }

    /// The change recorded for `key` when this node is a mapping.
    pub fn field(&self, key: &str) -> Option<&ChangeNode> {
        match self {
            ChangeNode::Mapping { fields, .. } => {
                fields.iter().find(|f| f.key == key).map(|f| &f.change)
            }
            _ => None,
        }
    }

    /// The entry labelled `label` when this node is a sequence.
    pub fn entry(&self, label: &str) -> Option<&EntryChange> {
        match self {
            ChangeNode::Sequence { entries, .. } => entries.iter().find(|e| e.label == label),
            _ => None,
        }
    }
}

/// The change for one key of a mapping.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldChange {
    pub key: String,
    pub change: ChangeNode,
}

/// The change for one entity of a collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntryChange {
    /// Display label derived from the entity's name, not its position.
    pub label: String,
    pub old_index: Option<usize>,
    pub new_index: Option<usize>,
    /// Matcher score for paired entities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    pub change: ChangeNode,
}

impl EntryChange {
    /// Paired entity whose position in the collection changed.
    pub fn is_moved(&self) -> bool {
        matches!((self.old_index, self.new_index), (Some(a), Some(b)) if a != b)
    }
}

/// Kind of a flattened change record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        };
        f.write_str(text)
    }
}

/// A single leaf change addressed by its document path.
///
/// Paths join mapping keys with `.` and address entities as
/// `collection[label]`, e.g. `modules.channels.channels.samplers[Kick].base.volume`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChangeRecord {
    pub path: String,
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<StateValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<StateValue>,
}

/// The result of comparing two State Documents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChangeSet {
    pub root: ChangeNode,
}

impl ChangeSet {
    /// Wrap a comparison tree.
    pub fn new(root: ChangeNode) -> Self {
        Self { root }
    }

    /// Returns `true` if nothing differs anywhere.
    pub fn is_empty(&self) -> bool {
        !self.root.is_changed()
    }

    /// Look up a node by path (`metadata.tempo`, `channels.samplers[Kick]`).
    pub fn node_at(&self, path: &str) -> Option<&ChangeNode> {
        let mut node = &self.root;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            node = match segment.split_once('[') {
                Some((key, rest)) => {
                    let label = rest.strip_suffix(']')?;
                    let collection = if key.is_empty() { node } else { node.field(key)? };
                    &collection.entry(label)?.change
                }
                None => node.field(segment)?,
            };
        }
        Some(node)
    }

    /// Every leaf change, depth first, in document order.
    pub fn records(&self) -> Vec<ChangeRecord> {
        let mut records = Vec::new();
        collect(&self.root, String::new(), &mut records);
        records
    }

    /// Number of `Added` records.
    pub fn additions(&self) -> usize {
        self.count(ChangeKind::Added)
    }

    /// Number of `Removed` records.
    pub fn removals(&self) -> usize {
        self.count(ChangeKind::Removed)
    }

    /// Number of `Modified` records.
    pub fn modifications(&self) -> usize {
        self.count(ChangeKind::Modified)
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.records().iter().filter(|r| r.kind == kind).count()
    }
}

fn collect(node: &ChangeNode, path: String, out: &mut Vec<ChangeRecord>) {
    match node {
        ChangeNode::Unchanged => {}
        ChangeNode::Added { value } => out.push(ChangeRecord {
            path,
            kind: ChangeKind::Added,
            old: None,
            new: Some(value.clone()),
        }),
        ChangeNode::Removed { value } => out.push(ChangeRecord {
            path,
            kind: ChangeKind::Removed,
            old: Some(value.clone()),
            new: None,
        }),
        ChangeNode::Modified { old, new } => out.push(ChangeRecord {
            path,
            kind: ChangeKind::Modified,
            old: Some(old.clone()),
            new: Some(new.clone()),
        }),
        ChangeNode::Mapping { changed: false, .. } | ChangeNode::Sequence { changed: false, .. } => {}
        ChangeNode::Mapping { fields, .. } => {
            for field in fields {
                let child = if path.is_empty() {
                    field.key.clone()
                } else {
                    format!("{path}.{}", field.key)
                };
                collect(&field.change, child, out);
            }
        }
        ChangeNode::Sequence { entries, .. } => {
            for entry in entries {
                collect(&entry.change, format!("{path}[{}]", entry.label), out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modified(old: i64, new: i64) -> ChangeNode {
        ChangeNode::Modified {
            old: StateValue::from(old),
            new: StateValue::from(new),
        }
    }

    fn sample_set() -> ChangeSet {
        ChangeSet::new(ChangeNode::Mapping {
            changed: true,
            fields: vec![
                FieldChange {
                    key: "metadata".into(),
                    change: ChangeNode::Mapping {
                        changed: true,
                        fields: vec![
                            FieldChange { key: "tempo".into(), change: modified(120, 128) },
                            FieldChange { key: "ppq".into(), change: ChangeNode::Unchanged },
                        ],
                    },
                },
                FieldChange {
                    key: "samplers".into(),
                    change: ChangeNode::Sequence {
                        changed: true,
                        entries: vec![
                            EntryChange {
                                label: "Kick".into(),
                                old_index: Some(0),
                                new_index: Some(1),
                                similarity: Some(1.0),
                                change: ChangeNode::Unchanged,
                            },
                            EntryChange {
                                label: "Snare".into(),
                                old_index: None,
                                new_index: Some(0),
                                similarity: None,
                                change: ChangeNode::Added { value: StateValue::empty_mapping() },
                            },
                        ],
                    },
                },
            ],
        })
    }

    #[test]
    fn records_flatten_changed_leaves() {
        let records = sample_set().records();
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["metadata.tempo", "samplers[Snare]"]);
        assert_eq!(records[0].kind, ChangeKind::Modified);
        assert_eq!(records[1].kind, ChangeKind::Added);
    }

    #[test]
    fn node_at_resolves_fields_and_entries() {
        let set = sample_set();
        assert_eq!(set.node_at("metadata.tempo"), Some(&modified(120, 128)));
        assert_eq!(set.node_at("metadata.ppq"), Some(&ChangeNode::Unchanged));
        assert_eq!(set.node_at("samplers[Kick]"), Some(&ChangeNode::Unchanged));
        assert!(set.node_at("samplers[Hat]").is_none());
        assert!(set.node_at("metadata.title").is_none());
    }

    #[test]
    fn counts_by_kind() {
        let set = sample_set();
        assert_eq!(set.modifications(), 1);
        assert_eq!(set.additions(), 1);
        assert_eq!(set.removals(), 0);
        assert!(!set.is_empty());
    }

    #[test]
    fn moved_entry_is_detected() {
        let set = sample_set();
        let kick = set.root.field("samplers").and_then(|s| s.entry("Kick")).unwrap();
        assert!(kick.is_moved());
        assert!(!kick.change.is_changed());
    }

    #[test]
    fn unchanged_root_is_empty() {
        let set = ChangeSet::new(ChangeNode::Mapping { changed: false, fields: vec![] });
        assert!(set.is_empty());
        assert!(set.records().is_empty());
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(ChangeSet::new(modified(1, 2))).unwrap();
        assert_eq!(json["root"]["status"], "modified");
        assert_eq!(json["root"]["new"], 2);
    }
}
