//! Recursive comparison of two State Documents.

use std::collections::HashMap;

use dawvc_types::{Mapping, StateValue};
use tracing::debug;

use crate::change::{ChangeNode, ChangeSet, EntryChange, FieldChange};
use crate::config::MatcherConfig;
use crate::matcher::EntityMatcher;

/// Compares State Documents, pairing collection entities with an
/// [`EntityMatcher`].
#[derive(Clone, Debug, Default)]
pub struct DiffEngine {
    matcher: EntityMatcher,
}

impl DiffEngine {
    /// Create an engine pairing entities with the given matcher settings.
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            matcher: EntityMatcher::new(config),
        }
    }

    /// The matcher used for collections of mappings.
    pub fn matcher(&self) -> &EntityMatcher {
        &self.matcher
    }

    /// Compare `old` against `new`. Never fails; wholly different documents
    /// produce a change set of removals and additions.
    pub fn diff(&self, old: &StateValue, new: &StateValue) -> ChangeSet {
        let set = ChangeSet::new(self.compare(old, new));
        debug!(changed = set.root.is_changed(), "compared documents");
        set
    }

    fn compare(&self, old: &StateValue, new: &StateValue) -> ChangeNode {
        if old == new {
            return ChangeNode::Unchanged;
        }
        match (old, new) {
            (StateValue::Mapping(a), StateValue::Mapping(b)) => self.compare_mappings(a, b),
            (StateValue::Sequence(a), StateValue::Sequence(b))
                if is_entity_collection(a) && is_entity_collection(b) =>
            {
                self.compare_entities(a, b)
            }
            _ => ChangeNode::Modified {
                old: old.clone(),
                new: new.clone(),
            },
        }
    }

    fn compare_mappings(&self, old: &Mapping, new: &Mapping) -> ChangeNode {
        let mut fields = Vec::with_capacity(old.len().max(new.len()));

        for (key, old_value) in old.iter() {
            let change = match new.get(key) {
                Some(new_value) => self.compare(old_value, new_value),
                None if old_value.is_empty_mapping() => ChangeNode::Unchanged,
                None => ChangeNode::Removed {
                    value: old_value.clone(),
                },
            };
            fields.push(FieldChange {
                key: key.to_string(),
                change,
            });
        }

        for (key, new_value) in new.iter().filter(|(k, _)| !old.contains_key(k)) {
            let change = if new_value.is_empty_mapping() {
                ChangeNode::Unchanged
            } else {
                ChangeNode::Added {
                    value: new_value.clone(),
                }
            };
            fields.push(FieldChange {
                key: key.to_string(),
                change,
            });
        }

        let changed = fields.iter().any(|f| f.change.is_changed());
        ChangeNode::Mapping { changed, fields }
    }

    fn compare_entities(&self, old: &[StateValue], new: &[StateValue]) -> ChangeNode {
        let result = self.matcher.match_entities(old, new);

        // Matched and added entries are labelled within the new collection,
        // removed ones within the old, so a path names the same entity in
        // either direction.
        let mut new_labels = Labels::default();
        let mut entries = Vec::with_capacity(result.pairs.len() + result.added.len() + result.removed.len());

        for (j, new_entity) in new.iter().enumerate() {
            let label = new_labels.assign(new_entity, j);
            let entry = match result.partner_of_new(j) {
                Some(pair) => EntryChange {
                    label,
                    old_index: Some(pair.old_index),
                    new_index: Some(j),
                    similarity: Some(pair.score),
                    change: self.compare(&old[pair.old_index], new_entity),
                },
                None => EntryChange {
                    label,
                    old_index: None,
                    new_index: Some(j),
                    similarity: None,
                    change: ChangeNode::Added {
                        value: new_entity.clone(),
                    },
                },
            };
            entries.push(entry);
        }

        let mut labels = Labels::default();
        let old_labels: Vec<String> = old
            .iter()
            .enumerate()
            .map(|(i, entity)| labels.assign(entity, i))
            .collect();
        for &i in &result.removed {
            entries.push(EntryChange {
                label: old_labels[i].clone(),
                old_index: Some(i),
                new_index: None,
                similarity: None,
                change: ChangeNode::Removed {
                    value: old[i].clone(),
                },
            });
        }

        let changed = entries.iter().any(|e| e.change.is_changed());
        ChangeNode::Sequence { changed, entries }
    }
}

/// Compare two documents with the default matcher configuration.
pub fn diff(old: &StateValue, new: &StateValue) -> ChangeSet {
    DiffEngine::default().diff(old, new)
}

/// Display label for a collection entity: its name, falling back to its
/// internal name. `None` when the entity carries neither.
pub fn entity_label(entity: &StateValue) -> Option<String> {
    let base = entity.get("base");
    [
        base.and_then(|b| b.get("name")),
        entity.get("name"),
        base.and_then(|b| b.get("internal_name")),
        entity.get("internal_name"),
    ]
    .into_iter()
    .flatten()
    .filter_map(StateValue::as_str)
    .map(str::trim)
    .find(|s| !s.is_empty())
    .map(str::to_string)
}

fn is_entity_collection(items: &[StateValue]) -> bool {
    items.iter().all(|item| item.as_mapping().is_some())
}

/// Hands out labels unique within one collection. Must see the collection's
/// entities in order.
#[derive(Default)]
struct Labels {
    seen: HashMap<String, usize>,
}

impl Labels {
    fn assign(&mut self, entity: &StateValue, index: usize) -> String {
        let base = entity_label(entity).unwrap_or_else(|| format!("#{index}"));
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{base}#{count}")
        }
    }
}
