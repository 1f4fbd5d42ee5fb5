//! Insertion-ordered mapping node of the State Document.

use std::hash::{Hash, Hasher};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::StateValue;

/// A string-keyed map that remembers insertion order for stable rendering.
///
/// Keys are unique. Order is not semantically significant: two mappings with
/// the same entries in different order are equal and hash identically.
/// Lookups are linear, which is fine for the fixed, small key sets the
/// extractor produces.
#[derive(Clone, Debug, Default)]
pub struct Mapping {
    entries: Vec<(String, StateValue)>,
}

impl Mapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace a key. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: StateValue) -> Option<StateValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries ordered by key, the canonical order for hashing.
    pub fn sorted_entries(&self) -> Vec<(&str, &StateValue)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        sorted
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| v == value))
    }
}

impl Eq for Mapping {}

impl Hash for Mapping {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (key, value) in self.sorted_entries() {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, StateValue)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, StateValue)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (String, StateValue);
    type IntoIter = std::vec::IntoIter<(String, StateValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut mapping = Mapping::new();
        mapping.insert("a", StateValue::from(1i64));
        mapping.insert("b", StateValue::from(2i64));
        let previous = mapping.insert("a", StateValue::from(3i64));

        assert_eq!(previous, Some(StateValue::from(1i64)));
        assert_eq!(mapping.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(mapping.get("a"), Some(&StateValue::from(3i64)));
    }

    #[test]
    fn different_values_are_unequal() {
        let a: Mapping = [("k", StateValue::from(true))].into_iter().collect();
        let b: Mapping = [("k", StateValue::from(false))].into_iter().collect();
        let c: Mapping = [("other", StateValue::from(true))].into_iter().collect();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
