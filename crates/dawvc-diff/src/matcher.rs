//! Entity matching across two versions of an unordered collection.
//!
//! Channels have no persistent identifier, so "the same sampler" in two
//! versions of a project is inferred from a weighted similarity over its
//! identity-bearing fields:
//!
//! 1. exact `internal_name` match,
//! 2. normalized `name` similarity (character-level diff ratio),
//! 3. overlap across the remaining base fields,
//! 4. exact match on the entity's source (`sample_path` or `plugin`).
//!
//! Identity fields are read from the entity's `base` mapping when it has one,
//! otherwise from the entity itself. The source is read from the entity
//! itself. A component is left out of the weighted average when neither side
//! carries it.
//!
//! `internal_name` only counts when it tells entities apart: in a collection
//! where every entity carries the same internal name (every sampler is a
//! "Sampler") it is left out, otherwise two unrelated samplers would score on
//! it alone.
//!
//! Pairing is greedy: the highest-scoring unmatched pair at or above the
//! threshold is taken first; ties prefer the smaller index distance, then the
//! lower old index.

use std::collections::BTreeSet;

use dawvc_types::{Mapping, StateValue};
use similar::TextDiff;
use tracing::debug;

use crate::config::MatcherConfig;

const IDENTITY_KEYS: [&str; 4] = ["internal_name", "name", "sample_path", "plugin"];
const SOURCE_KEYS: [&str; 2] = ["sample_path", "plugin"];

/// A pair of entities judged to be the same across versions.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchedPair {
    pub old_index: usize,
    pub new_index: usize,
    pub score: f64,
}

/// The outcome of matching two sibling collections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchResult {
    /// Matched pairs, ordered by `old_index`.
    pub pairs: Vec<MatchedPair>,
    /// Old indices with no counterpart.
    pub removed: BTreeSet<usize>,
    /// New indices with no counterpart.
    pub added: BTreeSet<usize>,
}

impl MatchResult {
    /// The old index paired with `new_index`, if any.
    pub fn partner_of_new(&self, new_index: usize) -> Option<&MatchedPair> {
        self.pairs.iter().find(|p| p.new_index == new_index)
    }
}

/// Identity-bearing view of one entity.
struct Identity<'a> {
    internal_name: Option<&'a str>,
    name: Option<String>,
    fields: Option<&'a Mapping>,
    source: Option<&'a StateValue>,
}

impl<'a> Identity<'a> {
    fn of(entity: &'a StateValue) -> Self {
        let source = entity
            .get("base")
            .and_then(StateValue::as_mapping)
            .or_else(|| entity.as_mapping());
        let text = |key: &str| {
            source
                .and_then(|m| m.get(key))
                .and_then(StateValue::as_str)
                .filter(|s| !s.trim().is_empty())
        };
        Self {
            internal_name: text("internal_name"),
            name: text("name").map(|n| n.trim().to_lowercase()),
            fields: source,
            source: SOURCE_KEYS
                .iter()
                .filter_map(|key| entity.get(key))
                .find(|value| !value.is_null()),
        }
    }
}

/// Pairs entities across two versions of a collection.
#[derive(Clone, Debug, Default)]
pub struct EntityMatcher {
    config: MatcherConfig,
}

impl EntityMatcher {
    /// Create a matcher with the given weights and threshold.
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// The weights and threshold this matcher scores with.
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Similarity in `[0, 1]` between two entities. Symmetric.
    ///
    /// `internal_name` is only weighed when `discriminating` is set, i.e. when
    /// the collection holds more than one distinct internal name.
    fn score(&self, old: &Identity<'_>, new: &Identity<'_>, discriminating: bool) -> f64 {
        let mut total = 0.0;
        let mut weight = 0.0;

        match (old.internal_name, new.internal_name) {
            _ if !discriminating => {}
            (None, None) => {}
            (a, b) => {
                weight += self.config.internal_name_weight;
                if a == b {
                    total += self.config.internal_name_weight;
                }
            }
        }

        match (&old.name, &new.name) {
            (None, None) => {}
            (Some(a), Some(b)) => {
                weight += self.config.name_weight;
                total += self.config.name_weight * name_similarity(a, b);
            }
            _ => weight += self.config.name_weight,
        }

        if let Some(overlap) = field_overlap(old.fields, new.fields) {
            weight += self.config.field_weight;
            total += self.config.field_weight * overlap;
        }

        match (old.source, new.source) {
            (None, None) => {}
            (a, b) => {
                weight += self.config.source_weight;
                if a == b {
                    total += self.config.source_weight;
                }
            }
        }

        if weight > 0.0 {
            total / weight
        } else {
            0.0
        }
    }

    /// Pair the entities of `old` with those of `new`.
    pub fn match_entities(&self, old: &[StateValue], new: &[StateValue]) -> MatchResult {
        if old.is_empty() || new.is_empty() {
            return MatchResult {
                pairs: Vec::new(),
                removed: (0..old.len()).collect(),
                added: (0..new.len()).collect(),
            };
        }

        let old_ids: Vec<Identity<'_>> = old.iter().map(Identity::of).collect();
        let new_ids: Vec<Identity<'_>> = new.iter().map(Identity::of).collect();
        let internal_names: BTreeSet<Option<&str>> = old_ids
            .iter()
            .chain(&new_ids)
            .map(|id| id.internal_name)
            .collect();
        let discriminating = internal_names.len() > 1;

        let mut candidates = Vec::new();
        for (i, old_entity) in old.iter().enumerate() {
            for (j, new_entity) in new.iter().enumerate() {
                let score = if old_entity == new_entity {
                    1.0
                } else if old_entity.as_mapping().is_none() || new_entity.as_mapping().is_none() {
                    0.0
                } else {
                    self.score(&old_ids[i], &new_ids[j], discriminating)
                };
                if score >= self.config.threshold {
                    candidates.push(MatchedPair {
                        old_index: i,
                        new_index: j,
                        score,
                    });
                }
            }
        }

        candidates.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| {
                    a.old_index
                        .abs_diff(a.new_index)
                        .cmp(&b.old_index.abs_diff(b.new_index))
                })
                .then_with(|| a.old_index.cmp(&b.old_index))
                .then_with(|| a.new_index.cmp(&b.new_index))
        });

        let mut old_taken = vec![false; old.len()];
        let mut new_taken = vec![false; new.len()];
        let mut pairs = Vec::new();
        for candidate in candidates {
            if old_taken[candidate.old_index] || new_taken[candidate.new_index] {
                continue;
            }
            old_taken[candidate.old_index] = true;
            new_taken[candidate.new_index] = true;
            pairs.push(candidate);
        }
        pairs.sort_by_key(|p| p.old_index);

        let removed: BTreeSet<usize> = (0..old.len()).filter(|i| !old_taken[*i]).collect();
        let added: BTreeSet<usize> = (0..new.len()).filter(|j| !new_taken[*j]).collect();

        debug!(
            old = old.len(),
            new = new.len(),
            matched = pairs.len(),
            removed = removed.len(),
            added = added.len(),
            "matched entities"
        );

        MatchResult { pairs, removed, added }
    }
}

fn name_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    f64::from(TextDiff::from_chars(a, b).ratio())
}

/// Fraction of non-identity keys (across both sides) holding equal values.
fn field_overlap(old: Option<&Mapping>, new: Option<&Mapping>) -> Option<f64> {
    let (old, new) = (old?, new?);
    let mut keys: Vec<&str> = old
        .keys()
        .chain(new.keys())
        .filter(|k| !IDENTITY_KEYS.contains(k))
        .collect();
    keys.sort_unstable();
    keys.dedup();
    if keys.is_empty() {
        return None;
    }
    let equal = keys
        .iter()
        .filter(|k| match (old.get(k), new.get(k)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        })
        .count();
    Some(equal as f64 / keys.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(name: &str, internal: Option<&str>, volume: i64, color: i64) -> StateValue {
        StateValue::mapping([(
            "base",
            StateValue::mapping([
                ("name", StateValue::from(name)),
                ("internal_name", StateValue::from(internal)),
                ("enabled", StateValue::from(true)),
                ("volume", StateValue::from(volume)),
                ("color", StateValue::from(color)),
            ]),
        )])
    }

    fn with_source(entity: StateValue, key: &str, source: &str) -> StateValue {
        let StateValue::Mapping(mut map) = entity else { panic!("not a mapping") };
        map.insert(key, StateValue::from(source));
        StateValue::Mapping(map)
    }

    fn sample(name: &str, path: &str, volume: i64, color: i64) -> StateValue {
        with_source(channel(name, Some("Sampler"), volume, color), "sample_path", path)
    }

    fn matcher() -> EntityMatcher {
        EntityMatcher::new(MatcherConfig::default())
    }

    fn pairs(result: &MatchResult) -> Vec<(usize, usize)> {
        result.pairs.iter().map(|p| (p.old_index, p.new_index)).collect()
    }

    #[test]
    fn empty_old_short_circuits_to_all_added() {
        let new = vec![channel("Kick", None, 100, 1), channel("Snare", None, 100, 2)];
        let result = matcher().match_entities(&[], &new);
        assert!(result.pairs.is_empty());
        assert!(result.removed.is_empty());
        assert_eq!(result.added, BTreeSet::from([0, 1]));
    }

    #[test]
    fn empty_new_short_circuits_to_all_removed() {
        let old = vec![channel("Kick", None, 100, 1)];
        let result = matcher().match_entities(&old, &[]);
        assert_eq!(result.removed, BTreeSet::from([0]));
        assert!(result.added.is_empty());
    }

    #[test]
    fn identical_collections_pair_positionally() {
        let items = vec![
            channel("Kick", Some("Sampler"), 100, 1),
            channel("Snare", Some("Sampler"), 90, 2),
            channel("Hat", Some("Sampler"), 80, 3),
        ];
        let result = matcher().match_entities(&items, &items);
        assert_eq!(pairs(&result), vec![(0, 0), (1, 1), (2, 2)]);
        assert!(result.removed.is_empty() && result.added.is_empty());
    }

    #[test]
    fn reordered_entities_follow_content_not_position() {
        let old = vec![channel("Kick", None, 100, 1), channel("Snare", None, 90, 2)];
        let new = vec![channel("Snare", None, 90, 2), channel("Kick", None, 100, 1)];
        let result = matcher().match_entities(&old, &new);
        assert_eq!(result.partner_of_new(0).unwrap().old_index, 1);
        assert_eq!(result.partner_of_new(1).unwrap().old_index, 0);
    }

    #[test]
    fn renamed_entity_keeping_its_sample_is_paired() {
        let old = vec![sample("Kick", "kick.wav", 100, 1)];
        let new = vec![sample("Bass Drum", "kick.wav", 100, 1)];
        let result = matcher().match_entities(&old, &new);
        assert_eq!(result.pairs.len(), 1);
        assert!(result.pairs[0].score >= 0.6);
    }

    #[test]
    fn renamed_entity_without_internal_name_is_still_paired() {
        let old = vec![channel("Kick", None, 100, 1)];
        let new = vec![channel("Kick 808", None, 100, 1)];
        let result = matcher().match_entities(&old, &new);
        assert_eq!(result.pairs.len(), 1);
    }

    #[test]
    fn shared_internal_name_alone_does_not_pair() {
        let old = vec![sample("Kick", "kick.wav", 100, 1)];
        let new = vec![sample("Vocal Chop", "vocal chop.wav", 60, 9)];
        let result = matcher().match_entities(&old, &new);
        assert!(result.pairs.is_empty());
        assert_eq!(result.removed, BTreeSet::from([0]));
        assert_eq!(result.added, BTreeSet::from([0]));
    }

    #[test]
    fn distinct_internal_names_still_count() {
        let old = vec![
            channel("Lead", Some("3x Osc"), 100, 1),
            channel("Lead", Some("Sytrus"), 100, 1),
        ];
        let new = vec![channel("Lead", Some("Sytrus"), 80, 1)];
        let result = matcher().match_entities(&old, &new);
        assert_eq!(pairs(&result), vec![(1, 0)]);
        assert_eq!(result.removed, BTreeSet::from([0]));
    }

    #[test]
    fn source_decides_between_same_named_candidates() {
        let old = vec![sample("Kick", "kick.wav", 100, 1)];
        let new = vec![
            sample("Kick", "909.wav", 100, 1),
            sample("Kick", "kick.wav", 70, 1),
        ];
        let result = matcher().match_entities(&old, &new);
        assert_eq!(pairs(&result), vec![(0, 1)]);
        assert_eq!(result.added, BTreeSet::from([0]));
    }

    #[test]
    fn plugin_is_read_as_the_source_of_instruments() {
        let synth = |name: &str, plugin: &str| with_source(channel(name, None, 100, 1), "plugin", plugin);
        let old = vec![synth("Pad", "Sytrus")];
        let new = vec![synth("Keys", "FLEX")];
        assert!(matcher().match_entities(&old, &new).pairs.is_empty());

        let renamed = vec![synth("Keys", "Sytrus")];
        assert_eq!(matcher().match_entities(&old, &renamed).pairs.len(), 1);
    }

    #[test]
    fn unrelated_entities_are_never_paired() {
        let old = vec![channel("Kick", Some("Sampler"), 100, 1)];
        let new = StateValue::mapping([(
            "base",
            StateValue::mapping([
                ("name", StateValue::from("Pad")),
                ("internal_name", StateValue::from("3x Osc")),
                ("enabled", StateValue::from(false)),
                ("volume", StateValue::from(40i64)),
                ("color", StateValue::from(9i64)),
            ]),
        )]);
        let result = matcher().match_entities(&old, &[new]);
        assert!(result.pairs.is_empty());
        assert_eq!(result.removed, BTreeSet::from([0]));
        assert_eq!(result.added, BTreeSet::from([0]));
    }

    #[test]
    fn duplicates_match_in_original_order() {
        let dup = channel("Clap", Some("Sampler"), 100, 5);
        let old = vec![dup.clone(), dup.clone(), dup.clone()];
        let new = vec![dup.clone(), dup.clone()];
        let result = matcher().match_entities(&old, &new);
        assert_eq!(pairs(&result), vec![(0, 0), (1, 1)]);
        assert_eq!(result.removed, BTreeSet::from([2]));
    }

    #[test]
    fn best_candidate_wins_over_earlier_one() {
        let old = vec![channel("Lead", None, 100, 1), channel("Lead 2", None, 70, 4)];
        let new = vec![channel("Lead 2", None, 70, 4)];
        let result = matcher().match_entities(&old, &new);
        assert_eq!(result.pairs.len(), 1);
        assert_eq!(result.pairs[0].old_index, 1);
        assert_eq!(result.removed, BTreeSet::from([0]));
    }

    #[test]
    fn scores_are_symmetric() {
        let a = vec![sample("Kick", "kick.wav", 100, 1)];
        let b = vec![sample("Kick 2", "kick.wav", 80, 1)];
        let m = matcher();
        let forward = m.match_entities(&a, &b);
        let backward = m.match_entities(&b, &a);
        assert_eq!(forward.pairs.len(), 1);
        assert_eq!(forward.pairs[0].score, backward.pairs[0].score);
        assert_eq!(m.match_entities(&a, &a).pairs[0].score, 1.0);
    }

    #[test]
    fn scalars_match_only_when_equal() {
        let result = matcher().match_entities(
            &[StateValue::from("a"), StateValue::from("b")],
            &[StateValue::from("b")],
        );
        assert_eq!(pairs(&result), vec![(1, 0)]);
        assert_eq!(result.removed, BTreeSet::from([0]));
    }

    #[test]
    fn higher_threshold_rejects_weak_pairs() {
        let strict = EntityMatcher::new(MatcherConfig { threshold: 0.95, ..Default::default() });
        let old = vec![channel("Kick", Some("Sampler"), 100, 1)];
        let new = vec![channel("Kick", Some("Sampler"), 60, 1)];
        assert!(strict.match_entities(&old, &new).pairs.is_empty());
        assert_eq!(matcher().match_entities(&old, &new).pairs.len(), 1);
    }
}
