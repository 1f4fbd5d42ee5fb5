//! The State Document value tree.
//!
//! A [`StateValue`] is one of three node kinds: a primitive [`Scalar`], a
//! string-keyed [`Mapping`], or an ordered `Sequence`. Every leaf is a
//! primitive; there is no opaque variant, so a document can always be
//! serialized, compared, and hashed.
//!
//! # Equality
//!
//! - Integers and floats compare numerically when the float is exactly
//!   integral (`1 == 1.0`).
//! - `NaN` equals `NaN`, so `D == D` holds for every document.
//! - Mapping equality ignores key order.
//!
//! [`Hash`] and [`StateValue::fingerprint`] follow the same rules.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::mapping::Mapping;

/// A primitive leaf of the State Document.
#[derive(Clone, Debug)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Canonical numeric form used for both hashing and fingerprinting.
enum CanonicalNumber {
    Int(i64),
    Bits(u64),
    NaN,
}

fn canonical_float(f: f64) -> CanonicalNumber {
    if f.is_nan() {
        return CanonicalNumber::NaN;
    }
    let truncated = f as i64;
    if truncated as f64 == f {
        CanonicalNumber::Int(truncated)
    } else {
        CanonicalNumber::Bits(f.to_bits())
    }
}

impl Scalar {
    /// Returns the value as an `f64` when it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the string content when the scalar is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    fn canonical_number(&self) -> Option<CanonicalNumber> {
        match self {
            Scalar::Int(i) => Some(CanonicalNumber::Int(*i)),
            Scalar::Float(f) => Some(canonical_float(*f)),
            _ => None,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Scalar::Int(i), Scalar::Float(f)) | (Scalar::Float(f), Scalar::Int(i)) => {
                matches!(canonical_float(*f), CanonicalNumber::Int(n) if n == *i)
            }
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Scalar::Null => 0u8.hash(state),
            Scalar::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Scalar::Str(s) => {
                2u8.hash(state);
                s.hash(state);
            }
            Scalar::Int(_) | Scalar::Float(_) => match self.canonical_number() {
                Some(CanonicalNumber::Int(i)) => {
                    3u8.hash(state);
                    i.hash(state);
                }
                Some(CanonicalNumber::Bits(bits)) => {
                    4u8.hash(state);
                    bits.hash(state);
                }
                Some(CanonicalNumber::NaN) | None => 5u8.hash(state),
            },
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// The kind of a [`StateValue`] node, used in schema diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Scalar,
    Mapping,
    Sequence,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Scalar => "scalar",
            ValueKind::Mapping => "mapping",
            ValueKind::Sequence => "sequence",
        };
        f.write_str(name)
    }
}

/// A node of the State Document.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StateValue {
    Scalar(Scalar),
    Mapping(Mapping),
    Sequence(Vec<StateValue>),
}

impl Default for StateValue {
    fn default() -> Self {
        StateValue::Scalar(Scalar::Null)
    }
}

impl StateValue {
    /// The null scalar.
    pub fn null() -> Self {
        StateValue::Scalar(Scalar::Null)
    }

    /// A mapping with no keys. Compares equal to an absent sub-mapping in diffs.
    pub fn empty_mapping() -> Self {
        StateValue::Mapping(Mapping::new())
    }

    /// Build a mapping node from `(key, value)` pairs, keeping their order.
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, StateValue)>,
    {
        StateValue::Mapping(entries.into_iter().collect())
    }

    /// Which of scalar, mapping or sequence this is.
    pub fn kind(&self) -> ValueKind {
        match self {
            StateValue::Scalar(_) => ValueKind::Scalar,
            StateValue::Mapping(_) => ValueKind::Mapping,
            StateValue::Sequence(_) => ValueKind::Sequence,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StateValue::Scalar(Scalar::Null))
    }

    /// Returns `true` for a mapping with no keys.
    pub fn is_empty_mapping(&self) -> bool {
        matches!(self, StateValue::Mapping(m) if m.is_empty())
    }

    /// The scalar, if this is one.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            StateValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The mapping, if this is one.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            StateValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// The items, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[StateValue]> {
        match self {
            StateValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// The text of a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// The value of a numeric scalar, integers widened.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Scalar::as_f64)
    }

    /// Look up a key when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Follow a dotted key path through nested mappings (`"metadata.tempo"`).
    pub fn get_path(&self, path: &str) -> Option<&StateValue> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.get(segment))
    }

    /// Hex-encoded BLAKE3 digest of the canonical, key-sorted encoding.
    ///
    /// Two documents that compare equal always produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"dawvc-state-v1:");
        self.feed_canonical(&mut hasher);
        hex::encode(hasher.finalize().as_bytes())
    }

    fn feed_canonical(&self, hasher: &mut blake3::Hasher) {
        match self {
            StateValue::Scalar(scalar) => match scalar {
                Scalar::Null => {
                    hasher.update(b"n");
                }
                Scalar::Bool(b) => {
                    hasher.update(if *b { b"t" } else { b"f" });
                }
                Scalar::Str(s) => {
                    hasher.update(b"s");
                    hasher.update(&(s.len() as u64).to_le_bytes());
                    hasher.update(s.as_bytes());
                }
                Scalar::Int(_) | Scalar::Float(_) => match scalar.canonical_number() {
                    Some(CanonicalNumber::Int(i)) => {
                        hasher.update(b"i");
                        hasher.update(&i.to_le_bytes());
                    }
                    Some(CanonicalNumber::Bits(bits)) => {
                        hasher.update(b"d");
                        hasher.update(&bits.to_le_bytes());
                    }
                    Some(CanonicalNumber::NaN) | None => {
                        hasher.update(b"N");
                    }
                },
            },
            StateValue::Mapping(mapping) => {
                hasher.update(b"m");
                hasher.update(&(mapping.len() as u64).to_le_bytes());
                for (key, value) in mapping.sorted_entries() {
                    hasher.update(&(key.len() as u64).to_le_bytes());
                    hasher.update(key.as_bytes());
                    value.feed_canonical(hasher);
                }
            }
            StateValue::Sequence(items) => {
                hasher.update(b"q");
                hasher.update(&(items.len() as u64).to_le_bytes());
                for item in items {
                    item.feed_canonical(hasher);
                }
            }
        }
    }
}

impl From<Scalar> for StateValue {
    fn from(value: Scalar) -> Self {
        StateValue::Scalar(value)
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Scalar(Scalar::Int(value))
    }
}

impl From<i32> for StateValue {
    fn from(value: i32) -> Self {
        StateValue::Scalar(Scalar::Int(i64::from(value)))
    }
}

impl From<u32> for StateValue {
    fn from(value: u32) -> Self {
        StateValue::Scalar(Scalar::Int(i64::from(value)))
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        StateValue::Scalar(Scalar::Float(value))
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Scalar(Scalar::Str(value))
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<Mapping> for StateValue {
    fn from(value: Mapping) -> Self {
        StateValue::Mapping(value)
    }
}

impl From<Vec<StateValue>> for StateValue {
    fn from(value: Vec<StateValue>) -> Self {
        StateValue::Sequence(value)
    }
}

impl<T: Into<StateValue>> From<Option<T>> for StateValue {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(StateValue::null, Into::into)
    }
}

impl Serialize for StateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StateValue::Scalar(Scalar::Null) => serializer.serialize_unit(),
            StateValue::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            StateValue::Scalar(Scalar::Int(i)) => serializer.serialize_i64(*i),
            StateValue::Scalar(Scalar::Float(f)) => serializer.serialize_f64(*f),
            StateValue::Scalar(Scalar::Str(s)) => serializer.serialize_str(s),
            StateValue::Mapping(mapping) => mapping.serialize(serializer),
            StateValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

struct StateValueVisitor;

impl<'de> Visitor<'de> for StateValueVisitor {
    type Value = StateValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a primitive, a string-keyed map, or a sequence")
    }

    fn visit_unit<E: de::Error>(self) -> Result<StateValue, E> {
        Ok(StateValue::null())
    }

    fn visit_none<E: de::Error>(self) -> Result<StateValue, E> {
        Ok(StateValue::null())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<StateValue, D::Error> {
        StateValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<StateValue, E> {
        Ok(StateValue::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<StateValue, E> {
        Ok(StateValue::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<StateValue, E> {
        Ok(match i64::try_from(v) {
            Ok(i) => StateValue::from(i),
            Err(_) => StateValue::from(v as f64),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<StateValue, E> {
        Ok(StateValue::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<StateValue, E> {
        Ok(StateValue::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<StateValue, E> {
        Ok(StateValue::from(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<StateValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(StateValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<StateValue, A::Error> {
        let mut mapping = Mapping::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, StateValue>()? {
            if mapping.insert(key.clone(), value).is_some() {
                return Err(de::Error::custom(format!("duplicate key `{key}`")));
            }
        }
        Ok(StateValue::Mapping(mapping))
    }
}

impl<'de> Deserialize<'de> for StateValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StateValueVisitor)
    }
}
