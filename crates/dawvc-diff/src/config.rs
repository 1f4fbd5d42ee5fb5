//! Entity matcher configuration.

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// Weights and threshold for pairing entities across versions.
///
/// A pair is only considered when its score reaches `threshold`. With the
/// defaults, an entity whose name changed but whose sample or plugin and base
/// fields did not still scores above 0.5, while an entity that shares only
/// default base fields with another scores well below it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Minimum similarity in `(0, 1]` for a pair to match.
    pub threshold: f64,
    /// Weight of an exact `internal_name` match.
    pub internal_name_weight: f64,
    /// Weight of the normalized `name` similarity.
    pub name_weight: f64,
    /// Weight of the overlap across the remaining base fields.
    pub field_weight: f64,
    /// Weight of an exact `sample_path` or `plugin` match.
    pub source_weight: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            internal_name_weight: 0.4,
            name_weight: 0.3,
            field_weight: 0.3,
            source_weight: 0.3,
        }
    }
}

impl MatcherConfig {
    /// Check the threshold is in `(0, 1]` and the weights are non-negative
    /// and not all zero.
    pub fn validate(&self) -> DiffResult<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(DiffError::InvalidConfig(format!(
                "threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }
        for (name, weight) in [
            ("internal_name_weight", self.internal_name_weight),
            ("name_weight", self.name_weight),
            ("field_weight", self.field_weight),
            ("source_weight", self.source_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DiffError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {weight}"
                )));
            }
        }
        if self.internal_name_weight + self.name_weight + self.field_weight + self.source_weight
            <= 0.0
        {
            return Err(DiffError::InvalidConfig("weights must not all be zero".into()));
        }
        Ok(())
    }
}
