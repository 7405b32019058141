//! Feature Vector - named signals describing one subject
//!
//! Two distinct kinds of input:
//! - continuous signals, always finite and inside [0, 1]
//! - hard flags (booleans) that can override tier-based routing
//!
//! Built once per assessment through [`FeatureVectorBuilder`], which rejects
//! anything out of range. There is no mutating API after `build()`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Deserialization goes through the builder, so stored snapshots obey the
/// same range and uniqueness rules as freshly extracted ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureVector")]
pub struct FeatureVector {
    signals: BTreeMap<String, f64>,
    flags: BTreeMap<String, bool>,
}

impl FeatureVector {
    pub fn builder() -> FeatureVectorBuilder {
        FeatureVectorBuilder::new()
    }

    /// Continuous signal by name
    pub fn signal(&self, name: &str) -> Option<f64> {
        self.signals.get(name).copied()
    }

    /// Hard flag by name
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }

    pub fn signals(&self) -> &BTreeMap<String, f64> {
        &self.signals
    }

    pub fn flags(&self) -> &BTreeMap<String, bool> {
        &self.flags
    }

    pub fn has_signal(&self, name: &str) -> bool {
        self.signals.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty() && self.flags.is_empty()
    }

    /// Convert to JSON for logging and audit snapshots
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "signals": self.signals,
            "flags": self.flags,
        })
    }
}

#[derive(Deserialize)]
struct RawFeatureVector {
    #[serde(default)]
    signals: BTreeMap<String, f64>,
    #[serde(default)]
    flags: BTreeMap<String, bool>,
}

impl TryFrom<RawFeatureVector> for FeatureVector {
    type Error = RiskError;

    fn try_from(raw: RawFeatureVector) -> RiskResult<Self> {
        FeatureVectorBuilder {
            signals: raw.signals.into_iter().collect(),
            flags: raw.flags.into_iter().collect(),
        }
        .build()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Collects signals and flags, then validates them all at once in `build()`.
#[derive(Debug, Default)]
pub struct FeatureVectorBuilder {
    signals: Vec<(String, f64)>,
    flags: Vec<(String, bool)>,
}

impl FeatureVectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(mut self, name: impl Into<String>, value: f64) -> Self {
        self.signals.push((name.into(), value));
        self
    }

    pub fn flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.push((name.into(), value));
        self
    }

    pub fn build(self) -> RiskResult<FeatureVector> {
        let mut vector = FeatureVector::default();

        for (name, value) in self.signals {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(RiskError::validation(format!(
                    "signal '{}' must be within [0, 1], got {}",
                    name, value
                )));
            }
            if vector.flags.contains_key(&name) || vector.signals.insert(name.clone(), value).is_some() {
                return Err(RiskError::validation(format!("feature '{}' supplied twice", name)));
            }
        }

        for (name, value) in self.flags {
            if vector.signals.contains_key(&name) || vector.flags.insert(name.clone(), value).is_some() {
                return Err(RiskError::validation(format!("feature '{}' supplied twice", name)));
            }
        }

        Ok(vector)
    }
}

// ============================================================================
// TESTS
// ============================================================================
