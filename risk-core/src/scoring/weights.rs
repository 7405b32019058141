//! Weight Table
//!
//! Explicit `(feature, weight)` association keyed by name. Positional
//! pairing of values with a weight list is never used.

use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub feature: String,
    pub weight: f64,
}

/// Validated, immutable weight table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WeightEntry>", into = "Vec<WeightEntry>")]
pub struct WeightTable {
    entries: Vec<WeightEntry>,
}

impl WeightTable {
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = (S, f64)>) -> RiskResult<Self> {
        let entries: Vec<WeightEntry> = entries
            .into_iter()
            .map(|(feature, weight)| WeightEntry { feature: feature.into(), weight })
            .collect();
        Self::try_from(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|e| (e.feature.as_str(), e.weight))
    }

    pub fn weight(&self, feature: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.feature == feature).map(|e| e.weight)
    }

    pub fn features(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.feature.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Every weighted feature must belong to the feature set a pipeline
    /// declares; checked once when configuration loads.
    pub fn require_features(&self, available: &[&str]) -> RiskResult<()> {
        for entry in &self.entries {
            if !available.contains(&entry.feature.as_str()) {
                return Err(RiskError::configuration(format!(
                    "weighted feature '{}' is not produced by this pipeline (available: {})",
                    entry.feature,
                    available.join(", ")
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<WeightEntry>> for WeightTable {
    type Error = RiskError;

    fn try_from(entries: Vec<WeightEntry>) -> RiskResult<Self> {
        if entries.is_empty() {
            return Err(RiskError::configuration("weight table is empty"));
        }

        for (i, entry) in entries.iter().enumerate() {
            if entry.feature.trim().is_empty() {
                return Err(RiskError::configuration("weight table contains an unnamed feature"));
            }
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(RiskError::configuration(format!(
                    "weight for '{}' must be finite and >= 0, got {}",
                    entry.feature, entry.weight
                )));
            }
            if entries[..i].iter().any(|prev| prev.feature == entry.feature) {
                return Err(RiskError::configuration(format!(
                    "feature '{}' weighted twice",
                    entry.feature
                )));
            }
        }

        Ok(Self { entries })
    }
}

impl From<WeightTable> for Vec<WeightEntry> {
    fn from(table: WeightTable) -> Self {
        table.entries
    }
}
