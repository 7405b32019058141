//! Threshold Table & Tiers
//!
//! Ascending `(lower_bound, label)` pairs partitioning [0, 1] with no gaps.
//! The position of an entry is its tier rank, which gives the total order.

use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

// ============================================================================
// TIER
// ============================================================================

/// A discrete risk bucket. Ordered by `rank` (position in its table).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tier {
    pub rank: usize,
    pub label: String,
}

impl Tier {
    pub fn as_str(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

// ============================================================================
// THRESHOLD TABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierBound {
    pub lower_bound: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TierBound>", into = "Vec<TierBound>")]
pub struct ThresholdTable {
    bounds: Vec<TierBound>,
}

impl ThresholdTable {
    pub fn new<S: Into<String>>(bounds: impl IntoIterator<Item = (f64, S)>) -> RiskResult<Self> {
        let bounds: Vec<TierBound> = bounds
            .into_iter()
            .map(|(lower_bound, label)| TierBound { lower_bound, label: label.into() })
            .collect();
        Self::try_from(bounds)
    }

    pub fn bounds(&self) -> &[TierBound] {
        &self.bounds
    }

    pub fn tiers(&self) -> impl Iterator<Item = Tier> + '_ {
        self.bounds
            .iter()
            .enumerate()
            .map(|(rank, b)| Tier { rank, label: b.label.clone() })
    }

    pub fn tier(&self, label: &str) -> Option<Tier> {
        self.tiers().find(|t| t.label == label)
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

impl TryFrom<Vec<TierBound>> for ThresholdTable {
    type Error = RiskError;

    fn try_from(bounds: Vec<TierBound>) -> RiskResult<Self> {
        let first = bounds
            .first()
            .ok_or_else(|| RiskError::configuration("threshold table is empty"))?;

        if first.lower_bound != 0.0 {
            return Err(RiskError::configuration(format!(
                "first tier '{}' must start at 0, got {}",
                first.label, first.lower_bound
            )));
        }

        for (i, bound) in bounds.iter().enumerate() {
            if !(0.0..=1.0).contains(&bound.lower_bound) {
                return Err(RiskError::configuration(format!(
                    "tier '{}' bound {} outside [0, 1]",
                    bound.label, bound.lower_bound
                )));
            }
            if bound.label.trim().is_empty() {
                return Err(RiskError::configuration("tier label must not be empty"));
            }
            if let Some(prev) = i.checked_sub(1).map(|p| &bounds[p]) {
                if bound.lower_bound <= prev.lower_bound {
                    return Err(RiskError::configuration(format!(
                        "tier bounds must strictly increase: '{}' ({}) after '{}' ({})",
                        bound.label, bound.lower_bound, prev.label, prev.lower_bound
                    )));
                }
            }
            if bounds[..i].iter().any(|prev| prev.label == bound.label) {
                return Err(RiskError::configuration(format!("tier '{}' declared twice", bound.label)));
            }
        }

        Ok(Self { bounds })
    }
}

impl From<ThresholdTable> for Vec<TierBound> {
    fn from(table: ThresholdTable) -> Self {
        table.bounds
    }
}
