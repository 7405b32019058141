//! Weighted Scorer
//!
//! Pure reduction of a [`FeatureVector`] and a [`WeightTable`] into one
//! bounded scalar: `min(Σ features[k] * weights[k], cap)`.

use crate::error::{RiskError, RiskResult};
use crate::features::FeatureVector;
use super::weights::WeightTable;

/// Default upper bound of a score
pub const DEFAULT_CAP: f64 = 1.0;

/// Weighted score clamped to `cap`.
///
/// Signals present in `features` but not weighted are ignored. A weighted
/// feature missing from `features` is a configuration error.
pub fn score(features: &FeatureVector, weights: &WeightTable, cap: f64) -> RiskResult<f64> {
    if !cap.is_finite() || cap < 0.0 {
        return Err(RiskError::configuration(format!("score cap must be finite and >= 0, got {}", cap)));
    }

    let raw: f64 = contributions(features, weights)?
        .iter()
        .map(|(_, contribution)| contribution)
        .sum();

    Ok(raw.min(cap))
}

/// [`score`] with the default cap of 1.0
pub fn score_default(features: &FeatureVector, weights: &WeightTable) -> RiskResult<f64> {
    score(features, weights, DEFAULT_CAP)
}

/// Per-feature `value * weight` products, in weight table order.
pub fn contributions<'w>(
    features: &FeatureVector,
    weights: &'w WeightTable,
) -> RiskResult<Vec<(&'w str, f64)>> {
    weights
        .iter()
        .map(|(name, weight)| {
            features
                .signal(name)
                .map(|value| (name, value * weight))
                .ok_or_else(|| {
                    RiskError::configuration(format!("weighted feature '{}' missing from feature vector", name))
                })
        })
        .collect()
}
