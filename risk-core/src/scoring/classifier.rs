//! Classifier
//!
//! Maps a score through a [`ThresholdTable`] to a [`Tier`]: the tier whose
//! lower bound is the largest one `<= score`. Right-continuous, so a score
//! equal to a bound belongs to that bound's tier.

use crate::error::{RiskError, RiskResult};
use super::thresholds::{ThresholdTable, Tier};

pub fn classify(score: f64, thresholds: &ThresholdTable) -> RiskResult<Tier> {
    if !score.is_finite() || score < 0.0 {
        return Err(RiskError::validation(format!("score must be finite and >= 0, got {}", score)));
    }

    let bounds = thresholds.bounds();
    match bounds.first() {
        None => return Err(RiskError::configuration("threshold table is empty")),
        Some(first) if first.lower_bound != 0.0 => {
            return Err(RiskError::configuration("threshold table must start at 0"))
        }
        Some(_) => {}
    }

    let rank = bounds
        .iter()
        .rposition(|b| b.lower_bound <= score)
        .ok_or_else(|| RiskError::configuration(format!("no tier covers score {}", score)))?;

    Ok(Tier { rank, label: bounds[rank].label.clone() })
}
