//! Anomaly Batch Scanner
//!
//! Scores at most the first `batch_cap` items of a batch, each on its own,
//! and keeps those above the anomaly threshold together with a reason from
//! a fixed set.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RiskError, RiskResult};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::scoring::{contributions, score, WeightTable, DEFAULT_CAP};

// ============================================================================
// DEFAULTS
// ============================================================================

pub const AMOUNT_DEVIATION: &str = "amount_deviation";
pub const TIME_DEVIATION: &str = "time_deviation";
pub const RECIPIENT_NOVELTY: &str = "recipient_novelty";

pub const SIGNALS: [&str; 3] = [AMOUNT_DEVIATION, TIME_DEVIATION, RECIPIENT_NOVELTY];

pub const MODEL_LABEL: &str = "Isolation Forest + Autoencoder";
pub const DEFAULT_BATCH_CAP: usize = 5;
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 0.7;

// ============================================================================
// TYPES
// ============================================================================

/// One transaction of a batch. Only `id` is interpreted here; the other
/// fields are handed to the extractor untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyReason {
    UnusualAmount,
    UnusualTime,
    UnusualRecipient,
}

impl AnomalyReason {
    pub const ALL: [AnomalyReason; 3] = [
        AnomalyReason::UnusualAmount,
        AnomalyReason::UnusualTime,
        AnomalyReason::UnusualRecipient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyReason::UnusualAmount => "unusual_amount",
            AnomalyReason::UnusualTime => "unusual_time",
            AnomalyReason::UnusualRecipient => "unusual_recipient",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub transaction_id: String,
    pub anomaly_score: f64,
    pub reason: AnomalyReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyScan {
    pub total_transactions: usize,
    pub evaluated: usize,
    pub anomalies: Vec<Anomaly>,
    pub model_label: String,
    pub processing_duration_ms: u64,
    pub analyzed_at: DateTime<Utc>,
}

// ============================================================================
// REASON POLICY
// ============================================================================

/// Picks the reason attached to a flagged item.
pub trait ReasonPolicy: Send + Sync {
    fn select(&self, item: &BatchItem, features: &FeatureVector, contributions: &[(&str, f64)]) -> AnomalyReason;

    /// Checked once at construction against the scanner's weights.
    fn validate(&self, _weights: &WeightTable) -> RiskResult<()> {
        Ok(())
    }
}

/// Reason of the feature with the largest weighted contribution. Ties go to
/// the feature listed first in the weight table.
pub struct DominantSignal {
    mapping: Vec<(String, AnomalyReason)>,
}

impl DominantSignal {
    pub fn new<S: Into<String>>(mapping: impl IntoIterator<Item = (S, AnomalyReason)>) -> Self {
        Self {
            mapping: mapping.into_iter().map(|(f, r)| (f.into(), r)).collect(),
        }
    }

    fn reason_for(&self, feature: &str) -> Option<AnomalyReason> {
        self.mapping.iter().find(|(f, _)| f == feature).map(|(_, r)| *r)
    }
}

impl Default for DominantSignal {
    fn default() -> Self {
        Self::new([
            (AMOUNT_DEVIATION, AnomalyReason::UnusualAmount),
            (TIME_DEVIATION, AnomalyReason::UnusualTime),
            (RECIPIENT_NOVELTY, AnomalyReason::UnusualRecipient),
        ])
    }
}

impl ReasonPolicy for DominantSignal {
    fn select(&self, _item: &BatchItem, _features: &FeatureVector, contributions: &[(&str, f64)]) -> AnomalyReason {
        let mut best: Option<(&str, f64)> = None;
        for (name, value) in contributions {
            if best.map_or(true, |(_, top)| *value > top) {
                best = Some((*name, *value));
            }
        }
        best.and_then(|(name, _)| self.reason_for(name))
            .unwrap_or(AnomalyReason::UnusualAmount)
    }

    fn validate(&self, weights: &WeightTable) -> RiskResult<()> {
        for feature in weights.features() {
            if self.reason_for(feature).is_none() {
                return Err(RiskError::configuration(format!(
                    "anomaly feature '{}' has no reason mapping",
                    feature
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SCANNER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyScanConfig {
    pub model_label: String,
    pub weights: WeightTable,
    pub batch_cap: usize,
    pub anomaly_threshold: f64,
}

impl AnomalyScanConfig {
    pub fn builtin() -> RiskResult<Self> {
        Ok(Self {
            model_label: MODEL_LABEL.to_string(),
            weights: WeightTable::new([
                (AMOUNT_DEVIATION, 0.45),
                (TIME_DEVIATION, 0.25),
                (RECIPIENT_NOVELTY, 0.30),
            ])?,
            batch_cap: DEFAULT_BATCH_CAP,
            anomaly_threshold: DEFAULT_ANOMALY_THRESHOLD,
        })
    }

    pub fn validate(&self) -> RiskResult<()> {
        if self.batch_cap == 0 {
            return Err(RiskError::configuration("anomaly batch_cap must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.anomaly_threshold) {
            return Err(RiskError::configuration(format!(
                "anomaly threshold must be within [0, 1], got {}",
                self.anomaly_threshold
            )));
        }
        self.weights.require_features(&SIGNALS)
    }
}

pub struct AnomalyBatchScanner {
    config: AnomalyScanConfig,
    extractor: Arc<dyn FeatureExtractor<BatchItem>>,
    reasons: Box<dyn ReasonPolicy>,
}

impl AnomalyBatchScanner {
    pub fn new(
        config: AnomalyScanConfig,
        extractor: Arc<dyn FeatureExtractor<BatchItem>>,
        reasons: Box<dyn ReasonPolicy>,
    ) -> RiskResult<Self> {
        config.validate()?;
        reasons.validate(&config.weights)?;
        Ok(Self { config, extractor, reasons })
    }

    pub async fn scan(&self, items: &[BatchItem]) -> RiskResult<AnomalyScan> {
        let started = Instant::now();
        let window = &items[..items.len().min(self.config.batch_cap)];

        let mut anomalies = Vec::new();
        for item in window {
            let features = self.extractor.extract(item).await?;
            let anomaly_score = score(&features, &self.config.weights, DEFAULT_CAP)?;
            if anomaly_score <= self.config.anomaly_threshold {
                continue;
            }

            let parts = contributions(&features, &self.config.weights)?;
            anomalies.push(Anomaly {
                transaction_id: item.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string()),
                anomaly_score,
                reason: self.reasons.select(item, &features, &parts),
            });
        }

        tracing::info!(
            total = items.len(),
            evaluated = window.len(),
            anomalies = anomalies.len(),
            "anomaly scan completed"
        );

        Ok(AnomalyScan {
            total_transactions: items.len(),
            evaluated: window.len(),
            anomalies,
            model_label: self.config.model_label.clone(),
            processing_duration_ms: started.elapsed().as_millis() as u64,
            analyzed_at: Utc::now(),
        })
    }
}
