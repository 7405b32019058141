//! Transaction Risk
//!
//! Six weighted signals, four tiers, three actions.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::assessment::{AssessmentRecord, ScoringPipeline};
use crate::error::{RiskError, RiskResult};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::scoring::{Action, ActionRouter, ThresholdTable, WeightTable};

// ============================================================================
// FEATURES & DEFAULTS
// ============================================================================

pub const AMOUNT_ANOMALY: &str = "amount_anomaly";
pub const VELOCITY: &str = "velocity";
pub const GEO_RISK: &str = "geo_risk";
pub const ACCOUNT_AGE: &str = "account_age";
pub const BEHAVIOR_SCORE: &str = "behavior_score";
pub const NETWORK_RISK: &str = "network_risk";

pub const SIGNALS: [&str; 6] = [AMOUNT_ANOMALY, VELOCITY, GEO_RISK, ACCOUNT_AGE, BEHAVIOR_SCORE, NETWORK_RISK];

pub const MODEL_LABEL: &str = "XGBoost + Neural Network";

/// Shared four-level risk scale (also used by user risk)
pub fn risk_levels() -> RiskResult<ThresholdTable> {
    ThresholdTable::new([(0.0, "low"), (0.3, "medium"), (0.6, "high"), (0.8, "critical")])
}

pub fn default_scoring() -> RiskResult<ScoringPipeline> {
    let weights = WeightTable::new([
        (AMOUNT_ANOMALY, 0.25),
        (VELOCITY, 0.20),
        (GEO_RISK, 0.15),
        (ACCOUNT_AGE, 0.10),
        (BEHAVIOR_SCORE, 0.20),
        (NETWORK_RISK, 0.10),
    ])?;
    let router = ActionRouter::new(
        [
            ("low", Action::Approve),
            ("medium", Action::Review),
            ("high", Action::Block),
            ("critical", Action::Block),
        ],
        Action::Block,
    );
    Ok(ScoringPipeline::new(MODEL_LABEL, weights, risk_levels()?, router))
}

// ============================================================================
// CONTEXT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionContext {
    pub transaction_id: String,
    pub from_account: String,
    pub to_account: String,
    pub amount: f64,
}

impl TransactionContext {
    pub fn validate(&self) -> RiskResult<()> {
        for (field, value) in [
            ("transaction_id", &self.transaction_id),
            ("from_account", &self.from_account),
            ("to_account", &self.to_account),
        ] {
            if value.trim().is_empty() {
                return Err(RiskError::validation(format!("{} is required", field)));
            }
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(RiskError::validation(format!("amount must be positive, got {}", self.amount)));
        }
        Ok(())
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct TransactionRisk {
    scoring: ScoringPipeline,
    extractor: Arc<dyn FeatureExtractor<TransactionContext>>,
}

impl TransactionRisk {
    pub fn new(
        scoring: ScoringPipeline,
        extractor: Arc<dyn FeatureExtractor<TransactionContext>>,
    ) -> RiskResult<Self> {
        scoring.validate_for(&SIGNALS, &[])?;
        Ok(Self { scoring, extractor })
    }

    pub fn scoring(&self) -> &ScoringPipeline {
        &self.scoring
    }

    pub async fn assess(&self, context: &TransactionContext) -> RiskResult<AssessmentRecord> {
        context.validate()?;
        let started = Instant::now();
        let features = self.extractor.extract(context).await?;
        self.scoring.assess(&context.transaction_id, features, started)
    }
}

/// Signals under their client-facing factor names.
pub fn public_factors(features: &FeatureVector) -> BTreeMap<&'static str, f64> {
    [
        ("amount_anomaly", AMOUNT_ANOMALY),
        ("velocity_check", VELOCITY),
        ("geo_location", GEO_RISK),
        ("account_age", ACCOUNT_AGE),
        ("behavior_pattern", BEHAVIOR_SCORE),
        ("network_analysis", NETWORK_RISK),
    ]
    .into_iter()
    .filter_map(|(public, name)| features.signal(name).map(|v| (public, v)))
    .collect()
}
