//! User Risk
//!
//! Equal-weight average of four continuous signals. `suspicious_patterns`
//! is a hard flag: when raised the recommendation is always `review`.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::assessment::{AssessmentRecord, ScoringPipeline};
use crate::error::{RiskError, RiskResult};
use crate::features::FeatureExtractor;
use crate::scoring::{Action, ActionRouter, WeightTable};

pub const TRANSACTION_HISTORY: &str = "transaction_history";
pub const KYC_SCORE: &str = "kyc_score";
pub const BEHAVIOR_CONSISTENCY: &str = "behavior_consistency";
pub const NETWORK_CONNECTIONS: &str = "network_connections";
pub const SUSPICIOUS_PATTERNS: &str = "suspicious_patterns";

pub const SIGNALS: [&str; 4] = [TRANSACTION_HISTORY, KYC_SCORE, BEHAVIOR_CONSISTENCY, NETWORK_CONNECTIONS];
pub const FLAGS: [&str; 1] = [SUSPICIOUS_PATTERNS];

pub const MODEL_LABEL: &str = "User Behavior Ensemble";

/// Connection count treated as fully connected
pub const DEFAULT_CONNECTION_SATURATION: u32 = 100;

pub fn default_scoring() -> RiskResult<ScoringPipeline> {
    let weights = WeightTable::new(SIGNALS.iter().map(|name| (*name, 0.25)))?;
    let router = ActionRouter::new(
        [
            ("low", Action::Approve),
            ("medium", Action::Review),
            ("high", Action::Review),
            ("critical", Action::Review),
        ],
        Action::Review,
    )
    .with_hard_flags(FLAGS);
    Ok(ScoringPipeline::new(MODEL_LABEL, weights, super::transaction::risk_levels()?, router))
}

/// Raw connection count -> [0, 1]
pub fn normalize_connections(count: u32, saturation: u32) -> f64 {
    if saturation == 0 {
        return 1.0;
    }
    (count as f64 / saturation as f64).min(1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
}

impl UserContext {
    pub fn validate(&self) -> RiskResult<()> {
        if self.user_id.trim().is_empty() {
            return Err(RiskError::validation("user_id is required"));
        }
        Ok(())
    }
}

pub struct UserRisk {
    scoring: ScoringPipeline,
    extractor: Arc<dyn FeatureExtractor<UserContext>>,
}

impl UserRisk {
    pub fn new(scoring: ScoringPipeline, extractor: Arc<dyn FeatureExtractor<UserContext>>) -> RiskResult<Self> {
        scoring.validate_for(&SIGNALS, &FLAGS)?;
        Ok(Self { scoring, extractor })
    }

    pub fn scoring(&self) -> &ScoringPipeline {
        &self.scoring
    }

    pub async fn assess(&self, context: &UserContext) -> RiskResult<AssessmentRecord> {
        context.validate()?;
        let started = Instant::now();
        let features = self.extractor.extract(context).await?;
        self.scoring.assess(&context.user_id, features, started)
    }
}
