//! AML Screening
//!
//! Watchlist hits (sanctions, PEP, adverse media) are hard flags; any hit
//! sends the subject to review whatever the continuous score says.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::{AssessmentRecord, ScoringPipeline};
use crate::error::{RiskError, RiskResult};
use crate::features::FeatureExtractor;
use crate::scoring::{Action, ActionRouter, ThresholdTable, WeightTable};

pub const NAME_MATCH: &str = "name_match";
pub const JURISDICTION_RISK: &str = "jurisdiction_risk";
pub const SANCTIONS: &str = "sanctions";
pub const PEP: &str = "pep";
pub const ADVERSE_MEDIA: &str = "adverse_media";

pub const SIGNALS: [&str; 2] = [NAME_MATCH, JURISDICTION_RISK];
pub const FLAGS: [&str; 3] = [SANCTIONS, PEP, ADVERSE_MEDIA];

pub const MODEL_LABEL: &str = "Watchlist Screening";
pub const DATA_SOURCES: [&str; 5] = ["OFAC", "UN", "EU", "Interpol", "Local Authorities"];

pub fn default_scoring() -> RiskResult<ScoringPipeline> {
    let weights = WeightTable::new([(NAME_MATCH, 0.6), (JURISDICTION_RISK, 0.4)])?;
    let thresholds = ThresholdTable::new([(0.0, "low"), (0.5, "elevated")])?;
    let router = ActionRouter::new([("low", Action::Approve), ("elevated", Action::Review)], Action::Review)
        .with_hard_flags(FLAGS);
    Ok(ScoringPipeline::new(MODEL_LABEL, weights, thresholds, router))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmlStatus {
    Clear,
    Flagged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmlContext {
    pub user_id: String,
    #[serde(default)]
    pub document_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmlScreening {
    pub user_id: String,
    pub status: AmlStatus,
    pub risk_score: f64,
    pub sanctions: bool,
    pub pep: bool,
    pub adverse_media: bool,
    pub data_sources: Vec<String>,
    pub record: AssessmentRecord,
    pub checked_at: DateTime<Utc>,
}

pub struct AmlScreener {
    scoring: ScoringPipeline,
    extractor: Arc<dyn FeatureExtractor<AmlContext>>,
}

impl AmlScreener {
    pub fn new(scoring: ScoringPipeline, extractor: Arc<dyn FeatureExtractor<AmlContext>>) -> RiskResult<Self> {
        scoring.validate_for(&SIGNALS, &FLAGS)?;
        Ok(Self { scoring, extractor })
    }

    pub fn scoring(&self) -> &ScoringPipeline {
        &self.scoring
    }

    pub async fn screen(&self, context: &AmlContext) -> RiskResult<AmlScreening> {
        if context.user_id.trim().is_empty() {
            return Err(RiskError::validation("user_id is required"));
        }
        let started = Instant::now();

        let features = self.extractor.extract(context).await?;
        let hit = |name: &str| features.flag(name).unwrap_or(false);
        let (sanctions, pep, adverse_media) = (hit(SANCTIONS), hit(PEP), hit(ADVERSE_MEDIA));

        let record = self.scoring.assess(&context.user_id, features, started)?;
        let status = if record.action().is_approval() { AmlStatus::Clear } else { AmlStatus::Flagged };

        Ok(AmlScreening {
            user_id: context.user_id.clone(),
            status,
            risk_score: record.score(),
            sanctions,
            pep,
            adverse_media,
            data_sources: DATA_SOURCES.iter().map(|s| s.to_string()).collect(),
            checked_at: record.created_at(),
            record,
        })
    }
}
