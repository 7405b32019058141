//! Credit Scorer
//!
//! Weighted goodness signals mapped onto the 300-850 score range, then rated
//! through fixed integer cut points.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::scoring::{score, WeightTable, DEFAULT_CAP};
use super::user::UserContext;

// ============================================================================
// DEFAULTS
// ============================================================================

pub const PAYMENT_HISTORY: &str = "payment_history";
pub const UTILIZATION_HEADROOM: &str = "utilization_headroom";
pub const ACCOUNT_AGE: &str = "account_age";
pub const CREDIT_MIX: &str = "credit_mix";
pub const INQUIRY_HEADROOM: &str = "inquiry_headroom";

pub const SIGNALS: [&str; 5] = [PAYMENT_HISTORY, UTILIZATION_HEADROOM, ACCOUNT_AGE, CREDIT_MIX, INQUIRY_HEADROOM];

pub const MODEL_LABEL: &str = "Gradient Boosting + Random Forest";

pub const SCORE_MIN: u32 = 300;
pub const SCORE_MAX: u32 = 850;
pub const SCORE_RANGE: &str = "300-850";
pub const DEFAULT_LIMIT_MULTIPLIER: f64 = 10.0;

// ============================================================================
// RATING BANDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBand {
    pub min_score: u32,
    pub rating: String,
}

/// Ascending cut points; a score gets the rating of the highest band whose
/// `min_score` it reaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RatingBand>", into = "Vec<RatingBand>")]
pub struct RatingBands {
    bands: Vec<RatingBand>,
}

impl RatingBands {
    pub fn new<S: Into<String>>(bands: impl IntoIterator<Item = (u32, S)>) -> RiskResult<Self> {
        let bands: Vec<RatingBand> = bands
            .into_iter()
            .map(|(min_score, rating)| RatingBand { min_score, rating: rating.into() })
            .collect();
        Self::try_from(bands)
    }

    pub fn standard() -> RiskResult<Self> {
        Self::new([
            (0, "Very Poor"),
            (600, "Poor"),
            (650, "Fair"),
            (700, "Good"),
            (750, "Excellent"),
        ])
    }

    pub fn rate(&self, credit_score: u32) -> &str {
        self.bands
            .iter()
            .rev()
            .find(|b| credit_score >= b.min_score)
            .map(|b| b.rating.as_str())
            .unwrap_or(self.bands[0].rating.as_str())
    }
}

impl TryFrom<Vec<RatingBand>> for RatingBands {
    type Error = RiskError;

    fn try_from(bands: Vec<RatingBand>) -> RiskResult<Self> {
        match bands.first() {
            None => return Err(RiskError::configuration("rating bands are empty")),
            Some(first) if first.min_score > SCORE_MIN => {
                return Err(RiskError::configuration(format!(
                    "lowest rating band must start at or below {}, got {}",
                    SCORE_MIN, first.min_score
                )))
            }
            Some(_) => {}
        }
        if bands.windows(2).any(|w| w[1].min_score <= w[0].min_score) {
            return Err(RiskError::configuration("rating band cut points must strictly increase"));
        }
        Ok(Self { bands })
    }
}

impl From<RatingBands> for Vec<RatingBand> {
    fn from(bands: RatingBands) -> Self {
        bands.bands
    }
}

// ============================================================================
// SCORER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditConfig {
    pub model_label: String,
    pub weights: WeightTable,
    pub rating_bands: RatingBands,
    pub limit_multiplier: f64,
}

impl CreditConfig {
    pub fn builtin() -> RiskResult<Self> {
        Ok(Self {
            model_label: MODEL_LABEL.to_string(),
            weights: WeightTable::new([
                (PAYMENT_HISTORY, 0.35),
                (UTILIZATION_HEADROOM, 0.30),
                (ACCOUNT_AGE, 0.15),
                (CREDIT_MIX, 0.10),
                (INQUIRY_HEADROOM, 0.10),
            ])?,
            rating_bands: RatingBands::standard()?,
            limit_multiplier: DEFAULT_LIMIT_MULTIPLIER,
        })
    }

    pub fn validate(&self) -> RiskResult<()> {
        if !self.limit_multiplier.is_finite() || self.limit_multiplier < 0.0 {
            return Err(RiskError::configuration(format!(
                "credit limit multiplier must be >= 0, got {}",
                self.limit_multiplier
            )));
        }
        self.weights.require_features(&SIGNALS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAssessment {
    pub user_id: String,
    pub credit_score: u32,
    pub score_range: String,
    pub rating: String,
    pub factors: FeatureVector,
    pub recommended_limit: f64,
    pub model_label: String,
    pub calculated_at: DateTime<Utc>,
}

/// Unit score -> 300..=850
pub fn composite_score(unit_score: f64) -> u32 {
    let span = (SCORE_MAX - SCORE_MIN) as f64;
    SCORE_MIN + (unit_score.clamp(0.0, 1.0) * span).round() as u32
}

pub struct CreditScorer {
    config: CreditConfig,
    extractor: Arc<dyn FeatureExtractor<UserContext>>,
}

impl CreditScorer {
    pub fn new(config: CreditConfig, extractor: Arc<dyn FeatureExtractor<UserContext>>) -> RiskResult<Self> {
        config.validate()?;
        Ok(Self { config, extractor })
    }

    pub fn rating(&self, credit_score: u32) -> &str {
        self.config.rating_bands.rate(credit_score)
    }

    pub fn recommended_limit(&self, credit_score: u32) -> f64 {
        credit_score as f64 * self.config.limit_multiplier
    }

    pub async fn score(&self, context: &UserContext) -> RiskResult<CreditAssessment> {
        context.validate()?;
        let started = Instant::now();

        let factors = self.extractor.extract(context).await?;
        let unit = score(&factors, &self.config.weights, DEFAULT_CAP)?;
        let credit_score = composite_score(unit);
        let rating = self.rating(credit_score).to_string();

        tracing::info!(
            user = %context.user_id,
            credit_score,
            rating = %rating,
            duration_ms = started.elapsed().as_millis() as u64,
            "credit score calculated"
        );

        Ok(CreditAssessment {
            user_id: context.user_id.clone(),
            credit_score,
            score_range: SCORE_RANGE.to_string(),
            rating,
            factors,
            recommended_limit: self.recommended_limit(credit_score),
            model_label: self.config.model_label.clone(),
            calculated_at: Utc::now(),
        })
    }
}
