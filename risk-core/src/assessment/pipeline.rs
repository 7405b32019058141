//! Scoring Pipeline
//!
//! Static configuration of one decision flow (weights, thresholds, routing)
//! plus the shared `score -> classify -> route` sequence that every
//! specialized pipeline runs.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::record::{AssessmentRecord, Decision};
use crate::error::{RiskError, RiskResult};
use crate::features::FeatureVector;
use crate::scoring::{classify, score, ActionRouter, ThresholdTable, WeightTable, DEFAULT_CAP};

fn default_cap() -> f64 {
    DEFAULT_CAP
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPipeline {
    /// Descriptive model name reported in every record
    pub model_label: String,
    pub weights: WeightTable,
    pub thresholds: ThresholdTable,
    pub router: ActionRouter,
    #[serde(default = "default_cap")]
    pub cap: f64,
}

impl ScoringPipeline {
    pub fn new(
        model_label: impl Into<String>,
        weights: WeightTable,
        thresholds: ThresholdTable,
        router: ActionRouter,
    ) -> Self {
        Self {
            model_label: model_label.into(),
            weights,
            thresholds,
            router,
            cap: DEFAULT_CAP,
        }
    }

    /// Cross-table checks, run once when configuration loads.
    pub fn validate(&self) -> RiskResult<()> {
        if !self.cap.is_finite() || self.cap <= 0.0 {
            return Err(RiskError::configuration(format!(
                "{}: cap must be finite and > 0, got {}",
                self.model_label, self.cap
            )));
        }

        self.router.validate_tiers(&self.thresholds)?;

        if let Some(flag) = self.router.hard_flags.iter().find(|f| self.weights.weight(f).is_some()) {
            return Err(RiskError::configuration(format!(
                "{}: hard flag '{}' cannot also be a weighted signal",
                self.model_label, flag
            )));
        }

        Ok(())
    }

    /// Validates against the signals and flags a pipeline's extractor emits.
    pub fn validate_for(&self, signals: &[&str], flags: &[&str]) -> RiskResult<()> {
        self.validate()?;
        self.weights.require_features(signals)?;

        if let Some(flag) = self.router.hard_flags.iter().find(|f| !flags.contains(&f.as_str())) {
            return Err(RiskError::configuration(format!(
                "{}: hard flag '{}' is not produced by this pipeline",
                self.model_label, flag
            )));
        }

        Ok(())
    }

    pub fn decide(&self, features: &FeatureVector) -> RiskResult<Decision> {
        let score = score(features, &self.weights, self.cap)?;
        let tier = classify(score, &self.thresholds)?;
        let triggered_flags = self.router.triggered_flags(features)?;
        let action = self.router.route(&tier, features)?;

        Ok(Decision { score, tier, action, triggered_flags })
    }

    /// Run the decision and assemble the audit record. `started` marks the
    /// beginning of the request so extraction time is included.
    pub fn assess(
        &self,
        subject_id: &str,
        features: FeatureVector,
        started: Instant,
    ) -> RiskResult<AssessmentRecord> {
        let decision = self.decide(&features)?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            model = %self.model_label,
            subject = subject_id,
            score = decision.score,
            tier = %decision.tier,
            action = %decision.action,
            overridden = decision.was_overridden(),
            duration_ms = elapsed_ms,
            "assessment completed"
        );
        tracing::debug!(subject = subject_id, features = %features.to_log_entry(), "feature snapshot");

        Ok(AssessmentRecord::new(subject_id, decision, features, self.model_label.clone(), elapsed_ms))
    }
}
