//! Assessment Record
//!
//! Immutable audit artifact of one scoring decision. Fields are private;
//! once assembled a record only exposes read access.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::FeatureVector;
use crate::scoring::{Action, Tier};

/// `{score, tier, action}` - always produced together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub score: f64,
    pub tier: Tier,
    pub action: Action,
    /// Hard flags that forced the action, if any
    pub triggered_flags: Vec<String>,
}

impl Decision {
    pub fn was_overridden(&self) -> bool {
        !self.triggered_flags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    id: Uuid,
    subject_id: String,
    decision: Decision,
    feature_snapshot: FeatureVector,
    model_label: String,
    created_at: DateTime<Utc>,
    processing_duration_ms: u64,
}

impl AssessmentRecord {
    pub(crate) fn new(
        subject_id: impl Into<String>,
        decision: Decision,
        feature_snapshot: FeatureVector,
        model_label: impl Into<String>,
        processing_duration_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id: subject_id.into(),
            decision,
            feature_snapshot,
            model_label: model_label.into(),
            created_at: Utc::now(),
            processing_duration_ms,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    pub fn score(&self) -> f64 {
        self.decision.score
    }

    pub fn tier(&self) -> &Tier {
        &self.decision.tier
    }

    pub fn action(&self) -> Action {
        self.decision.action
    }

    pub fn triggered_flags(&self) -> &[String] {
        &self.decision.triggered_flags
    }

    pub fn features(&self) -> &FeatureVector {
        &self.feature_snapshot
    }

    pub fn model_label(&self) -> &str {
        &self.model_label
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn processing_duration_ms(&self) -> u64 {
        self.processing_duration_ms
    }
}
