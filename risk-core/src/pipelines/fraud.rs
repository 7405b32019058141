//! Fraud Detector
//!
//! Each indicator evaluator tests one named condition against the
//! transaction context. Triggered indicators become 0/1 signals, and the
//! fraud probability is their weighted score.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};
use crate::features::FeatureVector;
use crate::scoring::{score, WeightTable, DEFAULT_CAP};

// ============================================================================
// DEFAULTS
// ============================================================================

pub const UNUSUAL_TRANSACTION_PATTERN: &str = "unusual_transaction_pattern";
pub const SUSPICIOUS_NETWORK_CONNECTION: &str = "suspicious_network_connection";
pub const VELOCITY_ANOMALY: &str = "velocity_anomaly";

pub const MODEL_LABEL: &str = "Graph Neural Network + Isolation Forest";

/// `is_fraud` when probability is strictly above this
pub const DEFAULT_FRAUD_THRESHOLD: f64 = 0.10;

// ============================================================================
// CONTEXT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudContext {
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub amount: f64,
    /// Typical transaction amount for the sender
    pub typical_amount: f64,
    pub transactions_last_hour: u32,
    /// Counterparty risk in [0, 1] from an upstream screen
    pub counterparty_risk: f64,
}

impl FraudContext {
    pub fn validate(&self) -> RiskResult<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(RiskError::validation(format!("amount must be positive, got {}", self.amount)));
        }
        if !self.typical_amount.is_finite() || self.typical_amount < 0.0 {
            return Err(RiskError::validation("typical_amount must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.counterparty_risk) {
            return Err(RiskError::validation("counterparty_risk must be within [0, 1]"));
        }
        Ok(())
    }
}

// ============================================================================
// INDICATOR EVALUATORS
// ============================================================================

pub trait IndicatorEvaluator: Send + Sync {
    /// Tag appended to the indicator list when triggered
    fn tag(&self) -> &str;

    fn triggered(&self, context: &FraudContext) -> bool;
}

/// Amount far above the sender's typical amount
pub struct UnusualTransactionPattern {
    pub amount_ratio: f64,
}

impl IndicatorEvaluator for UnusualTransactionPattern {
    fn tag(&self) -> &str {
        UNUSUAL_TRANSACTION_PATTERN
    }

    fn triggered(&self, context: &FraudContext) -> bool {
        context.amount > context.typical_amount * self.amount_ratio
    }
}

pub struct SuspiciousNetworkConnection {
    pub min_counterparty_risk: f64,
}

impl IndicatorEvaluator for SuspiciousNetworkConnection {
    fn tag(&self) -> &str {
        SUSPICIOUS_NETWORK_CONNECTION
    }

    fn triggered(&self, context: &FraudContext) -> bool {
        context.counterparty_risk >= self.min_counterparty_risk
    }
}

pub struct VelocityAnomaly {
    pub max_per_hour: u32,
}

impl IndicatorEvaluator for VelocityAnomaly {
    fn tag(&self) -> &str {
        VELOCITY_ANOMALY
    }

    fn triggered(&self, context: &FraudContext) -> bool {
        context.transactions_last_hour > self.max_per_hour
    }
}

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudConfig {
    pub model_label: String,
    pub weights: WeightTable,
    pub fraud_threshold: f64,
    pub amount_ratio: f64,
    pub min_counterparty_risk: f64,
    pub max_transactions_per_hour: u32,
}

impl FraudConfig {
    pub fn builtin() -> RiskResult<Self> {
        Ok(Self {
            model_label: MODEL_LABEL.to_string(),
            weights: WeightTable::new([
                (UNUSUAL_TRANSACTION_PATTERN, 0.07),
                (SUSPICIOUS_NETWORK_CONNECTION, 0.05),
                (VELOCITY_ANOMALY, 0.04),
            ])?,
            fraud_threshold: DEFAULT_FRAUD_THRESHOLD,
            amount_ratio: 3.0,
            min_counterparty_risk: 0.7,
            max_transactions_per_hour: 10,
        })
    }

    pub fn validate(&self) -> RiskResult<()> {
        if !self.amount_ratio.is_finite() || self.amount_ratio <= 0.0 {
            return Err(RiskError::configuration(format!(
                "fraud amount_ratio must be > 0, got {}",
                self.amount_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.min_counterparty_risk) {
            return Err(RiskError::configuration("fraud min_counterparty_risk must be within [0, 1]"));
        }
        Ok(())
    }

    pub fn evaluators(&self) -> Vec<Box<dyn IndicatorEvaluator>> {
        vec![
            Box::new(UnusualTransactionPattern { amount_ratio: self.amount_ratio }),
            Box::new(SuspiciousNetworkConnection { min_counterparty_risk: self.min_counterparty_risk }),
            Box::new(VelocityAnomaly { max_per_hour: self.max_transactions_per_hour }),
        ]
    }
}

// ============================================================================
// DETECTOR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAssessment {
    pub is_fraud: bool,
    pub fraud_probability: f64,
    pub confidence: f64,
    pub indicators: Vec<String>,
    pub model_label: String,
    pub processing_duration_ms: u64,
    pub checked_at: DateTime<Utc>,
}

pub struct FraudDetector {
    evaluators: Vec<Box<dyn IndicatorEvaluator>>,
    weights: WeightTable,
    fraud_threshold: f64,
    model_label: String,
}

impl FraudDetector {
    pub fn new(config: &FraudConfig) -> RiskResult<Self> {
        config.validate()?;
        Self::with_evaluators(
            config.evaluators(),
            config.weights.clone(),
            config.fraud_threshold,
            config.model_label.clone(),
        )
    }

    pub fn with_evaluators(
        evaluators: Vec<Box<dyn IndicatorEvaluator>>,
        weights: WeightTable,
        fraud_threshold: f64,
        model_label: impl Into<String>,
    ) -> RiskResult<Self> {
        if !(0.0..=1.0).contains(&fraud_threshold) {
            return Err(RiskError::configuration(format!(
                "fraud threshold must be within [0, 1], got {}",
                fraud_threshold
            )));
        }
        let tags: Vec<&str> = evaluators.iter().map(|e| e.tag()).collect();
        if let Some(dup) = tags.iter().enumerate().find(|(i, tag)| tags[..*i].contains(*tag)) {
            return Err(RiskError::configuration(format!("indicator '{}' registered twice", dup.1)));
        }
        weights.require_features(&tags)?;

        Ok(Self {
            evaluators,
            weights,
            fraud_threshold,
            model_label: model_label.into(),
        })
    }

    /// Indicator signals (1.0 triggered, 0.0 not) for every evaluator.
    pub fn indicator_signals(&self, context: &FraudContext) -> RiskResult<FeatureVector> {
        self.evaluators
            .iter()
            .fold(FeatureVector::builder(), |builder, evaluator| {
                let value = if evaluator.triggered(context) { 1.0 } else { 0.0 };
                builder.signal(evaluator.tag(), value)
            })
            .build()
    }

    pub fn detect(&self, context: &FraudContext) -> RiskResult<FraudAssessment> {
        context.validate()?;
        let started = Instant::now();

        let signals = self.indicator_signals(context)?;
        let fraud_probability = score(&signals, &self.weights, DEFAULT_CAP)?;
        let indicators: Vec<String> = self
            .evaluators
            .iter()
            .filter(|e| signals.signal(e.tag()) == Some(1.0))
            .map(|e| e.tag().to_string())
            .collect();
        let is_fraud = fraud_probability > self.fraud_threshold;

        tracing::debug!(
            transaction = context.transaction_id.as_deref().unwrap_or("-"),
            fraud_probability,
            is_fraud,
            indicators = indicators.len(),
            "fraud check completed"
        );

        Ok(FraudAssessment {
            is_fraud,
            fraud_probability,
            confidence: fraud_probability.max(1.0 - fraud_probability),
            indicators,
            model_label: self.model_label.clone(),
            processing_duration_ms: started.elapsed().as_millis() as u64,
            checked_at: Utc::now(),
        })
    }
}
