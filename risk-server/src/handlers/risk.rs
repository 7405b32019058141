//! Risk handlers

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use risk_core::collaborators::Cluster;
use risk_core::pipelines::{transaction, Anomaly, BatchItem, FraudContext, TransactionContext, UserContext};
use risk_core::{Action, FeatureVector};

use crate::extract::ValidatedJson;
use crate::{AppResult, AppState};

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Signals and flags as one flat JSON object
fn flat_features(features: &FeatureVector) -> Map<String, Value> {
    let mut out = Map::new();
    for (name, value) in features.signals() {
        out.insert(name.clone(), Value::from(*value));
    }
    for (name, value) in features.flags() {
        out.insert(name.clone(), Value::from(*value));
    }
    out
}

// ============================================================================
// TRANSACTION
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct AssessTransactionRequest {
    #[validate(length(min = 1, message = "transaction_id is required"))]
    pub transaction_id: String,
    #[validate(length(min = 1, message = "from_account is required"))]
    pub from_account: String,
    #[validate(length(min = 1, message = "to_account is required"))]
    pub to_account: String,
    #[validate(range(exclusive_min = 0.0, message = "amount must be positive"))]
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct TransactionAssessmentResponse {
    pub id: Uuid,
    pub transaction_id: String,
    pub risk_score: f64,
    pub risk_level: String,
    pub action: Action,
    pub factors: BTreeMap<&'static str, f64>,
    pub ml_model: String,
    pub processing_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

pub async fn assess_transaction(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AssessTransactionRequest>,
) -> AppResult<Json<TransactionAssessmentResponse>> {
    let context = TransactionContext {
        transaction_id: req.transaction_id,
        from_account: req.from_account,
        to_account: req.to_account,
        amount: req.amount,
    };
    let record = state.engine.transaction().assess(&context).await?;

    Ok(Json(TransactionAssessmentResponse {
        id: record.id(),
        transaction_id: context.transaction_id,
        risk_score: round4(record.score()),
        risk_level: record.tier().label.clone(),
        action: record.action(),
        factors: transaction::public_factors(record.features()),
        ml_model: record.model_label().to_string(),
        processing_time_ms: record.processing_duration_ms(),
        created_at: record.created_at(),
    }))
}

// ============================================================================
// USER
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct SubjectRequest {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct UserAssessmentResponse {
    pub user_id: String,
    pub risk_score: f64,
    pub risk_level: String,
    pub features: Map<String, Value>,
    pub recommendation: Action,
    pub triggered_flags: Vec<String>,
    pub ml_model: String,
    pub assessed_at: DateTime<Utc>,
}

pub async fn assess_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SubjectRequest>,
) -> AppResult<Json<UserAssessmentResponse>> {
    let record = state.engine.user().assess(&UserContext { user_id: req.user_id }).await?;

    Ok(Json(UserAssessmentResponse {
        user_id: record.subject_id().to_string(),
        risk_score: round4(record.score()),
        risk_level: record.tier().label.clone(),
        features: flat_features(record.features()),
        recommendation: record.action(),
        triggered_flags: record.triggered_flags().to_vec(),
        ml_model: record.model_label().to_string(),
        assessed_at: record.created_at(),
    }))
}

// ============================================================================
// FRAUD
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct FraudTransaction {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub transaction_id: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "amount must be positive"))]
    pub amount: f64,
    #[validate(range(min = 0.0))]
    pub typical_amount: f64,
    pub transactions_last_hour: u32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub counterparty_risk: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FraudDetectionRequest {
    #[validate(nested)]
    pub transaction: FraudTransaction,
}

#[derive(Debug, Serialize)]
pub struct FraudDetectionResponse {
    pub is_fraud: bool,
    pub fraud_probability: f64,
    pub confidence: f64,
    pub fraud_indicators: Vec<String>,
    pub ml_model: String,
    pub processing_time_ms: u64,
    pub checked_at: DateTime<Utc>,
}

pub async fn fraud_detection(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<FraudDetectionRequest>,
) -> AppResult<Json<FraudDetectionResponse>> {
    let txn = req.transaction;
    let context = FraudContext {
        transaction_id: txn.transaction_id,
        amount: txn.amount,
        typical_amount: txn.typical_amount,
        transactions_last_hour: txn.transactions_last_hour,
        counterparty_risk: txn.counterparty_risk,
    };
    let result = state.engine.fraud().detect(&context)?;

    Ok(Json(FraudDetectionResponse {
        is_fraud: result.is_fraud,
        fraud_probability: round4(result.fraud_probability),
        confidence: round4(result.confidence),
        fraud_indicators: result.indicators,
        ml_model: result.model_label,
        processing_time_ms: result.processing_duration_ms,
        checked_at: result.checked_at,
    }))
}

// ============================================================================
// NETWORK
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct NetworkAnalysisRequest {
    #[validate(length(min = 1, message = "account_id is required"))]
    pub account_id: String,
}

#[derive(Debug, Serialize)]
pub struct NetworkAnalysisResponse {
    pub account_id: String,
    pub network_risk: f64,
    pub risk_level: String,
    pub recommendation: Action,
    pub connected_accounts: u32,
    pub suspicious_connections: u32,
    pub clusters: Vec<Cluster>,
    pub centrality_score: f64,
    pub analysis_method: String,
    pub analyzed_at: DateTime<Utc>,
}

pub async fn network_analysis(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NetworkAnalysisRequest>,
) -> AppResult<Json<NetworkAnalysisResponse>> {
    let result = state.engine.network().analyze(&req.account_id).await?;

    Ok(Json(NetworkAnalysisResponse {
        account_id: result.account_id,
        network_risk: round4(result.network_risk),
        risk_level: result.record.tier().label.clone(),
        recommendation: result.record.action(),
        connected_accounts: result.connected_accounts,
        suspicious_connections: result.suspicious_connections,
        clusters: result.clusters,
        centrality_score: result.centrality_score,
        analysis_method: result.record.model_label().to_string(),
        analyzed_at: result.analyzed_at,
    }))
}

// ============================================================================
// ANOMALY
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct AnomalyDetectionRequest {
    #[serde(default)]
    pub transactions: Vec<BatchItem>,
}

#[derive(Debug, Serialize)]
pub struct AnomalyDetectionResponse {
    pub total_transactions: usize,
    pub evaluated_transactions: usize,
    pub anomalies_detected: usize,
    pub anomalies: Vec<Anomaly>,
    pub ml_model: String,
    pub processing_time_ms: u64,
    pub analyzed_at: DateTime<Utc>,
}

pub async fn anomaly_detection(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AnomalyDetectionRequest>,
) -> AppResult<Json<AnomalyDetectionResponse>> {
    let scan = state.engine.anomaly().scan(&req.transactions).await?;

    let anomalies: Vec<Anomaly> = scan
        .anomalies
        .into_iter()
        .map(|a| Anomaly { anomaly_score: round4(a.anomaly_score), ..a })
        .collect();

    Ok(Json(AnomalyDetectionResponse {
        total_transactions: scan.total_transactions,
        evaluated_transactions: scan.evaluated,
        anomalies_detected: anomalies.len(),
        anomalies,
        ml_model: scan.model_label,
        processing_time_ms: scan.processing_duration_ms,
        analyzed_at: scan.analyzed_at,
    }))
}

// ============================================================================
// CREDIT
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CreditScoreResponse {
    pub user_id: String,
    pub credit_score: u32,
    pub score_range: String,
    pub rating: String,
    pub factors: Map<String, Value>,
    pub recommended_limit: f64,
    pub ml_model: String,
    pub calculated_at: DateTime<Utc>,
}

pub async fn credit_score(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SubjectRequest>,
) -> AppResult<Json<CreditScoreResponse>> {
    let result = state.engine.credit().score(&UserContext { user_id: req.user_id }).await?;

    Ok(Json(CreditScoreResponse {
        user_id: result.user_id,
        credit_score: result.credit_score,
        score_range: result.score_range,
        rating: result.rating,
        factors: flat_features(&result.factors),
        recommended_limit: result.recommended_limit,
        ml_model: result.model_label,
        calculated_at: result.calculated_at,
    }))
}
