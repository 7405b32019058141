use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use risk_core::{EngineConfig, RiskEngine};

use crate::config::Config;
use crate::{create_router, AppState};

fn app() -> Router {
    let config = Config::default();
    let engine = RiskEngine::synthetic(EngineConfig::builtin().unwrap(), config.collaborator_timeout()).unwrap();
    create_router(AppState { config, engine: Arc::new(engine) })
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = tokio_test::assert_ok!(serde_json::from_slice::<Value>(&bytes));
    (status, value)
}

fn transaction_body() -> Value {
    json!({
        "transaction_id": "txn-1001",
        "from_account": "acc-alice",
        "to_account": "acc-bob",
        "amount": 1500.0
    })
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "risk-service");
    assert_eq!(body["pipelines_loaded"], 7);
    assert_eq!(body["graph_db_connected"], true);
    assert_eq!(body["pipelines"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_assess_transaction() {
    let (status, body) = post_json(app(), "/risk/assess-transaction", transaction_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction_id"], "txn-1001");
    assert_eq!(body["ml_model"], "XGBoost + Neural Network");
    assert!(["low", "medium", "high", "critical"].contains(&body["risk_level"].as_str().unwrap()));
    assert!(["approve", "review", "block"].contains(&body["action"].as_str().unwrap()));
    assert_eq!(body["factors"].as_object().unwrap().len(), 6);
    assert!(body["factors"].get("velocity_check").is_some());
}

#[tokio::test]
async fn test_assess_transaction_is_repeatable() {
    let app = app();
    let (_, first) = post_json(app.clone(), "/risk/assess-transaction", transaction_body()).await;
    let (_, second) = post_json(app, "/risk/assess-transaction", transaction_body()).await;

    assert_eq!(first["risk_score"], second["risk_score"]);
    assert_eq!(first["risk_level"], second["risk_level"]);
    assert_eq!(first["action"], second["action"]);
    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_invalid_amount_rejected() {
    let mut body = transaction_body();
    body["amount"] = json!(-10.0);
    let (status, body) = post_json(app(), "/risk/assess-transaction", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_error");
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_missing_field_rejected() {
    let (status, body) = post_json(app(), "/risk/assess-transaction", json!({"transaction_id": "t"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_error");
}

#[tokio::test]
async fn test_assess_user() {
    let (status, body) = post_json(app(), "/risk/assess-user", json!({"user_id": "user-5"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "user-5");
    assert!(body["features"].get("suspicious_patterns").unwrap().is_boolean());
    assert!(["approve", "review"].contains(&body["recommendation"].as_str().unwrap()));
}

#[tokio::test]
async fn test_fraud_detection() {
    let (status, body) = post_json(
        app(),
        "/risk/fraud-detection",
        json!({"transaction": {
            "transaction_id": "txn-9",
            "amount": 9000.0,
            "typical_amount": 100.0,
            "transactions_last_hour": 40,
            "counterparty_risk": 0.95
        }}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_fraud"], true);
    assert_eq!(body["fraud_indicators"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_fraud_detection_rejects_out_of_range_risk() {
    let (status, body) = post_json(
        app(),
        "/risk/fraud-detection",
        json!({"transaction": {"amount": 10.0, "typical_amount": 10.0, "transactions_last_hour": 1, "counterparty_risk": 3.0}}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_error");
}

#[tokio::test]
async fn test_fraud_detection_requires_every_signal() {
    let (status, body) = post_json(
        app(),
        "/risk/fraud-detection",
        json!({"transaction": {"amount": 9000.0, "typical_amount": 100.0}}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_error");
}

#[tokio::test]
async fn test_network_analysis() {
    let (status, body) = post_json(app(), "/risk/network-analysis", json!({"account_id": "acc-77"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis_method"], "Graph Database + Community Detection");
    let clusters = body["clusters"].as_array().unwrap();
    assert!(!clusters.is_empty() && clusters.len() <= 3);
}

#[tokio::test]
async fn test_network_analysis_requires_account() {
    let (status, _) = post_json(app(), "/risk/network-analysis", json!({"account_id": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_anomaly_detection_caps_batch() {
    let transactions: Vec<Value> = (0..9).map(|i| json!({"id": format!("txn-{}", i), "amount": i * 100})).collect();
    let (status, body) =
        post_json(app(), "/risk/anomaly-detection", json!({ "transactions": transactions })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_transactions"], 9);
    assert_eq!(body["evaluated_transactions"], 5);
    assert_eq!(body["anomalies_detected"].as_u64().unwrap() as usize, body["anomalies"].as_array().unwrap().len());
}

#[tokio::test]
async fn test_anomaly_detection_empty_batch() {
    let (status, body) = post_json(app(), "/risk/anomaly-detection", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_transactions"], 0);
    assert_eq!(body["anomalies_detected"], 0);
}

#[tokio::test]
async fn test_credit_score() {
    let (status, body) = post_json(app(), "/risk/credit-score", json!({"user_id": "user-5"})).await;

    assert_eq!(status, StatusCode::OK);
    let score = body["credit_score"].as_u64().unwrap();
    assert!((300..=850).contains(&score));
    assert_eq!(body["score_range"], "300-850");
    assert_eq!(body["recommended_limit"].as_f64().unwrap(), score as f64 * 10.0);
}

#[tokio::test]
async fn test_aml_check() {
    let (status, body) = post_json(
        app(),
        "/kyc/aml-check",
        json!({"user_id": "user-5", "document_number": "P7654321"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let flagged = body["sanctions"] == true || body["pep"] == true || body["adverse_media"] == true;
    assert_eq!(body["status"], if flagged { "flagged" } else { "clear" });
    assert_eq!(body["data_sources"].as_array().unwrap().len(), 5);
}
