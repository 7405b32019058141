use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::collaborators::{Cluster, GraphMetrics, GraphMetricsSource};
use crate::error::{RiskError, RiskResult};
use crate::features::{FeatureExtractor, FeatureVector, FnExtractor};
use crate::scoring::Action;
use crate::synthetic::SyntheticGraph;

// ============================================================================
// HELPERS
// ============================================================================

fn txn_context() -> TransactionContext {
    TransactionContext {
        transaction_id: "txn-001".into(),
        from_account: "acc-a".into(),
        to_account: "acc-b".into(),
        amount: 1200.0,
    }
}

fn medium_transaction_signals(_: &TransactionContext) -> RiskResult<FeatureVector> {
    FeatureVector::builder()
        .signal(transaction::AMOUNT_ANOMALY, 0.5)
        .signal(transaction::VELOCITY, 0.4)
        .signal(transaction::GEO_RISK, 0.1)
        .signal(transaction::ACCOUNT_AGE, 0.2)
        .signal(transaction::BEHAVIOR_SCORE, 0.9)
        .signal(transaction::NETWORK_RISK, 0.05)
        .build()
}

fn transaction_risk() -> TransactionRisk {
    TransactionRisk::new(
        transaction::default_scoring().unwrap(),
        Arc::new(FnExtractor::new(medium_transaction_signals)),
    )
    .unwrap()
}

fn user_signals(value: f64, suspicious: bool) -> impl Fn(&UserContext) -> RiskResult<FeatureVector> {
    move |_| {
        FeatureVector::builder()
            .signal(user::TRANSACTION_HISTORY, value)
            .signal(user::KYC_SCORE, value)
            .signal(user::BEHAVIOR_CONSISTENCY, value)
            .signal(user::NETWORK_CONNECTIONS, value)
            .flag(user::SUSPICIOUS_PATTERNS, suspicious)
            .build()
    }
}

struct CountingBatchExtractor {
    calls: AtomicUsize,
    signals: [f64; 3],
}

#[async_trait]
impl FeatureExtractor<BatchItem> for CountingBatchExtractor {
    async fn extract(&self, _item: &BatchItem) -> RiskResult<FeatureVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        FeatureVector::builder()
            .signal(anomaly::AMOUNT_DEVIATION, self.signals[0])
            .signal(anomaly::TIME_DEVIATION, self.signals[1])
            .signal(anomaly::RECIPIENT_NOVELTY, self.signals[2])
            .build()
    }
}

fn batch(n: usize, with_ids: bool) -> Vec<BatchItem> {
    (0..n)
        .map(|i| BatchItem {
            id: with_ids.then(|| format!("txn-{}", i)),
            ..Default::default()
        })
        .collect()
}

struct FixedGraph(GraphMetrics);

#[async_trait]
impl GraphMetricsSource for FixedGraph {
    async fn metrics(&self, _account_id: &str) -> RiskResult<GraphMetrics> {
        Ok(self.0.clone())
    }
}

struct StalledGraph;

#[async_trait]
impl GraphMetricsSource for StalledGraph {
    async fn metrics(&self, _account_id: &str) -> RiskResult<GraphMetrics> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(RiskError::dependency("unreachable"))
    }
}

// ============================================================================
// TRANSACTION / USER
// ============================================================================

#[tokio::test]
async fn test_transaction_medium_goes_to_review() {
    let record = transaction_risk().assess(&txn_context()).await.unwrap();

    assert!((record.score() - 0.425).abs() < 1e-9);
    assert_eq!(record.tier().label, "medium");
    assert_eq!(record.action(), Action::Review);
    assert_eq!(record.subject_id(), "txn-001");
    assert_eq!(record.model_label(), transaction::MODEL_LABEL);
    assert!(record.triggered_flags().is_empty());
}

#[tokio::test]
async fn test_transaction_assessment_is_repeatable() {
    let risk = transaction_risk();
    let first = risk.assess(&txn_context()).await.unwrap();
    let second = risk.assess(&txn_context()).await.unwrap();

    assert_eq!(first.decision(), second.decision());
    assert_ne!(first.id(), second.id());
}

#[tokio::test]
async fn test_transaction_rejects_bad_amount() {
    let mut context = txn_context();
    context.amount = 0.0;
    let err = transaction_risk().assess(&context).await.unwrap_err();
    assert_eq!(err.kind(), "validation_error");
}

#[test]
fn test_public_factor_names() {
    let features = medium_transaction_signals(&txn_context()).unwrap();
    let factors = transaction::public_factors(&features);
    assert_eq!(factors.len(), 6);
    assert_eq!(factors.get("velocity_check"), Some(&0.4));
    assert_eq!(factors.get("behavior_pattern"), Some(&0.9));
}

#[tokio::test]
async fn test_user_low_risk_is_approved() {
    let risk = UserRisk::new(user::default_scoring().unwrap(), Arc::new(FnExtractor::new(user_signals(0.1, false))))
        .unwrap();
    let record = risk.assess(&UserContext { user_id: "u-1".into() }).await.unwrap();

    assert_eq!(record.tier().label, "low");
    assert_eq!(record.action(), Action::Approve);
}

#[tokio::test]
async fn test_user_suspicious_patterns_force_review() {
    let risk = UserRisk::new(user::default_scoring().unwrap(), Arc::new(FnExtractor::new(user_signals(0.1, true))))
        .unwrap();
    let record = risk.assess(&UserContext { user_id: "u-1".into() }).await.unwrap();

    assert!(record.score() < 0.3);
    assert_eq!(record.tier().label, "low");
    assert_eq!(record.action(), Action::Review);
    assert_eq!(record.triggered_flags(), [user::SUSPICIOUS_PATTERNS.to_string()]);
    assert!(record.decision().was_overridden());
}

#[tokio::test]
async fn test_extractor_failure_propagates() {
    let failing = FnExtractor::new(|_: &UserContext| -> RiskResult<FeatureVector> {
        Err(RiskError::dependency("feature store unavailable"))
    });
    let risk = UserRisk::new(user::default_scoring().unwrap(), Arc::new(failing)).unwrap();

    let err = risk.assess(&UserContext { user_id: "u-1".into() }).await.unwrap_err();
    assert_eq!(err.kind(), "dependency_error");
}

// ============================================================================
// ANOMALY SCAN
// ============================================================================

#[tokio::test]
async fn test_scan_never_exceeds_batch_cap() {
    let extractor = Arc::new(CountingBatchExtractor { calls: AtomicUsize::new(0), signals: [0.9, 0.9, 0.9] });
    let scanner = AnomalyBatchScanner::new(
        AnomalyScanConfig::builtin().unwrap(),
        extractor.clone(),
        Box::new(DominantSignal::default()),
    )
    .unwrap();

    let scan = scanner.scan(&batch(8, true)).await.unwrap();

    assert_eq!(extractor.calls.load(Ordering::SeqCst), anomaly::DEFAULT_BATCH_CAP);
    assert_eq!(scan.total_transactions, 8);
    assert_eq!(scan.evaluated, anomaly::DEFAULT_BATCH_CAP);
    assert_eq!(scan.anomalies.len(), anomaly::DEFAULT_BATCH_CAP);
    assert_eq!(scan.anomalies[0].transaction_id, "txn-0");
    for found in &scan.anomalies {
        assert!(AnomalyReason::ALL.contains(&found.reason));
        assert_eq!(found.reason, AnomalyReason::UnusualAmount);
    }
}

#[tokio::test]
async fn test_scan_keeps_only_items_above_threshold() {
    let extractor = Arc::new(CountingBatchExtractor { calls: AtomicUsize::new(0), signals: [0.2, 0.2, 0.2] });
    let scanner =
        AnomalyBatchScanner::new(AnomalyScanConfig::builtin().unwrap(), extractor, Box::new(DominantSignal::default()))
            .unwrap();

    let scan = scanner.scan(&batch(3, true)).await.unwrap();
    assert_eq!(scan.evaluated, 3);
    assert!(scan.anomalies.is_empty());
}

#[tokio::test]
async fn test_scan_reason_follows_dominant_signal() {
    let extractor = Arc::new(CountingBatchExtractor { calls: AtomicUsize::new(0), signals: [0.6, 0.8, 1.0] });
    let scanner =
        AnomalyBatchScanner::new(AnomalyScanConfig::builtin().unwrap(), extractor, Box::new(DominantSignal::default()))
            .unwrap();

    let scan = scanner.scan(&batch(1, true)).await.unwrap();
    assert_eq!(scan.anomalies.len(), 1);
    assert_eq!(scan.anomalies[0].reason, AnomalyReason::UnusualRecipient);
    assert_eq!(scan.anomalies[0].reason.as_str(), "unusual_recipient");
}

#[tokio::test]
async fn test_scan_assigns_ids_to_anonymous_items() {
    let extractor = Arc::new(CountingBatchExtractor { calls: AtomicUsize::new(0), signals: [1.0, 1.0, 1.0] });
    let scanner =
        AnomalyBatchScanner::new(AnomalyScanConfig::builtin().unwrap(), extractor, Box::new(DominantSignal::default()))
            .unwrap();

    let scan = scanner.scan(&batch(2, false)).await.unwrap();
    assert_eq!(scan.anomalies.len(), 2);
    for found in &scan.anomalies {
        assert!(uuid::Uuid::parse_str(&found.transaction_id).is_ok());
    }
    assert_ne!(scan.anomalies[0].transaction_id, scan.anomalies[1].transaction_id);
}

#[tokio::test]
async fn test_scan_empty_batch() {
    let extractor = Arc::new(CountingBatchExtractor { calls: AtomicUsize::new(0), signals: [1.0, 1.0, 1.0] });
    let scanner = AnomalyBatchScanner::new(
        AnomalyScanConfig::builtin().unwrap(),
        extractor.clone(),
        Box::new(DominantSignal::default()),
    )
    .unwrap();

    let scan = scanner.scan(&[]).await.unwrap();
    assert_eq!(scan.total_transactions, 0);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_zero_batch_cap_rejected() {
    let mut config = AnomalyScanConfig::builtin().unwrap();
    config.batch_cap = 0;
    let extractor = Arc::new(CountingBatchExtractor { calls: AtomicUsize::new(0), signals: [0.0; 3] });
    let err = AnomalyBatchScanner::new(config, extractor, Box::new(DominantSignal::default())).err().unwrap();
    assert_eq!(err.kind(), "configuration_error");
}

#[test]
fn test_reason_policy_must_cover_weighted_features() {
    let mut config = AnomalyScanConfig::builtin().unwrap();
    config.weights = crate::scoring::WeightTable::new([(anomaly::AMOUNT_DEVIATION, 1.0)]).unwrap();
    let extractor = Arc::new(CountingBatchExtractor { calls: AtomicUsize::new(0), signals: [0.0; 3] });
    let policy = DominantSignal::new([(anomaly::TIME_DEVIATION, AnomalyReason::UnusualTime)]);

    assert!(AnomalyBatchScanner::new(config, extractor, Box::new(policy)).is_err());
}

// ============================================================================
// CREDIT
// ============================================================================

fn credit_signals(value: f64) -> impl Fn(&UserContext) -> RiskResult<FeatureVector> {
    move |_| {
        FeatureVector::builder()
            .signal(credit::PAYMENT_HISTORY, value)
            .signal(credit::UTILIZATION_HEADROOM, value)
            .signal(credit::ACCOUNT_AGE, value)
            .signal(credit::CREDIT_MIX, value)
            .signal(credit::INQUIRY_HEADROOM, value)
            .build()
    }
}

#[tokio::test]
async fn test_credit_perfect_profile() {
    let scorer =
        CreditScorer::new(CreditConfig::builtin().unwrap(), Arc::new(FnExtractor::new(credit_signals(1.0)))).unwrap();
    let result = scorer.score(&UserContext { user_id: "u-9".into() }).await.unwrap();

    assert_eq!(result.credit_score, 850);
    assert_eq!(result.rating, "Excellent");
    assert_eq!(result.score_range, "300-850");
    assert_eq!(result.recommended_limit, 8500.0);
}

#[tokio::test]
async fn test_credit_midpoint_profile() {
    let scorer =
        CreditScorer::new(CreditConfig::builtin().unwrap(), Arc::new(FnExtractor::new(credit_signals(0.5)))).unwrap();
    let result = scorer.score(&UserContext { user_id: "u-9".into() }).await.unwrap();

    assert_eq!(result.credit_score, 575);
    assert_eq!(result.rating, "Very Poor");
    assert!(result.factors.has_signal(credit::PAYMENT_HISTORY));
}

#[tokio::test]
async fn test_credit_requires_user() {
    let scorer =
        CreditScorer::new(CreditConfig::builtin().unwrap(), Arc::new(FnExtractor::new(credit_signals(0.5)))).unwrap();
    let err = scorer.score(&UserContext { user_id: " ".into() }).await.unwrap_err();
    assert_eq!(err.kind(), "validation_error");
}

// ============================================================================
// NETWORK
// ============================================================================

fn graph(connected: u32, suspicious: u32, cluster_risk: f64, centrality: f64) -> GraphMetrics {
    GraphMetrics {
        connected_accounts: connected,
        suspicious_connections: suspicious,
        clusters: vec![Cluster { cluster_id: "c-1".into(), size: 8, risk: cluster_risk }],
        centrality_score: centrality,
    }
}

#[tokio::test]
async fn test_network_quiet_account_approved() {
    let analyzer = NetworkRiskAnalyzer::new(
        NetworkConfig::builtin().unwrap(),
        Arc::new(FixedGraph(graph(10, 0, 0.1, 0.1))),
        Duration::from_millis(500),
    )
    .unwrap();

    let result = analyzer.analyze("acc-1").await.unwrap();
    assert_eq!(result.connected_accounts, 10);
    assert_eq!(result.clusters.len(), 1);
    assert_eq!(result.record.action(), Action::Approve);
    assert!(result.network_risk < 0.3);
}

#[tokio::test]
async fn test_network_dense_suspicious_account_reviewed() {
    let analyzer = NetworkRiskAnalyzer::new(
        NetworkConfig::builtin().unwrap(),
        Arc::new(FixedGraph(graph(50, 40, 0.9, 0.8))),
        Duration::from_millis(500),
    )
    .unwrap();

    let result = analyzer.analyze("acc-2").await.unwrap();
    assert_eq!(result.record.tier().label, "high");
    assert_eq!(result.record.action(), Action::Review);
}

#[tokio::test(start_paused = true)]
async fn test_network_store_timeout_is_dependency_error() {
    let analyzer =
        NetworkRiskAnalyzer::new(NetworkConfig::builtin().unwrap(), Arc::new(StalledGraph), Duration::from_millis(50))
            .unwrap();

    let err = analyzer.analyze("acc-3").await.unwrap_err();
    assert_eq!(err.kind(), "dependency_error");
}

#[tokio::test(start_paused = true)]
async fn test_graph_reachability_follows_the_store() {
    let stalled =
        NetworkRiskAnalyzer::new(NetworkConfig::builtin().unwrap(), Arc::new(StalledGraph), Duration::from_millis(50))
            .unwrap();
    assert!(!stalled.graph_reachable().await);

    let live =
        NetworkRiskAnalyzer::new(NetworkConfig::builtin().unwrap(), Arc::new(SyntheticGraph), Duration::from_millis(50))
            .unwrap();
    assert!(live.graph_reachable().await);
}

// ============================================================================
// AML
// ============================================================================

fn aml_signals(sanctions: bool) -> impl Fn(&AmlContext) -> RiskResult<FeatureVector> {
    move |_| {
        FeatureVector::builder()
            .signal(aml::NAME_MATCH, 0.05)
            .signal(aml::JURISDICTION_RISK, 0.05)
            .flag(aml::SANCTIONS, sanctions)
            .flag(aml::PEP, false)
            .flag(aml::ADVERSE_MEDIA, false)
            .build()
    }
}

fn aml_context() -> AmlContext {
    AmlContext { user_id: "u-7".into(), document_number: Some("P1234567".into()) }
}

#[tokio::test]
async fn test_aml_clear_subject() {
    let screener =
        AmlScreener::new(aml::default_scoring().unwrap(), Arc::new(FnExtractor::new(aml_signals(false)))).unwrap();
    let result = screener.screen(&aml_context()).await.unwrap();

    assert_eq!(result.status, AmlStatus::Clear);
    assert!(!result.sanctions);
    assert_eq!(result.data_sources.len(), aml::DATA_SOURCES.len());
}

#[tokio::test]
async fn test_aml_watchlist_hit_flags_subject() {
    let screener =
        AmlScreener::new(aml::default_scoring().unwrap(), Arc::new(FnExtractor::new(aml_signals(true)))).unwrap();
    let result = screener.screen(&aml_context()).await.unwrap();

    assert_eq!(result.status, AmlStatus::Flagged);
    assert!(result.sanctions);
    assert_eq!(result.record.tier().label, "low");
    assert_eq!(result.record.action(), Action::Review);
}
