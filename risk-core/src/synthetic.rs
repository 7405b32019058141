//! Synthetic signal sources
//!
//! Stand-ins for the model and store integrations that do not exist yet.
//! Values follow the same ranges the service has always reported, but each
//! source is seeded from a SHA-256 digest of its request context, so the
//! same context always yields the same signals.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use crate::collaborators::{Cluster, GraphMetrics, GraphMetricsSource};
use crate::error::{RiskError, RiskResult};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::pipelines::{aml, anomaly, credit, transaction, user};
use crate::pipelines::{AmlContext, BatchItem, TransactionContext, UserContext};

/// Deterministic RNG for a request context.
pub fn context_rng(parts: &[&str]) -> StdRng {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&hasher.finalize());
    StdRng::from_seed(seed)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ============================================================================
// EXTRACTORS
// ============================================================================

pub struct SyntheticTransactionSignals;

#[async_trait]
impl FeatureExtractor<TransactionContext> for SyntheticTransactionSignals {
    async fn extract(&self, ctx: &TransactionContext) -> RiskResult<FeatureVector> {
        let amount = ctx.amount.to_string();
        let mut rng = context_rng(&["transaction", &ctx.transaction_id, &ctx.from_account, &ctx.to_account, &amount]);

        FeatureVector::builder()
            .signal(transaction::AMOUNT_ANOMALY, round_to(rng.gen::<f64>(), 4))
            .signal(transaction::VELOCITY, round_to(rng.gen::<f64>(), 4))
            .signal(transaction::GEO_RISK, round_to(rng.gen::<f64>() * 0.3, 4))
            .signal(transaction::ACCOUNT_AGE, round_to(rng.gen::<f64>(), 4))
            .signal(transaction::BEHAVIOR_SCORE, round_to(0.7 + rng.gen::<f64>() * 0.29, 4))
            .signal(transaction::NETWORK_RISK, round_to(rng.gen::<f64>() * 0.2, 4))
            .build()
    }
}

pub struct SyntheticUserSignals {
    pub connection_saturation: u32,
}

#[async_trait]
impl FeatureExtractor<UserContext> for SyntheticUserSignals {
    async fn extract(&self, ctx: &UserContext) -> RiskResult<FeatureVector> {
        let mut rng = context_rng(&["user", &ctx.user_id]);
        let connections = rng.gen_range(5..=100);

        FeatureVector::builder()
            .signal(user::TRANSACTION_HISTORY, round_to(rng.gen::<f64>(), 4))
            .signal(user::KYC_SCORE, round_to(0.85 + rng.gen::<f64>() * 0.14, 4))
            .signal(user::BEHAVIOR_CONSISTENCY, round_to(0.80 + rng.gen::<f64>() * 0.19, 4))
            .signal(user::NETWORK_CONNECTIONS, user::normalize_connections(connections, self.connection_saturation))
            .flag(user::SUSPICIOUS_PATTERNS, rng.gen::<f64>() < 0.05)
            .build()
    }
}

pub struct SyntheticCreditSignals;

#[async_trait]
impl FeatureExtractor<UserContext> for SyntheticCreditSignals {
    async fn extract(&self, ctx: &UserContext) -> RiskResult<FeatureVector> {
        let mut rng = context_rng(&["credit", &ctx.user_id]);
        let utilization = round_to(rng.gen::<f64>(), 2);
        let inquiries: u32 = rng.gen_range(0..=5);

        FeatureVector::builder()
            .signal(credit::PAYMENT_HISTORY, round_to(rng.gen::<f64>(), 2))
            .signal(credit::UTILIZATION_HEADROOM, round_to(1.0 - utilization, 2))
            .signal(credit::ACCOUNT_AGE, round_to(rng.gen::<f64>(), 2))
            .signal(credit::CREDIT_MIX, round_to(rng.gen::<f64>(), 2))
            .signal(credit::INQUIRY_HEADROOM, round_to(1.0 - inquiries as f64 / 5.0, 2))
            .build()
    }
}

pub struct SyntheticAmlSignals;

#[async_trait]
impl FeatureExtractor<AmlContext> for SyntheticAmlSignals {
    async fn extract(&self, ctx: &AmlContext) -> RiskResult<FeatureVector> {
        let document = ctx.document_number.as_deref().unwrap_or("");
        let mut rng = context_rng(&["aml", &ctx.user_id, document]);

        FeatureVector::builder()
            .signal(aml::NAME_MATCH, round_to(rng.gen::<f64>() * 0.3, 4))
            .signal(aml::JURISDICTION_RISK, round_to(rng.gen::<f64>() * 0.3, 4))
            .flag(aml::SANCTIONS, rng.gen::<f64>() > 0.95)
            .flag(aml::PEP, rng.gen::<f64>() > 0.97)
            .flag(aml::ADVERSE_MEDIA, rng.gen::<f64>() > 0.90)
            .build()
    }
}

pub struct SyntheticBatchSignals;

#[async_trait]
impl FeatureExtractor<BatchItem> for SyntheticBatchSignals {
    async fn extract(&self, item: &BatchItem) -> RiskResult<FeatureVector> {
        let encoded = serde_json::to_string(item)
            .map_err(|e| RiskError::validation(format!("unreadable batch item: {}", e)))?;
        let mut rng = context_rng(&["anomaly", &encoded]);

        FeatureVector::builder()
            .signal(anomaly::AMOUNT_DEVIATION, round_to(rng.gen::<f64>(), 4))
            .signal(anomaly::TIME_DEVIATION, round_to(rng.gen::<f64>(), 4))
            .signal(anomaly::RECIPIENT_NOVELTY, round_to(rng.gen::<f64>(), 4))
            .build()
    }
}

// ============================================================================
// GRAPH STORE
// ============================================================================

pub struct SyntheticGraph;

#[async_trait]
impl GraphMetricsSource for SyntheticGraph {
    async fn metrics(&self, account_id: &str) -> RiskResult<GraphMetrics> {
        let mut rng = context_rng(&["graph", account_id]);
        let connected_accounts = rng.gen_range(3..=50);
        let suspicious_connections = rng.gen_range(0..=3u32).min(connected_accounts);

        let cluster_count = rng.gen_range(1..=3);
        let clusters = (0..cluster_count)
            .map(|_| Cluster {
                cluster_id: uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string(),
                size: rng.gen_range(5..=20),
                risk: round_to(rng.gen::<f64>(), 2),
            })
            .collect();

        Ok(GraphMetrics {
            connected_accounts,
            suspicious_connections,
            clusters,
            centrality_score: round_to(rng.gen::<f64>(), 4),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(id: &str) -> TransactionContext {
        TransactionContext {
            transaction_id: id.to_string(),
            from_account: "acc-a".to_string(),
            to_account: "acc-b".to_string(),
            amount: 250.0,
        }
    }

    #[tokio::test]
    async fn test_same_context_same_signals() {
        let a = SyntheticTransactionSignals.extract(&txn("t-1")).await.unwrap();
        let b = SyntheticTransactionSignals.extract(&txn("t-1")).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_different_context_different_signals() {
        let a = SyntheticTransactionSignals.extract(&txn("t-1")).await.unwrap();
        let b = SyntheticTransactionSignals.extract(&txn("t-2")).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_transaction_signal_ranges() {
        for i in 0..50 {
            let v = SyntheticTransactionSignals.extract(&txn(&format!("t-{}", i))).await.unwrap();
            assert!(v.signal(transaction::GEO_RISK).unwrap() <= 0.3);
            assert!(v.signal(transaction::BEHAVIOR_SCORE).unwrap() >= 0.7);
            assert!(v.signal(transaction::NETWORK_RISK).unwrap() <= 0.2);
        }
    }

    #[tokio::test]
    async fn test_user_signals_carry_hard_flag() {
        let extractor = SyntheticUserSignals { connection_saturation: 100 };
        let v = extractor.extract(&UserContext { user_id: "u-1".into() }).await.unwrap();
        assert!(v.flag(user::SUSPICIOUS_PATTERNS).is_some());
        assert!(v.signal(user::NETWORK_CONNECTIONS).unwrap() >= 0.05);
    }

    #[tokio::test]
    async fn test_graph_metrics_are_consistent() {
        for i in 0..50 {
            let m = SyntheticGraph.metrics(&format!("acc-{}", i)).await.unwrap();
            assert!(m.validate().is_ok());
            assert!(!m.clusters.is_empty() && m.clusters.len() <= 3);
        }
    }
}
