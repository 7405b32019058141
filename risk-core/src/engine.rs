//! Risk Engine
//!
//! All pipelines built from one validated [`EngineConfig`] and one set of
//! signal sources. Read-only once constructed; share it behind an `Arc`.

use std::sync::Arc;
use std::time::Duration;

use crate::collaborators::{GraphMetricsSource, TimeoutExtractor};
use crate::config::EngineConfig;
use crate::error::RiskResult;
use crate::features::FeatureExtractor;
use crate::pipelines::{
    AmlContext, AmlScreener, AnomalyBatchScanner, BatchItem, CreditScorer, DominantSignal, FraudDetector,
    NetworkRiskAnalyzer, TransactionContext, TransactionRisk, UserContext, UserRisk,
};
use crate::synthetic::{
    SyntheticAmlSignals, SyntheticBatchSignals, SyntheticCreditSignals, SyntheticGraph, SyntheticTransactionSignals,
    SyntheticUserSignals,
};

/// Pipeline names reported by the health probe
pub const PIPELINES: [&str; 7] = [
    "transaction_risk",
    "user_risk",
    "fraud_detection",
    "anomaly_detection",
    "credit_scoring",
    "network_analysis",
    "aml_screening",
];

pub struct SignalSources {
    pub transactions: Arc<dyn FeatureExtractor<TransactionContext>>,
    pub users: Arc<dyn FeatureExtractor<UserContext>>,
    pub credit: Arc<dyn FeatureExtractor<UserContext>>,
    pub batches: Arc<dyn FeatureExtractor<BatchItem>>,
    pub aml: Arc<dyn FeatureExtractor<AmlContext>>,
    pub graph: Arc<dyn GraphMetricsSource>,
    /// Deadline for graph store calls
    pub timeout: Duration,
}

impl SignalSources {
    /// Seeded synthetic sources, each bounded by `timeout`.
    pub fn synthetic(config: &EngineConfig, timeout: Duration) -> Self {
        let users = SyntheticUserSignals { connection_saturation: config.user.connection_saturation };

        Self {
            transactions: Arc::new(TimeoutExtractor::new(SyntheticTransactionSignals, "transaction signals", timeout)),
            users: Arc::new(TimeoutExtractor::new(users, "user signals", timeout)),
            credit: Arc::new(TimeoutExtractor::new(SyntheticCreditSignals, "credit bureau", timeout)),
            batches: Arc::new(TimeoutExtractor::new(SyntheticBatchSignals, "batch signals", timeout)),
            aml: Arc::new(TimeoutExtractor::new(SyntheticAmlSignals, "watchlist screening", timeout)),
            graph: Arc::new(SyntheticGraph),
            timeout,
        }
    }
}

pub struct RiskEngine {
    transaction: TransactionRisk,
    user: UserRisk,
    fraud: FraudDetector,
    anomaly: AnomalyBatchScanner,
    credit: CreditScorer,
    network: NetworkRiskAnalyzer,
    aml: AmlScreener,
}

impl RiskEngine {
    pub fn new(config: EngineConfig, sources: SignalSources) -> RiskResult<Self> {
        config.validate()?;

        let engine = Self {
            transaction: TransactionRisk::new(config.transaction, sources.transactions)?,
            user: UserRisk::new(config.user.scoring, sources.users)?,
            fraud: FraudDetector::new(&config.fraud)?,
            anomaly: AnomalyBatchScanner::new(config.anomaly, sources.batches, Box::new(DominantSignal::default()))?,
            credit: CreditScorer::new(config.credit, sources.credit)?,
            network: NetworkRiskAnalyzer::new(config.network, sources.graph, sources.timeout)?,
            aml: AmlScreener::new(config.aml, sources.aml)?,
        };

        tracing::info!(pipelines = PIPELINES.len(), "risk engine ready");
        Ok(engine)
    }

    pub fn synthetic(config: EngineConfig, timeout: Duration) -> RiskResult<Self> {
        let sources = SignalSources::synthetic(&config, timeout);
        Self::new(config, sources)
    }

    pub fn transaction(&self) -> &TransactionRisk {
        &self.transaction
    }

    pub fn user(&self) -> &UserRisk {
        &self.user
    }

    pub fn fraud(&self) -> &FraudDetector {
        &self.fraud
    }

    pub fn anomaly(&self) -> &AnomalyBatchScanner {
        &self.anomaly
    }

    pub fn credit(&self) -> &CreditScorer {
        &self.credit
    }

    pub fn network(&self) -> &NetworkRiskAnalyzer {
        &self.network
    }

    pub fn aml(&self) -> &AmlScreener {
        &self.aml
    }

    pub fn pipeline_names(&self) -> &'static [&'static str] {
        &PIPELINES
    }
}
