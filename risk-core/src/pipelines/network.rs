//! Network Risk Analyzer
//!
//! Graph metrics come from an external collaborator; they are turned into
//! signals and scored through the shared pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::{AssessmentRecord, ScoringPipeline};
use crate::collaborators::{with_timeout, Cluster, GraphMetrics, GraphMetricsSource};
use crate::error::{RiskError, RiskResult};
use crate::features::FeatureVector;
use crate::scoring::{Action, ActionRouter, ThresholdTable, WeightTable};

pub const SUSPICIOUS_RATIO: &str = "suspicious_ratio";
pub const CLUSTER_RISK: &str = "cluster_risk";
pub const CENTRALITY: &str = "centrality";
pub const CONNECTIVITY: &str = "connectivity";

pub const SIGNALS: [&str; 4] = [SUSPICIOUS_RATIO, CLUSTER_RISK, CENTRALITY, CONNECTIVITY];

pub const MODEL_LABEL: &str = "Graph Database + Community Detection";

/// Connected-account count treated as fully connected
pub const DEFAULT_CONNECTIVITY_SATURATION: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub scoring: ScoringPipeline,
    pub connectivity_saturation: u32,
}

impl NetworkConfig {
    pub fn builtin() -> RiskResult<Self> {
        let weights = WeightTable::new([
            (SUSPICIOUS_RATIO, 0.40),
            (CLUSTER_RISK, 0.30),
            (CENTRALITY, 0.20),
            (CONNECTIVITY, 0.10),
        ])?;
        let thresholds = ThresholdTable::new([(0.0, "low"), (0.3, "medium"), (0.6, "high")])?;
        let router = ActionRouter::new(
            [("low", Action::Approve), ("medium", Action::Review), ("high", Action::Review)],
            Action::Review,
        );

        Ok(Self {
            scoring: ScoringPipeline::new(MODEL_LABEL, weights, thresholds, router),
            connectivity_saturation: DEFAULT_CONNECTIVITY_SATURATION,
        })
    }

    pub fn validate(&self) -> RiskResult<()> {
        if self.connectivity_saturation == 0 {
            return Err(RiskError::configuration("network connectivity_saturation must be at least 1"));
        }
        self.scoring.validate_for(&SIGNALS, &[])
    }
}

/// Graph metrics -> signals. Highest cluster risk wins; no clusters means 0.
pub fn network_features(metrics: &GraphMetrics, saturation: u32) -> RiskResult<FeatureVector> {
    metrics.validate()?;

    let suspicious_ratio = if metrics.connected_accounts == 0 {
        0.0
    } else {
        metrics.suspicious_connections as f64 / metrics.connected_accounts as f64
    };
    let cluster_risk = metrics.clusters.iter().map(|c| c.risk).fold(0.0, f64::max);
    let connectivity = (metrics.connected_accounts as f64 / saturation.max(1) as f64).min(1.0);

    FeatureVector::builder()
        .signal(SUSPICIOUS_RATIO, suspicious_ratio)
        .signal(CLUSTER_RISK, cluster_risk)
        .signal(CENTRALITY, metrics.centrality_score)
        .signal(CONNECTIVITY, connectivity)
        .build()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkAssessment {
    pub account_id: String,
    pub network_risk: f64,
    pub connected_accounts: u32,
    pub suspicious_connections: u32,
    pub clusters: Vec<Cluster>,
    pub centrality_score: f64,
    pub record: AssessmentRecord,
    pub analyzed_at: DateTime<Utc>,
}

pub struct NetworkRiskAnalyzer {
    config: NetworkConfig,
    source: Arc<dyn GraphMetricsSource>,
    timeout: Duration,
}

impl NetworkRiskAnalyzer {
    pub fn new(config: NetworkConfig, source: Arc<dyn GraphMetricsSource>, timeout: Duration) -> RiskResult<Self> {
        config.validate()?;
        Ok(Self { config, source, timeout })
    }

    pub fn scoring(&self) -> &ScoringPipeline {
        &self.config.scoring
    }

    /// Whether the graph store answers a metrics lookup within the deadline.
    pub async fn graph_reachable(&self) -> bool {
        match with_timeout("graph store", self.timeout, self.source.metrics("health-check")).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "graph store unreachable");
                false
            }
        }
    }

    pub async fn analyze(&self, account_id: &str) -> RiskResult<NetworkAssessment> {
        if account_id.trim().is_empty() {
            return Err(RiskError::validation("account_id is required"));
        }
        let started = Instant::now();

        let metrics = with_timeout("graph store", self.timeout, self.source.metrics(account_id)).await?;
        let features = network_features(&metrics, self.config.connectivity_saturation)?;
        let record = self.config.scoring.assess(account_id, features, started)?;

        Ok(NetworkAssessment {
            account_id: account_id.to_string(),
            network_risk: record.score(),
            connected_accounts: metrics.connected_accounts,
            suspicious_connections: metrics.suspicious_connections,
            clusters: metrics.clusters,
            centrality_score: metrics.centrality_score,
            analyzed_at: record.created_at(),
            record,
        })
    }
}
