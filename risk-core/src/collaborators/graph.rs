//! Graph metrics collaborator
//!
//! The graph-analysis store is external; only its output shape and the
//! lookup trait live here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_id: String,
    pub size: u32,
    /// Community risk in [0, 1]
    pub risk: f64,
}

/// Precomputed metrics for one account's neighbourhood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub connected_accounts: u32,
    pub suspicious_connections: u32,
    pub clusters: Vec<Cluster>,
    /// Normalized centrality in [0, 1]
    pub centrality_score: f64,
}

impl GraphMetrics {
    /// Reject metrics a well-behaved store could not have produced.
    pub fn validate(&self) -> RiskResult<()> {
        if self.suspicious_connections > self.connected_accounts {
            return Err(RiskError::dependency(format!(
                "graph store reported {} suspicious of {} connected accounts",
                self.suspicious_connections, self.connected_accounts
            )));
        }
        if !(0.0..=1.0).contains(&self.centrality_score) {
            return Err(RiskError::dependency(format!(
                "graph store centrality {} outside [0, 1]",
                self.centrality_score
            )));
        }
        if let Some(cluster) = self.clusters.iter().find(|c| !(0.0..=1.0).contains(&c.risk)) {
            return Err(RiskError::dependency(format!(
                "cluster {} risk {} outside [0, 1]",
                cluster.cluster_id, cluster.risk
            )));
        }
        Ok(())
    }
}

#[async_trait]
pub trait GraphMetricsSource: Send + Sync {
    async fn metrics(&self, account_id: &str) -> RiskResult<GraphMetrics>;
}
