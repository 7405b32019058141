//! Specialized Pipelines
//!
//! Each one wires its own feature source and tables through the shared
//! scorer, classifier and router.
//!
//! ## Structure
//! - `transaction`: TransactionRisk (approve / review / block)
//! - `user`: UserRisk (hard flag `suspicious_patterns`)
//! - `fraud`: FraudDetector (indicator evaluators)
//! - `anomaly`: AnomalyBatchScanner (capped batch, reason policy)
//! - `credit`: CreditScorer (300-850, rating bands)
//! - `network`: NetworkRiskAnalyzer (graph store collaborator)
//! - `aml`: AmlScreener (watchlist hard flags)

pub mod transaction;
pub mod user;
pub mod fraud;
pub mod anomaly;
pub mod credit;
pub mod network;
pub mod aml;

#[cfg(test)]
mod tests;

pub use transaction::{TransactionContext, TransactionRisk};
pub use user::{UserContext, UserRisk};
pub use fraud::{FraudAssessment, FraudConfig, FraudContext, FraudDetector, IndicatorEvaluator};
pub use anomaly::{
    Anomaly, AnomalyBatchScanner, AnomalyReason, AnomalyScan, AnomalyScanConfig, BatchItem,
    DominantSignal, ReasonPolicy,
};
pub use credit::{CreditAssessment, CreditConfig, CreditScorer, RatingBands};
pub use network::{NetworkAssessment, NetworkConfig, NetworkRiskAnalyzer};
pub use aml::{AmlContext, AmlScreener, AmlScreening, AmlStatus};
