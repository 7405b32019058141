//! Risk Core
//!
//! Decisioning engine shared by every risk pipeline:
//! signals -> weighted score -> tier -> action -> assessment record.
//!
//! ## Structure
//! - `features`: FeatureVector and the FeatureExtractor seam
//! - `scoring`: weights, scorer, thresholds, classifier, router
//! - `assessment`: ScoringPipeline and AssessmentRecord
//! - `pipelines`: the seven specialized pipelines
//! - `collaborators`: graph store interface and call timeouts
//! - `synthetic`: seeded stand-in signal sources
//! - `config`: EngineConfig (built-in tables, JSON overrides)
//! - `engine`: RiskEngine wiring it all together

pub mod error;
pub mod features;
pub mod scoring;
pub mod assessment;
pub mod collaborators;
pub mod pipelines;
pub mod synthetic;
pub mod config;
pub mod engine;

pub use error::{RiskError, RiskResult};
pub use features::{FeatureExtractor, FeatureVector};
pub use scoring::{Action, ActionRouter, ThresholdTable, Tier, WeightTable};
pub use assessment::{AssessmentRecord, Decision, ScoringPipeline};
pub use config::EngineConfig;
pub use engine::{RiskEngine, SignalSources};
