//! Scoring Module
//!
//! Shared decision core used by every pipeline:
//! features -> weighted score -> tier -> action.
//!
//! ## Structure
//! - `weights`: WeightTable (feature name -> weight)
//! - `scorer`: WeightedScorer (pure, bounded)
//! - `thresholds`: ThresholdTable and Tier
//! - `classifier`: score -> tier
//! - `router`: tier + hard flags -> action

pub mod weights;
pub mod scorer;
pub mod thresholds;
pub mod classifier;
pub mod router;

pub use weights::{WeightEntry, WeightTable};
pub use scorer::{contributions, score, score_default, DEFAULT_CAP};
pub use thresholds::{ThresholdTable, Tier, TierBound};
pub use classifier::classify;
pub use router::{Action, ActionRouter};
