//! Assessment Module
//!
//! - `pipeline`: ScoringPipeline (static config + decide/assess)
//! - `record`: Decision and the immutable AssessmentRecord

pub mod pipeline;
pub mod record;

pub use pipeline::ScoringPipeline;
pub use record::{AssessmentRecord, Decision};
