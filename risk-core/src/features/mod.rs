//! Features Module
//!
//! ## Structure
//! - `vector`: FeatureVector (typed signals + hard flags) and its builder
//! - `extractor`: FeatureExtractor seam injected into every pipeline

pub mod vector;
pub mod extractor;

pub use vector::{FeatureVector, FeatureVectorBuilder};
pub use extractor::{FeatureExtractor, FnExtractor};
