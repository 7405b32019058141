//! Feature extractor seam
//!
//! Every pipeline receives its signals through a [`FeatureExtractor`]. Any
//! source of randomness or any call into an external store lives behind this
//! trait, never inside the scoring functions.

use async_trait::async_trait;

use super::vector::FeatureVector;
use crate::error::RiskResult;

/// Produces a [`FeatureVector`] from a subject-specific context.
#[async_trait]
pub trait FeatureExtractor<C: ?Sized + Sync>: Send + Sync {
    async fn extract(&self, context: &C) -> RiskResult<FeatureVector>;
}

/// Adapter turning a plain closure into an extractor.
pub struct FnExtractor<F> {
    f: F,
}

impl<F> FnExtractor<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<C, F> FeatureExtractor<C> for FnExtractor<F>
where
    C: ?Sized + Sync,
    F: Fn(&C) -> RiskResult<FeatureVector> + Send + Sync,
{
    async fn extract(&self, context: &C) -> RiskResult<FeatureVector> {
        (self.f)(context)
    }
}
