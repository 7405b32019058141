//! Collaborator call bounding
//!
//! A slow collaborator becomes a `Dependency` error after its deadline.
//! Nothing here retries.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{RiskError, RiskResult};
use crate::features::{FeatureExtractor, FeatureVector};

pub async fn with_timeout<T, F>(collaborator: &str, limit: Duration, call: F) -> RiskResult<T>
where
    F: Future<Output = RiskResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(collaborator, timeout_ms = limit.as_millis() as u64, "collaborator timed out");
            Err(RiskError::dependency(format!(
                "{} did not respond within {} ms",
                collaborator,
                limit.as_millis()
            )))
        }
    }
}

/// Wraps any extractor so its call is bounded by `limit`.
pub struct TimeoutExtractor<E> {
    inner: E,
    name: String,
    limit: Duration,
}

impl<E> TimeoutExtractor<E> {
    pub fn new(inner: E, name: impl Into<String>, limit: Duration) -> Self {
        Self { inner, name: name.into(), limit }
    }
}

#[async_trait]
impl<C, E> FeatureExtractor<C> for TimeoutExtractor<E>
where
    C: ?Sized + Sync,
    E: FeatureExtractor<C>,
{
    async fn extract(&self, context: &C) -> RiskResult<FeatureVector> {
        with_timeout(&self.name, self.limit, self.inner.extract(context)).await
    }
}
