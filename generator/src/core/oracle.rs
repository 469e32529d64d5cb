//! Rate-limited access to the combination oracle

use std::sync::Arc;

use shared::Recipe;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::limiter::RateLimiter;
use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::Oracle;
use crate::types::OracleAnswer;

/// Wraps an oracle so every query first takes a token from a shared limiter
pub struct RateLimitedOracle<O: Oracle> {
    oracle: Arc<O>,
    limiter: Arc<RateLimiter>,
}

impl<O: Oracle> Clone for RateLimitedOracle<O> {
    fn clone(&self) -> Self {
        Self {
            oracle: self.oracle.clone(),
            limiter: self.limiter.clone(),
        }
    }
}

impl<O: Oracle> RateLimitedOracle<O> {
    pub fn new(oracle: Arc<O>, limiter: Arc<RateLimiter>) -> Self {
        Self { oracle, limiter }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Query what `left + right` produces.
    ///
    /// If `cancel` fires while waiting for a token no query is sent; if it
    /// fires while the query is in flight the response is dropped.
    pub async fn query(&self, left: &str, right: &str, cancel: &CancellationToken) -> GeneratorResult<OracleAnswer> {
        self.limiter.acquire(cancel).await?;

        debug!(first = %left, second = %right, "Querying oracle");
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GeneratorError::Cancelled),
            response = self.oracle.combine(left, right) => response?,
        };

        let result = response.result.trim();
        if result.is_empty() {
            return Err(GeneratorError::oracle_malformed(left, right, "empty result"));
        }

        Ok(OracleAnswer {
            recipe: Recipe::new(left, right, result),
            is_new: response.is_new,
        })
    }
}
