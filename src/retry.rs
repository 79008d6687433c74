//! Bounded retry with timeout racing, and the indexing-lag recovery policy.
//!
//! The retry loop is generic; the domain-specific block-rollback response to
//! an indexer that has not caught up is isolated in `IndexingLagPolicy` so it
//! can be unit-tested without any network.

use std::future::Future;
use std::time::Duration;

use log::warn;
use tokio::time::{sleep, timeout};
use tokio_retry::strategy::ExponentialBackoff;

use crate::errors::ProviderError;
use crate::settings::RetrySettings;

/// Bounded-retry parameters for one class of remote call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Races each individual attempt; a timed-out attempt counts as a
    /// failure exactly like a thrown error.
    pub attempt_timeout: Duration,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            attempt_timeout: Duration::from_secs(settings.attempt_timeout_seconds),
            backoff_base: Duration::from_millis(settings.backoff_base_ms),
            backoff_max: Duration::from_millis(settings.backoff_max_ms),
        }
    }

    /// Doubling backoff starting at `backoff_base`, capped at `backoff_max`.
    pub fn backoff(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(2)
            .factor(self.backoff_base.as_millis().max(2) as u64 / 2)
            .max_delay(self.backoff_max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

/// Runs `op` until it succeeds or the retry budget is spent. Each attempt is
/// raced against the policy timeout. The attempt counter passed to `op`
/// starts at 0.
pub async fn retry_with_timeout<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut backoff = policy.backoff();
    let mut attempt: u32 = 0;
    loop {
        let message = match timeout(policy.attempt_timeout, op(attempt)).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {:?}", policy.attempt_timeout),
        };

        attempt += 1;
        if attempt > policy.max_retries {
            return Err(ProviderError::transient(
                format!("{label}: {message}"),
                attempt,
            ));
        }
        warn!("{label} attempt {attempt} failed ({message}), retrying");
        if let Some(delay) = backoff.next() {
            sleep(delay).await;
        }
    }
}

/// Recovery policy for "indexing not caught up" responses: retry the same
/// page against an earlier block instead of burning the budget on a block
/// the indexer does not have yet.
#[derive(Debug, Clone)]
pub struct IndexingLagPolicy {
    pub block_rollback: u64,
}

impl IndexingLagPolicy {
    pub fn new(block_rollback: u64) -> Self {
        Self { block_rollback }
    }

    /// Matches the error shapes indexing services use to report lag.
    pub fn is_lag_error(message: &str) -> bool {
        let lower = message.to_lowercase();
        lower.contains("indexed up to")
            || lower.contains("has only indexed")
            || (lower.contains("block") && lower.contains("behind"))
    }

    pub fn adjust_block(&self, block_number: u64) -> u64 {
        block_number.saturating_sub(self.block_rollback)
    }
}
