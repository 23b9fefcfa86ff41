//! Bounded retry policy applied around every adapter call.

use std::future::Future;
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use tracing::warn;

use crate::error::SourceError;

/// Fixed-delay retry: `max_retries` extra attempts after the first failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    /// One retry after three seconds.
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Never retry.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    fn backoff(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_retries)
    }

    /// Run `operation`, retrying only [`SourceError::Unavailable`] failures.
    pub async fn run<T, F, Fut>(&self, label: &str, operation: F) -> Result<T, SourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        operation
            .retry(self.backoff())
            .when(SourceError::is_retryable)
            .notify(|err: &SourceError, delay: Duration| {
                warn!(
                    source = %label,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Source call failed, retrying in {:?}",
                    delay
                );
            })
            .await
    }
}
