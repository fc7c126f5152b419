use std::{fmt::Display, future::IntoFuture, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::future::try_join_all;
use indexer_observability::{record_rpc_call, record_rpc_endpoint_switch, record_rpc_retry};
use tokio::time::{Instant, sleep};

use crate::rpc_rate_limiter::RpcRateLimiter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn rpc_default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Delay before attempt `attempt + 1`: `base_delay * 2^(attempt - 1)`, capped at `max_delay`.
pub fn backoff_delay(policy: &RetryPolicy, attempt: usize) -> Duration {
    let base_ms = policy.base_delay.as_millis() as u64;
    let exponent = (attempt.saturating_sub(1)).min(20) as u32;
    let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(factor);
    let max_ms = policy.max_delay.as_millis() as u64;

    Duration::from_millis(delay_ms.min(max_ms))
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum GovernorError {
    #[error("{name} failed after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        name: String,
        attempts: usize,
        last_error: String,
    },
}

/// Hook the governor uses to move to another RPC endpoint after a failure.
#[async_trait]
pub trait EndpointSwitch: Send + Sync {
    /// Returns `true` if a different endpoint is now active.
    async fn attempt_switch(&self) -> bool;
}

/// Wraps every chain call with rate limiting, retries and endpoint rotation.
pub struct RpcGovernor {
    rate_limiter: RpcRateLimiter,
    retry_policy: RetryPolicy,
    endpoint_switch: Option<Arc<dyn EndpointSwitch>>,
}

impl RpcGovernor {
    pub fn new(rate_limiter: RpcRateLimiter, retry_policy: RetryPolicy) -> Self {
        Self {
            rate_limiter,
            retry_policy,
            endpoint_switch: None,
        }
    }

    pub fn with_endpoint_switch(mut self, endpoint_switch: Arc<dyn EndpointSwitch>) -> Self {
        self.endpoint_switch = Some(endpoint_switch);
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Run `operation` until it succeeds or `max_attempts` is reached.
    ///
    /// Every attempt first waits for the rate limiter. After failed attempts
    /// 1, 3, 5, ... that will be retried, the endpoint switch (if any) is
    /// asked to rotate. Between
    /// attempts the task sleeps for [`backoff_delay`].
    pub async fn run<T, E, F, O>(&self, name: &str, mut operation: F) -> Result<T, GovernorError>
    where
        E: Display,
        F: FnMut() -> O,
        O: IntoFuture<Output = Result<T, E>>,
    {
        let started = Instant::now();
        let max_attempts = self.retry_policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            self.rate_limiter.acquire().await;

            match operation().into_future().await {
                Ok(value) => {
                    record_rpc_call(name, "success", attempt, started.elapsed());
                    return Ok(value);
                }
                Err(err) => {
                    let last_error = err.to_string();

                    if attempt % 2 == 1 && attempt < max_attempts {
                        self.switch_endpoint(name, attempt).await;
                    }

                    if attempt >= max_attempts {
                        tracing::error!(
                            operation = name,
                            attempts = attempt,
                            error = %last_error,
                            "RPC call failed; giving up"
                        );
                        record_rpc_call(name, "error", attempt, started.elapsed());
                        return Err(GovernorError::MaxRetriesExceeded {
                            name: name.to_string(),
                            attempts: attempt,
                            last_error,
                        });
                    }

                    let delay = backoff_delay(&self.retry_policy, attempt);
                    tracing::warn!(
                        operation = name,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis(),
                        error = %last_error,
                        "RPC call failed; retrying"
                    );
                    record_rpc_retry(name);
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Run `operations` in chunks of `batch_size`, each chunk concurrently.
    ///
    /// Results keep submission order. The first operation that exhausts its
    /// retries fails the whole batch; later chunks are not started.
    pub async fn run_batch<T, E, F, O>(
        &self,
        name: &str,
        operations: Vec<F>,
        batch_size: usize,
    ) -> Result<Vec<T>, GovernorError>
    where
        E: Display,
        F: FnMut() -> O,
        O: IntoFuture<Output = Result<T, E>>,
    {
        let batch_size = batch_size.max(1);
        let mut results = Vec::with_capacity(operations.len());
        let mut pending = operations.into_iter().enumerate().peekable();

        while pending.peek().is_some() {
            let chunk = pending.by_ref().take(batch_size).map(|(index, operation)| {
                let label = format!("{name}[{index}]");
                async move { self.run(&label, operation).await }
            });
            results.extend(try_join_all(chunk).await?);
        }

        Ok(results)
    }

    async fn switch_endpoint(&self, name: &str, attempt: usize) {
        let Some(endpoint_switch) = &self.endpoint_switch else {
            return;
        };

        let switched = endpoint_switch.attempt_switch().await;
        record_rpc_endpoint_switch(switched);
        if switched {
            tracing::info!(
                operation = name,
                attempt,
                "Switched RPC endpoint after failed attempt"
            );
        }
    }
}
