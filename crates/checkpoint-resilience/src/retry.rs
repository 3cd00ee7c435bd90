// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry loop that reports its terminal outcome to a circuit breaker.
//!
//! The executor holds no mutable state: independent calls run their own
//! loops concurrently and share only the breaker their admission came from.

use std::future::Future;
use std::time::Duration;

use checkpoint_core::CheckpointError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::backoff::BackoffPolicy;
use crate::circuit_breaker::Admission;

/// How many times to try and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub backoff: BackoffPolicy,
    /// Bound on a single attempt.
    pub attempt_timeout: Option<Duration>,
    /// Bound on the whole call, backoff waits included.
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffPolicy::default(),
            attempt_timeout: Some(Duration::from_secs(30)),
            deadline: None,
        }
    }
}

/// Why a retried call produced no value.
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    /// Every attempt failed with a transient error. The breaker saw one failure.
    #[error("all {attempts} attempts failed, last error: {last}")]
    Exhausted {
        attempts: u32,
        last: CheckpointError,
    },

    /// The caller's cancellation token fired.
    #[error("cancelled by caller")]
    Cancelled,

    /// The overall deadline elapsed.
    #[error("deadline of {deadline:?} exceeded")]
    DeadlineExceeded { deadline: Duration },

    /// An attempt failed in a way retrying cannot fix. Not counted against the breaker.
    #[error("permanent failure: {0}")]
    Permanent(CheckpointError),
}

/// Runs an operation under a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `op` receives the 1-indexed attempt number. The breaker hears exactly
    /// one verdict per call through `admission`: success on the first
    /// success, failure once when attempts or the deadline are exhausted.
    /// Cancellation and permanent errors drop the admission unsettled.
    pub async fn run<T, F, Fut>(
        &self,
        admission: Admission<'_>,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<T, RetryError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, CheckpointError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let deadline_at = self.policy.deadline.map(|d| Instant::now() + d);
        let breaker = admission.breaker();
        let mut attempt = 0;

        loop {
            attempt += 1;

            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(RetryError::Cancelled);
                }
                _ = sleep_until_deadline(deadline_at) => {
                    return Err(self.deadline_exceeded(admission));
                }
                result = self.attempt(op(attempt)) => result,
            };

            let error = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(breaker = breaker.name(), attempt, "succeeded after retry");
                    }
                    admission.succeeded();
                    return Ok(value);
                }
                Err(e) if !e.is_transient() => return Err(RetryError::Permanent(e)),
                Err(e) => e,
            };

            if attempt >= max_attempts {
                warn!(
                    breaker = breaker.name(),
                    attempts = attempt,
                    error = %error,
                    "retries exhausted"
                );
                admission.failed();
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: error,
                });
            }

            let delay = self.policy.backoff.delay(attempt);
            warn!(
                breaker = breaker.name(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "attempt failed, backing off"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(RetryError::Cancelled);
                }
                _ = sleep_until_deadline(deadline_at) => {
                    return Err(self.deadline_exceeded(admission));
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn attempt<T, Fut>(&self, fut: Fut) -> Result<T, CheckpointError>
    where
        Fut: Future<Output = Result<T, CheckpointError>>,
    {
        match self.policy.attempt_timeout {
            Some(duration) => tokio::time::timeout(duration, fut)
                .await
                .map_err(|_| CheckpointError::Timeout { duration })?,
            None => fut.await,
        }
    }

    fn deadline_exceeded(&self, admission: Admission<'_>) -> RetryError {
        let deadline = self.policy.deadline.unwrap_or_default();
        warn!(breaker = admission.breaker().name(), ?deadline, "deadline exceeded");
        admission.failed();
        RetryError::DeadlineExceeded { deadline }
    }
}

async fn sleep_until_deadline(deadline_at: Option<Instant>) {
    match deadline_at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
