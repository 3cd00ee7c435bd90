// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One resilient verification call, parametrized by domain.
//!
//! The flow is: validate, cache lookup, disabled check, concurrency permit,
//! circuit check, retried fetch + classify, cache write. Every failure after
//! validation becomes a labelled FALLBACK result; nothing past that point
//! returns an error to the caller.

use std::sync::Arc;
use std::time::Duration;

use checkpoint_cache::{CacheAsideStore, Lookup};
use checkpoint_config::DomainConfig;
use checkpoint_core::{
    CheckpointError, CircuitSnapshot, DomainKind, FallbackReason, Fetcher, ResultSource,
    VerificationQuery, canonical_key, key_fingerprint,
};
use checkpoint_resilience::{
    BackoffPolicy, CircuitBreaker, CircuitBreakerConfig, RetryError, RetryExecutor, RetryPolicy,
};
use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::{CheckedAtPolicy, VerificationDomain};
use crate::metrics;
use crate::result::VerificationResult;

/// The per-domain knobs the gateway reads on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub enabled: bool,
    pub cache_ttl: Duration,
    pub fallback_message: String,
}

impl From<&DomainConfig> for GatewaySettings {
    fn from(config: &DomainConfig) -> Self {
        Self {
            enabled: config.enabled,
            cache_ttl: config.cache_ttl(),
            fallback_message: config.fallback_message.clone(),
        }
    }
}

/// Fronts one external dependency for one domain.
pub struct VerificationGateway<D: VerificationDomain> {
    domain: D,
    fetcher: Arc<dyn Fetcher<D::Query>>,
    cache: Arc<CacheAsideStore>,
    breaker: Arc<CircuitBreaker>,
    executor: RetryExecutor,
    settings: GatewaySettings,
    permits: Option<Arc<Semaphore>>,
}

impl<D: VerificationDomain> std::fmt::Debug for VerificationGateway<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationGateway")
            .field("domain", &self.domain.kind())
            .field("breaker", &self.breaker.snapshot())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<D: VerificationDomain> VerificationGateway<D> {
    /// Build a gateway with its own circuit breaker.
    pub fn new(
        domain: D,
        fetcher: Arc<dyn Fetcher<D::Query>>,
        cache: Arc<CacheAsideStore>,
        config: &DomainConfig,
    ) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(
            domain.kind().to_string(),
            CircuitBreakerConfig {
                threshold: config.circuit_breaker_threshold,
                reset_timeout: config.circuit_breaker_reset(),
            },
        ));
        let executor = RetryExecutor::new(RetryPolicy {
            max_attempts: config.retry_attempts,
            backoff: BackoffPolicy::new(config.retry_delay(), config.retry_max_delay()),
            attempt_timeout: Some(config.timeout()),
            deadline: config.deadline(),
        });

        Self {
            domain,
            fetcher,
            cache,
            breaker,
            executor,
            settings: GatewaySettings::from(config),
            permits: config.max_concurrency.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Share a breaker with other gateways fronting the same dependency.
    pub fn with_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn kind(&self) -> DomainKind {
        self.domain.kind()
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn circuit_state(&self) -> CircuitSnapshot {
        self.breaker.snapshot()
    }

    /// Verify `query` with a token nobody cancels.
    pub async fn check(
        &self,
        query: &D::Query,
    ) -> Result<VerificationResult<D::Status>, CheckpointError> {
        self.check_with_cancel(query, &CancellationToken::new())
            .await
    }

    /// Verify `query`, abandoning network and cache work once `cancel` fires.
    ///
    /// Only query validation fails; every other problem is reported through
    /// a FALLBACK result.
    pub async fn check_with_cancel(
        &self,
        query: &D::Query,
        cancel: &CancellationToken,
    ) -> Result<VerificationResult<D::Status>, CheckpointError> {
        query.validate()?;

        let kind = self.kind();
        let key = canonical_key(kind, query);
        let started = Instant::now();

        let lookup = self
            .cache
            .wrap(&key, Some(self.settings.cache_ttl), cancel, || {
                self.resolve(query, cancel)
            })
            .await;

        let result = match lookup {
            Ok(Lookup::Hit(cached)) => {
                debug!(domain = %kind, key = %key_fingerprint(&key), "cache hit");
                self.serve_cached(cached)
            }
            Ok(Lookup::Miss(live)) => live,
            Err(degraded) => degraded,
        };

        metrics::record_verification(kind, result.source, started.elapsed());
        Ok(result)
    }

    /// Everything after the cache lookup. `Err` carries a degraded result
    /// that must not be cached.
    async fn resolve(
        &self,
        query: &D::Query,
        cancel: &CancellationToken,
    ) -> Result<VerificationResult<D::Status>, VerificationResult<D::Status>> {
        let kind = self.kind();

        if !self.settings.enabled {
            debug!(domain = %kind, "live checks disabled, returning guidance");
            return Err(self.degraded(FallbackReason::Disabled, None));
        }

        let _permit = match &self.permits {
            Some(permits) => tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(self.degraded(
                        FallbackReason::Cancelled,
                        Some("verification cancelled".to_string()),
                    ));
                }
                permit = permits.acquire() => permit.ok(),
            },
            None => None,
        };

        let Some(admission) = self.breaker.admit() else {
            warn!(domain = %kind, "circuit open, returning degraded result");
            metrics::record_circuit_rejection(kind);
            return Err(self.degraded(
                FallbackReason::CircuitOpen,
                Some("verification source temporarily unavailable (circuit open)".to_string()),
            ));
        };

        let fetcher = &self.fetcher;
        let domain = &self.domain;
        let outcome = self
            .executor
            .run(admission, cancel, move |attempt| async move {
                debug!(domain = %kind, attempt, "fetching from source");
                let raw = fetcher.fetch(query).await?;
                Ok(domain.interpret(&raw))
            })
            .await;

        match outcome {
            Ok(verdict) => Ok(VerificationResult::live(kind, verdict)),
            Err(RetryError::Exhausted { attempts, last }) => {
                warn!(domain = %kind, attempts, error = %last, "source unavailable, degrading");
                Err(self.degraded(
                    FallbackReason::RetriesExhausted,
                    Some(format!(
                        "verification source unavailable after {attempts} attempts"
                    )),
                ))
            }
            Err(RetryError::DeadlineExceeded { deadline }) => {
                warn!(domain = %kind, ?deadline, "verification deadline exceeded");
                Err(self.degraded(
                    FallbackReason::DeadlineExceeded,
                    Some(format!(
                        "verification did not complete within {}s",
                        deadline.as_secs()
                    )),
                ))
            }
            Err(RetryError::Cancelled) => {
                debug!(domain = %kind, "verification cancelled by caller");
                Err(self.degraded(
                    FallbackReason::Cancelled,
                    Some("verification cancelled".to_string()),
                ))
            }
            Err(RetryError::Permanent(e)) => {
                warn!(domain = %kind, error = %e, "source rejected the request");
                Err(self.degraded(
                    FallbackReason::Rejected,
                    Some("verification source rejected the request".to_string()),
                ))
            }
        }
    }

    fn serve_cached(
        &self,
        mut cached: VerificationResult<D::Status>,
    ) -> VerificationResult<D::Status> {
        cached.source = ResultSource::Cache;
        if self.domain.checked_at_policy() == CheckedAtPolicy::Refresh {
            cached.checked_at = Utc::now();
        }
        cached
    }

    fn degraded(
        &self,
        why: FallbackReason,
        error: Option<String>,
    ) -> VerificationResult<D::Status> {
        VerificationResult::fallback(
            self.kind(),
            self.domain.degraded_status(),
            why,
            self.settings.fallback_message.clone(),
            error,
        )
    }
}
