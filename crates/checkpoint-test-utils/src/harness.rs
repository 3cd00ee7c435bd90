// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for building verification gateways with mock collaborators.
//!
//! The harness owns one [`MockFetcher`] and one [`CacheAsideStore`] and
//! hands out gateways for any domain wired to both.

use std::sync::Arc;
use std::time::Duration;

use checkpoint_cache::{CacheAsideStore, CacheSettings, MemoryCacheBackend};
use checkpoint_config::DomainConfig;
use checkpoint_core::{CheckpointError, Fetcher};
use checkpoint_gateway::{VerificationDomain, VerificationGateway};

use crate::failing_cache::FailingCacheBackend;
use crate::mock_fetcher::MockFetcher;

/// Which cache the harness puts behind its gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// A working in-process cache.
    #[default]
    Memory,
    /// A backend that errors on every call, so the store starts degraded.
    Failing,
    /// No backend at all.
    Disabled,
}

/// Collaborators shared by every gateway the harness builds.
pub struct TestHarness {
    pub fetcher: Arc<MockFetcher>,
    pub cache: Arc<CacheAsideStore>,
    pub config: DomainConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Build a gateway for `domain` over the harness fetcher and cache.
    pub fn gateway<D: VerificationDomain>(&self, domain: D) -> VerificationGateway<D> {
        let fetcher: Arc<dyn Fetcher<D::Query>> = self.fetcher.clone();
        VerificationGateway::new(domain, fetcher, self.cache.clone(), &self.config)
    }
}

/// Builder for [`TestHarness`].
///
/// Defaults favour fast tests: live checks enabled, millisecond backoff,
/// a five-failure breaker, and an in-memory cache.
pub struct TestHarnessBuilder {
    responses: Vec<Result<String, CheckpointError>>,
    default_body: Option<String>,
    fetch_delay: Option<Duration>,
    config: DomainConfig,
    cache_mode: CacheMode,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            default_body: None,
            fetch_delay: None,
            config: DomainConfig {
                enabled: true,
                endpoint: Some("http://source.test/check".to_string()),
                retry_attempts: 3,
                retry_delay_ms: 10,
                retry_max_delay_ms: 50,
                timeout_secs: 5,
                circuit_breaker_threshold: 5,
                circuit_breaker_reset_secs: 60,
                ..DomainConfig::with_fallback_message("check manually")
            },
            cache_mode: CacheMode::Memory,
        }
    }

    /// Queue scripted fetch results.
    pub fn with_responses(mut self, responses: Vec<Result<String, CheckpointError>>) -> Self {
        self.responses = responses;
        self
    }

    /// Body returned once the scripted queue is drained.
    pub fn with_default_body(mut self, body: impl Into<String>) -> Self {
        self.default_body = Some(body.into());
        self
    }

    /// Delay every fetch by `delay`.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Adjust the domain settings in place.
    pub fn configure(mut self, f: impl FnOnce(&mut DomainConfig)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn with_cache(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Build the harness, probing the cache backend.
    pub async fn build(self) -> TestHarness {
        let mut fetcher = MockFetcher::with_responses(self.responses);
        if let Some(body) = self.default_body {
            fetcher = fetcher.with_default_body(body);
        }
        if let Some(delay) = self.fetch_delay {
            fetcher = fetcher.with_delay(delay);
        }

        let settings = CacheSettings::default();
        let cache = match self.cache_mode {
            CacheMode::Memory => {
                CacheAsideStore::connect(Arc::new(MemoryCacheBackend::new(1_000)), settings).await
            }
            CacheMode::Failing => {
                CacheAsideStore::connect(Arc::new(FailingCacheBackend::new()), settings).await
            }
            CacheMode::Disabled => CacheAsideStore::disabled(settings),
        };

        TestHarness {
            fetcher: Arc::new(fetcher),
            cache: Arc::new(cache),
            config: self.config,
        }
    }
}
