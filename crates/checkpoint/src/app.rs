// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires configuration into long-lived collaborators.
//!
//! One cache-aside store is shared by every gateway; each gateway owns its
//! circuit breaker. Domains without an endpoint get a fetcher that always
//! fails, which only matters if such a domain is ever enabled.

use std::sync::Arc;

use async_trait::async_trait;
use checkpoint_cache::{CacheAsideStore, CacheSettings, MemoryCacheBackend, SqliteCacheBackend};
use checkpoint_config::{
    CacheBackendKind, CacheConfig, DomainConfig, DomainsConfig, FetchMethod, LegislationConfig,
};
use checkpoint_core::{
    CheckpointError, CircuitSnapshot, DomainKind, EventPublisher, Fetcher, VerificationQuery,
};
use checkpoint_fetch::HttpFetcher;
use checkpoint_gateway::{
    EntryBanDomain, InnDomain, PatentDomain, ResidencePermitDomain, VerificationDomain,
    VerificationGateway, WorkPermitDomain,
};
use checkpoint_watch::{LawSource, LegislationWatcher, PageFetcher};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Build the cache-aside store described by `[cache]`.
///
/// A SQLite file that cannot be opened leaves the store degraded rather
/// than failing startup.
pub async fn build_cache(config: &CacheConfig) -> CacheAsideStore {
    let settings = CacheSettings {
        default_ttl: config.default_ttl(),
        operation_timeout: config.operation_timeout(),
    };

    match config.backend {
        CacheBackendKind::Memory => {
            let backend = Arc::new(MemoryCacheBackend::new(config.max_entries));
            CacheAsideStore::connect(backend, settings).await
        }
        CacheBackendKind::Sqlite => match SqliteCacheBackend::open(&config.sqlite_path).await {
            Ok(backend) => CacheAsideStore::connect(Arc::new(backend), settings).await,
            Err(e) => {
                warn!(
                    path = %config.sqlite_path,
                    error = %e,
                    "cannot open SQLite cache, running without cache"
                );
                CacheAsideStore::disabled(settings)
            }
        },
        CacheBackendKind::None => {
            info!("cache disabled by configuration");
            CacheAsideStore::disabled(settings)
        }
    }
}

/// Fetcher for a domain with no configured endpoint.
struct UnconfiguredFetcher(DomainKind);

#[async_trait]
impl<Q: ?Sized + Sync + 'static> Fetcher<Q> for UnconfiguredFetcher {
    async fn fetch(&self, _query: &Q) -> Result<String, CheckpointError> {
        Err(CheckpointError::Config(format!(
            "no endpoint configured for {}",
            self.0
        )))
    }
}

fn fetcher_for<Q: VerificationQuery + 'static>(
    kind: DomainKind,
    config: &DomainConfig,
) -> Result<Arc<dyn Fetcher<Q>>, CheckpointError> {
    if config.endpoint.is_none() {
        return Ok(Arc::new(UnconfiguredFetcher(kind)));
    }
    Ok(Arc::new(HttpFetcher::from_config(config)?))
}

fn gateway<D: VerificationDomain>(
    domain: D,
    config: &DomainConfig,
    cache: &Arc<CacheAsideStore>,
) -> Result<VerificationGateway<D>, CheckpointError> {
    let fetcher = fetcher_for::<D::Query>(domain.kind(), config)?;
    Ok(VerificationGateway::new(domain, fetcher, cache.clone(), config))
}

/// The five status-check gateways.
#[derive(Debug)]
pub struct Gateways {
    pub entry_ban: VerificationGateway<EntryBanDomain>,
    pub inn: VerificationGateway<InnDomain>,
    pub patent: VerificationGateway<PatentDomain>,
    pub work_permit: VerificationGateway<WorkPermitDomain>,
    pub residence_permit: VerificationGateway<ResidencePermitDomain>,
}

impl Gateways {
    /// Build HTTP-backed gateways over a shared cache.
    pub fn from_config(
        domains: &DomainsConfig,
        cache: &Arc<CacheAsideStore>,
    ) -> Result<Self, CheckpointError> {
        let gateways = Self {
            entry_ban: gateway(EntryBanDomain::new(), &domains.entry_ban, cache)?,
            inn: gateway(InnDomain::new(), &domains.inn, cache)?,
            patent: gateway(PatentDomain::patent(), &domains.patent, cache)?,
            work_permit: gateway(WorkPermitDomain::work_permit(), &domains.work_permit, cache)?,
            residence_permit: gateway(
                ResidencePermitDomain::residence_permit(),
                &domains.residence_permit,
                cache,
            )?,
        };

        for (name, config) in domains.iter() {
            info!(domain = name, enabled = config.enabled, "verification domain configured");
        }
        Ok(gateways)
    }

    /// Breaker snapshots in a fixed domain order.
    pub fn circuits(&self) -> Vec<(DomainKind, CircuitSnapshot)> {
        vec![
            (self.entry_ban.kind(), self.entry_ban.circuit_state()),
            (self.inn.kind(), self.inn.circuit_state()),
            (self.patent.kind(), self.patent.circuit_state()),
            (self.work_permit.kind(), self.work_permit.circuit_state()),
            (self.residence_permit.kind(), self.residence_permit.circuit_state()),
        ]
    }

    /// Decode `body` as the domain's query, verify it, and encode the result.
    ///
    /// Only validation problems (including an undecodable body) come back as
    /// errors; every source failure is already a FALLBACK result.
    pub async fn verify_json(
        &self,
        kind: DomainKind,
        body: serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, CheckpointError> {
        match kind {
            DomainKind::EntryBan => verify_with(&self.entry_ban, body, cancel).await,
            DomainKind::Inn => verify_with(&self.inn, body, cancel).await,
            DomainKind::Patent => verify_with(&self.patent, body, cancel).await,
            DomainKind::WorkPermit => verify_with(&self.work_permit, body, cancel).await,
            DomainKind::ResidencePermit => {
                verify_with(&self.residence_permit, body, cancel).await
            }
            DomainKind::Legislation => Err(CheckpointError::validation(
                "domain",
                "legislation is watched, not verified on demand",
            )),
        }
    }
}

async fn verify_with<D>(
    gateway: &VerificationGateway<D>,
    body: serde_json::Value,
    cancel: &CancellationToken,
) -> Result<serde_json::Value, CheckpointError>
where
    D: VerificationDomain,
    D::Query: DeserializeOwned,
{
    let query: D::Query = serde_json::from_value(body)
        .map_err(|e| CheckpointError::validation("body", e.to_string()))?;
    let result = gateway.check_with_cancel(&query, cancel).await?;
    Ok(serde_json::to_value(result)?)
}

/// Build the legislation watcher over HTTP page fetches.
pub fn build_watcher(
    config: &LegislationConfig,
    publisher: Arc<dyn EventPublisher>,
) -> Result<LegislationWatcher, CheckpointError> {
    // Pages are fetched by URL; the fetcher's own endpoint is never used.
    let pages = HttpFetcher::new(String::new(), FetchMethod::Get, config.timeout())?;
    let fetcher: Arc<dyn Fetcher<LawSource>> = Arc::new(PageFetcher(pages));
    Ok(LegislationWatcher::new(config, fetcher, publisher))
}
