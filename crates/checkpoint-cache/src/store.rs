// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The cache-aside store.
//!
//! No method on [`CacheAsideStore`] returns an error. Whatever the backend
//! does (fails, hangs, returns garbage) the caller sees a miss or a no-op.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use checkpoint_core::{CacheBackend, CheckpointError, key_fingerprint};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const PROBE_KEY: &str = "checkpoint:probe";
const PROBE_VALUE: &str = "ok";

/// Tunables for a [`CacheAsideStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// TTL used when a caller passes none.
    pub default_ttl: Duration,
    /// Upper bound on every backend call.
    pub operation_timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3600),
            operation_timeout: Duration::from_millis(500),
        }
    }
}

/// What actually sits in the backend: the value and when it was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: DateTime<Utc>,
}

/// Result of [`CacheAsideStore::wrap`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Served from the cache.
    Hit(T),
    /// Computed during this call.
    Miss(T),
}

impl<T> Lookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Lookup::Hit(v) | Lookup::Miss(v) => v,
        }
    }
}

/// Error-swallowing facade over a [`CacheBackend`].
pub struct CacheAsideStore {
    backend: Option<Arc<dyn CacheBackend>>,
    available: AtomicBool,
    settings: CacheSettings,
}

impl std::fmt::Debug for CacheAsideStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAsideStore")
            .field("backend", &self.backend_name())
            .field("available", &self.is_available())
            .field("settings", &self.settings)
            .finish()
    }
}

impl CacheAsideStore {
    /// Wrap `backend` and run the availability probe once.
    pub async fn connect(backend: Arc<dyn CacheBackend>, settings: CacheSettings) -> Self {
        let store = Self {
            backend: Some(backend),
            available: AtomicBool::new(false),
            settings,
        };
        store.reprobe().await;
        store
    }

    /// A store with no backend: every operation is an immediate no-op.
    pub fn disabled(settings: CacheSettings) -> Self {
        Self {
            backend: None,
            available: AtomicBool::new(false),
            settings,
        }
    }

    /// Whether the last probe succeeded.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.name())
    }

    pub fn settings(&self) -> CacheSettings {
        self.settings
    }

    /// Re-run the write/read/delete probe and update availability.
    ///
    /// Only called at construction and on explicit request; a backend that
    /// recovers later stays unused until someone calls this.
    pub async fn reprobe(&self) -> bool {
        let Some(backend) = self.backend.as_deref() else {
            return false;
        };

        let ok = match self.probe(backend).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    backend = backend.name(),
                    error = %e,
                    "cache probe failed, running without cache"
                );
                false
            }
        };

        let was = self.available.swap(ok, Ordering::AcqRel);
        if ok && !was {
            info!(backend = backend.name(), "cache available");
        }
        ok
    }

    async fn probe(&self, backend: &dyn CacheBackend) -> Result<(), CheckpointError> {
        let ttl = Duration::from_secs(60);
        self.bounded(backend.set(PROBE_KEY, PROBE_VALUE.to_string(), ttl))
            .await?;
        let read = self.bounded(backend.get(PROBE_KEY)).await?;
        if read.as_deref() != Some(PROBE_VALUE) {
            return Err(CheckpointError::Cache {
                message: "probe value did not read back".into(),
                source: None,
            });
        }
        self.bounded(backend.delete(PROBE_KEY)).await
    }

    /// Read and decode an entry. Errors of any kind read as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let backend = self.live_backend()?;
        let raw = match self.bounded(backend.get(key)).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %key_fingerprint(key), error = %e, "cache get failed");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry<T>>(&raw) {
            Ok(entry) => {
                debug!(
                    key = %key_fingerprint(key),
                    age_secs = (Utc::now() - entry.stored_at).num_seconds(),
                    "cache hit"
                );
                Some(entry.value)
            }
            Err(e) => {
                warn!(
                    key = %key_fingerprint(key),
                    error = %e,
                    "discarding undecodable cache entry"
                );
                self.delete(key).await;
                None
            }
        }
    }

    /// Encode and store an entry. Failures are logged and dropped.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let Some(backend) = self.live_backend() else {
            return;
        };
        let entry = CacheEntry {
            value,
            stored_at: Utc::now(),
        };
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    key = %key_fingerprint(key),
                    error = %e,
                    "cache entry not serializable"
                );
                return;
            }
        };
        let ttl = ttl.unwrap_or(self.settings.default_ttl);
        if let Err(e) = self.bounded(backend.set(key, raw, ttl)).await {
            warn!(key = %key_fingerprint(key), error = %e, "cache set failed");
        }
    }

    /// Remove an entry. Failures are logged and dropped.
    pub async fn delete(&self, key: &str) {
        let Some(backend) = self.live_backend() else {
            return;
        };
        if let Err(e) = self.bounded(backend.delete(key)).await {
            warn!(key = %key_fingerprint(key), error = %e, "cache delete failed");
        }
    }

    /// get, then on a miss compute, then set.
    ///
    /// Only `Ok` values are written back; `Err` passes through untouched so
    /// degraded results never poison the cache. Cache operations are skipped
    /// once `cancel` fires.
    pub async fn wrap<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
        compute: F,
    ) -> Result<Lookup<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !cancel.is_cancelled()
            && let Some(hit) = self.get::<T>(key).await
        {
            return Ok(Lookup::Hit(hit));
        }

        let value = compute().await?;

        if !cancel.is_cancelled() {
            self.set(key, &value, ttl).await;
        }
        Ok(Lookup::Miss(value))
    }

    /// Drop expired entries from the backend. Failures are logged and
    /// count as nothing removed.
    pub async fn purge_expired(&self) -> usize {
        let Some(backend) = self.live_backend() else {
            return 0;
        };
        match self.bounded(backend.purge_expired()).await {
            Ok(removed) => {
                debug!(backend = backend.name(), removed, "expired cache entries purged");
                removed
            }
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "cache purge failed");
                0
            }
        }
    }

    /// Purge expired entries every `every` until `cancel` fires. The first
    /// purge runs one period after start.
    pub async fn run_purge(&self, every: Duration, cancel: CancellationToken) {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.purge_expired().await;
                }
                _ = cancel.cancelled() => {
                    debug!("cache purge loop stopped");
                    break;
                }
            }
        }
    }

    fn live_backend(&self) -> Option<&dyn CacheBackend> {
        if !self.is_available() {
            return None;
        }
        self.backend.as_deref()
    }

    async fn bounded<R>(
        &self,
        fut: impl Future<Output = Result<R, CheckpointError>>,
    ) -> Result<R, CheckpointError> {
        let duration = self.settings.operation_timeout;
        tokio::time::timeout(duration, fut)
            .await
            .map_err(|_| CheckpointError::Timeout { duration })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryCacheBackend;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU32;

    /// Backend that fails every call, or hangs when `hang` is set.
    struct BrokenBackend {
        hang: bool,
        calls: AtomicU32,
    }

    impl BrokenBackend {
        fn new(hang: bool) -> Arc<Self> {
            Arc::new(Self {
                hang,
                calls: AtomicU32::new(0),
            })
        }

        async fn fail<R>(&self) -> Result<R, CheckpointError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            Err(CheckpointError::Cache {
                message: "connection refused".into(),
                source: None,
            })
        }
    }

    #[async_trait]
    impl CacheBackend for BrokenBackend {
        fn name(&self) -> &str {
            "broken"
        }
        async fn get(&self, _key: &str) -> Result<Option<String>, CheckpointError> {
            self.fail().await
        }
        async fn set(&self, _: &str, _: String, _: Duration) -> Result<(), CheckpointError> {
            self.fail().await
        }
        async fn delete(&self, _key: &str) -> Result<(), CheckpointError> {
            self.fail().await
        }
    }

    async fn memory_store() -> CacheAsideStore {
        CacheAsideStore::connect(
            Arc::new(MemoryCacheBackend::default()),
            CacheSettings::default(),
        )
        .await
    }

    #[tokio::test]
    async fn healthy_backend_passes_probe() {
        let store = memory_store().await;
        assert!(store.is_available());
        assert_eq!(store.backend_name(), Some("memory"));
    }

    #[tokio::test]
    async fn typed_round_trip() {
        let store = memory_store().await;
        store.set("k", &vec![1u32, 2, 3], None).await;
        assert_eq!(store.get::<Vec<u32>>("k").await, Some(vec![1, 2, 3]));
        store.delete("k").await;
        assert_eq!(store.get::<Vec<u32>>("k").await, None);
    }

    #[tokio::test]
    async fn failed_probe_degrades_to_no_ops() {
        let backend = BrokenBackend::new(false);
        let store = CacheAsideStore::connect(backend.clone(), CacheSettings::default()).await;
        assert!(!store.is_available());

        let probe_calls = backend.calls.load(Ordering::SeqCst);
        store.set("k", &1u8, None).await;
        assert_eq!(store.get::<u8>("k").await, None);
        store.delete("k").await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), probe_calls);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_backend_is_bounded() {
        let store = CacheAsideStore::connect(BrokenBackend::new(true), CacheSettings::default()).await;
        assert!(!store.is_available());
    }

    #[tokio::test]
    async fn undecodable_entry_is_a_miss_and_removed() {
        let backend = Arc::new(MemoryCacheBackend::default());
        let store = CacheAsideStore::connect(backend.clone(), CacheSettings::default()).await;
        backend
            .set("k", "not json".into(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get::<u32>("k").await, None);
        assert_eq!(backend.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn logged_keys_are_fingerprinted() {
        let key = "entry_ban:иванов:иван:1990-05-01";
        let backend = Arc::new(MemoryCacheBackend::default());
        let store = CacheAsideStore::connect(backend.clone(), CacheSettings::default()).await;
        backend
            .set(key, "not json".into(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get::<u32>(key).await, None);

        assert!(logs_contain("discarding undecodable cache entry"));
        assert!(logs_contain(&key_fingerprint(key)));
        assert!(!logs_contain("иванов"));
    }

    #[tokio::test]
    async fn wrap_computes_once_then_hits() {
        let store = memory_store().await;
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);

        for expected_hit in [false, true] {
            let lookup = store
                .wrap("k", None, &cancel, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>("value".to_string())
                })
                .await
                .unwrap();
            assert_eq!(lookup.is_hit(), expected_hit);
            assert_eq!(lookup.into_inner(), "value");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn wrap_never_caches_errors() {
        let store = memory_store().await;
        let cancel = CancellationToken::new();

        let first: Result<Lookup<String>, &str> =
            store.wrap("k", None, &cancel, || async { Err("degraded") }).await;
        assert_eq!(first, Err("degraded"));

        let second = store
            .wrap("k", None, &cancel, || async { Ok::<_, &str>("live".to_string()) })
            .await
            .unwrap();
        assert_eq!(second, Lookup::Miss("live".to_string()));
    }

    #[tokio::test]
    async fn cancelled_wrap_skips_cache() {
        let store = memory_store().await;
        store.set("k", &"cached".to_string(), None).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let lookup = store
            .wrap("k", None, &cancel, || async { Ok::<_, ()>("fresh".to_string()) })
            .await
            .unwrap();
        assert_eq!(lookup, Lookup::Miss("fresh".to_string()));
        assert_eq!(store.get::<String>("k").await.as_deref(), Some("cached"));
    }

    #[tokio::test(start_paused = true)]
    async fn purge_loop_removes_expired_entries_until_cancelled() {
        let backend = Arc::new(MemoryCacheBackend::default());
        let store = Arc::new(
            CacheAsideStore::connect(backend.clone(), CacheSettings::default()).await,
        );
        store.set("short", &1u8, Some(Duration::from_secs(5))).await;
        store.set("long", &2u8, Some(Duration::from_secs(500))).await;

        let cancel = CancellationToken::new();
        let task = {
            let store = store.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { store.run_purge(Duration::from_secs(60), cancel).await })
        };

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(backend.len(), 1);
        assert_eq!(store.get::<u8>("long").await, Some(2));

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn purge_on_degraded_store_is_a_no_op() {
        let backend = BrokenBackend::new(false);
        let store = CacheAsideStore::connect(backend.clone(), CacheSettings::default()).await;
        let calls = backend.calls.load(Ordering::SeqCst);

        assert_eq!(store.purge_expired().await, 0);
        assert_eq!(backend.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn disabled_store_is_inert() {
        let store = CacheAsideStore::disabled(CacheSettings::default());
        assert!(!store.is_available());
        assert!(!store.reprobe().await);
        store.set("k", &1u8, None).await;
        assert_eq!(store.get::<u8>("k").await, None);
    }

    proptest::proptest! {
        #[test]
        fn never_raises_for_any_key(key in "\\PC{0,64}", value in proptest::num::i64::ANY) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            rt.block_on(async {
                let store = CacheAsideStore::connect(BrokenBackend::new(false), CacheSettings::default()).await;
                store.set(&key, &value, None).await;
                assert_eq!(store.get::<i64>(&key).await, None);
                store.delete(&key).await;

                let healthy = memory_store().await;
                healthy.set(&key, &value, None).await;
                assert_eq!(healthy.get::<i64>(&key).await, Some(value));
            });
        }
    }
}
