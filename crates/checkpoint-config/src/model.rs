// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Checkpoint verification gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Checkpoint configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CheckpointConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP status/verification endpoint settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Cache-aside store settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-domain external verification settings.
    #[serde(default)]
    pub domains: DomainsConfig,

    /// Legislation-change watcher settings.
    #[serde(default)]
    pub legislation: LegislationConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in logs and health output.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "checkpoint".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3080
}

/// Which backend sits behind the cache-aside store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackendKind {
    /// In-process map. Lost on restart.
    Memory,
    /// SQLite file at `cache.sqlite_path`.
    Sqlite,
    /// No cache: the store starts in degraded mode.
    None,
}

/// Cache-aside store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Backend selection.
    #[serde(default = "default_cache_backend")]
    pub backend: CacheBackendKind,

    /// Path to the SQLite cache file (sqlite backend only).
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,

    /// TTL used when a caller does not pass one.
    #[serde(default = "default_cache_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Upper bound on any single backend operation.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    /// Entry limit for the memory backend.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// How often `serve` drops expired entries. 0 disables purging.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            sqlite_path: default_sqlite_path(),
            default_ttl_secs: default_cache_ttl_secs(),
            operation_timeout_ms: default_operation_timeout_ms(),
            max_entries: default_max_entries(),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// `None` when purging is switched off.
    pub fn purge_interval(&self) -> Option<Duration> {
        (self.purge_interval_secs > 0).then(|| Duration::from_secs(self.purge_interval_secs))
    }
}

fn default_cache_backend() -> CacheBackendKind {
    CacheBackendKind::Memory
}

fn default_sqlite_path() -> String {
    dirs::cache_dir()
        .map(|p| p.join("checkpoint").join("cache.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("checkpoint-cache.db"))
        .to_string_lossy()
        .to_string()
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_operation_timeout_ms() -> u64 {
    500
}

fn default_max_entries() -> usize {
    10_000
}

fn default_purge_interval_secs() -> u64 {
    600
}

/// HTTP method used to query an external source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FetchMethod {
    Get,
    Post,
}

/// Settings for one external dependency.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DomainConfig {
    /// Master switch. `false` returns guidance without touching the network.
    #[serde(default)]
    pub enabled: bool,

    /// Source endpoint. Required when `enabled` is true.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// How query fields are sent to the endpoint.
    #[serde(default = "default_method")]
    pub method: FetchMethod,

    /// Per-attempt timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts, including the first.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base backoff delay.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Backoff cap.
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,

    /// How long successful results stay cached.
    #[serde(default = "default_domain_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Consecutive failed calls that open the circuit.
    #[serde(default = "default_breaker_threshold")]
    pub circuit_breaker_threshold: u32,

    /// Cooldown before a probe is admitted.
    #[serde(default = "default_breaker_reset_secs")]
    pub circuit_breaker_reset_secs: u64,

    /// Concurrent live calls allowed against this dependency (`None` = unbounded).
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Overall deadline for one call across all attempts (`None` = none).
    #[serde(default)]
    pub deadline_secs: Option<u64>,

    /// Guidance pointing users to the official channel when live checks are off.
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            method: default_method(),
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            cache_ttl_secs: default_domain_cache_ttl_secs(),
            circuit_breaker_threshold: default_breaker_threshold(),
            circuit_breaker_reset_secs: default_breaker_reset_secs(),
            max_concurrency: None,
            deadline_secs: None,
            fallback_message: default_fallback_message(),
        }
    }
}

impl DomainConfig {
    /// Default settings with a domain-specific fallback message.
    pub fn with_fallback_message(message: &str) -> Self {
        Self {
            fallback_message: message.to_string(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn circuit_breaker_reset(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_reset_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

fn default_method() -> FetchMethod {
    FetchMethod::Get
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_retry_max_delay_ms() -> u64 {
    30_000
}

fn default_domain_cache_ttl_secs() -> u64 {
    86_400
}

fn default_breaker_threshold() -> u32 {
    5
}

fn default_breaker_reset_secs() -> u64 {
    60
}

fn default_fallback_message() -> String {
    "Онлайн-проверка временно недоступна. Воспользуйтесь официальным сервисом ГУВМ МВД России."
        .to_string()
}

/// Settings for every status-check domain.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DomainsConfig {
    #[serde(default = "default_entry_ban")]
    pub entry_ban: DomainConfig,

    #[serde(default = "default_inn")]
    pub inn: DomainConfig,

    #[serde(default = "default_patent")]
    pub patent: DomainConfig,

    #[serde(default = "default_work_permit")]
    pub work_permit: DomainConfig,

    #[serde(default = "default_residence_permit")]
    pub residence_permit: DomainConfig,
}

impl Default for DomainsConfig {
    fn default() -> Self {
        Self {
            entry_ban: default_entry_ban(),
            inn: default_inn(),
            patent: default_patent(),
            work_permit: default_work_permit(),
            residence_permit: default_residence_permit(),
        }
    }
}

impl DomainsConfig {
    /// Iterate `(section name, settings)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &DomainConfig)> {
        [
            ("entry_ban", &self.entry_ban),
            ("inn", &self.inn),
            ("patent", &self.patent),
            ("work_permit", &self.work_permit),
            ("residence_permit", &self.residence_permit),
        ]
        .into_iter()
    }
}

fn default_entry_ban() -> DomainConfig {
    DomainConfig::with_fallback_message(
        "Проверка запрета на въезд сейчас недоступна. Проверьте наличие запрета на официальном сайте ГУВМ МВД России.",
    )
}

fn default_inn() -> DomainConfig {
    DomainConfig {
        cache_ttl_secs: 7 * 86_400,
        ..DomainConfig::with_fallback_message(
            "Узнать ИНН можно на официальном сайте ФНС России: https://service.nalog.ru/inn.do",
        )
    }
}

fn default_patent() -> DomainConfig {
    DomainConfig::with_fallback_message(
        "Проверка патента сейчас недоступна. Проверьте действительность патента на официальном сайте ГУВМ МВД России.",
    )
}

fn default_work_permit() -> DomainConfig {
    DomainConfig::with_fallback_message(
        "Проверка разрешения на работу сейчас недоступна. Воспользуйтесь официальным сервисом ГУВМ МВД России.",
    )
}

fn default_residence_permit() -> DomainConfig {
    DomainConfig::with_fallback_message(
        "Проверка статуса ВНЖ/РВП сейчас недоступна. Обратитесь в территориальный орган МВД по месту подачи заявления.",
    )
}

/// Legislation-change watcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LegislationConfig {
    /// Enable the watcher worker.
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between polling rounds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Character-length delta (percent) above which a change is published.
    #[serde(default = "default_change_threshold_percent")]
    pub change_threshold_percent: f64,

    /// Maximum diff lines carried in a change event.
    #[serde(default = "default_diff_max_lines")]
    pub diff_max_lines: usize,

    /// Topic change events are published on.
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Per-attempt fetch timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total fetch attempts per source and round.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base backoff delay.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Consecutive failed rounds that open the circuit.
    #[serde(default = "default_breaker_threshold")]
    pub circuit_breaker_threshold: u32,

    /// Cooldown before a probe is admitted.
    #[serde(default = "default_breaker_reset_secs")]
    pub circuit_breaker_reset_secs: u64,

    /// Watched legal acts.
    #[serde(default)]
    pub sources: Vec<LawSourceConfig>,
}

impl Default for LegislationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            poll_interval_secs: default_poll_interval_secs(),
            change_threshold_percent: default_change_threshold_percent(),
            diff_max_lines: default_diff_max_lines(),
            topic: default_topic(),
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            circuit_breaker_threshold: default_breaker_threshold(),
            circuit_breaker_reset_secs: default_breaker_reset_secs(),
            sources: Vec::new(),
        }
    }
}

impl LegislationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn circuit_breaker_reset(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_reset_secs)
    }
}

fn default_poll_interval_secs() -> u64 {
    6 * 3600
}

fn default_change_threshold_percent() -> f64 {
    5.0
}

fn default_diff_max_lines() -> usize {
    50
}

fn default_topic() -> String {
    "legislation.changes".to_string()
}

/// One watched legal act.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LawSourceConfig {
    /// Stable identifier, e.g. `115-fz`.
    pub law_id: String,

    /// Human-readable title.
    pub title: String,

    /// Page holding the current text.
    pub url: String,
}
