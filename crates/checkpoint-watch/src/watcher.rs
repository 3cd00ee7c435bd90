// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polls watched legal acts and publishes significant changes.
//!
//! Each poll fetches the page through the same breaker and retry discipline
//! the verification gateway uses, reduces it to text, and compares its hash
//! with the last snapshot. The first observation only records a baseline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use checkpoint_classify::strip_markup;
use checkpoint_config::{LawSourceConfig, LegislationConfig};
use checkpoint_core::{CheckpointError, CircuitSnapshot, EventPublisher, Fetcher};
use checkpoint_fetch::HttpFetcher;
use checkpoint_resilience::{
    BackoffPolicy, CircuitBreaker, CircuitBreakerConfig, RetryExecutor, RetryPolicy,
};
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::event::LegislationChangeEvent;
use crate::snapshot::{PageSnapshot, change_percentage, diff_summary};

/// One watched legal act.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LawSource {
    pub law_id: String,
    pub title: String,
    pub url: String,
}

impl From<&LawSourceConfig> for LawSource {
    fn from(config: &LawSourceConfig) -> Self {
        Self {
            law_id: config.law_id.clone(),
            title: config.title.clone(),
            url: config.url.clone(),
        }
    }
}

/// Fetches a law source's page by its URL.
#[derive(Debug, Clone)]
pub struct PageFetcher(pub HttpFetcher);

#[async_trait]
impl Fetcher<LawSource> for PageFetcher {
    async fn fetch(&self, source: &LawSource) -> Result<String, CheckpointError> {
        self.0.fetch_url(&source.url).await
    }
}

/// What one poll of one source did.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchOutcome {
    /// First observation; snapshot stored, nothing published.
    Baseline,
    Unchanged,
    /// Content changed below the threshold; the baseline moved silently.
    Minor { change_percentage: f64 },
    Published(LegislationChangeEvent),
    /// The change is real but could not be published; the old snapshot is
    /// kept so the next poll tries again.
    PublishFailed { error: String },
    /// The page could not be fetched.
    Unavailable { error: String },
    /// The source's circuit is open.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchSettings {
    pub topic: String,
    pub change_threshold_percent: f64,
    pub diff_max_lines: usize,
    pub poll_interval: Duration,
}

impl From<&LegislationConfig> for WatchSettings {
    fn from(config: &LegislationConfig) -> Self {
        Self {
            topic: config.topic.clone(),
            change_threshold_percent: config.change_threshold_percent,
            diff_max_lines: config.diff_max_lines,
            poll_interval: config.poll_interval(),
        }
    }
}

pub struct LegislationWatcher {
    sources: Vec<LawSource>,
    fetcher: Arc<dyn Fetcher<LawSource>>,
    publisher: Arc<dyn EventPublisher>,
    fetch_breaker: CircuitBreaker,
    publish_breaker: CircuitBreaker,
    executor: RetryExecutor,
    settings: WatchSettings,
    snapshots: DashMap<String, PageSnapshot>,
}

impl LegislationWatcher {
    pub fn new(
        config: &LegislationConfig,
        fetcher: Arc<dyn Fetcher<LawSource>>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let breaker_config = CircuitBreakerConfig {
            threshold: config.circuit_breaker_threshold,
            reset_timeout: config.circuit_breaker_reset(),
        };
        let executor = RetryExecutor::new(RetryPolicy {
            max_attempts: config.retry_attempts,
            backoff: BackoffPolicy::new(config.retry_delay(), BackoffPolicy::default().cap),
            attempt_timeout: Some(config.timeout()),
            deadline: None,
        });

        Self {
            sources: config.sources.iter().map(LawSource::from).collect(),
            fetcher,
            publisher,
            fetch_breaker: CircuitBreaker::new("legislation", breaker_config),
            publish_breaker: CircuitBreaker::new("legislation-publisher", breaker_config),
            executor,
            settings: WatchSettings::from(config),
            snapshots: DashMap::new(),
        }
    }

    pub fn sources(&self) -> &[LawSource] {
        &self.sources
    }

    pub fn settings(&self) -> &WatchSettings {
        &self.settings
    }

    /// Health of the fetch-side breaker.
    pub fn circuit_state(&self) -> CircuitSnapshot {
        self.fetch_breaker.snapshot()
    }

    /// The stored snapshot for `law_id`, if one has been taken.
    pub fn snapshot(&self, law_id: &str) -> Option<PageSnapshot> {
        self.snapshots.get(law_id).map(|s| s.clone())
    }

    /// Poll one source.
    pub async fn check_source(
        &self,
        source: &LawSource,
        cancel: &CancellationToken,
    ) -> WatchOutcome {
        let Some(admission) = self.fetch_breaker.admit() else {
            warn!(law_id = %source.law_id, "legislation circuit open, skipping poll");
            return WatchOutcome::Skipped;
        };

        let fetcher = &self.fetcher;
        let fetched = self
            .executor
            .run(admission, cancel, move |_| fetcher.fetch(source))
            .await;
        let raw = match fetched {
            Ok(raw) => raw,
            Err(e) => {
                warn!(law_id = %source.law_id, error = %e, "law source unavailable");
                return WatchOutcome::Unavailable {
                    error: e.to_string(),
                };
            }
        };

        let current = PageSnapshot::capture(strip_markup(&raw));
        let Some(previous) = self.snapshot(&source.law_id) else {
            info!(law_id = %source.law_id, length = current.length, "baseline recorded");
            self.snapshots.insert(source.law_id.clone(), current);
            return WatchOutcome::Baseline;
        };

        if previous.hash == current.hash {
            debug!(law_id = %source.law_id, "no change");
            return WatchOutcome::Unchanged;
        }

        let percentage = change_percentage(previous.length, current.length);
        if percentage <= self.settings.change_threshold_percent {
            debug!(law_id = %source.law_id, percentage, "minor change, baseline updated");
            self.snapshots.insert(source.law_id.clone(), current);
            return WatchOutcome::Minor {
                change_percentage: percentage,
            };
        }

        let event = LegislationChangeEvent::new(
            &source.law_id,
            &source.title,
            &source.url,
            percentage,
            diff_summary(&previous.text, &current.text, self.settings.diff_max_lines),
        );

        match self.publish(&event, cancel).await {
            Ok(()) => {
                info!(
                    law_id = %source.law_id,
                    change_percentage = event.change_percentage,
                    topic = %self.settings.topic,
                    "legislation change published"
                );
                self.snapshots.insert(source.law_id.clone(), current);
                WatchOutcome::Published(event)
            }
            Err(error) => {
                warn!(law_id = %source.law_id, %error, "failed to publish legislation change");
                WatchOutcome::PublishFailed { error }
            }
        }
    }

    /// Poll every source once, in configuration order.
    pub async fn run_once(&self, cancel: &CancellationToken) -> Vec<(String, WatchOutcome)> {
        let mut outcomes = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            if cancel.is_cancelled() {
                break;
            }
            let outcome = self.check_source(source, cancel).await;
            outcomes.push((source.law_id.clone(), outcome));
        }
        outcomes
    }

    /// Poll on a fixed interval until `cancel` fires. The first round runs
    /// immediately.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            sources = self.sources.len(),
            interval_secs = self.settings.poll_interval.as_secs(),
            "legislation watcher started"
        );
        let mut interval = tokio::time::interval(self.settings.poll_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let outcomes = self.run_once(&cancel).await;
                    let published = outcomes
                        .iter()
                        .filter(|(_, o)| matches!(o, WatchOutcome::Published(_)))
                        .count();
                    debug!(polled = outcomes.len(), published, "legislation poll complete");
                }
                _ = cancel.cancelled() => {
                    info!("legislation watcher shutting down");
                    break;
                }
            }
        }
    }

    async fn publish(
        &self,
        event: &LegislationChangeEvent,
        cancel: &CancellationToken,
    ) -> Result<(), String> {
        let payload = serde_json::to_value(event).map_err(|e| e.to_string())?;
        let Some(admission) = self.publish_breaker.admit() else {
            return Err("event bus circuit open".to_string());
        };
        let publisher = &self.publisher;
        let topic = self.settings.topic.as_str();

        self.executor
            .run(admission, cancel, move |_| {
                publisher.publish(topic, payload.clone())
            })
            .await
            .map_err(|e| e.to_string())
    }
}
