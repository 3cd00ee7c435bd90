// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted fetcher for deterministic gateway and watcher tests.
//!
//! `MockFetcher` implements `Fetcher<Q>` for every query type, so one
//! instance can stand in for any external source.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use checkpoint_core::{CheckpointError, Fetcher};

/// A fetcher that answers from a FIFO queue of scripted results.
///
/// When the queue is empty the default body is returned, or a transport
/// error if no default is set.
pub struct MockFetcher {
    responses: Arc<Mutex<VecDeque<Result<String, CheckpointError>>>>,
    default_body: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockFetcher {
    /// Create a mock fetcher with an empty queue and no default body.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            default_body: None,
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Create a mock fetcher pre-loaded with the given results.
    pub fn with_responses(responses: Vec<Result<String, CheckpointError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Self::new()
        }
    }

    /// Answer every call with `body` once the queue is drained.
    pub fn with_default_body(mut self, body: impl Into<String>) -> Self {
        self.default_body = Some(body.into());
        self
    }

    /// Sleep for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Append a successful body to the queue.
    pub async fn add_body(&self, body: impl Into<String>) {
        self.responses.lock().await.push_back(Ok(body.into()));
    }

    /// Append a failure to the queue.
    pub async fn add_error(&self, error: CheckpointError) {
        self.responses.lock().await.push_back(Err(error));
    }

    /// Number of `fetch` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were ever running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn next_response(&self) -> Result<String, CheckpointError> {
        match self.responses.lock().await.pop_front() {
            Some(scripted) => scripted,
            None => self
                .default_body
                .clone()
                .ok_or_else(|| CheckpointError::transport("mock fetcher has no scripted response")),
        }
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<Q: ?Sized + Sync + 'static> Fetcher<Q> for MockFetcher {
    async fn fetch(&self, _query: &Q) -> Result<String, CheckpointError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let response = self.next_response().await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}
