// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event publisher that captures published events for assertions.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use checkpoint_core::{CheckpointError, EventPublisher};

/// Records every `(topic, payload)` it accepts.
///
/// Can be told to reject the next N publish calls to exercise retry paths.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, serde_json::Value)>>,
    failures_left: AtomicU32,
    attempts: AtomicU32,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the first `count` publish attempts with a publish error.
    pub fn failing_first(count: u32) -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            failures_left: AtomicU32::new(count),
            attempts: AtomicU32::new(0),
        }
    }

    /// Publish calls received, rejected ones included.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Snapshot of everything published so far.
    pub async fn published(&self) -> Vec<(String, serde_json::Value)> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), CheckpointError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(CheckpointError::Publish {
                message: "broker unavailable".to_string(),
                source: None,
            });
        }

        self.published
            .lock()
            .await
            .push((topic.to_string(), payload));
        Ok(())
    }
}
