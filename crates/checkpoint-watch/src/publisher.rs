// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process event publishing over a tokio broadcast channel.

use async_trait::async_trait;
use checkpoint_core::{CheckpointError, EventPublisher};
use tokio::sync::broadcast;
use tracing::debug;

/// A message as seen by subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Fans published events out to every live subscriber.
///
/// Publishing with no subscribers succeeds and drops the event; slow
/// subscribers lose the oldest events once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), CheckpointError> {
        let event = PublishedEvent {
            topic: topic.to_string(),
            payload,
        };
        match self.sender.send(event) {
            Ok(receivers) => debug!(topic, receivers, "event published"),
            Err(_) => debug!(topic, "event published with no subscribers"),
        }
        Ok(())
    }
}
