// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message bus publishing trait.

use async_trait::async_trait;

use crate::error::CheckpointError;

/// Publishes structured events onto a topic-based message bus.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// Publish `payload` on `topic`.
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), CheckpointError>;
}
