// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value backend trait behind the cache-aside store.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CheckpointError;

/// A string key/value store with per-entry expiry.
///
/// Backends report failures honestly; swallowing them is the job of the
/// cache-aside store wrapping the backend.
#[async_trait]
pub trait CacheBackend: Send + Sync + 'static {
    /// Human-readable backend name used in logs.
    fn name(&self) -> &str;

    /// Read a live (non-expired) entry.
    async fn get(&self, key: &str) -> Result<Option<String>, CheckpointError>;

    /// Insert or replace an entry that expires after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CheckpointError>;

    /// Remove an entry. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CheckpointError>;

    /// Drop every expired entry and return how many were removed.
    ///
    /// Backends that never hold expired entries keep the default.
    async fn purge_expired(&self) -> Result<usize, CheckpointError> {
        Ok(0)
    }
}
