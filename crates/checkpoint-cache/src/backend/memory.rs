// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process cache backend. Entries are lost on restart.

use std::time::Duration;

use async_trait::async_trait;
use checkpoint_core::{CacheBackend, CheckpointError, key_fingerprint};
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct Slot {
    value: String,
    expires_at: Instant,
}

/// Concurrent map with per-entry expiry and a soft size limit.
#[derive(Debug)]
pub struct MemoryCacheBackend {
    entries: DashMap<String, Slot>,
    max_entries: usize,
}

impl MemoryCacheBackend {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored entries, expired ones included until next touched.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&self) {
        let now = Instant::now();
        self.entries.retain(|_, slot| slot.expires_at > now);
        if self.entries.len() < self.max_entries {
            return;
        }

        let soonest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().expires_at)
            .map(|e| e.key().clone());
        if let Some(key) = soonest {
            debug!(
                key = %key_fingerprint(&key),
                "memory cache full, evicting soonest-expiring entry"
            );
            self.entries.remove(&key);
        }
    }
}

impl Default for MemoryCacheBackend {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CheckpointError> {
        let now = Instant::now();
        let hit = match self.entries.get(key) {
            Some(slot) if slot.expires_at > now => return Ok(Some(slot.value.clone())),
            Some(_) => true,
            None => false,
        };
        if hit {
            self.entries.remove_if(key, |_, slot| slot.expires_at <= now);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CheckpointError> {
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.make_room();
        }
        self.entries.insert(
            key.to_string(),
            Slot {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CheckpointError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, CheckpointError> {
        let before = self.entries.len();
        let now = Instant::now();
        self.entries.retain(|_, slot| slot.expires_at > now);
        Ok(before.saturating_sub(self.entries.len()))
    }
}
