// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A cache backend that is always down.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use checkpoint_core::{CacheBackend, CheckpointError};

/// Every operation fails with [`CheckpointError::Cache`] and is counted.
#[derive(Debug, Default)]
pub struct FailingCacheBackend {
    calls: AtomicUsize,
}

impl FailingCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations attempted against the backend, probe included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> CheckpointError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CheckpointError::Cache {
            message: "connection refused".to_string(),
            source: None,
        }
    }
}

#[async_trait]
impl CacheBackend for FailingCacheBackend {
    fn name(&self) -> &str {
        "failing"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CheckpointError> {
        Err(self.fail())
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CheckpointError> {
        Err(self.fail())
    }

    async fn delete(&self, _key: &str) -> Result<(), CheckpointError> {
        Err(self.fail())
    }
}
