// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite cache backend.
//!
//! All statements run on tokio-rusqlite's single background thread.
//! Expiry is stored as Unix milliseconds and filtered at read time.

use std::time::Duration;

use async_trait::async_trait;
use checkpoint_core::{CacheBackend, CheckpointError};
use rusqlite::{OptionalExtension, params};
use tracing::debug;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cache_entries (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cache_entries_expires_at ON cache_entries (expires_at);";

fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> CheckpointError {
    CheckpointError::Cache {
        message: format!("sqlite cache error: {e}"),
        source: None,
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Cache entries persisted in a SQLite table.
pub struct SqliteCacheBackend {
    conn: tokio_rusqlite::Connection,
}

impl SqliteCacheBackend {
    /// Open (or create) the cache database at `path`.
    pub async fn open(path: &str) -> Result<Self, CheckpointError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CheckpointError::Cache {
                message: format!("failed to create cache directory {}: {e}", parent.display()),
                source: Some(Box::new(e)),
            })?;
        }
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| CheckpointError::Cache {
                message: format!("failed to open sqlite cache at {path}"),
                source: Some(Box::new(e)),
            })?;
        Self::init(conn).await
    }

    /// Open a private in-memory cache database.
    pub async fn open_in_memory() -> Result<Self, CheckpointError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| CheckpointError::Cache {
                message: "failed to open in-memory sqlite cache".into(),
                source: Some(Box::new(e)),
            })?;
        Self::init(conn).await
    }

    async fn init(conn: tokio_rusqlite::Connection) -> Result<Self, CheckpointError> {
        conn.call(|conn| {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheBackend for SqliteCacheBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CheckpointError> {
        let key = key.to_string();
        let now = now_millis();
        self.conn
            .call(move |conn| {
                let value = conn
                    .query_row(
                        "SELECT value FROM cache_entries WHERE key = ?1 AND expires_at > ?2",
                        params![key, now],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CheckpointError> {
        let key = key.to_string();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now_millis().saturating_add(ttl_ms);
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO cache_entries (key, value, expires_at) \
                     VALUES (?1, ?2, ?3)",
                    params![key, value, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete(&self, key: &str) -> Result<(), CheckpointError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM cache_entries WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Expired rows are filtered at read time but only leave the file here.
    async fn purge_expired(&self) -> Result<usize, CheckpointError> {
        let now = now_millis();
        let removed = self
            .conn
            .call(move |conn| {
                let n = conn.execute(
                    "DELETE FROM cache_entries WHERE expires_at <= ?1",
                    params![now],
                )?;
                Ok(n)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(removed, "purged expired sqlite cache entries");
        Ok(removed)
    }
}
