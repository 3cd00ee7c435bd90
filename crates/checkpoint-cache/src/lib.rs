// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache-aside store for verification results.
//!
//! [`CacheAsideStore`] owns every read and write against the backing cache.
//! Its operations never fail: backend errors and timeouts are logged and
//! turned into misses or no-ops, and a backend that fails the startup probe
//! puts the store in degraded mode where every operation returns at once.

pub mod backend;
pub mod store;

pub use backend::memory::MemoryCacheBackend;
pub use backend::sqlite::SqliteCacheBackend;
pub use store::{CacheAsideStore, CacheEntry, CacheSettings, Lookup};
