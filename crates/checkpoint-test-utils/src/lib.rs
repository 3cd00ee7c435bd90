// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Checkpoint integration tests.
//!
//! Provides scripted collaborators and a gateway harness for fast,
//! deterministic tests without network access.
//!
//! # Components
//!
//! - [`MockFetcher`] - Fetcher answering from a scripted queue
//! - [`FailingCacheBackend`] - Cache backend whose every operation errors
//! - [`RecordingPublisher`] - Event publisher that captures what it is sent
//! - [`TestHarness`] - Builds gateways over a mock fetcher and a memory cache

pub mod failing_cache;
pub mod harness;
pub mod mock_fetcher;
pub mod recording_publisher;

pub use failing_cache::FailingCacheBackend;
pub use harness::{CacheMode, TestHarness, TestHarnessBuilder};
pub use mock_fetcher::MockFetcher;
pub use recording_publisher::RecordingPublisher;
