// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the gateway and the watcher.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility so
//! implementations can be stored as `Arc<dyn Trait>`.

pub mod cache;
pub mod fetcher;
pub mod publisher;

pub use cache::CacheBackend;
pub use fetcher::Fetcher;
pub use publisher::EventPublisher;
