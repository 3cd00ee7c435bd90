// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Legislation change watcher.
//!
//! Detects significant edits to watched legal acts and publishes a
//! [`LegislationChangeEvent`] for each one through an [`EventPublisher`].
//!
//! [`EventPublisher`]: checkpoint_core::EventPublisher

pub mod event;
pub mod publisher;
pub mod snapshot;
pub mod watcher;

pub use event::{EVENT_TYPE, LegislationChangeEvent};
pub use publisher::{BroadcastPublisher, PublishedEvent};
pub use snapshot::{PageSnapshot, change_percentage, content_hash, diff_summary};
pub use watcher::{LawSource, LegislationWatcher, PageFetcher, WatchOutcome, WatchSettings};
