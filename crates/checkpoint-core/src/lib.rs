// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Checkpoint verification gateway.
//!
//! This crate provides the error type, the shared vocabulary (domains,
//! result sources, circuit states), the query/cache-key contract, and the
//! collaborator traits every verification domain is built from.

pub mod error;
pub mod query;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CheckpointError;
pub use query::{canonical_key, key_fingerprint, VerificationQuery};
pub use types::{
    CircuitSnapshot, CircuitState, DomainKind, FallbackReason, HealthStatus, ResultSource,
};

pub use traits::{CacheBackend, EventPublisher, Fetcher};
