// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The seam between the generic gateway and one verification subsystem.

use chrono::NaiveDate;
use checkpoint_core::{DomainKind, VerificationQuery};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Whether a cached result keeps the timestamp of its original live check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckedAtPolicy {
    /// `checked_at` reports when the source was actually consulted.
    #[default]
    Original,
    /// `checked_at` is reset to the time the cached entry is served.
    Refresh,
}

/// A domain's interpretation of one raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict<S> {
    pub status: S,
    pub reason: Option<String>,
    pub expires_at: Option<NaiveDate>,
}

impl<S> Verdict<S> {
    pub fn new(status: S) -> Self {
        Self {
            status,
            reason: None,
            expires_at: None,
        }
    }
}

/// One status-check subsystem: its query shape, its status vocabulary, and
/// how raw payloads map onto that vocabulary.
///
/// Implementations are pure; all I/O, caching, and resilience live in
/// [`VerificationGateway`](crate::VerificationGateway).
pub trait VerificationDomain: Send + Sync + 'static {
    type Query: VerificationQuery + 'static;
    type Status: Clone
        + std::fmt::Debug
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    fn kind(&self) -> DomainKind;

    /// Classify a raw payload returned by the source.
    fn interpret(&self, raw: &str) -> Verdict<Self::Status>;

    /// Status reported when no live answer is available.
    fn degraded_status(&self) -> Self::Status;

    fn checked_at_policy(&self) -> CheckedAtPolicy {
        CheckedAtPolicy::Original
    }
}
