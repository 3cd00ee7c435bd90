// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The value every verification call returns.

use chrono::{DateTime, NaiveDate, Utc};
use checkpoint_core::{DomainKind, FallbackReason, ResultSource};
use serde::{Deserialize, Serialize};

use crate::domain::Verdict;

/// Outcome of one verification call, generic over the domain status.
///
/// Serialized camelCase; this is both the cache entry and the HTTP body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult<S> {
    pub domain: DomainKind,
    pub status: S,
    pub source: ResultSource,
    pub checked_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReason>,
}

impl<S> VerificationResult<S> {
    /// A result freshly classified from the source.
    pub fn live(domain: DomainKind, verdict: Verdict<S>) -> Self {
        Self {
            domain,
            status: verdict.status,
            source: ResultSource::Live,
            checked_at: Utc::now(),
            reason: verdict.reason,
            expires_at: verdict.expires_at,
            error: None,
            fallback: None,
        }
    }

    /// A result produced without a usable live answer.
    pub fn fallback(
        domain: DomainKind,
        status: S,
        why: FallbackReason,
        guidance: impl Into<String>,
        error: Option<String>,
    ) -> Self {
        Self {
            domain,
            status,
            source: ResultSource::Fallback,
            checked_at: Utc::now(),
            reason: Some(guidance.into()),
            expires_at: None,
            error,
            fallback: Some(why),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ResultSource::Fallback
    }
}
