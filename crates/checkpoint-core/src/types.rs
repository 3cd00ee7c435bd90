// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the gateway, the resilience primitives, and the watcher.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifies the external verification subsystem a call belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    EntryBan,
    Inn,
    Patent,
    WorkPermit,
    ResidencePermit,
    Legislation,
}

impl DomainKind {
    /// All status-check domains served through a verification gateway.
    pub const STATUS_DOMAINS: [DomainKind; 5] = [
        DomainKind::EntryBan,
        DomainKind::Inn,
        DomainKind::Patent,
        DomainKind::WorkPermit,
        DomainKind::ResidencePermit,
    ];
}

/// Where a verification result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultSource {
    /// Served from the cache-aside store.
    Cache,
    /// Fetched and classified from the external source during this call.
    Live,
    /// Degraded or guidance result produced without a usable live answer.
    Fallback,
}

/// Why a result was produced without a live answer.
///
/// `Disabled` is a product decision, not a failure; every other variant
/// describes a degraded path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Live checks are switched off for the domain by configuration.
    Disabled,
    /// The circuit breaker rejected the call without network activity.
    CircuitOpen,
    /// Every retry attempt failed.
    RetriesExhausted,
    /// The source answered, but with something that can never succeed on retry.
    Rejected,
    /// The caller abandoned the request.
    Cancelled,
    /// The overall deadline elapsed before an attempt succeeded.
    DeadlineExceeded,
}

/// Circuit breaker state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation, calls pass through.
    Closed,
    /// Dependency assumed down, calls fail fast.
    Open,
    /// A single probe is testing whether the dependency recovered.
    HalfOpen,
}

/// Read-only view of a circuit breaker for health endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub failures: u32,
}

/// Health status reported by components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Fully operational.
    Healthy,
    /// Operational but experiencing issues.
    Degraded(String),
    /// Not operational.
    Unhealthy(String),
}

impl HealthStatus {
    /// Short label for status endpoints.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "ok",
            Self::Degraded(_) => "degraded",
            Self::Unhealthy(_) => "unhealthy",
        }
    }

    /// What is wrong, when anything is.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Healthy => None,
            Self::Degraded(detail) | Self::Unhealthy(detail) => Some(detail),
        }
    }
}
