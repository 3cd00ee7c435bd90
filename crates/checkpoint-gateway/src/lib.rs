// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilient external-verification gateway.
//!
//! [`VerificationGateway`] wires a [`VerificationDomain`] to a fetcher, the
//! shared cache-aside store, a circuit breaker, and a retry executor. The
//! [`domains`] module provides the five status-check subsystems.

pub mod domain;
pub mod domains;
pub mod gateway;
pub mod metrics;
pub mod result;

pub use domain::{CheckedAtPolicy, Verdict, VerificationDomain};
pub use domains::document::{
    DocumentDomain, DocumentQuery, DocumentStatus, PatentDomain, PatentQuery,
    ResidencePermitDomain, ResidencePermitQuery, WorkPermitDomain, WorkPermitQuery,
};
pub use domains::entry_ban::{EntryBanDomain, EntryBanStatus, PersonQuery};
pub use domains::inn::{InnDomain, InnQuery, InnStatus};
pub use gateway::{GatewaySettings, VerificationGateway};
pub use result::VerificationResult;
