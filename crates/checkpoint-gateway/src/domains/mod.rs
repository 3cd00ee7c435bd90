// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The five status-check domains.

pub mod document;
pub mod entry_ban;
pub mod inn;

use chrono::{NaiveDate, Utc};
use checkpoint_core::CheckpointError;

/// Reject dates after today.
pub(crate) fn require_past_date(field: &str, date: NaiveDate) -> Result<(), CheckpointError> {
    if date > Utc::now().date_naive() {
        return Err(CheckpointError::validation(field, "must not be in the future"));
    }
    Ok(())
}
