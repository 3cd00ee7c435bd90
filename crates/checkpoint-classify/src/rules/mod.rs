// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-domain rule tables. Order within each table is significant.

pub mod document;
pub mod entry_ban;
pub mod inn;
