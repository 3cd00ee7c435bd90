// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`CacheBackend`](checkpoint_core::CacheBackend) implementations.

pub mod memory;
pub mod sqlite;
