// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport trait for pulling raw content from an external source.

use async_trait::async_trait;

use crate::error::CheckpointError;

/// Retrieves the raw text or HTML an external source returns for a query.
///
/// Implementations may be a plain HTTP request or a scripted browser
/// session; the gateway does not care which. A single call is one attempt:
/// retries, timeouts across attempts, and circuit breaking happen above.
#[async_trait]
pub trait Fetcher<Q: ?Sized + Sync>: Send + Sync + 'static {
    /// Fetch the raw payload for `query`.
    async fn fetch(&self, query: &Q) -> Result<String, CheckpointError>;
}
