// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Verification queries and their canonical cache keys.
//!
//! Equivalent queries must collide in the cache, so every field is trimmed,
//! case-folded, and whitespace-collapsed before the fields are joined with
//! `:` behind the domain name.

use sha2::{Digest, Sha256};

use crate::error::CheckpointError;
use crate::types::DomainKind;

/// An immutable request against one verification domain.
pub trait VerificationQuery: Send + Sync + std::fmt::Debug {
    /// Ordered `(name, value)` pairs identifying the request.
    ///
    /// Order is part of the cache key. Optional fields should be reported
    /// with an empty value rather than omitted so positions stay stable.
    fn fields(&self) -> Vec<(&'static str, String)>;

    /// Rejects queries missing data the domain requires.
    fn validate(&self) -> Result<(), CheckpointError>;
}

/// Build the canonical cache key for a query.
pub fn canonical_key<Q: VerificationQuery + ?Sized>(domain: DomainKind, query: &Q) -> String {
    let mut key = domain.to_string();
    for (_, value) in query.fields() {
        key.push(':');
        key.push_str(&normalize_field(&value));
    }
    key
}

/// Loggable stand-in for a cache key: the domain prefix and the first
/// 12 hex digits of the key's SHA-256.
///
/// Keys carry names, birth dates and document numbers and must not reach
/// the logs verbatim.
pub fn key_fingerprint(key: &str) -> String {
    let domain = key.split_once(':').map_or("", |(domain, _)| domain);
    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    format!("{domain}:{}", &digest[..12])
}

/// Normalize one field value for key construction.
pub fn normalize_field(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace(':', "_")
}

/// Fail with a validation error when `value` is blank.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), CheckpointError> {
    if value.trim().is_empty() {
        return Err(CheckpointError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Fail with a validation error when `value` is blank or contains anything
/// other than ASCII letters and digits.
pub fn require_document_code(field: &str, value: &str) -> Result<(), CheckpointError> {
    require_non_empty(field, value)?;
    if !value.trim().chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CheckpointError::validation(
            field,
            "may only contain letters and digits",
        ));
    }
    Ok(())
}
