// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Checkpoint verification gateway.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all Checkpoint collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Configuration errors (invalid TOML, missing endpoint, inconsistent limits).
    #[error("configuration error: {0}")]
    Config(String),

    /// The caller supplied an unusable query. Never retried.
    #[error("invalid query field `{field}`: {message}")]
    Validation { field: String, message: String },

    /// Connection-level failure talking to an external source.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The external source answered with a non-2xx status.
    #[error("upstream returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Cache backend errors (connection failure, query failure).
    #[error("cache error: {message}")]
    Cache {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Message bus publishing errors.
    #[error("publish error: {message}")]
    Publish {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CheckpointError {
    /// Shorthand for a [`CheckpointError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`CheckpointError::Transport`] error without a source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Whether retrying the same operation could plausibly succeed.
    ///
    /// Validation, configuration, and serialization failures are permanent:
    /// the same input produces the same error on every attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::HttpStatus { .. }
                | Self::Timeout { .. }
                | Self::Cache { .. }
                | Self::Publish { .. }
        )
    }
}
