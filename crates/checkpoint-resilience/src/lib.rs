// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives shared by every external dependency.
//!
//! - [`CircuitBreaker`]: one per dependency, gates calls while it is failing;
//!   each admitted call reports through its [`Admission`].
//! - [`BackoffPolicy`]: exponential delay with jitter and a hard cap.
//! - [`RetryExecutor`]: runs an operation under the policy, reports the
//!   terminal outcome to the breaker, honours cancellation and deadlines.

pub mod backoff;
pub mod circuit_breaker;
pub mod retry;

pub use backoff::BackoffPolicy;
pub use circuit_breaker::{Admission, CircuitBreaker, CircuitBreakerConfig};
pub use retry::{RetryError, RetryExecutor, RetryPolicy};
