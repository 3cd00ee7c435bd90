// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Circuit breaker for one external dependency.
//!
//! ```text
//! Closed   -> Open:     failure_count reaches threshold
//! Open     -> HalfOpen: first admit() after reset_timeout
//! HalfOpen -> Closed:   trial call succeeds (failure_count = 0)
//! HalfOpen -> Open:     trial call fails (last_failure_at refreshed, count untouched)
//! ```
//!
//! Every admitted call holds an [`Admission`] and reports through it, so
//! only the trial call admitted in `HalfOpen` can move the breaker out of
//! that state. Outcomes of calls admitted earlier are ignored there.
//!
//! All operations take a short internal lock and never await, so a breaker
//! is safe to share across every in-flight request against its dependency.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use checkpoint_core::{CircuitSnapshot, CircuitState};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Thresholds for a [`CircuitBreaker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failed calls that open the circuit.
    pub threshold: u32,
    /// How long the circuit stays open before admitting a trial call.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            threshold: 5,
            reset_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    last_failure_at: Option<Instant>,
    trial_in_flight: bool,
    /// Bumped on every trial admission.
    generation: u64,
}

/// Shared, in-memory health tracker for one external dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

/// Permission for one call to reach the dependency.
///
/// Consumed by [`Admission::succeeded`] or [`Admission::failed`]. Dropping
/// it unsettled gives a trial slot back without judging the dependency,
/// which is what cancellation and rejected requests want.
#[derive(Debug)]
#[must_use = "an admission must be settled or dropped"]
pub struct Admission<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    trial: bool,
    settled: bool,
}

impl<'a> Admission<'a> {
    /// Whether this call is the single trial of a half-open circuit.
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    /// The breaker this admission was granted by.
    pub fn breaker(&self) -> &'a CircuitBreaker {
        self.breaker
    }

    /// Report that the call succeeded.
    pub fn succeeded(mut self) {
        self.settled = true;
        self.breaker.record_success(self.generation, self.trial);
    }

    /// Report that the call failed in a way that counts against the dependency.
    pub fn failed(mut self) {
        self.settled = true;
        self.breaker.record_failure(self.generation, self.trial);
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.release(self.generation, self.trial);
        }
    }
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config: CircuitBreakerConfig {
                threshold: config.threshold.max(1),
                ..config
            },
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure_at: None,
                trial_in_flight: false,
                generation: 0,
            }),
        }
    }

    /// Name of the guarded dependency.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> CircuitBreakerConfig {
        self.config
    }

    /// Admit a call, or `None` while the circuit rejects calls.
    ///
    /// Side-effecting: once the reset timeout has elapsed, the first caller
    /// moves the breaker to `HalfOpen` and holds its single trial slot.
    pub fn admit(&self) -> Option<Admission<'_>> {
        let mut inner = self.lock();
        let trial = match inner.state {
            CircuitState::Closed => false,
            CircuitState::Open => {
                let elapsed = inner
                    .last_failure_at
                    .map(|at| at.elapsed())
                    .unwrap_or(Duration::MAX);
                if elapsed < self.config.reset_timeout {
                    return None;
                }
                inner.state = CircuitState::HalfOpen;
                info!(breaker = %self.name, "circuit half-open, admitting trial call");
                true
            }
            CircuitState::HalfOpen if inner.trial_in_flight => return None,
            CircuitState::HalfOpen => true,
        };
        if trial {
            inner.trial_in_flight = true;
            inner.generation = inner.generation.wrapping_add(1);
        }
        Some(Admission {
            breaker: self,
            generation: inner.generation,
            trial,
            settled: false,
        })
    }

    /// Whether `admission` owns the current half-open trial slot.
    fn owns_trial(inner: &Inner, generation: u64, trial: bool) -> bool {
        trial && inner.trial_in_flight && inner.generation == generation
    }

    fn record_success(&self, generation: u64, trial: bool) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::HalfOpen if Self::owns_trial(&inner, generation, trial) => {
                inner.state = CircuitState::Closed;
                inner.failure_count = 0;
                inner.trial_in_flight = false;
                info!(breaker = %self.name, "circuit closed after successful trial call");
            }
            // A call admitted before the circuit opened finished late.
            CircuitState::HalfOpen | CircuitState::Open => {
                debug!(breaker = %self.name, state = %inner.state, "ignoring stale success");
            }
        }
    }

    fn record_failure(&self, generation: u64, trial: bool) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count = inner.failure_count.saturating_add(1);
                if inner.failure_count >= self.config.threshold {
                    inner.state = CircuitState::Open;
                    inner.last_failure_at = Some(Instant::now());
                    warn!(
                        breaker = %self.name,
                        failures = inner.failure_count,
                        reset_secs = self.config.reset_timeout.as_secs(),
                        "circuit opened"
                    );
                }
            }
            CircuitState::HalfOpen if Self::owns_trial(&inner, generation, trial) => {
                inner.state = CircuitState::Open;
                inner.last_failure_at = Some(Instant::now());
                inner.trial_in_flight = false;
                warn!(breaker = %self.name, "trial call failed, circuit re-opened");
            }
            CircuitState::HalfOpen | CircuitState::Open => {
                debug!(breaker = %self.name, state = %inner.state, "ignoring stale failure");
            }
        }
    }

    fn release(&self, generation: u64, trial: bool) {
        let mut inner = self.lock();
        if inner.state == CircuitState::HalfOpen && Self::owns_trial(&inner, generation, trial) {
            inner.trial_in_flight = false;
            debug!(breaker = %self.name, "trial slot released");
        }
    }

    /// Read-only view for health endpoints.
    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.lock();
        CircuitSnapshot {
            state: inner.state,
            failures: inner.failure_count,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
