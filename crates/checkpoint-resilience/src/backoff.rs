// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exponential backoff with jitter.
//!
//! `delay(n) = min(base * 2^(n-1) * (1 + jitter), cap)` with `jitter`
//! drawn uniformly from `[0, MAX_JITTER)`.

use std::time::Duration;

use rand::Rng;

/// Upper bound (exclusive) of the multiplicative jitter.
pub const MAX_JITTER: f64 = 0.3;

/// Doubling stops here so the arithmetic stays finite.
const MAX_EXPONENT: u32 = 62;

/// Delay schedule for a bounded sequence of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
        }
    }
}

impl BackoffPolicy {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    /// Delay before the attempt following failed attempt `attempt` (1-indexed).
    pub fn delay(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(0.0..MAX_JITTER);
        self.delay_with_jitter(attempt, jitter)
    }

    /// Deterministic form of [`delay`](Self::delay).
    ///
    /// `jitter` is clamped to `[0, MAX_JITTER]`; attempt `0` is treated as `1`.
    pub fn delay_with_jitter(&self, attempt: u32, jitter: f64) -> Duration {
        if self.base.is_zero() || self.cap.is_zero() {
            return Duration::ZERO;
        }
        let jitter = if jitter.is_nan() {
            0.0
        } else {
            jitter.clamp(0.0, MAX_JITTER)
        };
        let exponent = (attempt.max(1) - 1).min(MAX_EXPONENT);
        let secs = self.base.as_secs_f64() * 2f64.powi(exponent as i32) * (1.0 + jitter);
        Duration::from_secs_f64(secs.min(self.cap.as_secs_f64()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> BackoffPolicy {
        BackoffPolicy::new(Duration::from_millis(100), Duration::from_secs(30))
    }

    #[test]
    fn doubles_per_attempt_without_jitter() {
        let p = policy();
        assert_eq!(p.delay_with_jitter(1, 0.0), Duration::from_millis(100));
        assert_eq!(p.delay_with_jitter(2, 0.0), Duration::from_millis(200));
        assert_eq!(p.delay_with_jitter(3, 0.0), Duration::from_millis(400));
    }

    #[test]
    fn attempt_zero_behaves_like_first() {
        let p = policy();
        assert_eq!(p.delay_with_jitter(0, 0.0), p.delay_with_jitter(1, 0.0));
    }

    #[test]
    fn capped() {
        let p = policy();
        assert_eq!(p.delay_with_jitter(20, 0.29), Duration::from_secs(30));
        assert_eq!(p.delay_with_jitter(u32::MAX, 0.0), Duration::from_secs(30));
    }

    #[test]
    fn jitter_is_bounded() {
        let p = policy();
        for _ in 0..200 {
            let d = p.delay(1);
            assert!(d >= Duration::from_millis(100));
            assert!(d < Duration::from_millis(130));
        }
    }

    #[test]
    fn zero_base_never_waits() {
        let p = BackoffPolicy::new(Duration::ZERO, Duration::from_secs(30));
        assert_eq!(p.delay(5), Duration::ZERO);
    }
}
