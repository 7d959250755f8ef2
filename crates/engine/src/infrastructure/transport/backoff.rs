//! Reconnect delays.

use std::time::Duration;

pub const INITIAL_RETRY_DELAY_MS: u64 = 1_000;
pub const MAX_RETRY_DELAY_MS: u64 = 30_000;
pub const MAX_RETRY_ATTEMPTS: u32 = 10;
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// Limits for [`BackoffState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub max: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(INITIAL_RETRY_DELAY_MS),
            max: Duration::from_millis(MAX_RETRY_DELAY_MS),
            max_attempts: Some(MAX_RETRY_ATTEMPTS),
        }
    }
}

/// Exponential backoff between connection attempts.
#[derive(Debug, Clone, Copy)]
pub struct BackoffState {
    policy: BackoffPolicy,
    attempts: u32,
    delay: Duration,
}

impl BackoffState {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            delay: policy.initial,
        }
    }

    /// Called after a connection succeeds.
    pub fn reset(&mut self) {
        *self = Self::new(self.policy);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.policy
            .max_attempts
            .is_some_and(|max| self.attempts >= max)
    }

    /// Returns the delay to wait before the next attempt, or `None` once the
    /// attempts are used up.
    pub fn next_delay_and_advance(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        let current = self.delay;
        self.attempts += 1;
        self.delay = current
            .saturating_mul(BACKOFF_MULTIPLIER)
            .min(self.policy.max);
        Some(current)
    }
}

impl Default for BackoffState {
    fn default() -> Self {
        Self::new(BackoffPolicy::default())
    }
}
