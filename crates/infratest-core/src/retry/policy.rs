//! Attempt budget and fixed inter-attempt delay.

use std::time::Duration;

/// Retry budget for one run: how many retries, how long to wait between them,
/// and a human-readable description used in diagnostics.
///
/// A policy is built once by the caller and never mutated afterwards, so the
/// same value can be read by many concurrent runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    description: String,
    max_retries: u32,
    interval: Duration,
}

impl RetryPolicy {
    /// Create a policy allowing `max_retries` retries after the first attempt,
    /// sleeping exactly `interval` between attempts.
    pub fn new(description: impl Into<String>, max_retries: u32, interval: Duration) -> Self {
        Self {
            description: description.into(),
            max_retries,
            interval,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Total attempts allowed (`max_retries + 1`). Attempt 1 always runs.
    ///
    /// Capped at `u32::MAX`: a policy with `max_retries == u32::MAX` makes
    /// `u32::MAX` attempts, one fewer than requested.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// True if another attempt may follow the 1-based `attempt` just made.
    pub fn has_attempts_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts()
    }
}
