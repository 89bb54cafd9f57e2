//! Per-attempt diagnostics.

use std::sync::Mutex;

use super::classify::Classification;

/// What the runner reports after a retryable, non-terminal failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    /// 1-based index of the attempt that failed.
    pub attempt: u32,
    pub max_attempts: u32,
    pub description: String,
    /// Rendered error text.
    pub error: String,
    pub classification: Classification,
}

/// Receives diagnostics from the runner. Formatting is up to the implementor.
pub trait RetryObserver {
    fn on_retry(&self, report: &AttemptReport);
}

impl<T: RetryObserver + ?Sized> RetryObserver for &T {
    fn on_retry(&self, report: &AttemptReport) {
        (**self).on_retry(report)
    }
}

/// Default observer: one `tracing` warning per retried attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn on_retry(&self, report: &AttemptReport) {
        tracing::warn!(
            attempt = report.attempt,
            max_attempts = report.max_attempts,
            description = %report.description,
            matched = report.classification.matched_id().unwrap_or("-"),
            error = %report.error,
            "{} returned a retryable error ({}); retrying",
            report.description,
            report.classification,
        );
    }
}

/// Observer that keeps every report, for callers that want to inspect or
/// summarise the retry history of a run after the fact.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    reports: Mutex<Vec<AttemptReport>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<AttemptReport> {
        match self.reports.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl RetryObserver for RecordingObserver {
    fn on_retry(&self, report: &AttemptReport) {
        let mut guard = match self.reports.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(report.clone());
    }
}
