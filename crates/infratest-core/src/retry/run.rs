//! Retry loop: run an action until success, a fatal error, or budget exhaustion.

use std::fmt;

use super::catalog::ErrorCatalog;
use super::classify::{Classification, Classifier};
use super::observer::{AttemptReport, RetryObserver, TracingObserver};
use super::outcome::RunOutcome;
use super::policy::RetryPolicy;
use super::sleep::{Sleeper, ThreadSleeper};

/// Executes actions under a [`RetryPolicy`], consulting a [`Classifier`]
/// after each failure.
///
/// A run is a blocking, strictly sequential loop on the calling thread. The
/// runner itself holds no per-run state, so one runner can serve many runs.
#[derive(Debug, Clone)]
pub struct Runner<O = TracingObserver, S = ThreadSleeper> {
    classifier: Classifier,
    observer: O,
    sleeper: S,
}

impl Runner {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            observer: TracingObserver,
            sleeper: ThreadSleeper,
        }
    }

    pub fn with_catalogs<'a, I>(catalogs: I) -> Self
    where
        I: IntoIterator<Item = &'a ErrorCatalog>,
    {
        Self::new(Classifier::new(catalogs))
    }
}

impl<O, S> Runner<O, S> {
    pub fn with_observer<O2>(self, observer: O2) -> Runner<O2, S> {
        Runner {
            classifier: self.classifier,
            observer,
            sleeper: self.sleeper,
        }
    }

    pub fn with_sleeper<S2>(self, sleeper: S2) -> Runner<O, S2> {
        Runner {
            classifier: self.classifier,
            observer: self.observer,
            sleeper,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub(crate) fn observer(&self) -> &O {
        &self.observer
    }

    pub(crate) fn sleeper(&self) -> &S {
        &self.sleeper
    }
}

impl<O: RetryObserver, S: Sleeper> Runner<O, S> {
    /// Run `action` until it succeeds or the policy/classifier says stop.
    ///
    /// Attempt 1 always runs. A fatal error returns at once without sleeping.
    /// A retryable error sleeps exactly `policy.interval()` before the next
    /// attempt, except after the last attempt, which returns
    /// [`RunOutcome::BudgetExhausted`] without sleeping. Total sleep time is
    /// therefore exactly `(attempts_made - 1) * interval`.
    pub fn run<T, E, F>(&self, policy: &RetryPolicy, mut action: F) -> RunOutcome<T, E>
    where
        E: fmt::Display,
        F: FnMut() -> Result<T, E>,
    {
        let max_attempts = policy.max_attempts();
        let mut attempt = 1u32;
        loop {
            let error = match action() {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(
                            attempt,
                            description = %policy.description(),
                            "succeeded after retries"
                        );
                    }
                    return RunOutcome::Success(value);
                }
                Err(e) => e,
            };

            let rendered = error.to_string();
            let classification = self.classifier.classify_text(&rendered);
            let matched_id = match &classification {
                Classification::Fatal => {
                    tracing::debug!(
                        attempt,
                        max_attempts,
                        description = %policy.description(),
                        error = %rendered,
                        "non-retryable error"
                    );
                    return RunOutcome::FatalFailure {
                        error,
                        attempts_made: attempt,
                        max_attempts,
                        description: policy.description().to_string(),
                    };
                }
                Classification::Retryable { id, .. } => id.clone(),
            };

            if !policy.has_attempts_after(attempt) {
                tracing::debug!(
                    attempts_made = attempt,
                    description = %policy.description(),
                    matched = %matched_id,
                    "retry budget exhausted"
                );
                return RunOutcome::BudgetExhausted {
                    last_error: error,
                    attempts_made: attempt,
                    matched_id,
                    description: policy.description().to_string(),
                };
            }

            self.observer.on_retry(&AttemptReport {
                attempt,
                max_attempts,
                description: policy.description().to_string(),
                error: rendered,
                classification,
            });
            self.sleeper.sleep(policy.interval());
            attempt += 1;
        }
    }
}

/// Run `action` with the default tracing observer and a blocking sleep.
pub fn run_with_retry<T, E, F>(
    policy: &RetryPolicy,
    catalogs: &[&ErrorCatalog],
    action: F,
) -> RunOutcome<T, E>
where
    E: fmt::Display,
    F: FnMut() -> Result<T, E>,
{
    Runner::with_catalogs(catalogs.iter().copied()).run(policy, action)
}
