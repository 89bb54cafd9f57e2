//! Wait until observable state satisfies a predicate.
//!
//! A check that is "not ready yet" is driven through the same budget and
//! backoff as a transient error: the poller turns every not-ready result into
//! a synthesized error that the condition catalog always classifies as
//! retryable.

use std::fmt;
use std::sync::LazyLock;

use super::catalog::{CatalogEntry, ErrorCatalog, Matcher};
use super::classify::Classifier;
use super::observer::{RetryObserver, TracingObserver};
use super::outcome::RunOutcome;
use super::policy::RetryPolicy;
use super::run::Runner;
use super::sleep::{Sleeper, ThreadSleeper};

/// Id of the single entry in [`condition_catalog()`].
pub const CONDITION_PENDING: &str = "condition-pending";

static CONDITION: LazyLock<ErrorCatalog> = LazyLock::new(|| {
    ErrorCatalog::new("condition").with_entry(CatalogEntry::new(
        CONDITION_PENDING,
        Matcher::Any,
        "Condition not satisfied yet.",
    ))
});

/// Catalog the poller classifies with: every synthesized not-ready error retries.
pub fn condition_catalog() -> &'static ErrorCatalog {
    &CONDITION
}

/// Result of one state check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness<T> {
    /// Condition satisfied.
    Ready(T),
    /// Not satisfied yet, optionally with the error observed while checking.
    Pending(Option<String>),
}

impl<T> Readiness<T> {
    pub fn pending() -> Self {
        Readiness::Pending(None)
    }

    pub fn pending_with(observed: impl fmt::Display) -> Self {
        Readiness::Pending(Some(observed.to_string()))
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for Readiness<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Readiness::Ready(v),
            Err(e) => Readiness::pending_with(e),
        }
    }
}

/// Synthesized error for a check that was not ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotReady {
    pub observed: Option<String>,
}

impl fmt::Display for NotReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.observed {
            Some(observed) => write!(f, "condition not met: {}", observed),
            None => f.write_str("condition not met"),
        }
    }
}

impl std::error::Error for NotReady {}

/// Runner specialised for condition checks.
#[derive(Debug, Clone)]
pub struct Poller<O = TracingObserver, S = ThreadSleeper> {
    runner: Runner<O, S>,
}

impl Poller {
    pub fn new() -> Self {
        Self {
            runner: Runner::new(Classifier::new([condition_catalog()])),
        }
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, S> Poller<O, S> {
    pub fn with_observer<O2>(self, observer: O2) -> Poller<O2, S> {
        Poller {
            runner: self.runner.with_observer(observer),
        }
    }

    pub fn with_sleeper<S2>(self, sleeper: S2) -> Poller<O, S2> {
        Poller {
            runner: self.runner.with_sleeper(sleeper),
        }
    }
}

impl<O: RetryObserver, S: Sleeper> Poller<O, S> {
    /// Call `check` until it reports ready or the policy's budget runs out.
    ///
    /// Never returns [`RunOutcome::FatalFailure`]: a pending check is always
    /// retryable, whether or not it carried an observed error.
    pub fn poll_until<T, F>(&self, policy: &RetryPolicy, mut check: F) -> RunOutcome<T, NotReady>
    where
        F: FnMut() -> Readiness<T>,
    {
        self.runner.run(policy, || match check() {
            Readiness::Ready(v) => Ok(v),
            Readiness::Pending(observed) => Err(NotReady { observed }),
        })
    }
}

impl<O: RetryObserver, S: Sleeper> Runner<O, S> {
    /// Poll a condition reusing this runner's observer and sleeper. The
    /// runner's own catalogs are not consulted.
    pub fn poll_until<T, F>(&self, policy: &RetryPolicy, check: F) -> RunOutcome<T, NotReady>
    where
        F: FnMut() -> Readiness<T>,
    {
        Poller::new()
            .with_observer(self.observer())
            .with_sleeper(self.sleeper())
            .poll_until(policy, check)
    }
}

/// Poll with the default tracing observer and a blocking sleep.
pub fn poll_until<T, F>(policy: &RetryPolicy, check: F) -> RunOutcome<T, NotReady>
where
    F: FnMut() -> Readiness<T>,
{
    Poller::new().poll_until(policy, check)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::observer::RecordingObserver;
    use crate::retry::sleep::RecordingSleeper;
    use std::cell::Cell;
    use std::time::Duration;

    #[test]
    fn ready_on_third_check() {
        let sleeper = RecordingSleeper::new();
        let poller = Poller::new().with_sleeper(&sleeper);
        let calls = Cell::new(0u32);
        let out = poller.poll_until(
            &RetryPolicy::new("waiting for replicas", 5, Duration::from_millis(5)),
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Readiness::pending()
                } else {
                    Readiness::Ready(())
                }
            },
        );
        assert!(out.is_success());
        assert_eq!(calls.get(), 3);
        assert_eq!(sleeper.sleeps(), vec![Duration::from_millis(5); 2]);
    }

    #[test]
    fn observed_errors_are_retried_not_fatal() {
        let sleeper = RecordingSleeper::new();
        let observer = RecordingObserver::new();
        let poller = Poller::new().with_sleeper(&sleeper).with_observer(&observer);
        let out = poller.poll_until(
            &RetryPolicy::new("label visible", 2, Duration::from_millis(1)),
            || Readiness::<()>::pending_with("AccessDenied"),
        );
        match out {
            RunOutcome::BudgetExhausted {
                last_error,
                attempts_made,
                ..
            } => {
                assert_eq!(attempts_made, 3);
                assert_eq!(last_error.observed.as_deref(), Some("AccessDenied"));
            }
            other => panic!("expected BudgetExhausted, got {:?}", other),
        }
        let reports = observer.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].error, "condition not met: AccessDenied");
    }

    #[test]
    fn ready_value_is_returned() {
        let out = poll_until(&RetryPolicy::new("value", 0, Duration::ZERO), || {
            Readiness::Ready(42)
        });
        assert!(matches!(out, RunOutcome::Success(42)));
    }

    #[test]
    fn runner_poll_ignores_runner_catalogs() {
        let sleeper = RecordingSleeper::new();
        let runner = Runner::with_catalogs([&ErrorCatalog::new("empty")]).with_sleeper(&sleeper);
        let calls = Cell::new(0u32);
        let out = runner.poll_until(&RetryPolicy::new("p", 3, Duration::from_millis(2)), || {
            calls.set(calls.get() + 1);
            if calls.get() == 2 {
                Readiness::Ready("up")
            } else {
                Readiness::pending()
            }
        });
        assert!(matches!(out, RunOutcome::Success("up")));
        assert_eq!(sleeper.sleeps().len(), 1);
    }

    #[test]
    fn condition_catalog_matches_every_text() {
        let c = Classifier::new([condition_catalog()]);
        assert_eq!(c.classify_text("").matched_id(), Some(CONDITION_PENDING));
        assert_eq!(
            c.classify(&NotReady {
                observed: Some("AccessDenied".to_string())
            })
            .matched_id(),
            Some(CONDITION_PENDING)
        );
    }

    #[test]
    fn readiness_from_result() {
        let ok: Readiness<u8> = Ok::<u8, String>(1).into();
        assert_eq!(ok, Readiness::Ready(1));
        let pending: Readiness<u8> = Err::<u8, _>("503").into();
        assert_eq!(pending, Readiness::Pending(Some("503".to_string())));
    }
}
