//! Terminal results of a retry run.

use std::fmt;

/// How one run ended.
///
/// Every failure variant keeps the last error together with the attempt count
/// and policy description, so the caller can log or re-raise it.
#[derive(Debug)]
#[must_use]
pub enum RunOutcome<T, E> {
    /// The action succeeded.
    Success(T),
    /// The action returned an error no catalog entry recognised.
    FatalFailure {
        error: E,
        /// 1-based attempt that failed.
        attempts_made: u32,
        max_attempts: u32,
        description: String,
    },
    /// Every error was retryable, but the attempt budget ran out.
    BudgetExhausted {
        last_error: E,
        attempts_made: u32,
        /// Catalog entry that matched the last error.
        matched_id: String,
        description: String,
    },
}

impl<T, E> RunOutcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }

    pub fn attempts_made(&self) -> Option<u32> {
        match self {
            RunOutcome::Success(_) => None,
            RunOutcome::FatalFailure { attempts_made, .. }
            | RunOutcome::BudgetExhausted { attempts_made, .. } => Some(*attempts_made),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> RunOutcome<U, E> {
        match self {
            RunOutcome::Success(v) => RunOutcome::Success(f(v)),
            RunOutcome::FatalFailure {
                error,
                attempts_made,
                max_attempts,
                description,
            } => RunOutcome::FatalFailure {
                error,
                attempts_made,
                max_attempts,
                description,
            },
            RunOutcome::BudgetExhausted {
                last_error,
                attempts_made,
                matched_id,
                description,
            } => RunOutcome::BudgetExhausted {
                last_error,
                attempts_made,
                matched_id,
                description,
            },
        }
    }

    /// Convert into a `Result`, folding both failure variants into [`RetryError`].
    pub fn into_result(self) -> Result<T, RetryError<E>> {
        match self {
            RunOutcome::Success(v) => Ok(v),
            RunOutcome::FatalFailure {
                error,
                attempts_made,
                max_attempts,
                description,
            } => Err(RetryError::Fatal {
                description,
                error,
                attempts_made,
                max_attempts,
            }),
            RunOutcome::BudgetExhausted {
                last_error,
                attempts_made,
                matched_id,
                description,
            } => Err(RetryError::BudgetExhausted {
                description,
                last_error,
                attempts_made,
                matched_id,
            }),
        }
    }
}

/// Error form of a failed [`RunOutcome`].
#[derive(Debug)]
pub enum RetryError<E> {
    Fatal {
        description: String,
        error: E,
        attempts_made: u32,
        max_attempts: u32,
    },
    BudgetExhausted {
        description: String,
        last_error: E,
        attempts_made: u32,
        matched_id: String,
    },
}

impl<E> RetryError<E> {
    /// The last error the action returned.
    pub fn last_error(&self) -> &E {
        match self {
            RetryError::Fatal { error, .. } => error,
            RetryError::BudgetExhausted { last_error, .. } => last_error,
        }
    }

    pub fn into_last_error(self) -> E {
        match self {
            RetryError::Fatal { error, .. } => error,
            RetryError::BudgetExhausted { last_error, .. } => last_error,
        }
    }

    pub fn attempts_made(&self) -> u32 {
        match self {
            RetryError::Fatal { attempts_made, .. }
            | RetryError::BudgetExhausted { attempts_made, .. } => *attempts_made,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, RetryError::Fatal { .. })
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Fatal {
                description,
                error,
                attempts_made,
                max_attempts,
            } => write!(
                f,
                "'{}' failed with a non-retryable error on attempt {} of {}: {}",
                description, attempts_made, max_attempts, error
            ),
            RetryError::BudgetExhausted {
                description,
                last_error,
                attempts_made,
                matched_id,
            } => write!(
                f,
                "'{}' unsuccessful after {} attempts (last error matched {}): {}",
                description, attempts_made, matched_id, last_error
            ),
        }
    }
}

impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.last_error())
    }
}
