//! Strict adapters for test bodies: unwrap a result or fail the test.
//!
//! The retry engine only ever returns values. These helpers sit at the test
//! boundary and turn a failure into a panic, which the Rust test harness
//! reports as a failed test.

use std::fmt;

use crate::retry::RunOutcome;

/// Return the success value or panic with the rendered retry error.
#[track_caller]
pub fn must<T, E: fmt::Display>(outcome: RunOutcome<T, E>) -> T {
    match outcome.into_result() {
        Ok(v) => v,
        Err(e) => panic!("{}", e),
    }
}

/// Return the value of any `Result` or panic with the error's `Display` text.
#[track_caller]
pub fn must_ok<T, E: fmt::Display>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn must_returns_success_value() {
        assert_eq!(must(RunOutcome::<_, String>::Success(3)), 3);
        assert_eq!(must_ok(Ok::<_, String>("v")), "v");
    }

    #[test]
    #[should_panic(expected = "'Checking Instance web-1 for labels' unsuccessful after 13 attempts")]
    fn must_panics_with_retry_error() {
        let outcome: RunOutcome<(), String> = RunOutcome::BudgetExhausted {
            last_error: "condition not met".to_string(),
            attempts_made: 13,
            matched_id: "condition-pending".to_string(),
            description: "Checking Instance web-1 for labels".to_string(),
        };
        must(outcome);
    }

    #[test]
    #[should_panic(expected = "AccessDenied")]
    fn must_ok_panics_with_error_text() {
        must_ok(Err::<(), _>("AccessDenied"));
    }
}
