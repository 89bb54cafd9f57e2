//! Integration test: a command that hits a transient tool error twice, then
//! succeeds, driven through the terraform catalog.

#![cfg(unix)]

use std::time::Duration;

use infratest_core::catalogs;
use infratest_core::retry::{RecordingSleeper, RetryPolicy, RunOutcome, Runner};
use infratest_core::shell::{run_command, run_command_with_retry, Command};
use tempfile::tempdir;

/// Script that fails with `message` until it has run `fail_times` times.
fn flaky_script(counter: &std::path::Path, fail_times: u32, message: &str) -> Command {
    let script = format!(
        "n=$(cat {c} 2>/dev/null || echo 0); n=$((n+1)); echo $n > {c}; \
         if [ $n -le {f} ]; then echo '{m}' >&2; exit 1; fi; echo applied",
        c = counter.display(),
        f = fail_times,
        m = message,
    );
    Command::new("sh").arg("-c").arg(script)
}

fn runs(counter: &std::path::Path) -> u32 {
    std::fs::read_to_string(counter)
        .unwrap()
        .trim()
        .parse()
        .unwrap()
}

#[test]
fn state_lock_contention_is_retried() {
    let dir = tempdir().unwrap();
    let counter = dir.path().join("count");
    let cmd = flaky_script(&counter, 2, "Error: Error acquiring the state lock");
    let sleeper = RecordingSleeper::new();
    let runner = Runner::with_catalogs([catalogs::terraform()]).with_sleeper(&sleeper);

    let out = runner.run(
        &RetryPolicy::new("terraform apply", 3, Duration::from_secs(2)),
        || run_command(&cmd),
    );

    match out {
        RunOutcome::Success(output) => assert_eq!(output.stdout.trim(), "applied"),
        other => panic!("expected success, got {:?}", other),
    }
    assert_eq!(runs(&counter), 3);
    assert_eq!(sleeper.total(), Duration::from_secs(4));
}

#[test]
fn configuration_error_fails_immediately() {
    let dir = tempdir().unwrap();
    let counter = dir.path().join("count");
    let cmd = flaky_script(&counter, 5, "Error: Unsupported argument");

    let out = run_command_with_retry(
        &cmd,
        &RetryPolicy::new("terraform apply", 3, Duration::from_secs(60)),
        &[catalogs::terraform()],
    );

    assert!(matches!(out, RunOutcome::FatalFailure { attempts_made: 1, .. }));
    assert_eq!(runs(&counter), 1);
}
