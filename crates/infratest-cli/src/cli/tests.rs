//! CLI parse tests.

use super::{Cli, CliCommand, PolicyArgs};
use clap::Parser;
use infratest_core::config::InfratestConfig;
use std::time::Duration;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_run() {
    match parse(&[
        "infratest",
        "run",
        "--catalog",
        "terraform",
        "--catalog",
        "aws",
        "--max-retries",
        "5",
        "--",
        "terraform",
        "apply",
        "-auto-approve",
    ]) {
        CliCommand::Run {
            catalogs,
            policy,
            description,
            command,
        } => {
            assert_eq!(catalogs, vec!["terraform", "aws"]);
            assert_eq!(policy.max_retries, Some(5));
            assert!(policy.interval_secs.is_none());
            assert!(description.is_none());
            assert_eq!(command, vec!["terraform", "apply", "-auto-approve"]);
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_requires_command() {
    assert!(Cli::try_parse_from(["infratest", "run"]).is_err());
}

#[test]
fn cli_parse_classify() {
    match parse(&["infratest", "classify", "--catalog", "ssh", "connection refused"]) {
        CliCommand::Classify { catalogs, text } => {
            assert_eq!(catalogs, vec!["ssh"]);
            assert_eq!(text, "connection refused");
        }
        _ => panic!("expected Classify"),
    }
}

#[test]
fn cli_parse_catalogs() {
    match parse(&["infratest", "catalogs", "--json"]) {
        CliCommand::Catalogs { json } => assert!(json),
        _ => panic!("expected Catalogs"),
    }
}

#[test]
fn cli_parse_wait_http_defaults() {
    match parse(&["infratest", "wait-http", "http://localhost:8080"]) {
        CliCommand::WaitHttp {
            url, status, body, ..
        } => {
            assert_eq!(url, "http://localhost:8080");
            assert_eq!(status, 200);
            assert_eq!(body, "");
        }
        _ => panic!("expected WaitHttp"),
    }
}

#[test]
fn cli_parse_global_config() {
    let cli = Cli::try_parse_from(["infratest", "catalogs", "--config", "/tmp/x.toml"]).unwrap();
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/x.toml")));
}

#[test]
fn policy_flags_override_config() {
    let cfg = InfratestConfig::default();
    let args = PolicyArgs {
        max_retries: Some(30),
        interval_secs: Some(0.25),
    };
    let p = args.policy("probe", &cfg).unwrap();
    assert_eq!(p.max_retries(), 30);
    assert_eq!(p.interval(), Duration::from_millis(250));

    let p = PolicyArgs::default().policy("probe", &cfg).unwrap();
    assert_eq!(p.max_retries(), cfg.retry.max_retries);
    assert_eq!(p.interval(), cfg.retry.interval());
}

#[test]
fn negative_interval_flag_is_rejected() {
    let args = PolicyArgs {
        max_retries: None,
        interval_secs: Some(-1.0),
    };
    assert!(args.policy("probe", &InfratestConfig::default()).is_err());
}
