//! CLI for the infratest retry engine.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use infratest_core::config::{self, InfratestConfig};
use infratest_core::retry::RetryPolicy;
use std::path::PathBuf;
use std::time::Duration;

use commands::{run_catalogs, run_classify, run_command, run_wait_http};

/// Top-level CLI for infratest.
#[derive(Debug, Parser)]
#[command(name = "infratest")]
#[command(about = "infratest: retry flaky infrastructure actions, fail fast on real errors", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config dir.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Retry budget flags shared by commands that retry.
#[derive(Debug, Clone, Default, Args)]
pub struct PolicyArgs {
    /// Retries after the first attempt (default from config).
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,
    /// Seconds to sleep between attempts (default from config).
    #[arg(long, value_name = "SECS")]
    pub interval_secs: Option<f64>,
}

impl PolicyArgs {
    pub fn policy(&self, description: &str, cfg: &InfratestConfig) -> Result<RetryPolicy> {
        let max_retries = self.max_retries.unwrap_or(cfg.retry.max_retries);
        let interval = match self.interval_secs {
            Some(secs) => Duration::try_from_secs_f64(secs)
                .map_err(|e| anyhow::anyhow!("invalid --interval-secs {}: {}", secs, e))?,
            None => cfg.retry.interval(),
        };
        Ok(RetryPolicy::new(description, max_retries, interval))
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a command, retrying errors matched by the selected catalogs.
    Run {
        /// Built-in catalog to classify errors with (repeatable; default from config).
        #[arg(long = "catalog", value_name = "NAME")]
        catalogs: Vec<String>,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Description used in log messages (default: the command line).
        #[arg(long)]
        description: Option<String>,
        /// Program and arguments, after `--`.
        #[arg(last = true, required = true, value_name = "COMMAND")]
        command: Vec<String>,
    },

    /// Classify an error text as retryable or fatal.
    Classify {
        /// Built-in catalog to classify with (repeatable; default from config).
        #[arg(long = "catalog", value_name = "NAME")]
        catalogs: Vec<String>,
        /// Error text to classify.
        text: String,
    },

    /// List built-in catalogs and their entries.
    Catalogs {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Poll an HTTP endpoint until it returns the expected status and body.
    WaitHttp {
        url: String,
        /// Expected HTTP status.
        #[arg(long, default_value = "200")]
        status: u32,
        /// Text the body must contain.
        #[arg(long, default_value = "")]
        body: String,
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<InfratestConfig> {
    match path {
        Some(p) => config::load_from(p),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(cli.config.as_ref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                catalogs,
                policy,
                description,
                command,
            } => run_command(&cfg, &catalogs, &policy, description.as_deref(), &command)?,
            CliCommand::Classify { catalogs, text } => run_classify(&cfg, &catalogs, &text)?,
            CliCommand::Catalogs { json } => run_catalogs(json)?,
            CliCommand::WaitHttp {
                url,
                status,
                body,
                policy,
            } => run_wait_http(&cfg, &url, status, &body, &policy)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
