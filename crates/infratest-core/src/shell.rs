//! Run external tools (terraform, packer, helm, kubectl, ...) as retryable actions.
//!
//! A failed command renders as its exit status followed by the combined
//! stdout/stderr output, so tool catalogs can classify it by text.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process;

use crate::retry::{ErrorCatalog, RetryPolicy, RunOutcome, Runner};

/// A program invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub working_dir: Option<PathBuf>,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {}", a)?;
        }
        Ok(())
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut s = self.stdout.clone();
        if !s.is_empty() && !self.stderr.is_empty() && !s.ends_with('\n') {
            s.push('\n');
        }
        s.push_str(&self.stderr);
        s
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("'{command}' exited with {status}:\n{}", .output.combined())]
    Failed {
        command: String,
        status: String,
        output: CommandOutput,
    },
}

/// Run `cmd` to completion, capturing stdout and stderr.
pub fn run_command(cmd: &Command) -> Result<CommandOutput, CommandError> {
    tracing::info!(command = %cmd, "running command");
    let mut proc = process::Command::new(&cmd.program);
    proc.args(&cmd.args).envs(&cmd.env);
    if let Some(dir) = &cmd.working_dir {
        proc.current_dir(dir);
    }
    let out = proc.output().map_err(|source| CommandError::Spawn {
        command: cmd.to_string(),
        source,
    })?;

    let output = CommandOutput {
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    };
    if out.status.success() {
        Ok(output)
    } else {
        Err(CommandError::Failed {
            command: cmd.to_string(),
            status: out.status.to_string(),
            output,
        })
    }
}

/// Run `cmd` under `policy`, retrying failures the catalogs recognise.
pub fn run_command_with_retry(
    cmd: &Command,
    policy: &RetryPolicy,
    catalogs: &[&ErrorCatalog],
) -> RunOutcome<CommandOutput, CommandError> {
    Runner::with_catalogs(catalogs.iter().copied()).run(policy, || run_command(cmd))
}
