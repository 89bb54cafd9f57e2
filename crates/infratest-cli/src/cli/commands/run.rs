//! `infratest run` – run a command under the retry engine.

use anyhow::Result;
use infratest_core::config::InfratestConfig;
use infratest_core::retry::ErrorCatalog;
use infratest_core::shell::{self, Command};

use crate::cli::PolicyArgs;

pub fn run_command(
    cfg: &InfratestConfig,
    catalog_names: &[String],
    policy_args: &PolicyArgs,
    description: Option<&str>,
    argv: &[String],
) -> Result<()> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("no command given"))?;
    let cmd = Command::new(program.as_str()).args(args.iter().cloned());
    let description = description
        .map(str::to_string)
        .unwrap_or_else(|| cmd.to_string());
    let policy = policy_args.policy(&description, cfg)?;
    let catalogs = cfg.effective_catalogs(catalog_names)?;
    let catalog_refs: Vec<&ErrorCatalog> = catalogs.iter().collect();

    let output = shell::run_command_with_retry(&cmd, &policy, &catalog_refs).into_result()?;
    print!("{}", output.stdout);
    eprint!("{}", output.stderr);
    Ok(())
}
