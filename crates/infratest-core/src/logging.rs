//! Logging init: append to a log file under the XDG state dir, echoing
//! warnings (retry notices) to stderr. Falls back to stderr only.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,infratest_core=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn file_subscriber(file: fs::File) -> impl tracing::Subscriber + Send + Sync + 'static {
    let writer = Mutex::new(file).and(io::stderr.with_max_level(Level::WARN));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .finish()
}

/// Path of the log file: `~/.local/state/infratest/infratest.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("infratest")?;
    Ok(xdg_dirs.get_state_home().join("infratest.log"))
}

/// Install the file logger. Errors (unwritable state dir, subscriber already
/// set) are returned so the caller can use [`init_logging_stderr`] instead.
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    tracing::subscriber::set_global_default(file_subscriber(file))
        .map_err(|e| anyhow::anyhow!("install log subscriber: {}", e))?;
    tracing::info!(path = %path.display(), "logging initialized");
    Ok(())
}

/// Log to stderr only.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
