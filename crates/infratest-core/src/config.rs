use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalogs;
use crate::retry::{CatalogError, ErrorCatalog, RetryPolicy};

/// Retry policy parameters (`[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Fixed delay between attempts in seconds (e.g. 0.25 = 250ms).
    pub interval_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            interval_secs: 5.0,
        }
    }
}

impl RetryConfig {
    /// Interval as a `Duration`; negative or non-finite values clamp to zero.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs).unwrap_or(Duration::ZERO)
    }

    /// Build a policy from this section.
    pub fn policy(&self, description: impl Into<String>) -> RetryPolicy {
        RetryPolicy::new(description, self.max_retries, self.interval())
    }
}

/// One user-defined retryable error: a regex over the rendered error text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryableErrorConfig {
    /// Entry id; reusing a built-in id overrides that entry.
    pub id: String,
    pub pattern: String,
    #[serde(default)]
    pub note: String,
}

/// Global configuration loaded from `~/.config/infratest/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfratestConfig {
    /// Built-in catalogs used when a command names none.
    #[serde(default = "default_catalogs")]
    pub default_catalogs: Vec<String>,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Extra entries, merged after the built-in catalogs.
    #[serde(default)]
    pub retryable_errors: Vec<RetryableErrorConfig>,
}

fn default_catalogs() -> Vec<String> {
    vec!["terraform".to_string()]
}

impl Default for InfratestConfig {
    fn default() -> Self {
        Self {
            default_catalogs: default_catalogs(),
            retry: RetryConfig::default(),
            retryable_errors: Vec::new(),
        }
    }
}

impl InfratestConfig {
    /// Compile `retryable_errors` into a catalog named `config`.
    pub fn user_catalog(&self) -> Result<ErrorCatalog, CatalogError> {
        let mut catalog = ErrorCatalog::new("config");
        for e in &self.retryable_errors {
            catalog = catalog.with_regex(&e.id, &e.pattern, &e.note)?;
        }
        Ok(catalog)
    }

    /// Resolve `names` (or `default_catalogs` when empty) to built-in catalogs,
    /// then append the user catalog so its ids override built-in ones.
    pub fn effective_catalogs(&self, names: &[String]) -> Result<Vec<ErrorCatalog>> {
        let names = if names.is_empty() {
            self.default_catalogs.as_slice()
        } else {
            names
        };
        let mut out = Vec::with_capacity(names.len() + 1);
        for name in names {
            let catalog = catalogs::by_name(name).with_context(|| {
                format!(
                    "unknown catalog {:?} (known: {})",
                    name,
                    catalogs::names().join(", ")
                )
            })?;
            out.push(catalog.clone());
        }
        out.push(self.user_catalog()?);
        Ok(out)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("infratest")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<InfratestConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = InfratestConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<InfratestConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: InfratestConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
