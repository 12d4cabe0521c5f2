//! Configuration management for the CLI
//!
//! Settings are layered: built-in defaults, then an optional JSON file,
//! then `KEST_*` environment variables. Command-line flags win over all of
//! them and are applied by the caller.

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use estimator_lib::manifest::DEFAULT_WORKLOAD_KINDS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Highest supported report verbosity
pub const MAX_VERBOSITY: u8 = 2;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Manifest read when no `--filepath` is given
    pub manifest_path: PathBuf,
    /// Default report verbosity
    pub verbosity: u8,
    /// Default output format
    pub format: OutputFormat,
    /// Kinds treated as replicated workloads
    pub workload_kinds: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from("rendered.yml"),
            verbosity: 0,
            format: OutputFormat::Table,
            workload_kinds: DEFAULT_WORKLOAD_KINDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// An explicitly given file must exist; the default location is optional.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let (path, required) = match override_path {
            Some(path) => (Some(path.to_path_buf()), true),
            None => (Self::config_path().ok(), false),
        };

        let mut builder = ::config::Config::builder();

        if let Some(path) = &path {
            builder = builder.add_source(
                ::config::File::new(&path.to_string_lossy(), ::config::FileFormat::Json)
                    .required(required),
            );
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix("KEST")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("workload_kinds"),
            )
            .build()
            .context("Failed to load configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;

        anyhow::ensure!(
            config.verbosity <= MAX_VERBOSITY,
            "Configured verbosity {} is above the maximum of {}",
            config.verbosity,
            MAX_VERBOSITY
        );

        Ok(config)
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("kest").join("config.json"))
    }
}
