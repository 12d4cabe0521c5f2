//! Manifest resource estimator CLI
//!
//! Reads a rendered multi-document Kubernetes manifest and reports the CPU
//! and memory each workload needs, at its static replica count and at its
//! autoscaler bounds.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::estimate::{self, EstimateOptions};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Manifest resource estimator
#[derive(Parser)]
#[command(name = "kest")]
#[command(author, version, about = "Estimate resource needs of rendered Kubernetes manifests", long_about = None)]
pub struct Cli {
    /// Path to a JSON config file (defaults to ~/.config/kest/config.json)
    #[arg(long, env = "KEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (overrides the configured format)
    #[arg(long)]
    pub format: Option<output::OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub verbose: bool,

    /// Log line format on stderr
    #[arg(long, default_value = "text")]
    pub log_format: output::LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate resources of a rendered manifest
    Estimate {
        /// Rendered manifest to read, `-` for stdin
        #[arg(long, short = 'f')]
        filepath: Option<PathBuf>,

        /// Report detail: 0 per-pod, 1 adds replicas, 2 adds autoscaler bounds and scaled totals
        #[arg(long, short = 'v', value_parser = clap::value_parser!(u8).range(0..=2))]
        verbosity: Option<u8>,

        /// Kind to treat as a workload; repeat to replace the configured list
        #[arg(long = "workload-kind")]
        workload_kinds: Vec<String>,
    },
}

fn init_tracing(verbose: bool, format: output::LogFormat) {
    let default_level = if verbose { "debug" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        output::LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        output::LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_format);

    let config = config::Config::load(cli.config.as_deref())?;
    let format = cli.format.unwrap_or(config.format);

    match cli.command {
        Commands::Estimate {
            filepath,
            verbosity,
            workload_kinds,
        } => {
            let options = EstimateOptions {
                path: filepath.unwrap_or(config.manifest_path),
                verbosity: verbosity.unwrap_or(config.verbosity),
                workload_kinds: if workload_kinds.is_empty() {
                    config.workload_kinds
                } else {
                    workload_kinds
                },
                format,
            };
            tracing::debug!(
                path = %options.path.display(),
                verbosity = options.verbosity,
                "Starting estimate"
            );
            estimate::run_estimate(&options)?;
        }
    }

    Ok(())
}
