//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no I/O happens here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use depsight_results::OutputFormat;

/// depsight -- vulnerability and license report generator.
///
/// Merges matching-client results, optionally enriches them with license
/// data, and renders a report.
#[derive(Parser, Debug)]
#[command(name = "depsight", version, about, long_about = None)]
pub struct Cli {
    /// Path to the depsight.toml configuration file.
    ///
    /// When omitted, `depsight.toml` is used if it exists, otherwise defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a report from one or more results files.
    Report(ReportArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- report ----

/// Render vulnerability results.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Results JSON files produced by the matching client.
    #[arg(value_name = "RESULTS_JSON")]
    pub inputs: Vec<PathBuf>,

    /// Report format (table, json, sarif, markdown).
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Look up package licenses and print a license summary.
    #[arg(long)]
    pub licenses: bool,

    /// Comma-separated SPDX identifiers; other licenses are reported as violations.
    #[arg(long, value_delimiter = ',', value_name = "LICENSES")]
    pub license_allowlist: Vec<String>,
}

// ---- config ----

/// Manage depsight configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, licenses, enrichment, output).
        #[arg(long)]
        section: Option<String>,
    },
}
