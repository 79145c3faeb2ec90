//! depsight -- merge vulnerability results, enrich licenses, render reports.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use depsight_core::config::GeneralConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.should_print() {
                eprintln!("{e}");
            }
            debug!(exit_code = e.exit_code(), "exiting with error");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    depsight_core::metrics::describe_all();

    match cli.command {
        Commands::Report(args) => {
            let config = commands::load_config(cli.config.as_deref()).await?;
            init_logging(&config.general, cli.log_level)?;
            commands::report::execute(args, config).await
        }
        Commands::Config(args) => {
            init_logging(&GeneralConfig::default(), cli.log_level)?;
            commands::config::execute(args, cli.config.as_deref()).await
        }
    }
}

fn init_logging(general: &GeneralConfig, log_level: Option<String>) -> Result<(), CliError> {
    logging::init_tracing(general, log_level.as_deref())
        .map_err(|e| CliError::Command(e.to_string()))
}
