//! logloom CLI entry point
//!
//! Loads configuration (file + env overrides + CLI flags), initializes
//! tracing, dispatches the subcommand and maps errors to exit codes.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use logloom_core::config::{GeneralConfig, LogloomConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    let log_level = cli.log_level.as_deref();

    match cli.command {
        // config commands load the file themselves so that invalid files can be reported
        Commands::Config(args) => {
            let mut general = GeneralConfig::default();
            if let Some(level) = log_level {
                general.log_level = level.to_owned();
            }
            logging::init_tracing(&general)?;
            commands::config::execute(args, &cli.config, &writer).await
        }
        command => {
            let config = load_config(&cli.config, log_level).await?;
            logging::init_tracing(&config.general)?;
            logloom_core::metrics::describe_all();
            tracing::debug!(config = %cli.config.display(), "configuration loaded");
            commands::dispatch(command, &config, &writer).await
        }
    }
}

/// Load the configuration and apply the `--log-level` flag on top.
async fn load_config(path: &Path, log_level: Option<&str>) -> Result<LogloomConfig, CliError> {
    let mut config = LogloomConfig::load_or_default(path).await?;
    if let Some(level) = log_level {
        config.general.log_level = level.to_owned();
        config.validate()?;
    }
    Ok(config)
}
