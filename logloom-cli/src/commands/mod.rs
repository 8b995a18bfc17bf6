//! Command handlers -- one module per subcommand

pub mod analyze;
pub mod config;
pub mod mine;
pub mod run;
pub mod sequences;
pub mod templates;
pub mod vocab;

use std::path::{Path, PathBuf};

use logloom_core::config::LogloomConfig;
use logloom_miner::store::{self, DataLayout};
use logloom_miner::MinedSource;

use crate::cli::Commands;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Dispatch a data command (everything except `config`).
pub async fn dispatch(
    command: Commands,
    config: &LogloomConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match command {
        Commands::Mine(args) => mine::execute(args, config, writer).await,
        Commands::Vocab(args) => vocab::execute(args, config, writer).await,
        Commands::Sequences(args) => sequences::execute(args, config, writer).await,
        Commands::Run(args) => run::execute(args, config, writer).await,
        Commands::Analyze(args) => analyze::execute(args, config, writer).await,
        Commands::Templates(args) => templates::execute(args, config, writer).await,
        Commands::Config(_) => Err(CliError::Command(
            "config commands are handled before dispatch".to_owned(),
        )),
    }
}

/// Data directory layout from `[general] data_dir`.
fn layout(config: &LogloomConfig) -> DataLayout {
    DataLayout::new(&config.general.data_dir)
}

/// Resolve an optional CLI path against a layout default.
fn or_default(path: Option<PathBuf>, default: impl FnOnce() -> PathBuf) -> PathBuf {
    path.unwrap_or_else(default)
}

/// Load every mined table in `dir`, failing when there is none.
async fn load_mined_sources(dir: &Path) -> Result<Vec<MinedSource>, CliError> {
    let sources = store::load_parsed_dir(dir).await?;
    if sources.is_empty() {
        return Err(CliError::Command(format!(
            "no template files found in {} (run `logloom mine` first)",
            dir.display()
        )));
    }
    Ok(sources)
}
