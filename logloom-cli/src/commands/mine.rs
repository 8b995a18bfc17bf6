//! `logloom mine` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use logloom_core::config::LogloomConfig;
use logloom_miner::MiningPipelineBuilder;
use logloom_miner::store;

use crate::cli::MineArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `mine` command.
///
/// Mines every matching file under the input concurrently and writes one
/// `<stem>_templates.json` per source.
pub async fn execute(
    args: MineArgs,
    config: &LogloomConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let layout = super::layout(config);
    let input = super::or_default(args.input, || layout.raw_dir());
    let output_dir = super::or_default(args.output_dir, || layout.parsed_dir());

    let pipeline = MiningPipelineBuilder::from_core(config).build()?;
    info!(input = %input.display(), "mining templates");
    let mined = pipeline.mine_input(&input).await?;

    let mut sources = Vec::with_capacity(mined.len());
    for source in &mined {
        let path = store::save_mined(&output_dir, source).await?;
        sources.push(MinedRow {
            source: source.source.clone(),
            lines: source.total_lines,
            templates: source.templates.len(),
            path: path.display().to_string(),
        });
    }

    writer.render(&MineReport {
        input: input.display().to_string(),
        output_dir: output_dir.display().to_string(),
        sources,
    })
}

/// Result of a `mine` run.
#[derive(Serialize)]
pub struct MineReport {
    pub input: String,
    pub output_dir: String,
    pub sources: Vec<MinedRow>,
}

/// One mined source.
#[derive(Serialize)]
pub struct MinedRow {
    pub source: String,
    pub lines: u64,
    pub templates: usize,
    pub path: String,
}

impl Render for MineReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Mine: {}", self.input.bold())?;
        if self.sources.is_empty() {
            writeln!(w, "{}", "No log files found.".yellow())?;
            return Ok(());
        }

        writeln!(w, "{:<24} {:>10} {:>10}  Output", "Source", "Lines", "Templates")?;
        writeln!(w, "{}", "-".repeat(72))?;
        for row in &self.sources {
            writeln!(
                w,
                "{:<24} {:>10} {:>10}  {}",
                row.source, row.lines, row.templates, row.path
            )?;
        }

        let lines: u64 = self.sources.iter().map(|r| r.lines).sum();
        writeln!(w)?;
        writeln!(
            w,
            "{} {} sources, {} lines -> {}",
            "✓".green(),
            self.sources.len(),
            lines,
            self.output_dir
        )?;
        Ok(())
    }
}
