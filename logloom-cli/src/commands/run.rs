//! `logloom run` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use logloom_core::config::LogloomConfig;
use logloom_miner::{MiningPipelineBuilder, RunSummary};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command: mine, build the vocabulary, window, write training data.
pub async fn execute(
    args: RunArgs,
    config: &LogloomConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let layout = super::layout(config);
    let input = super::or_default(args.input, || layout.raw_dir());

    let pipeline = MiningPipelineBuilder::from_core(config).build()?;
    info!(input = %input.display(), data_dir = %layout.root().display(), "running full pipeline");
    let summary = pipeline.run(&input, &layout).await?;

    writer.render(&RunReport {
        input: input.display().to_string(),
        data_dir: layout.root().display().to_string(),
        summary,
    })
}

/// Result of a `run`.
#[derive(Serialize)]
pub struct RunReport {
    pub input: String,
    pub data_dir: String,
    #[serde(flatten)]
    pub summary: RunSummary,
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Run: {} -> {}", self.input.bold(), self.data_dir.bold())?;
        if self.summary.sources.is_empty() {
            writeln!(w, "{}", "No log files found.".yellow())?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<24} {:>10} {:>10} {:>10}",
            "Source", "Lines", "Templates", "Windows"
        )?;
        writeln!(w, "{}", "-".repeat(57))?;
        for row in &self.summary.sources {
            writeln!(
                w,
                "{:<24} {:>10} {:>10} {:>10}",
                row.source, row.lines, row.templates, row.sequences
            )?;
        }
        writeln!(w)?;
        writeln!(
            w,
            "{} {} unique templates, vocabulary size {}",
            "✓".green(),
            self.summary.merged_templates,
            self.summary.vocab_size
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logloom_miner::SourceSummary;

    fn report() -> RunReport {
        RunReport {
            input: "data/raw".to_owned(),
            data_dir: "data".to_owned(),
            summary: RunSummary {
                sources: vec![SourceSummary {
                    source: "auth".to_owned(),
                    lines: 40,
                    templates: 3,
                    sequences: 31,
                }],
                merged_templates: 3,
                vocab_size: 8,
            },
        }
    }

    #[test]
    fn test_run_report_render_text() {
        let mut buffer = Vec::new();
        report().render_text(&mut buffer).expect("render should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("auth"));
        assert!(output.contains("31"));
        assert!(output.contains("vocabulary size 8"));
    }

    #[test]
    fn test_run_report_json_is_flat() {
        let json = serde_json::to_value(report()).expect("serialize");
        assert_eq!(json["vocab_size"], 8);
        assert_eq!(json["sources"][0]["source"], "auth");
        assert_eq!(json["data_dir"], "data");
    }
}
