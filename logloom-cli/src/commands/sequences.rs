//! `logloom sequences` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use logloom_core::config::LogloomConfig;
use logloom_miner::MiningPipelineBuilder;
use logloom_miner::store;

use crate::cli::SequencesArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `sequences` command.
///
/// Encodes each mined source with the saved vocabulary and writes
/// `<stem>_sequences.json` and `<stem>_training.json` per source.
pub async fn execute(
    args: SequencesArgs,
    config: &LogloomConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let layout = super::layout(config);
    let parsed_dir = super::or_default(args.parsed_dir, || layout.parsed_dir());
    let vocab_path = super::or_default(args.vocab, || layout.vocab_path());
    let output_dir = super::or_default(args.output_dir, || layout.sequences_dir());
    let training_dir = super::or_default(args.training_dir, || layout.training_dir());

    let mut config = config.clone();
    if let Some(window_size) = args.window_size {
        config.sequence.window_size = window_size;
    }
    let pipeline = MiningPipelineBuilder::from_core(&config).build()?;

    let mined = super::load_mined_sources(&parsed_dir).await?;
    let vocab = store::load_vocab(&vocab_path).await?;
    info!(
        sources = mined.len(),
        vocab_size = vocab.len(),
        window_size = config.sequence.window_size,
        "generating sequences"
    );

    let artifacts = pipeline.build_sequences(&mined, &vocab)?;
    let training = pipeline.build_training(&artifacts)?;
    let mut rows = Vec::with_capacity(artifacts.len());
    for (artifact, training) in artifacts.iter().zip(&training) {
        let path = store::save_sequences(&output_dir, artifact).await?;
        let training_path = store::save_training(&training_dir, training).await?;
        rows.push(SequenceRow {
            source: artifact.source.clone(),
            sequences: artifact.num_sequences,
            path: path.display().to_string(),
            training_path: training_path.display().to_string(),
        });
    }

    writer.render(&SequencesReport {
        output_dir: output_dir.display().to_string(),
        training_dir: training_dir.display().to_string(),
        window_size: config.sequence.window_size,
        vocab_size: vocab.len(),
        sources: rows,
    })
}

/// Result of a `sequences` run.
#[derive(Serialize)]
pub struct SequencesReport {
    pub output_dir: String,
    pub training_dir: String,
    pub window_size: usize,
    pub vocab_size: usize,
    pub sources: Vec<SequenceRow>,
}

/// Windows written for one source.
#[derive(Serialize)]
pub struct SequenceRow {
    pub source: String,
    pub sequences: usize,
    pub path: String,
    pub training_path: String,
}

impl Render for SequencesReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Sequences: {}", self.output_dir.bold())?;
        writeln!(w, "Training:  {}", self.training_dir.bold())?;
        writeln!(
            w,
            "Window size: {}, vocabulary size: {}",
            self.window_size, self.vocab_size
        )?;
        writeln!(w)?;
        writeln!(w, "{:<24} {:>10}  Output", "Source", "Windows")?;
        writeln!(w, "{}", "-".repeat(72))?;
        for row in &self.sources {
            let count = if row.sequences == 0 {
                row.sequences.to_string().yellow()
            } else {
                row.sequences.to_string().normal()
            };
            writeln!(w, "{:<24} {:>10}  {}", row.source, count, row.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_report_render_text() {
        let report = SequencesReport {
            output_dir: "data/sequences".to_owned(),
            training_dir: "data/training".to_owned(),
            window_size: 50,
            vocab_size: 812,
            sources: vec![
                SequenceRow {
                    source: "web".to_owned(),
                    sequences: 951,
                    path: "data/sequences/web_sequences.json".to_owned(),
                    training_path: "data/training/web_training.json".to_owned(),
                },
                SequenceRow {
                    source: "tiny".to_owned(),
                    sequences: 0,
                    path: "data/sequences/tiny_sequences.json".to_owned(),
                    training_path: "data/training/tiny_training.json".to_owned(),
                },
            ],
        };

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Window size: 50"));
        assert!(output.contains("951"));
        assert!(output.contains("tiny_sequences.json"));
        assert!(output.contains("data/training"));
    }
}
