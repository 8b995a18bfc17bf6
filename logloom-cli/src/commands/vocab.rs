//! `logloom vocab` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use logloom_core::config::LogloomConfig;
use logloom_miner::store;
use logloom_miner::vocab::SPECIAL_TOKENS;
use logloom_miner::{MiningPipelineBuilder, Vocabulary};

use crate::cli::VocabArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, truncate};

/// Number of learned tokens listed in the report.
const PREVIEW_LEN: usize = 10;

/// Execute the `vocab` command.
///
/// Merges every mined table in the parsed directory and writes the vocabulary.
pub async fn execute(
    args: VocabArgs,
    config: &LogloomConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let layout = super::layout(config);
    let parsed_dir = super::or_default(args.parsed_dir, || layout.parsed_dir());
    let output = super::or_default(args.output, || layout.vocab_path());

    let mut config = config.clone();
    if let Some(min_freq) = args.min_freq {
        config.vocab.min_freq = min_freq;
    }
    if let Some(max_vocab_size) = args.max_vocab_size {
        config.vocab.max_vocab_size = max_vocab_size;
    }
    let pipeline = MiningPipelineBuilder::from_core(&config).build()?;

    let mined = super::load_mined_sources(&parsed_dir).await?;
    info!(sources = mined.len(), parsed_dir = %parsed_dir.display(), "building vocabulary");
    let merged = pipeline.merge(&mined);
    let vocab = pipeline.build_vocabulary(&mined)?;
    store::save_vocab(&output, &vocab).await?;

    writer.render(&VocabReport::new(
        output.display().to_string(),
        mined.len(),
        merged.len(),
        &vocab,
    ))
}

/// Result of a `vocab` run.
#[derive(Serialize)]
pub struct VocabReport {
    pub output: String,
    pub sources: usize,
    pub merged_templates: usize,
    pub vocab_size: usize,
    pub min_freq: u64,
    pub max_vocab_size: usize,
    /// Most frequent learned tokens as `(id, rendering)`.
    pub preview: Vec<(u32, String)>,
}

impl VocabReport {
    fn new(output: String, sources: usize, merged_templates: usize, vocab: &Vocabulary) -> Self {
        Self {
            output,
            sources,
            merged_templates,
            vocab_size: vocab.len(),
            min_freq: vocab.min_freq(),
            max_vocab_size: vocab.max_vocab_size(),
            preview: vocab
                .tokens()
                .skip(SPECIAL_TOKENS.len())
                .take(PREVIEW_LEN)
                .map(|(id, token)| (id, token.to_owned()))
                .collect(),
        }
    }
}

impl Render for VocabReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Vocabulary: {}", self.output.bold())?;
        writeln!(w, "Sources merged: {}", self.sources)?;
        writeln!(w, "Unique templates: {}", self.merged_templates)?;
        writeln!(
            w,
            "Vocabulary size: {} ({} special + {} templates, min_freq={}, max={})",
            self.vocab_size.to_string().green().bold(),
            SPECIAL_TOKENS.len(),
            self.vocab_size.saturating_sub(SPECIAL_TOKENS.len()),
            self.min_freq,
            self.max_vocab_size
        )?;

        if !self.preview.is_empty() {
            writeln!(w)?;
            writeln!(w, "{:>6}  Template", "ID")?;
            writeln!(w, "{}", "-".repeat(72))?;
            for (id, token) in &self.preview {
                writeln!(w, "{id:>6}  {}", truncate(token, 64))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logloom_miner::{MinerSettings, TemplateMiner, VocabularyBuilder};

    fn vocab() -> Vocabulary {
        let mut miner = TemplateMiner::new("app", &MinerSettings::default()).expect("miner");
        miner.add_lines(["disk full", "disk full", "fan ok"]);
        VocabularyBuilder::default().build(&miner.finish().templates)
    }

    #[test]
    fn test_vocab_report_preview_skips_specials() {
        let report = VocabReport::new("vocab.json".to_owned(), 1, 2, &vocab());
        assert_eq!(report.vocab_size, 6);
        assert_eq!(report.preview, vec![(5, "disk full".to_owned())]);
    }

    #[test]
    fn test_vocab_report_render_text() {
        let report = VocabReport::new("vocab.json".to_owned(), 1, 2, &vocab());
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("vocab.json"));
        assert!(output.contains("disk full"));
        assert!(output.contains("min_freq=2"));
    }
}
