//! `logloom analyze` command handler
//!
//! Read-only: the tree is rebuilt from the saved tables and nothing is written back.

use std::io::Write;

use serde::Serialize;

use logloom_core::config::LogloomConfig;
use logloom_core::types::render_tokens;
use logloom_miner::{Analysis, Lookup, MiningPipelineBuilder, TemplateMiner, TemplateTable};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `analyze` command.
pub async fn execute(
    args: AnalyzeArgs,
    config: &LogloomConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let layout = super::layout(config);
    let parsed_dir = super::or_default(args.parsed_dir, || layout.parsed_dir());

    let pipeline = MiningPipelineBuilder::from_core(config).build()?;
    let mined = super::load_mined_sources(&parsed_dir).await?;
    let table = pipeline.merge(&mined);
    let miner = TemplateMiner::from_table("analyze", &table, pipeline.miner_settings())?;

    let analysis = miner.analyze(&args.line);
    writer.render(&AnalyzeReport::new(&args.line, &analysis, &miner, &table))
}

/// Result of analyzing one line.
#[derive(Serialize)]
pub struct AnalyzeReport {
    pub line: String,
    pub masked: String,
    /// `"match"` or `"new"`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generalized: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl AnalyzeReport {
    fn new(line: &str, analysis: &Analysis, miner: &TemplateMiner, table: &TemplateTable) -> Self {
        let masked = render_tokens(&analysis.tokens);
        match &analysis.lookup {
            Lookup::Match {
                template_id,
                score,
                generalized,
            } => {
                let template = miner.rendering(*template_id);
                let count = template
                    .as_deref()
                    .and_then(|rendering| table.get(rendering))
                    .map(|record| record.count);
                Self {
                    line: line.to_owned(),
                    masked,
                    status: "match",
                    template,
                    generalized: Some(render_tokens(generalized)),
                    similarity: Some(*score),
                    count,
                }
            }
            Lookup::New => Self {
                line: line.to_owned(),
                masked,
                status: "new",
                template: None,
                generalized: None,
                similarity: None,
                count: None,
            },
        }
    }
}

impl Render for AnalyzeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Line:     {}", self.line)?;
        writeln!(w, "Masked:   {}", self.masked.cyan())?;

        match (&self.template, self.similarity) {
            (Some(template), Some(score)) => {
                writeln!(w, "Result:   {}", "MATCH".green().bold())?;
                writeln!(w, "Template: {}", template.bold())?;
                if let Some(generalized) = self.generalized.as_ref().filter(|g| *g != template) {
                    writeln!(w, "Would become: {generalized}")?;
                }
                writeln!(w, "Similarity: {score:.3}")?;
                if let Some(count) = self.count {
                    writeln!(w, "Count:    {count}")?;
                }
            }
            _ => {
                writeln!(w, "Result:   {}", "NEW TEMPLATE".yellow().bold())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logloom_miner::MinerSettings;

    fn setup() -> (TemplateMiner, TemplateTable) {
        let mut miner = TemplateMiner::new("app", &MinerSettings::default()).expect("miner");
        miner.add_lines(["disk full on sda", "disk full on sdb"]);
        let table = miner.snapshot().templates;
        let rebuilt =
            TemplateMiner::from_table("analyze", &table, &MinerSettings::default()).expect("miner");
        (rebuilt, table)
    }

    #[test]
    fn test_analyze_report_match() {
        let (miner, table) = setup();
        let analysis = miner.analyze("disk full on sdc");
        let report = AnalyzeReport::new("disk full on sdc", &analysis, &miner, &table);

        assert_eq!(report.status, "match");
        assert_eq!(report.template.as_deref(), Some("disk full on <*>"));
        assert_eq!(report.similarity, Some(1.0));
        assert_eq!(report.count, Some(2));

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("MATCH"));
        assert!(output.contains("disk full on <*>"));
    }

    #[test]
    fn test_analyze_report_new() {
        let (miner, table) = setup();
        let analysis = miner.analyze("fan speed nominal");
        let report = AnalyzeReport::new("fan speed nominal", &analysis, &miner, &table);

        assert_eq!(report.status, "new");
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["status"], "new");
        assert!(json.get("similarity").is_none());
    }
}
