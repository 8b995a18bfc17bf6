//! `logloom templates` command handler

use std::io::Write;

use serde::Serialize;

use logloom_core::config::LogloomConfig;
use logloom_miner::{MiningPipelineBuilder, TemplateStats};

use crate::cli::TemplatesArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, truncate};

/// Execute the `templates` command.
pub async fn execute(
    args: TemplatesArgs,
    config: &LogloomConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let layout = super::layout(config);
    let parsed_dir = super::or_default(args.parsed_dir, || layout.parsed_dir());

    let pipeline = MiningPipelineBuilder::from_core(config).build()?;
    let mined = super::load_mined_sources(&parsed_dir).await?;
    let stats = pipeline.merge(&mined).stats(args.top);

    writer.render(&TemplatesReport::new(
        parsed_dir.display().to_string(),
        stats,
        args.examples,
    ))
}

/// Merged template listing.
#[derive(Serialize)]
pub struct TemplatesReport {
    pub parsed_dir: String,
    #[serde(flatten)]
    pub stats: TemplateStats,
}

impl TemplatesReport {
    /// Keep at most `examples` example lines per template (the newest ones).
    fn new(parsed_dir: String, mut stats: TemplateStats, examples: usize) -> Self {
        for template in &mut stats.top {
            let excess = template.examples.len().saturating_sub(examples);
            template.examples.drain(..excess);
        }
        Self { parsed_dir, stats }
    }
}

impl Render for TemplatesReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Templates: {}", self.parsed_dir.bold())?;
        writeln!(
            w,
            "Total lines: {}, unique templates: {}",
            self.stats.total_lines, self.stats.unique_templates
        )?;
        writeln!(w)?;

        let total = self.stats.total_lines.max(1) as f64;
        for (rank, template) in self.stats.top.iter().enumerate() {
            let share = template.count as f64 / total * 100.0;
            writeln!(
                w,
                "{:>3}. {} {}",
                rank + 1,
                format!("[{} | {share:.1}%]", template.count).green(),
                template.rendering.bold()
            )?;
            writeln!(w, "     source: {}", template.source)?;
            for example in &template.examples {
                writeln!(w, "     - {}", truncate(example, 100).dimmed())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logloom_miner::TopTemplate;

    fn stats() -> TemplateStats {
        TemplateStats {
            total_lines: 4,
            unique_templates: 2,
            top: vec![
                TopTemplate {
                    rendering: "User <*> login successful".to_owned(),
                    count: 3,
                    source: "auth".to_owned(),
                    examples: vec![
                        "User 1 login successful".to_owned(),
                        "User 2 login successful".to_owned(),
                        "User 3 login successful".to_owned(),
                    ],
                },
                TopTemplate {
                    rendering: "Database connection failed".to_owned(),
                    count: 1,
                    source: "db".to_owned(),
                    examples: vec!["Database connection failed".to_owned()],
                },
            ],
        }
    }

    #[test]
    fn test_templates_report_keeps_newest_examples() {
        let report = TemplatesReport::new("data/parsed".to_owned(), stats(), 2);
        assert_eq!(
            report.stats.top[0].examples,
            vec!["User 2 login successful", "User 3 login successful"]
        );
        assert_eq!(report.stats.top[1].examples.len(), 1);
    }

    #[test]
    fn test_templates_report_render_text() {
        let report = TemplatesReport::new("data/parsed".to_owned(), stats(), 1);
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("unique templates: 2"));
        assert!(output.contains("User <*> login successful"));
        assert!(output.contains("75.0%"));
        assert!(output.contains("User 3 login successful"));
        assert!(!output.contains("User 1 login successful"));
    }

    #[test]
    fn test_templates_report_json_is_flat() {
        let report = TemplatesReport::new("data/parsed".to_owned(), stats(), 3);
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["total_lines"], 4);
        assert_eq!(json["top"][0]["count"], 3);
    }
}
