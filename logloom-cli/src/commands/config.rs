//! `logloom config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use logloom_core::config::LogloomConfig;
use logloom_core::error::{ConfigError, LogloomError};

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Section names accepted by `config show --section`.
const SECTIONS: [&str; 4] = ["general", "miner", "vocab", "sequence"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration, reporting the result.
///
/// A missing file is valid (defaults apply). Returns `CliError::Config`
/// when the file does not parse or a value is out of range.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match LogloomConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport::valid(config_path, false),
        Err(LogloomError::Config(ConfigError::FileNotFound { .. })) => {
            // missing file: validate defaults plus env overrides
            let mut config = LogloomConfig::default();
            config.apply_env_overrides();
            match config.validate() {
                Ok(()) => ConfigValidationReport::valid(config_path, true),
                Err(e) => ConfigValidationReport::invalid(config_path, e),
            }
        }
        Err(e) => ConfigValidationReport::invalid(config_path, e),
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Show the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = LogloomConfig::load_or_default(config_path).await?;
    let config_toml = match section.as_deref() {
        None => to_toml(&config)?,
        Some("general") => to_toml(&config.general)?,
        Some("miner") => to_toml(&config.miner)?,
        Some("vocab") => to_toml(&config.vocab)?,
        Some("sequence") => to_toml(&config.sequence)?,
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {other} (expected: {})",
                SECTIONS.join(", ")
            )));
        }
    };

    writer.render(&ConfigReport {
        source: config_path.display().to_string(),
        section,
        config: toml_to_json(&config_toml)?,
        config_toml,
    })
}

fn to_toml<T: Serialize>(value: &T) -> Result<String, CliError> {
    toml::to_string_pretty(value)
        .map_err(|e| CliError::Command(format!("failed to serialize configuration: {e}")))
}

fn toml_to_json(config_toml: &str) -> Result<serde_json::Value, CliError> {
    let value: toml::Value = toml::from_str(config_toml)
        .map_err(|e| CliError::Command(format!("failed to re-read configuration: {e}")))?;
    Ok(serde_json::to_value(value)?)
}

/// Configuration display report.
///
/// Text output prints the TOML; JSON output carries the same data as an object.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Effective configuration as JSON
    pub config: serde_json::Value,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.section {
            Some(section) => writeln!(
                w,
                "Configuration {} (source: {})",
                format!("[{section}]").bold(),
                self.source
            )?,
            None => writeln!(w, "Configuration (source: {})", self.source.bold())?,
        }
        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;
        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// True when the file was missing and defaults were validated
    pub defaults: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl ConfigValidationReport {
    fn valid(path: &Path, defaults: bool) -> Self {
        Self {
            source: path.display().to_string(),
            valid: true,
            defaults,
            errors: Vec::new(),
        }
    }

    fn invalid(path: &Path, error: LogloomError) -> Self {
        Self {
            source: path.display().to_string(),
            valid: false,
            defaults: false,
            errors: vec![error.to_string()],
        }
    }
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
            if self.defaults {
                writeln!(w, "  Note: file not found, defaults apply")?;
            }
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_report_render_text_section() {
        let report = ConfigReport {
            source: "logloom.toml".to_owned(),
            section: Some("miner".to_owned()),
            config: serde_json::Value::Null,
            config_toml: "max_depth = 4\n".to_owned(),
        };

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("[miner]"));
        assert!(output.contains("max_depth = 4"));
    }

    #[test]
    fn test_config_report_json_skips_toml_text() {
        let config_toml = to_toml(&LogloomConfig::default().sequence).expect("toml");
        let report = ConfigReport {
            source: "logloom.toml".to_owned(),
            section: Some("sequence".to_owned()),
            config: toml_to_json(&config_toml).expect("json"),
            config_toml,
        };

        let json = serde_json::to_value(&report).expect("serialize");
        assert!(json.get("config_toml").is_none());
        assert_eq!(json["config"]["window_size"], 50);
        assert_eq!(json["section"], "sequence");
    }

    #[test]
    fn test_full_config_toml_has_all_sections() {
        let config_toml = to_toml(&LogloomConfig::default()).expect("toml");
        for section in SECTIONS {
            assert!(
                config_toml.contains(&format!("[{section}]")),
                "missing section {section}"
            );
        }
    }

    #[test]
    fn test_validation_report_defaults_note() {
        let report = ConfigValidationReport::valid(Path::new("missing.toml"), true);
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("VALID"));
        assert!(output.contains("defaults apply"));
    }

    #[test]
    fn test_validation_report_invalid() {
        let error = LogloomError::Config(ConfigError::InvalidValue {
            field: "miner.sim_threshold".to_owned(),
            reason: "must be in (0, 1], got 1.5".to_owned(),
        });
        let report = ConfigValidationReport::invalid(Path::new("bad.toml"), error);
        assert!(!report.valid);

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("INVALID"));
        assert!(output.contains("miner.sim_threshold"));
    }
}
