//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no side effects or I/O happen here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// logloom -- log template mining and training-sequence preparation.
///
/// Use `logloom <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logloom", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logloom.toml configuration file (missing file means defaults).
    #[arg(short, long, global = true, default_value = "logloom.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mine templates from log files.
    Mine(MineArgs),

    /// Build the template vocabulary from mined tables.
    Vocab(VocabArgs),

    /// Cut vocabulary id streams into windows and write training data.
    Sequences(SequencesArgs),

    /// Mine, build the vocabulary and generate sequences in one go.
    Run(RunArgs),

    /// Show which template a single line would match (read-only).
    Analyze(AnalyzeArgs),

    /// List merged templates with counts and examples.
    Templates(TemplatesArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- mine ----

#[derive(Args, Debug)]
pub struct MineArgs {
    /// Log file or directory (default: <data_dir>/raw).
    pub input: Option<PathBuf>,

    /// Where to write `<stem>_templates.json` (default: <data_dir>/parsed).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

// ---- vocab ----

#[derive(Args, Debug)]
pub struct VocabArgs {
    /// Directory with `*_templates.json` (default: <data_dir>/parsed).
    #[arg(long)]
    pub parsed_dir: Option<PathBuf>,

    /// Vocabulary output path (default: <data_dir>/vocab.json).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Minimum template frequency.
    #[arg(long)]
    pub min_freq: Option<u64>,

    /// Maximum vocabulary size including special tokens.
    #[arg(long)]
    pub max_vocab_size: Option<usize>,
}

// ---- sequences ----

#[derive(Args, Debug)]
pub struct SequencesArgs {
    /// Directory with `*_templates.json` (default: <data_dir>/parsed).
    #[arg(long)]
    pub parsed_dir: Option<PathBuf>,

    /// Vocabulary path (default: <data_dir>/vocab.json).
    #[arg(long)]
    pub vocab: Option<PathBuf>,

    /// Where to write `<stem>_sequences.json` (default: <data_dir>/sequences).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Where to write `<stem>_training.json` (default: <data_dir>/training).
    #[arg(long)]
    pub training_dir: Option<PathBuf>,

    /// Window length.
    #[arg(long)]
    pub window_size: Option<usize>,
}

// ---- run ----

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Log file or directory (default: <data_dir>/raw).
    pub input: Option<PathBuf>,
}

// ---- analyze ----

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Raw log line to analyze.
    pub line: String,

    /// Directory with `*_templates.json` (default: <data_dir>/parsed).
    #[arg(long)]
    pub parsed_dir: Option<PathBuf>,
}

// ---- templates ----

#[derive(Args, Debug)]
pub struct TemplatesArgs {
    /// Directory with `*_templates.json` (default: <data_dir>/parsed).
    #[arg(long)]
    pub parsed_dir: Option<PathBuf>,

    /// Number of templates to show.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Number of example lines per template.
    #[arg(long, default_value_t = 3)]
    pub examples: usize,
}

// ---- config ----

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, miner, vocab, sequence).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_mine_defaults() {
        let cli = Cli::try_parse_from(["logloom", "mine"]).expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("logloom.toml"));
        assert_eq!(cli.output, OutputFormat::Text);
        match cli.command {
            Commands::Mine(args) => {
                assert!(args.input.is_none());
                assert!(args.output_dir.is_none());
            }
            _ => panic!("expected Mine command"),
        }
    }

    #[test]
    fn test_cli_parse_mine_with_paths() {
        let cli = Cli::try_parse_from(["logloom", "mine", "logs/app.log", "--output-dir", "out"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Mine(args) => {
                assert_eq!(args.input, Some(PathBuf::from("logs/app.log")));
                assert_eq!(args.output_dir, Some(PathBuf::from("out")));
            }
            _ => panic!("expected Mine command"),
        }
    }

    #[test]
    fn test_cli_parse_vocab_overrides() {
        let cli = Cli::try_parse_from([
            "logloom",
            "vocab",
            "--min-freq",
            "3",
            "--max-vocab-size",
            "100",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Vocab(args) => {
                assert_eq!(args.min_freq, Some(3));
                assert_eq!(args.max_vocab_size, Some(100));
                assert!(args.output.is_none());
            }
            _ => panic!("expected Vocab command"),
        }
    }

    #[test]
    fn test_cli_parse_sequences_window_size() {
        let cli = Cli::try_parse_from(["logloom", "sequences", "--window-size", "8"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Sequences(args) => {
                assert_eq!(args.window_size, Some(8));
                assert!(args.training_dir.is_none());
            }
            _ => panic!("expected Sequences command"),
        }
    }

    #[test]
    fn test_cli_parse_analyze_requires_line() {
        assert!(Cli::try_parse_from(["logloom", "analyze"]).is_err());

        let cli = Cli::try_parse_from(["logloom", "analyze", "User 42 login successful"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Analyze(args) => assert_eq!(args.line, "User 42 login successful"),
            _ => panic!("expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_parse_templates_defaults() {
        let cli = Cli::try_parse_from(["logloom", "templates"]).expect("parse succeeded");
        match cli.command {
            Commands::Templates(args) => {
                assert_eq!(args.top, 20);
                assert_eq!(args.examples, 3);
            }
            _ => panic!("expected Templates command"),
        }
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "logloom",
            "run",
            "--output",
            "json",
            "--log-level",
            "debug",
            "--config",
            "/etc/logloom.toml",
        ])
        .expect("parse succeeded");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.config, PathBuf::from("/etc/logloom.toml"));
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from(["logloom", "config", "show", "--section", "miner"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Config(args) => match args.action {
                ConfigAction::Show { section } => assert_eq!(section.as_deref(), Some("miner")),
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_output_format() {
        assert!(Cli::try_parse_from(["logloom", "--output", "yaml", "mine"]).is_err());
    }
}
