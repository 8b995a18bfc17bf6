//! CLI-specific error types and exit code mapping

use logloom_core::error::LogloomError;
use logloom_miner::MinerError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logloom-core.
    #[error("{0}")]
    Core(#[from] LogloomError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                      |
    /// |------|------------------------------|
    /// | 0    | Success                      |
    /// | 1    | General / command error      |
    /// | 2    | Configuration error          |
    /// | 10   | IO or storage error          |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(LogloomError::Config(_)) => 2,
            Self::Io(_) | Self::Core(LogloomError::Io(_) | LogloomError::Storage(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<MinerError> for CliError {
    fn from(e: MinerError) -> Self {
        Self::Core(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logloom_core::error::{ConfigError, MiningError, StorageError};

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err: CliError = LogloomError::Config(ConfigError::ParseFailed {
            reason: "bad toml".to_owned(),
        })
        .into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_storage_error() {
        let err: CliError = LogloomError::Storage(StorageError::Read {
            path: "data/vocab.json".to_owned(),
            reason: "missing".to_owned(),
        })
        .into();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("test error".to_owned());
        assert_eq!(err.exit_code(), 1, "command error should return exit code 1");
    }

    #[test]
    fn test_exit_code_mining_error() {
        let err: CliError = LogloomError::Mining(MiningError::Task("panicked".to_owned())).into();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_from_miner_config_error_maps_to_config_exit_code() {
        let err: CliError = MinerError::Config {
            field: "window_size".to_owned(),
            reason: "must be at least 1".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("window_size"));
    }

    #[test]
    fn test_from_miner_storage_error_maps_to_io_exit_code() {
        let err: CliError = MinerError::Storage {
            path: "data/parsed/app_templates.json".to_owned(),
            reason: "expected value".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn test_error_display_config() {
        let err = CliError::Config("invalid TOML syntax".to_owned());
        let display_str = err.to_string();
        assert!(display_str.contains("configuration error"));
        assert!(display_str.contains("invalid TOML syntax"));
    }

    #[test]
    fn test_error_display_command() {
        let err = CliError::Command("execution failed".to_owned());
        assert_eq!(err.to_string(), "execution failed");
    }
}
