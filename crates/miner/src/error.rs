//! 마이너 에러 타입
//!
//! [`MinerError`]는 마스킹, 클러스터링, 어휘 구축, 윈도잉, 결과 저장 중에
//! 발생하는 모든 에러를 표현합니다.
//! `From<MinerError> for LogloomError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use logloom_core::error::{ConfigError, LogloomError, MiningError, StorageError};

/// 마이너 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum MinerError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 수집기 에러 (파일 크기 초과, 읽기 실패 등)
    #[error("collector error: {path}: {reason}")]
    Collector {
        /// 입력 파일 경로
        path: String,
        /// 에러 사유
        reason: String,
    },

    /// 결과 파일 저장/로드 에러
    #[error("storage error: {path}: {reason}")]
    Storage {
        /// 대상 파일 경로
        path: String,
        /// 에러 사유
        reason: String,
    },

    /// 서로 맞지 않는 입력 (스트림에 렌더링이 없는 템플릿 ID 등)
    #[error("inconsistent input: {0}")]
    Inconsistent(String),

    /// 마이닝 태스크 실패
    #[error("task error: {0}")]
    Task(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl MinerError {
    /// 설정 에러를 생성합니다.
    pub(crate) fn config(field: &str, reason: impl Into<String>) -> Self {
        MinerError::Config {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }

    /// 스토리지 에러를 생성합니다.
    pub(crate) fn storage(path: &std::path::Path, reason: impl ToString) -> Self {
        MinerError::Storage {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<MinerError> for LogloomError {
    fn from(err: MinerError) -> Self {
        match err {
            MinerError::Config { field, reason } => {
                LogloomError::Config(ConfigError::InvalidValue { field, reason })
            }
            MinerError::Collector { path, reason } => {
                LogloomError::Storage(StorageError::Read { path, reason })
            }
            MinerError::Storage { path, reason } => {
                LogloomError::Storage(StorageError::Artifact { path, reason })
            }
            MinerError::Inconsistent(msg) => LogloomError::Mining(MiningError::Inconsistent(msg)),
            MinerError::Task(msg) => LogloomError::Mining(MiningError::Task(msg)),
            MinerError::Io(e) => LogloomError::Io(e),
            MinerError::Regex(e) => LogloomError::Mining(MiningError::Inconsistent(e.to_string())),
        }
    }
}
