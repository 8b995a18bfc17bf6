//! 에러 타입 — 도메인별 에러 정의

/// logloom 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogloomError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 마이닝/어휘/윈도잉 처리 에러
    #[error("mining error: {0}")]
    Mining(#[from] MiningError),

    /// 결과 파일 저장/로드 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 마이닝 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum MiningError {
    /// 마이닝 태스크 실패 (패닉, 취소 등)
    #[error("mining task failed: {0}")]
    Task(String),

    /// 일관성이 깨진 입력 (알 수 없는 템플릿 ID 등)
    #[error("inconsistent input: {0}")]
    Inconsistent(String),
}

/// 스토리지 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 입력 로그 읽기 실패
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    /// 결과 파일 저장/로드 실패 (I/O, JSON 형식, 검증)
    #[error("artifact {path}: {reason}")]
    Artifact { path: String, reason: String },
}
