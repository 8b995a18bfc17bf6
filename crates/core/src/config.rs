//! 설정 관리 — logloom.toml 파싱 및 런타임 설정
//!
//! [`LogloomConfig`]는 모든 단계의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGLOOM_MINER_SIM_THRESHOLD=0.5` 형식)
//! 3. 설정 파일 (`logloom.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logloom_core::error::LogloomError> {
//! use logloom_core::config::LogloomConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogloomConfig::load("logloom.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogloomConfig::parse("[miner]\nsim_threshold = 0.5")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogloomError};

/// 어휘에 항상 예약되는 특수 토큰 수 (`<PAD>`, `<UNK>`, `<MASK>`, `<CLS>`, `<SEP>`)
pub const SPECIAL_TOKEN_COUNT: usize = 5;

/// logloom 통합 설정
///
/// `logloom.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 단계는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogloomConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 템플릿 마이닝 설정
    #[serde(default)]
    pub miner: MinerConfig,
    /// 어휘 구축 설정
    #[serde(default)]
    pub vocab: VocabConfig,
    /// 시퀀스 윈도잉 설정
    #[serde(default)]
    pub sequence: SequenceConfig,
}

impl LogloomConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogloomError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값에서 시작합니다.
    ///
    /// 파일이 존재하면 [`load`](Self::load)와 동일하게 동작합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, LogloomError> {
        let path = path.as_ref();
        let mut config = match Self::from_file(path).await {
            Ok(config) => config,
            Err(LogloomError::Config(ConfigError::FileNotFound { .. })) => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogloomError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogloomError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogloomError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogloomError> {
        toml::from_str(toml_str).map_err(|e| {
            LogloomError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGLOOM_{SECTION}_{FIELD}`
    /// 예: `LOGLOOM_VOCAB_MIN_FREQ=3`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGLOOM_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGLOOM_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.data_dir, "LOGLOOM_GENERAL_DATA_DIR");

        // Miner
        override_usize(&mut self.miner.max_depth, "LOGLOOM_MINER_MAX_DEPTH");
        override_f64(&mut self.miner.sim_threshold, "LOGLOOM_MINER_SIM_THRESHOLD");
        override_usize(&mut self.miner.max_examples, "LOGLOOM_MINER_MAX_EXAMPLES");
        override_string(
            &mut self.miner.extra_delimiters,
            "LOGLOOM_MINER_EXTRA_DELIMITERS",
        );
        override_string(
            &mut self.miner.input_extension,
            "LOGLOOM_MINER_INPUT_EXTENSION",
        );

        // Vocab
        override_u64(&mut self.vocab.min_freq, "LOGLOOM_VOCAB_MIN_FREQ");
        override_usize(&mut self.vocab.max_vocab_size, "LOGLOOM_VOCAB_MAX_VOCAB_SIZE");

        // Sequence
        override_usize(&mut self.sequence.window_size, "LOGLOOM_SEQUENCE_WINDOW_SIZE");
        override_usize(&mut self.sequence.stride, "LOGLOOM_SEQUENCE_STRIDE");
        override_usize(&mut self.sequence.max_length, "LOGLOOM_SEQUENCE_MAX_LENGTH");
        override_f64(&mut self.sequence.mask_prob, "LOGLOOM_SEQUENCE_MASK_PROB");
        override_u64(&mut self.sequence.seed, "LOGLOOM_SEQUENCE_SEED");
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 범위를 벗어난 값은 조용히 보정하지 않고 에러로 거부합니다.
    pub fn validate(&self) -> Result<(), LogloomError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.miner.max_depth < 1 {
            return Err(invalid("miner.max_depth", "must be at least 1".to_owned()));
        }

        if !(self.miner.sim_threshold > 0.0 && self.miner.sim_threshold <= 1.0) {
            return Err(invalid(
                "miner.sim_threshold",
                format!("must be in (0, 1], got {}", self.miner.sim_threshold),
            ));
        }

        if self.miner.max_examples == 0 {
            return Err(invalid(
                "miner.max_examples",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.miner.input_extension.is_empty() {
            return Err(invalid(
                "miner.input_extension",
                "must not be empty".to_owned(),
            ));
        }

        if self.vocab.min_freq == 0 {
            return Err(invalid("vocab.min_freq", "must be at least 1".to_owned()));
        }

        if self.vocab.max_vocab_size < SPECIAL_TOKEN_COUNT {
            return Err(invalid(
                "vocab.max_vocab_size",
                format!("must be at least {SPECIAL_TOKEN_COUNT} (special tokens)"),
            ));
        }

        if self.sequence.window_size < 1 {
            return Err(invalid(
                "sequence.window_size",
                "must be at least 1".to_owned(),
            ));
        }

        if self.sequence.stride < 1 {
            return Err(invalid("sequence.stride", "must be at least 1".to_owned()));
        }

        if self.sequence.max_length < 1 {
            return Err(invalid(
                "sequence.max_length",
                "must be at least 1".to_owned(),
            ));
        }

        if !(0.0..=1.0).contains(&self.sequence.mask_prob) {
            return Err(invalid(
                "sequence.mask_prob",
                format!("must be in [0, 1], got {}", self.sequence.mask_prob),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> LogloomError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 데이터 디렉토리 (raw/, parsed/, sequences/, vocab.json 의 기준 경로)
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            data_dir: "data".to_owned(),
        }
    }
}

/// 템플릿 마이닝 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// 파스 트리 최대 깊이 (루트 + 길이 버킷 + 토큰 레벨들)
    pub max_depth: usize,
    /// 유사도 임계값 (0, 1]
    pub sim_threshold: f64,
    /// 템플릿당 보관할 예시 라인 수
    pub max_examples: usize,
    /// 공백 외에 추가로 토큰 구분자로 취급할 문자들
    pub extra_delimiters: String,
    /// 입력 디렉토리에서 수집할 파일 확장자
    pub input_extension: String,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            sim_threshold: 0.4,
            max_examples: 10,
            extra_delimiters: String::new(),
            input_extension: "log".to_owned(),
        }
    }
}

/// 어휘 구축 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabConfig {
    /// 어휘에 포함될 최소 빈도
    pub min_freq: u64,
    /// 특수 토큰을 포함한 최대 어휘 크기
    pub max_vocab_size: usize,
}

impl Default for VocabConfig {
    fn default() -> Self {
        Self {
            min_freq: 2,
            max_vocab_size: 50_000,
        }
    }
}

/// 시퀀스 윈도잉 및 학습 데이터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// 윈도우 크기
    pub window_size: usize,
    /// 윈도우 간 간격
    pub stride: usize,
    /// 모델 최대 입력 길이 (패딩/절단 기준)
    pub max_length: usize,
    /// 마스크 언어 모델 라벨 생성 시 마스킹 확률
    pub mask_prob: f64,
    /// 마스킹 난수 시드
    pub seed: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            window_size: 50,
            stride: 1,
            max_length: 512,
            mask_prob: 0.15,
            seed: 42,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_f64(target: &mut f64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<f64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse f64 from env var, ignoring"
            ),
        }
    }
}
