//! 마이너 설정
//!
//! core의 [`MinerConfig`](logloom_core::config::MinerConfig),
//! [`VocabConfig`](logloom_core::config::VocabConfig),
//! [`SequenceConfig`](logloom_core::config::SequenceConfig)를 기반으로
//! 각 단계 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logloom_core::config::LogloomConfig;
//! use logloom_miner::config::MinerSettings;
//!
//! let core_config = LogloomConfig::default();
//! let settings = MinerSettings::from_core(&core_config.miner);
//! settings.validate()?;
//! ```

use serde::{Deserialize, Serialize};

use logloom_core::config::SPECIAL_TOKEN_COUNT;

use crate::error::MinerError;

/// 입력 파일 최대 크기 기본값 (256 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 256 * 1024 * 1024;

/// 템플릿 마이닝 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerSettings {
    /// 파스 트리 최대 깊이
    pub max_depth: usize,
    /// 유사도 임계값 (0, 1]
    pub sim_threshold: f64,
    /// 템플릿당 예시 라인 보관 수
    pub max_examples: usize,
    /// 공백 외 추가 구분자
    pub extra_delimiters: String,
    /// 수집할 파일 확장자
    pub input_extension: String,

    // --- 확장 설정 (core에 없는 추가 필드) ---
    /// 입력 파일 최대 크기 (바이트)
    pub max_file_size: u64,
}

impl Default for MinerSettings {
    fn default() -> Self {
        Self {
            max_depth: 4,
            sim_threshold: 0.4,
            max_examples: 10,
            extra_delimiters: String::new(),
            input_extension: "log".to_owned(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl MinerSettings {
    /// core의 `MinerConfig`에서 마이너 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값이 적용됩니다.
    pub fn from_core(core: &logloom_core::config::MinerConfig) -> Self {
        Self {
            max_depth: core.max_depth,
            sim_threshold: core.sim_threshold,
            max_examples: core.max_examples,
            extra_delimiters: core.extra_delimiters.clone(),
            input_extension: core.input_extension.clone(),
            ..Self::default()
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), MinerError> {
        if self.max_depth < 1 {
            return Err(MinerError::config("max_depth", "must be at least 1"));
        }

        if !(self.sim_threshold > 0.0 && self.sim_threshold <= 1.0) {
            return Err(MinerError::config(
                "sim_threshold",
                format!("must be in (0, 1], got {}", self.sim_threshold),
            ));
        }

        if self.max_examples == 0 {
            return Err(MinerError::config(
                "max_examples",
                "must be greater than 0",
            ));
        }

        if self.input_extension.is_empty() {
            return Err(MinerError::config("input_extension", "must not be empty"));
        }

        if self.max_file_size == 0 {
            return Err(MinerError::config(
                "max_file_size",
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// 마이너 설정 빌더
///
/// 3개 이상의 설정 필드가 있으므로 빌더 패턴을 사용합니다.
#[derive(Default)]
pub struct MinerSettingsBuilder {
    settings: MinerSettings,
}

impl MinerSettingsBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 트리 최대 깊이를 설정합니다.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.settings.max_depth = depth;
        self
    }

    /// 유사도 임계값을 설정합니다.
    pub fn sim_threshold(mut self, threshold: f64) -> Self {
        self.settings.sim_threshold = threshold;
        self
    }

    /// 템플릿당 예시 보관 수를 설정합니다.
    pub fn max_examples(mut self, max: usize) -> Self {
        self.settings.max_examples = max;
        self
    }

    /// 추가 구분자를 설정합니다.
    pub fn extra_delimiters(mut self, delimiters: impl Into<String>) -> Self {
        self.settings.extra_delimiters = delimiters.into();
        self
    }

    /// 수집할 파일 확장자를 설정합니다.
    pub fn input_extension(mut self, ext: impl Into<String>) -> Self {
        self.settings.input_extension = ext.into();
        self
    }

    /// 입력 파일 최대 크기를 설정합니다.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.settings.max_file_size = bytes;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    pub fn build(self) -> Result<MinerSettings, MinerError> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

/// 어휘 구축 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabSettings {
    /// 최소 빈도
    pub min_freq: u64,
    /// 특수 토큰을 포함한 최대 어휘 크기
    pub max_vocab_size: usize,
}

impl Default for VocabSettings {
    fn default() -> Self {
        Self {
            min_freq: 2,
            max_vocab_size: 50_000,
        }
    }
}

impl VocabSettings {
    /// 설정을 생성하고 검증합니다.
    pub fn new(min_freq: u64, max_vocab_size: usize) -> Result<Self, MinerError> {
        let settings = Self {
            min_freq,
            max_vocab_size,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// core의 `VocabConfig`에서 어휘 설정을 생성합니다.
    pub fn from_core(core: &logloom_core::config::VocabConfig) -> Self {
        Self {
            min_freq: core.min_freq,
            max_vocab_size: core.max_vocab_size,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), MinerError> {
        if self.min_freq < 1 {
            return Err(MinerError::config("min_freq", "must be at least 1"));
        }

        if self.max_vocab_size < SPECIAL_TOKEN_COUNT {
            return Err(MinerError::config(
                "max_vocab_size",
                format!("must be at least {SPECIAL_TOKEN_COUNT} (special tokens)"),
            ));
        }

        Ok(())
    }
}

/// 시퀀스 윈도잉 및 학습 데이터 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceSettings {
    /// 윈도우 크기
    pub window_size: usize,
    /// 윈도우 간 간격
    pub stride: usize,
    /// 패딩/절단 기준 길이
    pub max_length: usize,
    /// 마스킹 확률
    pub mask_prob: f64,
    /// 마스킹 난수 시드
    pub seed: u64,
}

impl Default for SequenceSettings {
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

impl SequenceSettings {
    /// core의 `SequenceConfig`에서 시퀀스 설정을 생성합니다.
    pub fn from_core(core: &logloom_core::config::SequenceConfig) -> Self {
        Self {
            window_size: core.window_size,
            stride: core.stride,
            max_length: core.max_length,
            mask_prob: core.mask_prob,
            seed: core.seed,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), MinerError> {
        if self.window_size < 1 {
            return Err(MinerError::config("window_size", "must be at least 1"));
        }

        if self.stride < 1 {
            return Err(MinerError::config("stride", "must be at least 1"));
        }

        if self.max_length < 1 {
            return Err(MinerError::config("max_length", "must be at least 1"));
        }

        if !(0.0..=1.0).contains(&self.mask_prob) {
            return Err(MinerError::config(
                "mask_prob",
                format!("must be in [0, 1], got {}", self.mask_prob),
            ));
        }

        Ok(())
    }
}

/// 시퀀스 설정 빌더
#[derive(Default)]
pub struct SequenceSettingsBuilder {
    settings: SequenceSettings,
}

impl SequenceSettingsBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 윈도우 크기를 설정합니다.
    pub fn window_size(mut self, size: usize) -> Self {
        self.settings.window_size = size;
        self
    }

    /// 윈도우 간격을 설정합니다.
    pub fn stride(mut self, stride: usize) -> Self {
        self.settings.stride = stride;
        self
    }

    /// 패딩/절단 기준 길이를 설정합니다.
    pub fn max_length(mut self, len: usize) -> Self {
        self.settings.max_length = len;
        self
    }

    /// 마스킹 확률을 설정합니다.
    pub fn mask_prob(mut self, prob: f64) -> Self {
        self.settings.mask_prob = prob;
        self
    }

    /// 난수 시드를 설정합니다.
    pub fn seed(mut self, seed: u64) -> Self {
        self.settings.seed = seed;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    pub fn build(self) -> Result<SequenceSettings, MinerError> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
