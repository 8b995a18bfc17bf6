//! 시퀀스 윈도잉 -- 어휘 ID 스트림을 고정 길이 윈도우로 자릅니다.

use serde::{Deserialize, Serialize};
use tracing::info;

use logloom_core::metrics as m;

use crate::config::SequenceSettings;
use crate::error::MinerError;

/// ID 스트림에서 `window_size` 길이 윈도우를 `stride` 간격으로 생성합니다.
///
/// 스트림이 윈도우보다 짧으면 빈 이터레이터를 반환합니다.
/// stride 1일 때 윈도우 수는 `max(0, len - window_size + 1)`입니다.
pub fn windows(
    ids: &[u32],
    window_size: usize,
    stride: usize,
) -> Result<impl Iterator<Item = &[u32]>, MinerError> {
    if window_size < 1 {
        return Err(MinerError::config("window_size", "must be at least 1"));
    }
    if stride < 1 {
        return Err(MinerError::config("stride", "must be at least 1"));
    }
    Ok(ids.windows(window_size).step_by(stride))
}

/// 소스 하나의 시퀀스 결과 (`<stem>_sequences.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceArtifact {
    /// 소스 이름
    pub source: String,
    /// 윈도우 목록
    pub sequences: Vec<Vec<u32>>,
    /// 윈도우 크기
    pub window_size: usize,
    /// 윈도우 수
    pub num_sequences: usize,
    /// 어휘 크기 (특수 토큰 포함)
    pub vocab_size: usize,
}

impl SequenceArtifact {
    /// ID 스트림에서 시퀀스 결과를 만듭니다.
    pub fn build(
        source: &str,
        ids: &[u32],
        settings: &SequenceSettings,
        vocab_size: usize,
    ) -> Result<Self, MinerError> {
        settings.validate()?;
        let sequences: Vec<Vec<u32>> = windows(ids, settings.window_size, settings.stride)?
            .map(<[u32]>::to_vec)
            .collect();

        metrics::counter!(m::SEQUENCE_WINDOWS_TOTAL, m::LABEL_SOURCE => source.to_owned())
            .increment(sequences.len() as u64);
        info!(
            source,
            stream_len = ids.len(),
            windows = sequences.len(),
            window_size = settings.window_size,
            "sequences generated"
        );

        Ok(Self {
            source: source.to_owned(),
            num_sequences: sequences.len(),
            sequences,
            window_size: settings.window_size,
            vocab_size,
        })
    }
}
