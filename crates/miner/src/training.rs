//! 학습 데이터 헬퍼 -- 윈도우를 모델 입력 형태로 변환합니다.
//!
//! - [`TrainingPair`]: 다음 토큰 예측용 입력/타깃 쌍
//! - [`MaskedLmBatch`]: 마스크 언어 모델용 입력/라벨 (시드 고정)
//! - [`attention_mask`], [`pad_or_truncate`]
//! - [`TrainingArtifact`]: 소스 하나의 학습 데이터 (`<stem>_training.json`)

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SequenceSettings;
use crate::error::MinerError;
use crate::sequence::SequenceArtifact;
use crate::vocab::{MASK_ID, PAD_ID};

/// 손실 계산에서 제외되는 라벨 값
pub const IGNORE_LABEL: i64 = -100;

/// 시퀀스를 `max_length`로 자르거나 `pad_id`로 오른쪽을 채웁니다.
pub fn pad_or_truncate(seq: &[u32], max_length: usize, pad_id: u32) -> Vec<u32> {
    let mut out: Vec<u32> = seq.iter().copied().take(max_length).collect();
    out.resize(max_length, pad_id);
    out
}

/// 패딩이 아닌 위치는 1, 패딩 위치는 0인 마스크를 반환합니다.
pub fn attention_mask(seq: &[u32], pad_id: u32) -> Vec<u8> {
    seq.iter().map(|&id| u8::from(id != pad_id)).collect()
}

/// 다음 토큰 예측 학습 쌍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPair {
    /// 입력 (`window[..n-1]`)
    pub input: Vec<u32>,
    /// 타깃 (`window[1..]`)
    pub target: Vec<u32>,
}

impl TrainingPair {
    /// 윈도우에서 학습 쌍을 만듭니다.
    ///
    /// 길이 1 이하 윈도우는 입력/타깃이 모두 패딩입니다.
    pub fn from_window(window: &[u32], max_length: usize, pad_id: u32) -> Self {
        let (input, target) = match window.len() {
            0 => (&[][..], &[][..]),
            n => (&window[..n - 1], &window[1..]),
        };
        Self {
            input: pad_or_truncate(input, max_length, pad_id),
            target: pad_or_truncate(target, max_length, pad_id),
        }
    }

    /// 여러 윈도우에서 학습 쌍 목록을 만듭니다.
    pub fn from_windows<'a>(
        windows: impl IntoIterator<Item = &'a [u32]>,
        max_length: usize,
    ) -> Vec<Self> {
        windows
            .into_iter()
            .map(|w| Self::from_window(w, max_length, PAD_ID))
            .collect()
    }

    /// 입력의 어텐션 마스크를 반환합니다.
    pub fn attention_mask(&self) -> Vec<u8> {
        attention_mask(&self.input, PAD_ID)
    }
}

/// 마스크 언어 모델 배치
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedLmBatch {
    /// 일부 위치가 마스크 ID로 바뀐 입력
    pub inputs: Vec<Vec<u32>>,
    /// 마스킹된 위치는 원래 ID, 나머지는 [`IGNORE_LABEL`]
    pub labels: Vec<Vec<i64>>,
}

impl MaskedLmBatch {
    /// 시퀀스마다 패딩이 아닌 위치를 `mask_prob` 확률로 마스킹합니다.
    ///
    /// 같은 시드와 입력이면 항상 같은 결과를 냅니다.
    pub fn from_sequences(
        sequences: &[Vec<u32>],
        mask_prob: f64,
        mask_id: u32,
        seed: u64,
    ) -> Result<Self, MinerError> {
        if !(0.0..=1.0).contains(&mask_prob) {
            return Err(MinerError::config(
                "mask_prob",
                format!("must be in [0, 1], got {mask_prob}"),
            ));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut inputs = Vec::with_capacity(sequences.len());
        let mut labels = Vec::with_capacity(sequences.len());

        for seq in sequences {
            let mut input = seq.clone();
            let mut label = vec![IGNORE_LABEL; seq.len()];
            for (pos, id) in input.iter_mut().enumerate() {
                if *id == PAD_ID {
                    continue;
                }
                if rng.random_bool(mask_prob) {
                    label[pos] = i64::from(*id);
                    *id = mask_id;
                }
            }
            inputs.push(input);
            labels.push(label);
        }

        Ok(Self { inputs, labels })
    }

    /// 배치 크기
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// 배치가 비었는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// 소스 하나의 학습 데이터 (`<stem>_training.json`)
///
/// 시퀀스 결과의 윈도우마다 학습 쌍, 어텐션 마스크, 마스크 언어 모델 입력을 담습니다.
/// 마스크 언어 모델 입력은 `max_length`로 맞춘 윈도우에서 만듭니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingArtifact {
    /// 소스 이름
    pub source: String,
    /// 패딩/절단 기준 길이
    pub max_length: usize,
    /// 마스킹 확률
    pub mask_prob: f64,
    /// 마스킹 난수 시드
    pub seed: u64,
    /// 어휘 크기 (특수 토큰 포함)
    pub vocab_size: usize,
    /// 다음 토큰 예측 쌍
    pub pairs: Vec<TrainingPair>,
    /// 쌍 입력의 어텐션 마스크
    pub attention_masks: Vec<Vec<u8>>,
    /// 마스크 언어 모델 배치
    pub masked: MaskedLmBatch,
}

impl TrainingArtifact {
    /// 시퀀스 결과에서 학습 데이터를 만듭니다.
    pub fn build(sequences: &SequenceArtifact, settings: &SequenceSettings) -> Result<Self, MinerError> {
        settings.validate()?;
        let pairs = TrainingPair::from_windows(
            sequences.sequences.iter().map(Vec::as_slice),
            settings.max_length,
        );
        let attention_masks = pairs.iter().map(TrainingPair::attention_mask).collect();
        let padded: Vec<Vec<u32>> = sequences
            .sequences
            .iter()
            .map(|w| pad_or_truncate(w, settings.max_length, PAD_ID))
            .collect();
        let masked =
            MaskedLmBatch::from_sequences(&padded, settings.mask_prob, MASK_ID, settings.seed)?;

        info!(
            source = %sequences.source,
            pairs = pairs.len(),
            max_length = settings.max_length,
            "training data generated"
        );

        Ok(Self {
            source: sequences.source.clone(),
            max_length: settings.max_length,
            mask_prob: settings.mask_prob,
            seed: settings.seed,
            vocab_size: sequences.vocab_size,
            pairs,
            attention_masks,
            masked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SequenceSettingsBuilder;

    #[test]
    fn pair_shifts_by_one_and_pads() {
        let pair = TrainingPair::from_window(&[5, 6, 7], 4, PAD_ID);
        assert_eq!(pair.input, vec![5, 6, 0, 0]);
        assert_eq!(pair.target, vec![6, 7, 0, 0]);
        assert_eq!(pair.attention_mask(), vec![1, 1, 0, 0]);
    }

    #[test]
    fn pair_truncates_to_max_length() {
        let pair = TrainingPair::from_window(&[5, 6, 7, 8, 9], 2, PAD_ID);
        assert_eq!(pair.input, vec![5, 6]);
        assert_eq!(pair.target, vec![6, 7]);
    }

    #[test]
    fn single_token_window_is_all_padding() {
        let pair = TrainingPair::from_window(&[5], 3, PAD_ID);
        assert_eq!(pair.input, vec![0, 0, 0]);
        assert_eq!(pair.target, vec![0, 0, 0]);
    }

    #[test]
    fn pad_or_truncate_exact_length_is_unchanged() {
        assert_eq!(pad_or_truncate(&[1, 2, 3], 3, 0), vec![1, 2, 3]);
    }

    #[test]
    fn masking_is_reproducible_with_seed() {
        let seqs = vec![vec![5, 6, 7, 8, 9, 10, 11, 12]; 4];
        let a = MaskedLmBatch::from_sequences(&seqs, 0.5, MASK_ID, 7).unwrap();
        let b = MaskedLmBatch::from_sequences(&seqs, 0.5, MASK_ID, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn full_masking_labels_every_real_token() {
        let seqs = vec![vec![5, 6, PAD_ID]];
        let batch = MaskedLmBatch::from_sequences(&seqs, 1.0, MASK_ID, 0).unwrap();
        assert_eq!(batch.inputs[0], vec![MASK_ID, MASK_ID, PAD_ID]);
        assert_eq!(batch.labels[0], vec![5, 6, IGNORE_LABEL]);
    }

    #[test]
    fn zero_probability_masks_nothing() {
        let seqs = vec![vec![5, 6, 7]];
        let batch = MaskedLmBatch::from_sequences(&seqs, 0.0, MASK_ID, 0).unwrap();
        assert_eq!(batch.inputs[0], vec![5, 6, 7]);
        assert!(batch.labels[0].iter().all(|&l| l == IGNORE_LABEL));
    }

    #[test]
    fn rejects_invalid_probability() {
        assert!(MaskedLmBatch::from_sequences(&[], 1.5, MASK_ID, 0).is_err());
    }

    fn sequence_artifact() -> SequenceArtifact {
        SequenceArtifact {
            source: "app".to_owned(),
            sequences: vec![vec![5, 6, 7], vec![6, 7, 5]],
            window_size: 3,
            num_sequences: 2,
            vocab_size: 8,
        }
    }

    #[test]
    fn artifact_uses_sequence_settings() {
        let settings = SequenceSettingsBuilder::new()
            .window_size(3)
            .max_length(4)
            .mask_prob(1.0)
            .seed(9)
            .build()
            .unwrap();
        let artifact = TrainingArtifact::build(&sequence_artifact(), &settings).unwrap();

        assert_eq!(artifact.source, "app");
        assert_eq!(artifact.vocab_size, 8);
        assert_eq!(artifact.pairs.len(), 2);
        assert_eq!(artifact.pairs[0].input, vec![5, 6, 0, 0]);
        assert_eq!(artifact.attention_masks[0], vec![1, 1, 0, 0]);
        assert_eq!(artifact.masked.inputs[0], vec![MASK_ID, MASK_ID, MASK_ID, PAD_ID]);
        assert_eq!(artifact.masked.labels[0], vec![5, 6, 7, IGNORE_LABEL]);
    }

    #[test]
    fn artifact_is_reproducible_for_same_seed() {
        let settings = SequenceSettingsBuilder::new().mask_prob(0.5).seed(3).build().unwrap();
        let a = TrainingArtifact::build(&sequence_artifact(), &settings).unwrap();
        let b = TrainingArtifact::build(&sequence_artifact(), &settings).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn artifact_of_empty_sequences_is_empty() {
        let mut sequences = sequence_artifact();
        sequences.sequences.clear();
        sequences.num_sequences = 0;
        let artifact = TrainingArtifact::build(&sequences, &SequenceSettings::default()).unwrap();
        assert!(artifact.pairs.is_empty());
        assert!(artifact.masked.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn pair_lengths_always_match_max_length(
                window in prop::collection::vec(1u32..50, 0..30),
                max_length in 1usize..40,
            ) {
                let pair = TrainingPair::from_window(&window, max_length, PAD_ID);
                prop_assert_eq!(pair.input.len(), max_length);
                prop_assert_eq!(pair.target.len(), max_length);
            }

            #[test]
            fn labels_only_where_masked(
                seqs in prop::collection::vec(prop::collection::vec(0u32..20, 0..16), 0..8),
                seed in any::<u64>(),
            ) {
                let batch = MaskedLmBatch::from_sequences(&seqs, 0.3, MASK_ID, seed).unwrap();
                for ((orig, input), label) in seqs.iter().zip(&batch.inputs).zip(&batch.labels) {
                    for i in 0..orig.len() {
                        if label[i] == IGNORE_LABEL {
                            prop_assert_eq!(input[i], orig[i]);
                        } else {
                            prop_assert_eq!(input[i], MASK_ID);
                            prop_assert_eq!(label[i], i64::from(orig[i]));
                        }
                    }
                }
            }
        }
    }
}
