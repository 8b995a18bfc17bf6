//! 어휘 구축 -- 템플릿 렌더링을 정수 ID로 매핑합니다.
//!
//! # ID 배정 규칙
//! - 특수 토큰: `<PAD>`=0, `<UNK>`=1, `<MASK>`=2, `<CLS>`=3, `<SEP>`=4
//! - `min_freq` 미만 템플릿 제외
//! - 나머지는 카운트 내림차순, `first_seen` 오름차순, 소스 이름, 렌더링 순으로 정렬
//! - 5부터 차례로 배정하며 전체 크기는 `max_vocab_size`를 넘지 않음

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use logloom_core::config::SPECIAL_TOKEN_COUNT;
use logloom_core::metrics as m;

use crate::config::VocabSettings;
use crate::error::MinerError;
use crate::table::{MinedSource, TemplateRecord, TemplateTable};

/// 패딩 토큰 ID
pub const PAD_ID: u32 = 0;
/// 미등록 토큰 ID
pub const UNK_ID: u32 = 1;
/// 마스크 토큰 ID
pub const MASK_ID: u32 = 2;
/// 문장 시작 토큰 ID
pub const CLS_ID: u32 = 3;
/// 구분 토큰 ID
pub const SEP_ID: u32 = 4;

/// 특수 토큰 (ID 순)
pub const SPECIAL_TOKENS: [&str; SPECIAL_TOKEN_COUNT] = ["<PAD>", "<UNK>", "<MASK>", "<CLS>", "<SEP>"];

/// 템플릿 어휘
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    token_to_id: BTreeMap<String, u32>,
    id_to_token: Vec<String>,
    min_freq: u64,
    max_vocab_size: usize,
}

impl Vocabulary {
    /// 특수 토큰만 있는 어휘를 생성합니다.
    fn with_specials(settings: VocabSettings) -> Self {
        let mut vocab = Self {
            token_to_id: BTreeMap::new(),
            id_to_token: Vec::with_capacity(SPECIAL_TOKEN_COUNT),
            min_freq: settings.min_freq,
            max_vocab_size: settings.max_vocab_size,
        };
        for token in SPECIAL_TOKENS {
            vocab.push(token.to_owned());
        }
        vocab
    }

    fn push(&mut self, token: String) -> u32 {
        let id = self.id_to_token.len() as u32;
        self.token_to_id.insert(token.clone(), id);
        self.id_to_token.push(token);
        id
    }

    /// 렌더링의 ID를 반환합니다. 없으면 `<UNK>` ID를 반환합니다.
    pub fn lookup(&self, rendering: &str) -> u32 {
        self.token_to_id.get(rendering).copied().unwrap_or(UNK_ID)
    }

    /// ID의 토큰을 반환합니다.
    pub fn token(&self, id: u32) -> Option<&str> {
        self.id_to_token.get(id as usize).map(String::as_str)
    }

    /// 템플릿 렌더링의 ID를 반환합니다.
    ///
    /// 특수 토큰과 같은 문자열로 렌더링된 템플릿은 어휘에 들어가지 않으므로 `<UNK>`입니다.
    pub fn template_id(&self, rendering: &str) -> u32 {
        if SPECIAL_TOKENS.contains(&rendering) {
            return UNK_ID;
        }
        self.lookup(rendering)
    }

    /// 렌더링이 어휘에 있는지 확인합니다.
    pub fn contains(&self, rendering: &str) -> bool {
        self.token_to_id.contains_key(rendering)
    }

    /// 특수 토큰을 포함한 어휘 크기
    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    /// 특수 토큰 외에 항목이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.id_to_token.len() <= SPECIAL_TOKEN_COUNT
    }

    /// 구축 시 사용한 최소 빈도
    pub fn min_freq(&self) -> u64 {
        self.min_freq
    }

    /// 구축 시 사용한 최대 어휘 크기
    pub fn max_vocab_size(&self) -> usize {
        self.max_vocab_size
    }

    /// ID 순으로 토큰을 순회합니다.
    pub fn tokens(&self) -> impl Iterator<Item = (u32, &str)> {
        self.id_to_token
            .iter()
            .enumerate()
            .map(|(id, token)| (id as u32, token.as_str()))
    }

    /// 마이닝 결과의 템플릿 스트림을 어휘 ID 스트림으로 변환합니다.
    pub fn encode_stream(&self, mined: &MinedSource) -> Result<Vec<u32>, MinerError> {
        Ok(mined
            .rendered_stream()?
            .into_iter()
            .map(|rendering| self.template_id(rendering))
            .collect())
    }

    /// 영속화 형식으로 변환합니다.
    pub fn to_file(&self) -> VocabularyFile {
        VocabularyFile {
            vocab: self.token_to_id.clone(),
            token_to_id: self.token_to_id.clone(),
            id_to_token: self
                .tokens()
                .map(|(id, token)| (id, token.to_owned()))
                .collect(),
            min_freq: self.min_freq,
            max_vocab_size: self.max_vocab_size,
        }
    }

    /// 영속화 형식에서 어휘를 복원합니다.
    ///
    /// 특수 토큰이 0..4에 있고 ID가 빈틈없이 이어지는지 검증합니다.
    /// `vocab`과 `token_to_id`가 다르거나 항목 수가 `max_vocab_size`를 넘으면 거부합니다.
    pub fn from_file(file: VocabularyFile) -> Result<Self, MinerError> {
        let settings = VocabSettings::new(file.min_freq, file.max_vocab_size)?;
        if file.token_to_id.len() < SPECIAL_TOKEN_COUNT {
            return Err(MinerError::Inconsistent(
                "vocabulary is missing special tokens".to_owned(),
            ));
        }
        if file.vocab != file.token_to_id {
            return Err(MinerError::Inconsistent(
                "vocab does not mirror token_to_id".to_owned(),
            ));
        }
        if file.token_to_id.len() > file.max_vocab_size {
            return Err(MinerError::Inconsistent(format!(
                "vocabulary has {} entries, more than max_vocab_size {}",
                file.token_to_id.len(),
                file.max_vocab_size
            )));
        }

        let mut by_id: Vec<Option<String>> = vec![None; file.token_to_id.len()];
        for (token, &id) in &file.token_to_id {
            let slot = by_id.get_mut(id as usize).ok_or_else(|| {
                MinerError::Inconsistent(format!("vocabulary id {id} for '{token}' is not dense"))
            })?;
            if slot.is_some() {
                return Err(MinerError::Inconsistent(format!(
                    "vocabulary id {id} is assigned twice"
                )));
            }
            *slot = Some(token.clone());
        }

        let mut vocab = Self::with_specials(settings);
        for (id, token) in by_id.into_iter().enumerate() {
            let token = token.ok_or_else(|| {
                MinerError::Inconsistent(format!("vocabulary id {id} is missing"))
            })?;
            if let Some(expected) = SPECIAL_TOKENS.get(id) {
                if token != *expected {
                    return Err(MinerError::Inconsistent(format!(
                        "vocabulary id {id} must be {expected}, found '{token}'"
                    )));
                }
                continue;
            }
            vocab.push(token);
        }

        if vocab.tokens().any(|(id, token)| file.id_to_token.get(&id).map(String::as_str) != Some(token)) {
            return Err(MinerError::Inconsistent(
                "id_to_token does not mirror token_to_id".to_owned(),
            ));
        }
        Ok(vocab)
    }
}

/// `vocab.json` 영속화 형식
///
/// `vocab`과 `token_to_id`는 같은 매핑입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyFile {
    /// 렌더링 → ID
    pub vocab: BTreeMap<String, u32>,
    /// 렌더링 → ID
    pub token_to_id: BTreeMap<String, u32>,
    /// ID → 렌더링
    pub id_to_token: BTreeMap<u32, String>,
    /// 최소 빈도
    pub min_freq: u64,
    /// 최대 어휘 크기
    pub max_vocab_size: usize,
}

/// 어휘 빌더
#[derive(Debug, Clone, Copy, Default)]
pub struct VocabularyBuilder {
    settings: VocabSettings,
}

impl VocabularyBuilder {
    /// 설정을 검증하고 빌더를 생성합니다.
    pub fn new(settings: VocabSettings) -> Result<Self, MinerError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// 병합된 템플릿 테이블에서 어휘를 구축합니다.
    ///
    /// `first_seen`은 각 소스 안의 라인 인덱스입니다. 여러 소스가 섞이면
    /// 이 순서는 결정적이지만 전역 생성 순서는 아니며, 같은 값은 소스 이름으로 가립니다.
    pub fn build(&self, table: &TemplateTable) -> Vocabulary {
        let mut candidates: Vec<(&String, &TemplateRecord)> = table
            .iter()
            .filter(|(rendering, record)| {
                record.count >= self.settings.min_freq && !SPECIAL_TOKENS.contains(&rendering.as_str())
            })
            .collect();
        candidates.sort_by(|(ra, a), (rb, b)| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| ra.cmp(rb))
        });

        let mut vocab = Vocabulary::with_specials(self.settings);
        let capacity = self.settings.max_vocab_size.saturating_sub(SPECIAL_TOKEN_COUNT);
        for (rendering, _) in candidates.iter().take(capacity) {
            vocab.push((*rendering).clone());
        }

        metrics::gauge!(m::VOCAB_SIZE).set(vocab.len() as f64);
        info!(
            templates = table.len(),
            eligible = candidates.len(),
            vocab_size = vocab.len(),
            "vocabulary built"
        );
        vocab
    }
}
