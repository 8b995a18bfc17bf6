#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`collector`]: 로그 파일 수집과 입력 탐색
//! - [`masker`]: 라인 토큰화와 가변 필드 마스킹
//! - [`cluster`]: 리프 단위 유사도 클러스터링
//! - [`tree`]: 고정 깊이 파싱 트리
//! - [`miner`]: 소스 하나의 스트리밍 템플릿 마이너
//! - [`table`]: 템플릿 테이블, 병합, 통계
//! - [`vocab`]: 특수 토큰을 포함한 템플릿 어휘
//! - [`sequence`]: 고정 길이 윈도잉
//! - [`training`]: 학습 쌍, 마스크 언어 모델 배치, 학습 데이터 결과
//! - [`store`]: JSON 결과 저장/로딩
//! - [`pipeline`]: 전체 파이프라인 오케스트레이션
//! - [`config`]: 크레이트 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! FileCollector -> Masker -> TemplateTree -> TemplateTable -> Vocabulary -> windows
//!      |              |            |               |               |            |
//!   raw/*.log    <IP>/<NUM>   leaf clusters   merge sources    token ids    sequences
//! ```

pub mod cluster;
pub mod collector;
pub mod config;
pub mod error;
pub mod masker;
pub mod miner;
pub mod pipeline;
pub mod sequence;
pub mod store;
pub mod table;
pub mod training;
pub mod tree;
pub mod vocab;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{MiningPipeline, MiningPipelineBuilder, RunSummary, SourceSummary};

// 설정
pub use config::{
    MinerSettings, MinerSettingsBuilder, SequenceSettings, SequenceSettingsBuilder, VocabSettings,
};

// 에러
pub use error::MinerError;

// 마이닝
pub use cluster::{LeafClusterer, Lookup, RouteResult, Template, similarity};
pub use masker::Masker;
pub use miner::{Analysis, TemplateMiner};
pub use tree::TemplateTree;

// 결과
pub use table::{MinedSource, TemplateRecord, TemplateStats, TemplateTable, TopTemplate};

// 어휘와 시퀀스
pub use sequence::{SequenceArtifact, windows};
pub use training::{IGNORE_LABEL, MaskedLmBatch, TrainingArtifact, TrainingPair};
pub use vocab::{SPECIAL_TOKENS, Vocabulary, VocabularyBuilder, VocabularyFile};

// 수집기와 저장소
pub use collector::{FileCollector, RawLog};
pub use store::DataLayout;
