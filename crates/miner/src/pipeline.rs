//! 마이닝 파이프라인 -- 수집, 마이닝, 병합, 어휘 구축, 윈도잉, 학습 데이터 생성을 조립합니다.
//!
//! # 동시성
//! 소스마다 독립된 [`TemplateMiner`]를 tokio 블로킹 풀에서 실행합니다.
//! 각 태스크가 자기 트리를 소유하므로 마이닝 상태에 락이 없습니다.
//! 결과는 소스 이름순으로 정렬한 뒤 병합하므로 완료 순서는 결과에 영향을 주지 않습니다.
//!
//! # 사용 예시
//! ```ignore
//! let pipeline = MiningPipelineBuilder::from_core(&config).build()?;
//! let summary = pipeline.run(Path::new("data/raw"), &DataLayout::new("data")).await?;
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

use logloom_core::config::LogloomConfig;

use crate::collector::{FileCollector, RawLog, resolve_inputs, source_name};
use crate::config::{MinerSettings, SequenceSettings, VocabSettings};
use crate::error::MinerError;
use crate::miner::TemplateMiner;
use crate::sequence::SequenceArtifact;
use crate::store::{self, DataLayout};
use crate::table::{MinedSource, TemplateTable};
use crate::training::TrainingArtifact;
use crate::vocab::{Vocabulary, VocabularyBuilder};

/// 소스 하나의 처리 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    /// 소스 이름
    pub source: String,
    /// 처리된 라인 수
    pub lines: u64,
    /// 템플릿 수
    pub templates: usize,
    /// 생성된 윈도우 수
    pub sequences: usize,
}

/// 전체 실행 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// 소스별 요약 (이름순)
    pub sources: Vec<SourceSummary>,
    /// 병합된 고유 템플릿 수
    pub merged_templates: usize,
    /// 어휘 크기 (특수 토큰 포함)
    pub vocab_size: usize,
}

/// 마이닝 파이프라인
#[derive(Debug, Clone)]
pub struct MiningPipeline {
    miner: MinerSettings,
    vocab: VocabSettings,
    sequence: SequenceSettings,
    collector: FileCollector,
}

impl MiningPipeline {
    /// 마이너 설정
    pub fn miner_settings(&self) -> &MinerSettings {
        &self.miner
    }

    /// 어휘 설정
    pub fn vocab_settings(&self) -> &VocabSettings {
        &self.vocab
    }

    /// 시퀀스 설정
    pub fn sequence_settings(&self) -> &SequenceSettings {
        &self.sequence
    }

    /// 메모리의 라인 목록을 소스별로 동시에 마이닝합니다.
    ///
    /// 결과는 소스 이름순입니다.
    pub async fn mine_lines(
        &self,
        sources: Vec<(String, Vec<String>)>,
    ) -> Result<Vec<MinedSource>, MinerError> {
        let mut tasks = JoinSet::new();
        for (index, (source, lines)) in sources.into_iter().enumerate() {
            let settings = self.miner.clone();
            tasks.spawn_blocking(move || {
                let mut miner = TemplateMiner::new(source, &settings)?;
                miner.add_lines(lines.iter().map(String::as_str));
                Ok::<_, MinerError>((index, miner.finish()))
            });
        }
        collect_ordered(tasks).await
    }

    /// 파일들을 동시에 수집하고 마이닝합니다.
    ///
    /// 읽을 수 없는 파일은 경고 로그를 남기고 건너뜁니다. 결과는 소스 이름순입니다.
    pub async fn mine_files(&self, paths: &[PathBuf]) -> Result<Vec<MinedSource>, MinerError> {
        let mut tasks = JoinSet::new();
        for (index, path) in paths.iter().cloned().enumerate() {
            let settings = self.miner.clone();
            let collector = self.collector.clone();
            tasks.spawn(async move {
                let logs = match collector.collect(&path).await {
                    Ok(logs) => logs,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable log file");
                        return Ok(None);
                    }
                };
                let source = source_name(&path);
                let mined = tokio::task::spawn_blocking(move || mine_raw_logs(source, &logs, &settings))
                    .await
                    .map_err(|e| MinerError::Task(format!("spawn_blocking failed: {e}")))??;
                Ok::<_, MinerError>(Some((index, mined)))
            });
        }

        let mut results = Vec::with_capacity(paths.len());
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| MinerError::Task(format!("mining task failed: {e}")))?;
            if let Some(entry) = outcome? {
                results.push(entry);
            }
        }
        Ok(sort_by_source(results))
    }

    /// 입력 경로(파일 또는 디렉토리)의 로그를 마이닝합니다.
    pub async fn mine_input(&self, input: &Path) -> Result<Vec<MinedSource>, MinerError> {
        let paths = resolve_inputs(input, &self.miner.input_extension).await?;
        if paths.is_empty() {
            warn!(
                input = %input.display(),
                extension = %self.miner.input_extension,
                "no log files found"
            );
        }
        self.mine_files(&paths).await
    }

    /// 소스별 테이블을 이름순으로 병합합니다.
    pub fn merge(&self, mined: &[MinedSource]) -> TemplateTable {
        let mut ordered: Vec<&MinedSource> = mined.iter().collect();
        ordered.sort_by(|a, b| a.source.cmp(&b.source));
        TemplateTable::merged(
            ordered.into_iter().map(|m| &m.templates),
            self.miner.max_examples,
        )
    }

    /// 병합된 테이블로 어휘를 구축합니다.
    pub fn build_vocabulary(&self, mined: &[MinedSource]) -> Result<Vocabulary, MinerError> {
        let builder = VocabularyBuilder::new(self.vocab)?;
        Ok(builder.build(&self.merge(mined)))
    }

    /// 소스별 시퀀스 결과를 만듭니다.
    pub fn build_sequences(
        &self,
        mined: &[MinedSource],
        vocab: &Vocabulary,
    ) -> Result<Vec<SequenceArtifact>, MinerError> {
        mined
            .iter()
            .map(|source| {
                let ids = vocab.encode_stream(source)?;
                SequenceArtifact::build(&source.source, &ids, &self.sequence, vocab.len())
            })
            .collect()
    }

    /// 시퀀스 결과마다 학습 데이터를 만듭니다.
    ///
    /// `max_length`, `mask_prob`, `seed`는 시퀀스 설정을 따릅니다.
    pub fn build_training(
        &self,
        artifacts: &[SequenceArtifact],
    ) -> Result<Vec<TrainingArtifact>, MinerError> {
        artifacts
            .iter()
            .map(|artifact| TrainingArtifact::build(artifact, &self.sequence))
            .collect()
    }

    /// 마이닝, 어휘 구축, 윈도잉, 학습 데이터 생성을 한 번에 실행하고 결과를 저장합니다.
    pub async fn run(&self, input: &Path, layout: &DataLayout) -> Result<RunSummary, MinerError> {
        let mined = self.mine_input(input).await?;
        let parsed_dir = layout.parsed_dir();
        for source in &mined {
            store::save_mined(&parsed_dir, source).await?;
        }

        let merged = self.merge(&mined);
        let vocab = VocabularyBuilder::new(self.vocab)?.build(&merged);
        store::save_vocab(&layout.vocab_path(), &vocab).await?;

        let artifacts = self.build_sequences(&mined, &vocab)?;
        let sequences_dir = layout.sequences_dir();
        for artifact in &artifacts {
            store::save_sequences(&sequences_dir, artifact).await?;
        }

        let training_dir = layout.training_dir();
        for training in self.build_training(&artifacts)? {
            store::save_training(&training_dir, &training).await?;
        }

        let sources = mined
            .iter()
            .zip(&artifacts)
            .map(|(m, a)| SourceSummary {
                source: m.source.clone(),
                lines: m.total_lines,
                templates: m.templates.len(),
                sequences: a.num_sequences,
            })
            .collect();

        let summary = RunSummary {
            sources,
            merged_templates: merged.len(),
            vocab_size: vocab.len(),
        };
        info!(
            sources = summary.sources.len(),
            merged_templates = summary.merged_templates,
            vocab_size = summary.vocab_size,
            "pipeline run complete"
        );
        Ok(summary)
    }
}

/// 수집된 로그를 마이너 하나로 처리합니다.
fn mine_raw_logs(
    source: String,
    logs: &[RawLog],
    settings: &MinerSettings,
) -> Result<MinedSource, MinerError> {
    let mut miner = TemplateMiner::new(source, settings)?;
    miner.add_raw_logs(logs);
    let mined = miner.finish();
    info!(
        source = %mined.source,
        lines = mined.total_lines,
        templates = mined.templates.len(),
        "source mined"
    );
    Ok(mined)
}

async fn collect_ordered(
    mut tasks: JoinSet<Result<(usize, MinedSource), MinerError>>,
) -> Result<Vec<MinedSource>, MinerError> {
    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.map_err(|e| MinerError::Task(format!("mining task failed: {e}")))?;
        results.push(outcome?);
    }
    Ok(sort_by_source(results))
}

/// 소스 이름순, 같은 이름이면 입력 순서로 정렬합니다.
fn sort_by_source(mut results: Vec<(usize, MinedSource)>) -> Vec<MinedSource> {
    results.sort_by(|(ia, a), (ib, b)| a.source.cmp(&b.source).then(ia.cmp(ib)));
    results.into_iter().map(|(_, mined)| mined).collect()
}

/// 마이닝 파이프라인 빌더
#[derive(Debug, Clone, Default)]
pub struct MiningPipelineBuilder {
    miner: MinerSettings,
    vocab: VocabSettings,
    sequence: SequenceSettings,
}

impl MiningPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// core 설정에서 빌더를 생성합니다.
    pub fn from_core(config: &LogloomConfig) -> Self {
        Self {
            miner: MinerSettings::from_core(&config.miner),
            vocab: VocabSettings::from_core(&config.vocab),
            sequence: SequenceSettings::from_core(&config.sequence),
        }
    }

    /// 마이너 설정을 지정합니다.
    pub fn miner(mut self, settings: MinerSettings) -> Self {
        self.miner = settings;
        self
    }

    /// 어휘 설정을 지정합니다.
    pub fn vocab(mut self, settings: VocabSettings) -> Self {
        self.vocab = settings;
        self
    }

    /// 시퀀스 설정을 지정합니다.
    pub fn sequence(mut self, settings: SequenceSettings) -> Self {
        self.sequence = settings;
        self
    }

    /// 설정을 검증하고 파이프라인을 빌드합니다.
    pub fn build(self) -> Result<MiningPipeline, MinerError> {
        self.miner.validate()?;
        self.vocab.validate()?;
        self.sequence.validate()?;

        Ok(MiningPipeline {
            collector: FileCollector::new(self.miner.max_file_size),
            miner: self.miner,
            vocab: self.vocab,
            sequence: self.sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SequenceSettingsBuilder;
    use crate::vocab::{MASK_ID, PAD_ID, UNK_ID};

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn pipeline() -> MiningPipeline {
        MiningPipelineBuilder::new()
            .sequence(SequenceSettingsBuilder::new().window_size(2).build().unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn builder_rejects_invalid_sequence_settings() {
        let settings = SequenceSettings {
            stride: 0,
            ..SequenceSettings::default()
        };
        let err = MiningPipelineBuilder::new().sequence(settings).build().unwrap_err();
        assert!(err.to_string().contains("stride"));
    }

    #[test]
    fn builder_from_core_copies_sections() {
        let mut config = LogloomConfig::default();
        config.vocab.min_freq = 3;
        let pipeline = MiningPipelineBuilder::from_core(&config).build().unwrap();
        assert_eq!(pipeline.vocab_settings().min_freq, 3);
    }

    #[tokio::test]
    async fn mine_lines_orders_by_source() {
        let mined = pipeline()
            .mine_lines(vec![
                ("zeta".into(), lines(&["a b", "a b"])),
                ("alpha".into(), lines(&["c d e"])),
            ])
            .await
            .unwrap();
        let names: Vec<&str> = mined.iter().map(|m| m.source.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn merged_vocabulary_spans_sources() {
        let pipeline = pipeline();
        let mined = pipeline
            .mine_lines(vec![
                ("web".into(), lines(&["GET index ok", "GET index ok"])),
                ("db".into(), lines(&["GET index ok", "vacuum done"])),
            ])
            .await
            .unwrap();

        let merged = pipeline.merge(&mined);
        assert_eq!(merged.get("GET index ok").unwrap().count, 3);
        assert_eq!(merged.get("GET index ok").unwrap().source, "db");

        let vocab = pipeline.build_vocabulary(&mined).unwrap();
        assert_eq!(vocab.lookup("GET index ok"), 5);
        assert!(!vocab.contains("vacuum done"));
    }

    #[tokio::test]
    async fn sequences_use_vocabulary_ids() {
        let pipeline = pipeline();
        let mined = pipeline
            .mine_lines(vec![("app".into(), lines(&["a", "b c", "a", "b c"]))])
            .await
            .unwrap();
        let vocab = pipeline.build_vocabulary(&mined).unwrap();
        let artifacts = pipeline.build_sequences(&mined, &vocab).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].num_sequences, 3);
        assert_eq!(artifacts[0].vocab_size, 7);
        assert_eq!(artifacts[0].sequences[0], vec![5, 6]);
    }

    #[tokio::test]
    async fn mine_files_skips_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.log");
        tokio::fs::write(&good, "hello world\n").await.unwrap();
        let missing = dir.path().join("missing.log");

        let mined = pipeline().mine_files(&[missing, good]).await.unwrap();
        assert_eq!(mined.len(), 1);
        assert_eq!(mined[0].source, "good");
        assert_eq!(mined[0].total_lines, 1);
    }

    #[tokio::test]
    async fn run_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        tokio::fs::create_dir_all(layout.raw_dir()).await.unwrap();
        tokio::fs::write(
            layout.raw_dir().join("app.log"),
            "User 42 login successful\nUser 99 login successful\nDatabase connection failed\n",
        )
        .await
        .unwrap();

        let summary = pipeline().run(&layout.raw_dir(), &layout).await.unwrap();
        assert_eq!(summary.sources.len(), 1);
        assert_eq!(summary.sources[0].lines, 3);
        assert_eq!(summary.sources[0].templates, 2);
        assert_eq!(summary.vocab_size, 6);

        assert!(layout.parsed_dir().join("app_templates.json").exists());
        assert!(layout.sequences_dir().join("app_sequences.json").exists());
        assert!(layout.vocab_path().exists());

        let training = store::load_training(&layout.training_dir().join("app_training.json"))
            .await
            .unwrap();
        assert_eq!(training.pairs.len(), 2);
        assert_eq!(training.max_length, pipeline().sequence_settings().max_length);
        assert_eq!(training.vocab_size, 6);
    }

    #[tokio::test]
    async fn special_token_lines_encode_as_unknown() {
        let pipeline = pipeline();
        let mined = pipeline
            .mine_lines(vec![(
                "app".into(),
                lines(&["<MASK>", "<MASK>", "<PAD>", "<PAD>", "job done", "job done"]),
            )])
            .await
            .unwrap();
        let vocab = pipeline.build_vocabulary(&mined).unwrap();
        assert_eq!(vocab.len(), 6);

        let artifacts = pipeline.build_sequences(&mined, &vocab).unwrap();
        assert_eq!(
            artifacts[0].sequences,
            vec![
                vec![UNK_ID, UNK_ID],
                vec![UNK_ID, UNK_ID],
                vec![UNK_ID, UNK_ID],
                vec![UNK_ID, 5],
                vec![5, 5],
            ]
        );
        for window in &artifacts[0].sequences {
            assert!(!window.contains(&MASK_ID));
            assert!(!window.contains(&PAD_ID));
        }
    }

    #[tokio::test]
    async fn training_follows_sequence_settings() {
        let pipeline = MiningPipelineBuilder::new()
            .sequence(
                SequenceSettingsBuilder::new()
                    .window_size(2)
                    .max_length(3)
                    .mask_prob(0.0)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let mined = pipeline
            .mine_lines(vec![("app".into(), lines(&["a", "b c", "a", "b c"]))])
            .await
            .unwrap();
        let vocab = pipeline.build_vocabulary(&mined).unwrap();
        let artifacts = pipeline.build_sequences(&mined, &vocab).unwrap();
        let training = pipeline.build_training(&artifacts).unwrap();

        assert_eq!(training.len(), 1);
        assert_eq!(training[0].pairs[0].input, vec![5, 0, 0]);
        assert_eq!(training[0].pairs[0].target, vec![6, 0, 0]);
        assert_eq!(training[0].masked.inputs[0], vec![5, 6, 0]);
    }
}
