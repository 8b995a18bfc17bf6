//! 결과 저장소 -- 마이닝/어휘/시퀀스 결과를 JSON 파일로 저장하고 읽습니다.
//!
//! # 디렉토리 구조
//! ```text
//! <data_dir>/
//! ├── raw/                      입력 로그 (*.log)
//! ├── parsed/<stem>_templates.json
//! ├── sequences/<stem>_sequences.json
//! ├── training/<stem>_training.json
//! └── vocab.json
//! ```
//!
//! 디렉토리 단위 로딩에서 개별 파일 실패는 경고 로그를 남기고 건너뜁니다.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::MinerError;
use crate::sequence::SequenceArtifact;
use crate::table::MinedSource;
use crate::training::TrainingArtifact;
use crate::vocab::{Vocabulary, VocabularyFile};

/// 마이닝 결과 파일 접미사
pub const TEMPLATES_SUFFIX: &str = "_templates.json";
/// 시퀀스 결과 파일 접미사
pub const SEQUENCES_SUFFIX: &str = "_sequences.json";
/// 학습 데이터 파일 접미사
pub const TRAINING_SUFFIX: &str = "_training.json";
/// 어휘 파일 이름
pub const VOCAB_FILE: &str = "vocab.json";

/// 데이터 디렉토리 레이아웃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// 데이터 루트 디렉토리로 레이아웃을 생성합니다.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 데이터 루트
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 입력 로그 디렉토리
    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    /// 마이닝 결과 디렉토리
    pub fn parsed_dir(&self) -> PathBuf {
        self.root.join("parsed")
    }

    /// 시퀀스 결과 디렉토리
    pub fn sequences_dir(&self) -> PathBuf {
        self.root.join("sequences")
    }

    /// 학습 데이터 디렉토리
    pub fn training_dir(&self) -> PathBuf {
        self.root.join("training")
    }

    /// 어휘 파일 경로
    pub fn vocab_path(&self) -> PathBuf {
        self.root.join(VOCAB_FILE)
    }
}

/// 값을 보기 좋은 JSON으로 저장합니다. 상위 디렉토리가 없으면 만듭니다.
pub async fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), MinerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| MinerError::storage(parent, e))?;
    }
    let json = serde_json::to_vec_pretty(value).map_err(|e| MinerError::storage(path, e))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| MinerError::storage(path, e))
}

/// JSON 파일을 읽어 역직렬화합니다.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, MinerError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| MinerError::storage(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| MinerError::storage(path, e))
}

/// 마이닝 결과를 `<dir>/<source>_templates.json`으로 저장합니다.
pub async fn save_mined(dir: &Path, mined: &MinedSource) -> Result<PathBuf, MinerError> {
    let path = dir.join(format!("{}{TEMPLATES_SUFFIX}", mined.source));
    save_json(&path, mined).await?;
    info!(
        source = %mined.source,
        templates = mined.templates.len(),
        lines = mined.total_lines,
        path = %path.display(),
        "templates saved"
    );
    Ok(path)
}

/// 마이닝 결과 파일을 읽습니다.
pub async fn load_mined(path: &Path) -> Result<MinedSource, MinerError> {
    let mined: MinedSource = load_json(path).await?;
    // 스트림이 가리키는 ID는 모두 렌더링이 있어야 함
    mined.rendered_stream().map_err(|e| MinerError::storage(path, e))?;
    Ok(mined)
}

/// 디렉토리의 모든 `*_templates.json`을 파일 이름순으로 읽습니다.
pub async fn load_parsed_dir(dir: &Path) -> Result<Vec<MinedSource>, MinerError> {
    let paths = list_with_suffix(dir, TEMPLATES_SUFFIX).await?;
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        match load_mined(&path).await {
            Ok(mined) => sources.push(mined),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable template file"),
        }
    }
    Ok(sources)
}

/// 어휘를 저장합니다.
pub async fn save_vocab(path: &Path, vocab: &Vocabulary) -> Result<(), MinerError> {
    save_json(path, &vocab.to_file()).await?;
    info!(vocab_size = vocab.len(), path = %path.display(), "vocabulary saved");
    Ok(())
}

/// 어휘를 읽고 검증합니다.
pub async fn load_vocab(path: &Path) -> Result<Vocabulary, MinerError> {
    let file: VocabularyFile = load_json(path).await?;
    Vocabulary::from_file(file).map_err(|e| MinerError::storage(path, e))
}

/// 시퀀스 결과를 `<dir>/<source>_sequences.json`으로 저장합니다.
pub async fn save_sequences(dir: &Path, artifact: &SequenceArtifact) -> Result<PathBuf, MinerError> {
    let path = dir.join(format!("{}{SEQUENCES_SUFFIX}", artifact.source));
    save_json(&path, artifact).await?;
    info!(
        source = %artifact.source,
        sequences = artifact.num_sequences,
        path = %path.display(),
        "sequences saved"
    );
    Ok(path)
}

/// 시퀀스 결과 파일을 읽습니다.
pub async fn load_sequences(path: &Path) -> Result<SequenceArtifact, MinerError> {
    load_json(path).await
}

/// 학습 데이터를 `<dir>/<source>_training.json`으로 저장합니다.
pub async fn save_training(dir: &Path, artifact: &TrainingArtifact) -> Result<PathBuf, MinerError> {
    let path = dir.join(format!("{}{TRAINING_SUFFIX}", artifact.source));
    save_json(&path, artifact).await?;
    info!(
        source = %artifact.source,
        pairs = artifact.pairs.len(),
        path = %path.display(),
        "training data saved"
    );
    Ok(path)
}

/// 학습 데이터 파일을 읽습니다.
pub async fn load_training(path: &Path) -> Result<TrainingArtifact, MinerError> {
    load_json(path).await
}

/// 디렉토리에서 이름이 `suffix`로 끝나는 파일을 이름순으로 찾습니다.
async fn list_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, MinerError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| MinerError::storage(dir, format!("failed to read directory: {e}")))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MinerError::storage(dir, format!("failed to read directory entry: {e}")))?
    {
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(suffix));
        if matches {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
