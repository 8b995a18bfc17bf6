//! 로그 수집 -- 파일에서 원시 로그 라인을 읽습니다.
//!
//! # 수집 규칙
//! - 잘못된 UTF-8은 대체 문자로 치환
//! - 앞뒤 공백 제거
//! - 빈 라인은 건너뜀
//!
//! 디렉토리 입력은 [`discover_sources`]로 확장자가 맞는 파일을 이름순으로 찾습니다.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, warn};

use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::error::MinerError;

/// 수집된 원시 로그 라인
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    /// 원시 로그 바이트 (앞뒤 공백 제거됨)
    pub data: Bytes,
    /// 수집 소스 이름
    pub source: String,
}

impl RawLog {
    /// 새 RawLog를 생성합니다.
    pub fn new(data: Bytes, source: impl Into<String>) -> Self {
        Self {
            data,
            source: source.into(),
        }
    }

    /// 로그 텍스트를 반환합니다. 잘못된 UTF-8은 대체 문자로 치환됩니다.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

/// 파일 경로에서 소스 이름(파일 스템)을 추출합니다.
pub fn source_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 파일 기반 로그 수집기
///
/// 파일 하나를 통째로 읽어 라인 단위 [`RawLog`]로 분리합니다.
#[derive(Debug, Clone)]
pub struct FileCollector {
    max_file_size: u64,
}

impl Default for FileCollector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl FileCollector {
    /// 최대 파일 크기를 지정하여 수집기를 생성합니다.
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// 파일을 읽어 비어 있지 않은 라인을 순서대로 반환합니다.
    pub async fn collect(&self, path: &Path) -> Result<Vec<RawLog>, MinerError> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| MinerError::Collector {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        if metadata.len() > self.max_file_size {
            return Err(MinerError::Collector {
                path: path.display().to_string(),
                reason: format!(
                    "file size {} exceeds limit {}",
                    metadata.len(),
                    self.max_file_size
                ),
            });
        }

        let content = tokio::fs::read(path).await.map_err(|e| MinerError::Collector {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let logs = split_lines(Bytes::from(content), &source_name(path));
        debug!(path = %path.display(), lines = logs.len(), "collected log file");
        Ok(logs)
    }
}

/// 버퍼를 라인 단위로 나누고 공백만 있는 라인을 제외합니다.
pub fn split_lines(data: Bytes, source: &str) -> Vec<RawLog> {
    let mut logs = Vec::new();
    let mut start = 0;
    while start < data.len() {
        let end = data[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(data.len(), |offset| start + offset);

        let line = &data[start..end];
        let leading = line.len() - line.trim_ascii_start().len();
        let trailing = line.len() - line.trim_ascii_end().len();
        if leading < line.len() {
            let slice = data.slice(start + leading..end - trailing);
            let log = RawLog::new(slice, source);
            if !log.text().trim().is_empty() {
                logs.push(log);
            }
        }
        start = end + 1;
    }
    logs
}

/// 입력 경로를 소스 파일 목록으로 확장합니다.
///
/// 파일이면 그 파일 하나, 디렉토리면 확장자가 맞는 파일을 이름순으로 반환합니다.
pub async fn resolve_inputs(input: &Path, extension: &str) -> Result<Vec<PathBuf>, MinerError> {
    let metadata = tokio::fs::metadata(input).await.map_err(|e| MinerError::Collector {
        path: input.display().to_string(),
        reason: e.to_string(),
    })?;
    if metadata.is_file() {
        Ok(vec![input.to_path_buf()])
    } else {
        discover_sources(input, extension).await
    }
}

/// 디렉토리에서 확장자가 맞는 파일을 이름순으로 찾습니다.
///
/// 하위 디렉토리는 탐색하지 않습니다.
pub async fn discover_sources(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, MinerError> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| MinerError::Collector {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        match entry.file_type().await {
            Ok(ft) if ft.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable entry"),
        }
    }

    paths.sort();
    Ok(paths)
}
