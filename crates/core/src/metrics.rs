//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 단계는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않았으면 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logloom_`
//! - 단계명: `miner_`, `vocab_`, `sequence_`
//! - 접미어: `_total` (counter), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 로그 소스 레이블 키 (파일 스템)
pub const LABEL_SOURCE: &str = "source";

// ─── Miner 메트릭 ──────────────────────────────────────────────────

/// Miner: 처리된 로그 라인 수 (counter, label: source)
pub const MINER_LINES_TOTAL: &str = "logloom_miner_lines_total";

/// Miner: 새로 생성된 템플릿 수 (counter, label: source)
pub const MINER_TEMPLATES_CREATED_TOTAL: &str = "logloom_miner_templates_created_total";

// ─── Vocab / Sequence 메트릭 ───────────────────────────────────────

/// Vocab: 마지막으로 구축된 어휘 크기 (gauge, 특수 토큰 포함)
pub const VOCAB_SIZE: &str = "logloom_vocab_size";

/// Sequence: 생성된 윈도우 수 (counter, label: source)
pub const SEQUENCE_WINDOWS_TOTAL: &str = "logloom_sequence_windows_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(MINER_LINES_TOTAL, "Total log lines fed to the template miner");
    describe_counter!(
        MINER_TEMPLATES_CREATED_TOTAL,
        "Total templates created by the template miner"
    );
    describe_gauge!(
        VOCAB_SIZE,
        "Size of the most recently built vocabulary, special tokens included"
    );
    describe_counter!(
        SEQUENCE_WINDOWS_TOTAL,
        "Total sliding windows produced from template id streams"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_share_prefix() {
        for name in [
            MINER_LINES_TOTAL,
            MINER_TEMPLATES_CREATED_TOTAL,
            VOCAB_SIZE,
            SEQUENCE_WINDOWS_TOTAL,
        ] {
            assert!(name.starts_with("logloom_"), "{name}");
        }
    }

    #[test]
    fn describe_all_without_recorder_is_noop() {
        describe_all();
    }
}
