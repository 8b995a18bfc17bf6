//! 템플릿 마이너 -- 소스 하나의 라인을 순서대로 처리합니다.
//!
//! [`TemplateMiner`]는 마스커와 파스 트리를 소유하며, 라인마다
//! 템플릿 ID를 스트림에 기록합니다. 한 소스는 한 마이너가 순차적으로 처리합니다.

use tracing::debug;

use logloom_core::metrics as m;
use logloom_core::types::{TemplateId, Token};

use crate::cluster::{Lookup, RouteResult};
use crate::collector::RawLog;
use crate::config::MinerSettings;
use crate::error::MinerError;
use crate::masker::Masker;
use crate::table::{MinedSource, TemplateStats, TemplateTable};
use crate::tree::TemplateTree;

/// 읽기 전용 분석 결과
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// 마스킹된 토큰
    pub tokens: Vec<Token>,
    /// 조회 결과
    pub lookup: Lookup,
}

/// 소스 하나를 담당하는 템플릿 마이너
#[derive(Debug)]
pub struct TemplateMiner {
    source: String,
    masker: Masker,
    tree: TemplateTree,
    stream: Vec<TemplateId>,
}

impl TemplateMiner {
    /// 새 마이너를 생성합니다.
    ///
    /// 설정값이 유효 범위를 벗어나면 에러를 반환합니다.
    pub fn new(source: impl Into<String>, settings: &MinerSettings) -> Result<Self, MinerError> {
        settings.validate()?;
        Ok(Self {
            source: source.into(),
            masker: Masker::from_settings(settings)?,
            tree: TemplateTree::from_settings(settings),
            stream: Vec::new(),
        })
    }

    /// 저장된 템플릿 테이블로 조회 전용 마이너를 생성합니다.
    pub fn from_table(
        source: impl Into<String>,
        table: &TemplateTable,
        settings: &MinerSettings,
    ) -> Result<Self, MinerError> {
        let mut miner = Self::new(source, settings)?;
        table.rebuild_tree(&mut miner.tree);
        Ok(miner)
    }

    /// 소스 이름을 반환합니다.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 라인 하나를 처리합니다.
    pub fn add_line(&mut self, raw: &str) -> RouteResult {
        let line_index = self.stream.len() as u64;
        let tokens = self.masker.mask(raw);
        let result = self.tree.route_and_update(tokens, raw, line_index);
        if result.is_new {
            debug!(
                source = %self.source,
                template_id = %result.template_id,
                line = line_index,
                "new template created"
            );
        }
        self.stream.push(result.template_id);
        result
    }

    /// 여러 라인을 순서대로 처리합니다.
    pub fn add_lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        for line in lines {
            self.add_line(line);
        }
    }

    /// 수집된 원시 로그를 순서대로 처리합니다.
    pub fn add_raw_logs(&mut self, logs: &[RawLog]) {
        for log in logs {
            self.add_line(&log.text());
        }
    }

    /// 상태를 바꾸지 않고 라인을 분석합니다.
    pub fn analyze(&self, raw: &str) -> Analysis {
        let tokens = self.masker.mask(raw);
        let lookup = self.tree.lookup(&tokens);
        Analysis { tokens, lookup }
    }

    /// 처리한 라인 수를 반환합니다.
    pub fn total_lines(&self) -> u64 {
        self.stream.len() as u64
    }

    /// 파스 트리를 반환합니다.
    pub fn tree(&self) -> &TemplateTree {
        &self.tree
    }

    /// ID로 템플릿 렌더링을 조회합니다.
    pub fn rendering(&self, id: TemplateId) -> Option<String> {
        self.tree.get(id).map(|t| t.rendering())
    }

    /// 현재 상태의 템플릿 통계를 계산합니다.
    pub fn stats(&self, top_n: usize) -> TemplateStats {
        TemplateTable::from_tree(&self.tree, &self.source).stats(top_n)
    }

    /// 현재 상태의 마이닝 결과를 만듭니다.
    pub fn snapshot(&self) -> MinedSource {
        MinedSource::from_tree(&self.source, &self.tree, self.stream.clone())
    }

    /// 마이닝을 마치고 결과를 반환합니다.
    pub fn finish(self) -> MinedSource {
        metrics::counter!(m::MINER_LINES_TOTAL, m::LABEL_SOURCE => self.source.clone())
            .increment(self.stream.len() as u64);
        metrics::counter!(m::MINER_TEMPLATES_CREATED_TOTAL, m::LABEL_SOURCE => self.source.clone())
            .increment(self.tree.len() as u64);
        MinedSource::from_tree(&self.source, &self.tree, self.stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn miner() -> TemplateMiner {
        TemplateMiner::new("app", &MinerSettings::default()).unwrap()
    }

    #[test]
    fn rejects_invalid_settings() {
        let settings = MinerSettings {
            sim_threshold: 0.0,
            ..MinerSettings::default()
        };
        assert!(TemplateMiner::new("app", &settings).is_err());
    }

    #[test]
    fn timestamped_error_lines_share_a_template() {
        let mut miner = miner();
        let first = miner.add_line("2024-01-01 10:00:00 ERROR Database connection failed");
        let second = miner.add_line("2024-01-02 11:30:00 ERROR Database connection failed");
        assert!(first.is_new);
        assert!(!second.is_new);
        assert_eq!(
            miner.rendering(first.template_id).unwrap(),
            "<TIMESTAMP> ERROR Database connection failed"
        );
    }

    #[test]
    fn login_lines_generalize_user_id() {
        let mut miner = miner();
        miner.add_line("User 42 login successful");
        let result = miner.add_line("User 99 login successful");
        assert!(!result.is_new);
        assert_eq!(
            miner.rendering(result.template_id).unwrap(),
            "User <*> login successful"
        );
        assert_eq!(miner.tree().len(), 1);
    }

    #[test]
    fn different_token_counts_create_separate_templates() {
        let mut miner = miner();
        let a = miner.add_line("User 42 login successful");
        let b = miner.add_line("Database connection failed");
        assert!(a.is_new && b.is_new);
        let stats = miner.stats(10);
        assert_eq!(stats.unique_templates, 2);
        assert!(stats.top.iter().all(|t| t.count == 1));
    }

    #[test]
    fn stream_records_every_line() {
        let mut miner = miner();
        miner.add_lines(["a b c", "x y", "a b c"]);
        let mined = miner.snapshot();
        assert_eq!(mined.total_lines, 3);
        assert_eq!(mined.stream, vec![TemplateId(0), TemplateId(1), TemplateId(0)]);
        assert_eq!(mined.rendered_stream().unwrap(), vec!["a b c", "x y", "a b c"]);
    }

    #[test]
    fn stream_resolves_to_final_rendering() {
        let mut miner = miner();
        miner.add_line("job 1 started ok");
        miner.add_line("job 2 started ok");
        let mined = miner.finish();
        // 첫 라인의 ID도 일반화된 최종 렌더링으로 해석됨
        assert_eq!(
            mined.rendered_stream().unwrap(),
            vec!["job <*> started ok", "job <*> started ok"]
        );
    }

    #[test]
    fn analyze_is_read_only() {
        let mut miner = miner();
        miner.add_line("disk full on sda");
        let before = miner.snapshot();

        let analysis = miner.analyze("disk full on sdb");
        assert!(matches!(analysis.lookup, Lookup::Match { .. }));
        assert_eq!(analysis.tokens.len(), 4);
        assert_eq!(miner.snapshot(), before);
    }

    #[test]
    fn from_table_answers_lookups() {
        let mut miner = miner();
        miner.add_lines(["cache miss key1", "cache miss key2"]);
        let mined = miner.finish();

        let restored =
            TemplateMiner::from_table("saved", &mined.templates, &MinerSettings::default()).unwrap();
        let analysis = restored.analyze("cache miss key3");
        match analysis.lookup {
            Lookup::Match { score, .. } => assert!((score - 1.0).abs() < f64::EPSILON),
            Lookup::New => panic!("expected match"),
        }
        assert_eq!(restored.total_lines(), 0);
    }

    #[test]
    fn stats_reports_top_templates() {
        let mut miner = miner();
        miner.add_lines(["a b", "a b", "c d e"]);
        let stats = miner.stats(1);
        assert_eq!(stats.total_lines, 3);
        assert_eq!(stats.unique_templates, 2);
        assert_eq!(stats.top[0].rendering, "a b");
        assert_eq!(stats.top[0].count, 2);
    }

    #[test]
    fn blank_line_is_counted() {
        let mut miner = miner();
        let result = miner.add_line("");
        assert!(result.is_new);
        assert_eq!(miner.rendering(result.template_id).unwrap(), "");
        assert_eq!(miner.total_lines(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mining_is_deterministic(lines in prop::collection::vec("[a-c0-9 ]{0,20}", 0..30)) {
                let mut a = miner();
                let mut b = miner();
                a.add_lines(lines.iter().map(String::as_str));
                b.add_lines(lines.iter().map(String::as_str));
                prop_assert_eq!(a.finish(), b.finish());
            }
        }
    }
}
