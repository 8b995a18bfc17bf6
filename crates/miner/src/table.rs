//! 템플릿 테이블 -- 마이닝 결과의 영속화 형식과 병합
//!
//! [`TemplateTable`]은 렌더링 문자열을 키로 하는 정렬된 맵입니다.
//! 소스별 테이블은 [`TemplateTable::merge`]로 하나로 합쳐 어휘 구축에 사용합니다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use logloom_core::types::{TemplateId, Token};

use crate::error::MinerError;
use crate::tree::TemplateTree;

/// 저장된 템플릿 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    /// 마이닝 실행 내 템플릿 ID
    pub id: TemplateId,
    /// 발생 횟수
    pub count: u64,
    /// 예시 라인 (오래된 것부터)
    pub examples: Vec<String>,
    /// 처음 등장한 라인 인덱스
    pub first_seen: u64,
    /// 소스 이름
    pub source: String,
}

impl TemplateRecord {
    /// 병합 시 우선순위 키 (먼저 등장한 쪽이 작음)
    fn origin(&self) -> (u64, &str) {
        (self.first_seen, self.source.as_str())
    }

    /// 같은 렌더링의 다른 레코드를 흡수합니다.
    ///
    /// 카운트는 합산, 예시는 이어 붙인 뒤 최신 `max_examples`개만 유지,
    /// 출처(`first_seen`, `source`, `id`)는 더 먼저 등장한 쪽을 유지합니다.
    fn absorb(&mut self, other: &TemplateRecord, max_examples: usize) {
        self.count += other.count;
        self.examples.extend(other.examples.iter().cloned());
        let excess = self.examples.len().saturating_sub(max_examples);
        self.examples.drain(..excess);
        if other.origin() < self.origin() {
            self.first_seen = other.first_seen;
            self.source = other.source.clone();
            self.id = other.id;
        }
    }
}

/// 렌더링 → 레코드 맵
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateTable {
    records: BTreeMap<String, TemplateRecord>,
}

impl TemplateTable {
    /// 빈 테이블을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 트리의 템플릿을 테이블로 내보냅니다.
    ///
    /// 렌더링이 같은 템플릿이 여럿이면 하나의 레코드로 합칩니다.
    pub fn from_tree(tree: &TemplateTree, source: &str) -> Self {
        let mut table = Self::new();
        for template in tree.templates() {
            table.insert(
                template.rendering(),
                TemplateRecord {
                    id: template.id,
                    count: template.count,
                    examples: template.examples.iter().cloned().collect(),
                    first_seen: template.first_seen,
                    source: source.to_owned(),
                },
                tree.max_examples(),
            );
        }
        table
    }

    /// 레코드를 추가합니다. 같은 렌더링이 있으면 병합합니다.
    pub fn insert(&mut self, rendering: String, record: TemplateRecord, max_examples: usize) {
        match self.records.get_mut(&rendering) {
            Some(existing) => existing.absorb(&record, max_examples),
            None => {
                self.records.insert(rendering, record);
            }
        }
    }

    /// 다른 테이블을 병합합니다.
    pub fn merge(&mut self, other: &TemplateTable, max_examples: usize) {
        for (rendering, record) in &other.records {
            self.insert(rendering.clone(), record.clone(), max_examples);
        }
    }

    /// 여러 테이블을 순서대로 병합한 새 테이블을 반환합니다.
    pub fn merged<'a>(tables: impl IntoIterator<Item = &'a TemplateTable>, max_examples: usize) -> Self {
        let mut merged = Self::new();
        for table in tables {
            merged.merge(table, max_examples);
        }
        merged
    }

    /// 렌더링으로 레코드를 조회합니다.
    pub fn get(&self, rendering: &str) -> Option<&TemplateRecord> {
        self.records.get(rendering)
    }

    /// 렌더링 순으로 레코드를 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TemplateRecord)> {
        self.records.iter()
    }

    /// 레코드 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 테이블이 비었는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 전체 발생 횟수 (= 처리된 라인 수)
    pub fn total_count(&self) -> u64 {
        self.records.values().map(|r| r.count).sum()
    }

    /// 저장된 템플릿으로 파스 트리를 재구성합니다.
    ///
    /// 재구성된 트리의 ID는 원래 ID와 다를 수 있으며 조회 전용으로 사용합니다.
    pub fn rebuild_tree(&self, tree: &mut TemplateTree) {
        let mut records: Vec<(&String, &TemplateRecord)> = self.records.iter().collect();
        records.sort_by(|a, b| a.1.origin().cmp(&b.1.origin()).then_with(|| a.0.cmp(b.0)));
        for (rendering, record) in records {
            let tokens: Vec<Token> = if rendering.is_empty() {
                Vec::new()
            } else {
                rendering.split(' ').map(|s| Token::from(s.to_owned())).collect()
            };
            tree.insert_template(tokens, record.count, &record.examples, record.first_seen);
        }
    }

    /// 템플릿 통계를 계산합니다.
    ///
    /// 상위 목록은 카운트 내림차순, 동률이면 렌더링 순입니다.
    pub fn stats(&self, top_n: usize) -> TemplateStats {
        let mut ranked: Vec<(&String, &TemplateRecord)> = self.records.iter().collect();
        ranked.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));

        TemplateStats {
            total_lines: self.total_count(),
            unique_templates: self.records.len(),
            top: ranked
                .into_iter()
                .take(top_n)
                .map(|(rendering, record)| TopTemplate {
                    rendering: rendering.clone(),
                    count: record.count,
                    source: record.source.clone(),
                    examples: record.examples.clone(),
                })
                .collect(),
        }
    }
}

/// 템플릿 통계
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStats {
    /// 처리된 전체 라인 수
    pub total_lines: u64,
    /// 고유 템플릿 수
    pub unique_templates: usize,
    /// 카운트 상위 템플릿
    pub top: Vec<TopTemplate>,
}

/// 상위 템플릿 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopTemplate {
    /// 렌더링
    pub rendering: String,
    /// 발생 횟수
    pub count: u64,
    /// 가장 먼저 등장한 소스
    pub source: String,
    /// 예시 라인
    pub examples: Vec<String>,
}

/// 소스 하나의 마이닝 결과 (`<stem>_templates.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinedSource {
    /// 소스 이름 (파일 스템)
    pub source: String,
    /// 처리된 라인 수
    pub total_lines: u64,
    /// 템플릿 테이블
    pub templates: TemplateTable,
    /// 라인 순서대로의 템플릿 ID 스트림
    pub stream: Vec<TemplateId>,
    /// `renderings[id]` = 템플릿 `id`의 최종 렌더링
    pub renderings: Vec<String>,
}

impl MinedSource {
    /// 트리와 ID 스트림에서 마이닝 결과를 만듭니다.
    pub fn from_tree(source: &str, tree: &TemplateTree, stream: Vec<TemplateId>) -> Self {
        Self {
            source: source.to_owned(),
            total_lines: stream.len() as u64,
            templates: TemplateTable::from_tree(tree, source),
            stream,
            renderings: tree.templates().iter().map(|t| t.rendering()).collect(),
        }
    }

    /// ID 스트림을 최종 렌더링 스트림으로 변환합니다.
    pub fn rendered_stream(&self) -> Result<Vec<&str>, MinerError> {
        self.stream
            .iter()
            .map(|id| {
                self.renderings
                    .get(id.index())
                    .map(String::as_str)
                    .ok_or_else(|| {
                        MinerError::Inconsistent(format!(
                            "source '{}' references unknown template {id}",
                            self.source
                        ))
                    })
            })
            .collect()
    }
}
