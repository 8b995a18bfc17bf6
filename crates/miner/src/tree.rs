//! 고정 깊이 접두사 트리 -- 토큰 수와 앞쪽 토큰으로 라인을 리프까지 라우팅합니다.
//!
//! # 구조
//! ```text
//! root ─┬─ len=5 ─┬─ "<TIMESTAMP>" ─┬─ "ERROR" ─ leaf [T0, T3]
//!       │         │                 └─ "INFO"  ─ leaf [T1]
//!       │         └─ ...
//!       └─ len=6 ─ ...
//! ```
//!
//! 토큰 레벨 수는 `max_depth - 2`(음수면 0)이며 토큰 수를 넘지 않습니다.
//! 와일드카드는 자기 마커로, 숫자가 섞인 리터럴은 `<*>`로 라우팅됩니다.
//! 자식 노드는 필요할 때 생성되고 삭제되지 않습니다.
//! 템플릿은 트리가 소유한 ID 인덱스 아레나에 저장되고 리프는 ID만 가집니다.

use std::collections::HashMap;

use logloom_core::types::{TemplateId, Token, Wildcard};

use crate::cluster::{LeafClusterer, Lookup, RouteResult, Template};
use crate::config::MinerSettings;

/// 트리 노드
///
/// 깊이 제한에 도달한 노드는 리프로만 사용되며 `templates`만 채워집니다.
#[derive(Debug, Default)]
struct Node {
    children: HashMap<Token, Node>,
    templates: Vec<TemplateId>,
}

/// 템플릿 파스 트리
#[derive(Debug)]
pub struct TemplateTree {
    max_depth: usize,
    root: HashMap<usize, Node>,
    arena: Vec<Template>,
    clusterer: LeafClusterer,
}

impl TemplateTree {
    /// 새 트리를 생성합니다.
    pub fn new(max_depth: usize, clusterer: LeafClusterer) -> Self {
        Self {
            max_depth,
            root: HashMap::new(),
            arena: Vec::new(),
            clusterer,
        }
    }

    /// 마이너 설정에서 트리를 생성합니다.
    pub fn from_settings(settings: &MinerSettings) -> Self {
        Self::new(
            settings.max_depth,
            LeafClusterer::new(settings.sim_threshold, settings.max_examples),
        )
    }

    /// 토큰 수에 대한 토큰 레벨 수
    fn levels_for(&self, token_count: usize) -> usize {
        self.max_depth.saturating_sub(2).min(token_count)
    }

    fn leaf(&self, tokens: &[Token]) -> Option<&Node> {
        let levels = self.levels_for(tokens.len());
        let mut node = self.root.get(&tokens.len())?;
        for token in &tokens[..levels] {
            node = node.children.get(&route_key(token))?;
        }
        Some(node)
    }

    /// 라인을 리프까지 라우팅하고 템플릿을 갱신하거나 생성합니다.
    ///
    /// 호출마다 정확히 하나의 템플릿 카운트가 1 증가합니다.
    pub fn route_and_update(&mut self, tokens: Vec<Token>, raw: &str, line_index: u64) -> RouteResult {
        let levels = self.levels_for(tokens.len());
        let leaf = descend(&mut self.root, levels, &tokens);
        self.clusterer
            .match_or_create(&mut leaf.templates, &mut self.arena, tokens, raw, line_index)
    }

    /// 트리를 바꾸지 않고 라인이 어떤 템플릿에 흡수될지 조회합니다.
    pub fn lookup(&self, tokens: &[Token]) -> Lookup {
        match self.leaf(tokens) {
            Some(node) => self.clusterer.lookup(&node.templates, &self.arena, tokens),
            None => Lookup::New,
        }
    }

    /// 저장된 템플릿을 그대로 삽입합니다 (저장된 결과로 트리 재구성).
    pub fn insert_template(
        &mut self,
        tokens: Vec<Token>,
        count: u64,
        examples: &[String],
        first_seen: u64,
    ) -> TemplateId {
        let levels = self.levels_for(tokens.len());
        let leaf = descend(&mut self.root, levels, &tokens);
        self.clusterer.insert_verbatim(
            &mut leaf.templates,
            &mut self.arena,
            tokens,
            count,
            examples,
            first_seen,
        )
    }

    /// ID로 템플릿을 조회합니다.
    pub fn get(&self, id: TemplateId) -> Option<&Template> {
        self.arena.get(id.index())
    }

    /// 생성 순서대로 모든 템플릿을 반환합니다.
    pub fn templates(&self) -> &[Template] {
        &self.arena
    }

    /// 템플릿 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// 템플릿이 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// 템플릿당 예시 보관 수를 반환합니다.
    pub fn max_examples(&self) -> usize {
        self.clusterer.max_examples()
    }
}

/// 자식 노드 선택에 쓰는 키
///
/// 숫자가 섞인 리터럴(`42`, `req-7`)은 변수일 가능성이 높아 `<*>` 자식으로 모읍니다.
fn route_key(token: &Token) -> Token {
    match token {
        Token::Literal(s) if s.bytes().any(|b| b.is_ascii_digit()) => Token::Wildcard(Wildcard::Any),
        other => other.clone(),
    }
}

/// 루트에서 리프까지 내려가며 필요한 노드를 생성합니다.
fn descend<'a>(root: &'a mut HashMap<usize, Node>, levels: usize, tokens: &[Token]) -> &'a mut Node {
    let mut node = root.entry(tokens.len()).or_default();
    for token in &tokens[..levels] {
        node = node.children.entry(route_key(token)).or_default();
    }
    node
}
