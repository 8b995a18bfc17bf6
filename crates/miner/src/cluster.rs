//! 리프 클러스터러 -- 리프 안에서 가장 유사한 템플릿을 찾아 흡수하거나 새로 만듭니다.
//!
//! 유사도는 (후보 토큰이 와일드카드이거나 입력 토큰과 같은 위치 수) / 토큰 수 입니다.
//! 템플릿 내용이 바뀌는 곳은 이 모듈뿐입니다.

use std::collections::VecDeque;

use logloom_core::types::{TemplateId, Token, Wildcard, render_tokens};

/// 마이닝된 로그 템플릿
///
/// 토큰 수는 생성 시 고정되며, 일반화는 불일치 위치를 `<*>`로 바꾸는 방향으로만 진행됩니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// 템플릿 ID
    pub id: TemplateId,
    /// 템플릿 토큰
    pub tokens: Vec<Token>,
    /// 이 템플릿으로 흡수된 라인 수
    pub count: u64,
    /// 최근 예시 라인 (가장 오래된 것부터)
    pub examples: VecDeque<String>,
    /// 템플릿을 만든 입력 라인의 인덱스 (0부터)
    pub first_seen: u64,
}

impl Template {
    fn new(id: TemplateId, tokens: Vec<Token>, raw: &str, first_seen: u64) -> Self {
        Self {
            id,
            tokens,
            count: 1,
            examples: VecDeque::from([raw.to_owned()]),
            first_seen,
        }
    }

    /// 템플릿 렌더링 문자열을 반환합니다.
    pub fn rendering(&self) -> String {
        render_tokens(&self.tokens)
    }

    /// 예시를 추가합니다. 용량을 넘으면 가장 오래된 예시를 버립니다.
    fn push_example(&mut self, raw: &str, max_examples: usize) {
        if self.examples.len() >= max_examples {
            self.examples.pop_front();
        }
        self.examples.push_back(raw.to_owned());
    }
}

/// 라우팅 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteResult {
    /// 라인을 흡수한 템플릿 ID
    pub template_id: TemplateId,
    /// 새 템플릿 생성 여부
    pub is_new: bool,
}

/// 읽기 전용 조회 결과
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// 기존 템플릿이 라인을 흡수함
    Match {
        /// 흡수할 템플릿 ID
        template_id: TemplateId,
        /// 유사도
        score: f64,
        /// 흡수 후 템플릿이 될 토큰
        generalized: Vec<Token>,
    },
    /// 새 템플릿이 생성될 것
    New,
}

/// 두 토큰 시퀀스의 유사도를 계산합니다.
///
/// 빈 시퀀스끼리의 유사도는 1.0입니다. 길이가 다르면 0.0입니다.
pub fn similarity(candidate: &[Token], tokens: &[Token]) -> f64 {
    if candidate.len() != tokens.len() {
        return 0.0;
    }
    if tokens.is_empty() {
        return 1.0;
    }
    let matched = candidate
        .iter()
        .zip(tokens)
        .filter(|(c, t)| c.is_wildcard() || c == t)
        .count();
    matched as f64 / tokens.len() as f64
}

/// 후보 템플릿에 입력 토큰을 흡수했을 때의 토큰을 계산합니다.
fn generalize(candidate: &[Token], tokens: &[Token]) -> Vec<Token> {
    candidate
        .iter()
        .zip(tokens)
        .map(|(c, t)| {
            if c.is_wildcard() || c == t {
                c.clone()
            } else {
                Token::Wildcard(Wildcard::Any)
            }
        })
        .collect()
}

/// 리프 클러스터러
#[derive(Debug, Clone, Copy)]
pub struct LeafClusterer {
    sim_threshold: f64,
    max_examples: usize,
}

impl LeafClusterer {
    /// 새 클러스터러를 생성합니다.
    ///
    /// 값 검증은 [`MinerSettings::validate`](crate::config::MinerSettings::validate)에서 수행됩니다.
    pub fn new(sim_threshold: f64, max_examples: usize) -> Self {
        Self {
            sim_threshold,
            max_examples,
        }
    }

    /// 템플릿당 예시 보관 수를 반환합니다.
    pub fn max_examples(&self) -> usize {
        self.max_examples
    }

    /// 리프에서 임계값 이상인 최고 점수 템플릿을 찾습니다.
    ///
    /// 동점이면 ID가 작은 템플릿을 선택합니다.
    fn best_match(
        &self,
        leaf: &[TemplateId],
        arena: &[Template],
        tokens: &[Token],
    ) -> Option<(TemplateId, f64)> {
        let mut best: Option<(TemplateId, f64)> = None;
        for &id in leaf {
            let Some(template) = arena.get(id.index()) else {
                continue;
            };
            let score = similarity(&template.tokens, tokens);
            best = match best {
                Some((best_id, best_score))
                    if best_score > score || (best_score == score && best_id < id) =>
                {
                    Some((best_id, best_score))
                }
                _ => Some((id, score)),
            };
        }
        best.filter(|&(_, score)| score >= self.sim_threshold)
    }

    /// 라인을 기존 템플릿에 흡수하거나 새 템플릿을 만듭니다.
    pub fn match_or_create(
        &self,
        leaf: &mut Vec<TemplateId>,
        arena: &mut Vec<Template>,
        tokens: Vec<Token>,
        raw: &str,
        line_index: u64,
    ) -> RouteResult {
        if let Some((id, _)) = self.best_match(leaf, arena, &tokens) {
            if let Some(template) = arena.get_mut(id.index()) {
                for (slot, incoming) in template.tokens.iter_mut().zip(&tokens) {
                    if !slot.is_wildcard() && slot != incoming {
                        *slot = Token::Wildcard(Wildcard::Any);
                    }
                }
                template.count += 1;
                template.push_example(raw, self.max_examples);
                return RouteResult {
                    template_id: id,
                    is_new: false,
                };
            }
        }

        let id = next_id(arena);
        arena.push(Template::new(id, tokens, raw, line_index));
        leaf.push(id);
        RouteResult {
            template_id: id,
            is_new: true,
        }
    }

    /// 상태를 바꾸지 않고 라인이 어떤 템플릿에 흡수될지 조회합니다.
    pub fn lookup(&self, leaf: &[TemplateId], arena: &[Template], tokens: &[Token]) -> Lookup {
        match self.best_match(leaf, arena, tokens) {
            Some((template_id, score)) => {
                let generalized = arena
                    .get(template_id.index())
                    .map(|t| generalize(&t.tokens, tokens))
                    .unwrap_or_default();
                Lookup::Match {
                    template_id,
                    score,
                    generalized,
                }
            }
            None => Lookup::New,
        }
    }

    /// 저장된 템플릿을 그대로 리프에 추가합니다 (트리 재구성용).
    pub(crate) fn insert_verbatim(
        &self,
        leaf: &mut Vec<TemplateId>,
        arena: &mut Vec<Template>,
        tokens: Vec<Token>,
        count: u64,
        examples: &[String],
        first_seen: u64,
    ) -> TemplateId {
        let id = next_id(arena);
        let keep = examples.len().saturating_sub(self.max_examples);
        arena.push(Template {
            id,
            tokens,
            count,
            examples: examples[keep..].iter().cloned().collect(),
            first_seen,
        });
        leaf.push(id);
        id
    }
}

fn next_id(arena: &[Template]) -> TemplateId {
    TemplateId(arena.len() as u32)
}
