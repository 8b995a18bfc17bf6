//! 도메인 타입 — 마이닝/어휘/윈도잉 전 단계에서 공유하는 타입
//!
//! 토큰은 리터럴 문자열이거나 와일드카드 마커입니다.
//! 직렬화 시에는 렌더링된 문자열(`"ERROR"`, `"<NUM>"`)로 표현됩니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 와일드카드 마커 종류
///
/// 마스킹 단계에서 변수 영역을 대체하는 마커와,
/// 클러스터링 단계에서 일반화로 생성되는 범용 마커(`<*>`)를 포함합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Wildcard {
    /// 타임스탬프 (`2024-01-01 10:00:00`, 유닉스 epoch 등)
    Timestamp,
    /// IPv4 주소
    Ip,
    /// 5자리 이상 숫자
    Num,
    /// 파일 경로
    Path,
    /// UUID
    Uuid,
    /// 클러스터링 일반화로 생긴 범용 와일드카드
    Any,
}

impl Wildcard {
    /// 모든 마커 목록 (렌더링 역변환용)
    pub const ALL: [Wildcard; 6] = [
        Wildcard::Timestamp,
        Wildcard::Ip,
        Wildcard::Num,
        Wildcard::Path,
        Wildcard::Uuid,
        Wildcard::Any,
    ];

    /// 마커의 렌더링 문자열을 반환합니다.
    pub fn marker(self) -> &'static str {
        match self {
            Wildcard::Timestamp => "<TIMESTAMP>",
            Wildcard::Ip => "<IP>",
            Wildcard::Num => "<NUM>",
            Wildcard::Path => "<PATH>",
            Wildcard::Uuid => "<UUID>",
            Wildcard::Any => "<*>",
        }
    }

    /// 렌더링 문자열에서 마커를 복원합니다.
    pub fn from_marker(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.marker() == s)
    }
}

impl fmt::Display for Wildcard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// 마스킹된 로그 라인의 토큰
///
/// 동등성은 구조적입니다. 리터럴 텍스트가 `"<NUM>"`이더라도
/// `Wildcard::Num`과는 같지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Token {
    /// 원문 그대로의 토큰
    Literal(String),
    /// 와일드카드 마커
    Wildcard(Wildcard),
}

impl Token {
    /// 리터럴 토큰을 생성합니다.
    pub fn literal(s: impl Into<String>) -> Self {
        Token::Literal(s.into())
    }

    /// 와일드카드 여부를 반환합니다.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Token::Wildcard(_))
    }

    /// 렌더링 문자열을 반환합니다.
    pub fn as_str(&self) -> &str {
        match self {
            Token::Literal(s) => s,
            Token::Wildcard(w) => w.marker(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        match Wildcard::from_marker(&s) {
            Some(w) => Token::Wildcard(w),
            None => Token::Literal(s),
        }
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        match token {
            Token::Literal(s) => s,
            Token::Wildcard(w) => w.marker().to_owned(),
        }
    }
}

/// 토큰 시퀀스를 공백 하나로 이어 붙여 렌더링합니다.
///
/// 템플릿은 이 렌더링 문자열로 식별됩니다.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(token.as_str());
    }
    out
}

/// 템플릿 ID
///
/// 하나의 마이닝 실행 안에서 생성 순서대로 0부터 단조 증가하며,
/// 한 번 할당되면 바뀌지 않습니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TemplateId(pub u32);

impl TemplateId {
    /// 아레나 인덱스로 변환합니다.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
