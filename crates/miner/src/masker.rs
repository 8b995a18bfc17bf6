//! 마스커 -- 원시 로그 라인을 토큰화하고 변수 영역을 와일드카드로 치환합니다.
//!
//! # 규칙 (토큰 전체 일치, 먼저 일치한 규칙 적용)
//! 1. 10자리 이상 숫자 → `<TIMESTAMP>` (유닉스 epoch)
//! 2. IPv4 주소 → `<IP>`
//! 3. 5자리 이상 숫자 → `<NUM>`
//! 4. `/`로 시작하는 경로 → `<PATH>`
//! 5. 하이픈 형식 UUID → `<UUID>`
//!
//! 날짜와 시각이 두 토큰으로 나뉜 타임스탬프(`2024-01-01 10:00:00`,
//! `01/01/2024 10:00:00`)는 하나의 `<TIMESTAMP>` 토큰으로 합쳐집니다.

use regex::Regex;

use logloom_core::types::{Token, Wildcard};

use crate::config::MinerSettings;
use crate::error::MinerError;

/// UUID 하이픈 표기 길이
const UUID_LEN: usize = 36;

/// 로그 라인 마스커
///
/// 생성 시 정규식을 한 번만 컴파일하며, 이후 [`mask`](Self::mask)는
/// 순수하고 결정적입니다.
#[derive(Debug, Clone)]
pub struct Masker {
    extra_delimiters: Vec<char>,
    iso_date: Regex,
    us_date: Regex,
    clock: Regex,
    epoch: Regex,
    ipv4: Regex,
    number: Regex,
}

impl Masker {
    /// 추가 구분자를 지정하여 마스커를 생성합니다.
    pub fn new(extra_delimiters: &str) -> Result<Self, MinerError> {
        Ok(Self {
            extra_delimiters: extra_delimiters.chars().collect(),
            iso_date: Regex::new(r"^\d{4}-\d{2}-\d{2}$")?,
            us_date: Regex::new(r"^\d{2}/\d{2}/\d{4}$")?,
            clock: Regex::new(r"^\d{2}:\d{2}:\d{2}$")?,
            epoch: Regex::new(r"^\d{10,}$")?,
            ipv4: Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$")?,
            number: Regex::new(r"^\d{5,}$")?,
        })
    }

    /// 마이너 설정에서 마스커를 생성합니다.
    pub fn from_settings(settings: &MinerSettings) -> Result<Self, MinerError> {
        Self::new(&settings.extra_delimiters)
    }

    /// 원시 로그 라인을 마스킹된 토큰 시퀀스로 변환합니다.
    ///
    /// 빈 라인(공백만 있는 라인 포함)은 빈 시퀀스를 반환합니다.
    pub fn mask(&self, raw_line: &str) -> Vec<Token> {
        let mut pieces = self.split(raw_line).peekable();
        let mut tokens = Vec::new();

        while let Some(piece) = pieces.next() {
            if self.is_date(piece) && pieces.peek().is_some_and(|next| self.clock.is_match(next)) {
                pieces.next();
                tokens.push(Token::Wildcard(Wildcard::Timestamp));
                continue;
            }
            tokens.push(self.mask_token(piece));
        }

        tokens
    }

    fn split<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        line.split(move |c: char| c.is_whitespace() || self.extra_delimiters.contains(&c))
            .filter(|piece| !piece.is_empty())
    }

    fn is_date(&self, piece: &str) -> bool {
        self.iso_date.is_match(piece) || self.us_date.is_match(piece)
    }

    fn mask_token(&self, piece: &str) -> Token {
        if self.epoch.is_match(piece) {
            Token::Wildcard(Wildcard::Timestamp)
        } else if self.ipv4.is_match(piece) {
            Token::Wildcard(Wildcard::Ip)
        } else if self.number.is_match(piece) {
            Token::Wildcard(Wildcard::Num)
        } else if piece.len() > 1 && piece.starts_with('/') {
            Token::Wildcard(Wildcard::Path)
        } else if piece.len() == UUID_LEN && uuid::Uuid::try_parse(piece).is_ok() {
            Token::Wildcard(Wildcard::Uuid)
        } else {
            Token::literal(piece)
        }
    }
}
