#![no_main]

use libfuzzer_sys::fuzz_target;
use logloom_core::types::Token;
use logloom_miner::Masker;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(masker) = Masker::new("=,;") else {
        return;
    };

    let tokens = masker.mask(line);
    assert_eq!(tokens, masker.mask(line), "masking must be deterministic");
    for token in &tokens {
        if let Token::Literal(text) = token {
            assert!(!text.is_empty(), "empty literal token");
            assert!(!text.chars().any(char::is_whitespace), "whitespace in token");
        }
    }
});
