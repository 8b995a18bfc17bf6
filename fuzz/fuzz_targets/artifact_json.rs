#![no_main]

use libfuzzer_sys::fuzz_target;
use logloom_miner::{MinedSource, Vocabulary, VocabularyFile};

fuzz_target!(|data: &[u8]| {
    // 손상된 결과 파일은 에러로 거부되어야 하며 패닉은 허용되지 않음
    if let Ok(mined) = serde_json::from_slice::<MinedSource>(data) {
        let _ = mined.rendered_stream();
        let _ = mined.templates.stats(10);
    }

    if let Ok(file) = serde_json::from_slice::<VocabularyFile>(data) {
        if let Ok(vocab) = Vocabulary::from_file(file) {
            assert!(vocab.len() >= 5, "validated vocabulary lost special tokens");
            assert!(vocab.len() <= vocab.max_vocab_size());
            for (id, token) in vocab.tokens() {
                assert_eq!(vocab.lookup(token), id);
            }
        }
    }
});
