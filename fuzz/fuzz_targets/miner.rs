#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use logloom_miner::{
    MinerSettingsBuilder, TemplateMiner, VocabSettings, VocabularyBuilder, windows,
};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 마이닝할 라인 (최대 64개로 제한)
    lines: Vec<String>,
    /// 트리 깊이 (1..=8로 보정)
    max_depth: u8,
    /// 유사도 임계값 백분율 (1..=100으로 보정)
    sim_percent: u8,
    /// 윈도우 크기 (1..=16으로 보정)
    window: u8,
}

fuzz_target!(|input: FuzzInput| {
    let Ok(settings) = MinerSettingsBuilder::new()
        .max_depth(usize::from(input.max_depth % 8) + 1)
        .sim_threshold(f64::from(input.sim_percent % 100 + 1) / 100.0)
        .max_examples(3)
        .build()
    else {
        return;
    };
    let Ok(mut miner) = TemplateMiner::new("fuzz", &settings) else {
        return;
    };

    let lines: Vec<&str> = input.lines.iter().take(64).map(String::as_str).collect();
    miner.add_lines(lines.iter().copied());
    let mined = miner.finish();

    // 모든 라인은 정확히 하나의 템플릿에 집계됨
    assert_eq!(mined.total_lines as usize, lines.len());
    assert_eq!(mined.templates.total_count(), mined.total_lines);
    for (_, record) in mined.templates.iter() {
        assert!(record.examples.len() <= 3, "example cap exceeded");
    }

    let rendered = mined.rendered_stream().expect("stream must resolve");
    assert_eq!(rendered.len(), lines.len());

    let Ok(builder) = VocabularyBuilder::new(VocabSettings::default()) else {
        return;
    };
    let vocab = builder.build(&mined.templates);
    let ids = vocab.encode_stream(&mined).expect("stream must encode");
    let window = usize::from(input.window % 16) + 1;
    for w in windows(&ids, window, 1).expect("valid window") {
        assert_eq!(w.len(), window);
        assert!(w.iter().all(|&id| (id as usize) < vocab.len()));
    }
});
