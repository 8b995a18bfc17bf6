//! 마스커 벤치마크
//!
//! 짧은 라인, 마스킹 대상이 많은 라인, 구분자 확장 라인의 처리량을 측정합니다.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use logloom_miner::Masker;

/// 마스킹 대상이 없는 짧은 라인
const PLAIN_SHORT: &str = "worker pool resized";

/// 타임스탬프, IP, 경로, UUID, 숫자를 모두 포함한 라인
const MIXED_LONG: &str = "2024-01-15 12:00:00 INFO request 550e8400-e29b-41d4-a716-446655440000 from 192.168.1.100 GET /api/v1/users/create took 1234567 us status 201";

/// 키=값 형식 (구분자 확장 대상)
const KEY_VALUE: &str = "user=admin,ip=10.0.0.1,path=/var/log/auth.log,elapsed=98765";

fn bench_mask(c: &mut Criterion) {
    let masker = Masker::new("").unwrap();

    let mut group = c.benchmark_group("mask");
    group.throughput(Throughput::Elements(1));

    group.bench_function("plain_short", |b| {
        b.iter(|| masker.mask(black_box(PLAIN_SHORT)))
    });

    group.bench_function("mixed_long", |b| {
        b.iter(|| masker.mask(black_box(MIXED_LONG)))
    });

    // 1000건 반복 처리량
    group.throughput(Throughput::Elements(1000));
    group.bench_function("throughput_1000", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                masker.mask(black_box(MIXED_LONG));
            }
        })
    });

    group.finish();
}

fn bench_extra_delimiters(c: &mut Criterion) {
    let masker = Masker::new("=,").unwrap();

    c.bench_function("mask_key_value_delimiters", |b| {
        b.iter(|| masker.mask(black_box(KEY_VALUE)))
    });
}

criterion_group!(benches, bench_mask, bench_extra_delimiters);
criterion_main!(benches);
