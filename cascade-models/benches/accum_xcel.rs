// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

/// Benchmark the accumulator at each level and the multiplier models.
use cascade_engine::engine::Engine;
use cascade_models::accum_xcel::Level;
use cascade_models::conformance::{AccumTest, run_accumulate, run_int_mul};
use cascade_models::int_mul::IntMulModel;
use cascade_models::memory::MemoryConfig;
use cascade_models::msg::MulReq;
use cascade_track::tracker::dev_null_tracker;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

fn create_engine() -> Engine {
    // Create an engine without the tracker system opening files for logging
    let tracker = dev_null_tracker();
    Engine::new(&tracker)
}

fn large_test() -> AccumTest {
    AccumTest::new((0..8).map(|i| (i..i + 256).collect()).collect())
        .with_memory(MemoryConfig::new(2))
}

fn mul_requests() -> Vec<MulReq> {
    (0..200u32)
        .map(|i| MulReq::new(i.wrapping_mul(0x9e37_79b9), i))
        .collect()
}

fn bench_accum_xcel(c: &mut Criterion) {
    let mut group = c.benchmark_group("accum_xcel");
    let test = large_test();

    for level in Level::ALL {
        group.bench_function(format!("{level}"), |b| {
            b.iter_batched(
                create_engine,
                |mut engine| run_accumulate(&mut engine, level, &test).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_int_mul(c: &mut Criterion) {
    let mut group = c.benchmark_group("int_mul");
    let requests = mul_requests();

    for model in [
        IntMulModel::Fl,
        IntMulModel::VarLatCl,
        IntMulModel::NstageCl(4),
        IntMulModel::NstageRtl(4),
    ] {
        group.bench_function(format!("{model}"), |b| {
            b.iter_batched(
                create_engine,
                |mut engine| run_int_mul(&mut engine, model, &requests, 0, 0).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = bench_accum_xcel, bench_int_mul
}
criterion_main!(benches);
