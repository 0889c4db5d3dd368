// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for CHORUS
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Beat-grid offset math (called on every round and loop start)
//! - Action queue operations (scheduler core)
//! - Timing-grade classification

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Benchmark next-beat offset computation (core grid operation)
fn bench_next_beat(c: &mut Criterion) {
    let origin = 0.0f64;
    let interval = 5.0f64;

    c.bench_function("next_beat_offset", |b| {
        b.iter(|| {
            let now = black_box(123.456f64);
            let elapsed = now - black_box(origin);
            let phase = elapsed.rem_euclid(black_box(interval));
            let mut offset = interval - phase;
            if offset < 0.05 {
                offset += interval;
            }
            black_box(offset)
        })
    });
}

/// Benchmark action queue operations (scheduler core)
fn bench_action_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("action_queue");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::new("insert", size), size, |b, &size| {
            b.iter(|| {
                let mut queue: BinaryHeap<Reverse<(u64, u64)>> = BinaryHeap::new();
                for i in 0..size {
                    queue.push(Reverse((i as u64 * 50_000, i as u64)));
                }
                black_box(queue.len())
            })
        });

        group.bench_with_input(BenchmarkId::new("drain", size), size, |b, &size| {
            b.iter_batched(
                || {
                    let mut queue: BinaryHeap<Reverse<(u64, u64)>> = BinaryHeap::new();
                    for i in 0..size {
                        queue.push(Reverse((i as u64 * 50_000, i as u64)));
                    }
                    queue
                },
                |mut queue| {
                    let mut count = 0;
                    while queue.pop().is_some() {
                        count += 1;
                    }
                    black_box(count)
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark timing-grade classification
fn bench_grading(c: &mut Criterion) {
    let windows = (0.15f64, 0.30f64, 0.50f64);

    c.bench_function("grade_click", |b| {
        b.iter(|| {
            let expected = black_box(10.0f64);
            let actual = black_box(10.37f64);
            let diff = (actual - expected).abs();
            let grade = if diff <= windows.0 {
                0u8
            } else if diff <= windows.1 {
                1
            } else if diff <= windows.2 {
                2
            } else {
                3
            };
            black_box(grade)
        })
    });
}

criterion_group!(benches, bench_next_beat, bench_action_queue, bench_grading);
criterion_main!(benches);
