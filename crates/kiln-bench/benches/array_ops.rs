//! Criterion comparisons of `DynamicArray` against `Vec` and `SmallVec`.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kiln_array::{Duplicate, DynamicArray, Relocate};
use kiln_bench::{churn, fill_by_front_insert, fill_by_push, Payload, SIZES};
use kiln_core::GrowthPolicy;
use smallvec::SmallVec;

/// Benchmark: append N payloads from empty under each container.
fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");
    for n in SIZES {
        group.bench_with_input(BenchmarkId::new("kiln_relocate", n), &n, |b, &n| {
            b.iter(|| {
                let array: DynamicArray<Payload, Relocate> =
                    fill_by_push(n, GrowthPolicy::default());
                black_box(array);
            });
        });
        group.bench_with_input(BenchmarkId::new("kiln_duplicate", n), &n, |b, &n| {
            b.iter(|| {
                let array: DynamicArray<Payload, Duplicate> =
                    fill_by_push(n, GrowthPolicy::default());
                black_box(array);
            });
        });
        group.bench_with_input(BenchmarkId::new("vec", n), &n, |b, &n| {
            b.iter(|| {
                let mut v = Vec::new();
                for i in 0..n as u64 {
                    v.push(Payload::new(i));
                }
                black_box(v);
            });
        });
        group.bench_with_input(BenchmarkId::new("smallvec_16", n), &n, |b, &n| {
            b.iter(|| {
                let mut v: SmallVec<[Payload; 16]> = SmallVec::new();
                for i in 0..n as u64 {
                    v.push(Payload::new(i));
                }
                black_box(v);
            });
        });
    }
    group.finish();
}

/// Benchmark: push with a 4x growth factor versus the default 2x.
fn bench_growth_factor(c: &mut Criterion) {
    let n = 16_384;
    let mut group = c.benchmark_group("growth_factor");
    for factor in [2usize, 4] {
        let policy = GrowthPolicy::new(factor, 1).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(factor), &policy, |b, &policy| {
            b.iter(|| {
                let array: DynamicArray<Payload> = fill_by_push(n, policy);
                black_box(array);
            });
        });
    }
    group.finish();
}

/// Benchmark: insert 1K integers at the front.
fn bench_front_insert(c: &mut Criterion) {
    c.bench_function("front_insert_1k", |b| {
        b.iter(|| black_box(fill_by_front_insert(1_024)));
    });
    c.bench_function("front_insert_1k_vec", |b| {
        b.iter(|| {
            let mut v = Vec::new();
            for i in 0..1_024u64 {
                v.insert(0, i);
            }
            black_box(v);
        });
    });
}

/// Benchmark: stride-8 insert/erase churn over 16K integers.
fn bench_churn(c: &mut Criterion) {
    let mut array: DynamicArray<u64> = (0..16_384).collect();
    array.reserve(16_385);
    c.bench_function("churn_16k_stride_8", |b| {
        b.iter(|| black_box(churn(&mut array, 8)));
    });
}

/// Benchmark: deep copy of 16K payloads.
fn bench_clone(c: &mut Criterion) {
    let array: DynamicArray<Payload> = fill_by_push(16_384, GrowthPolicy::default());
    let v: Vec<Payload> = array.iter().cloned().collect();
    c.bench_function("clone_16k", |b| {
        b.iter(|| black_box(array.clone()));
    });
    c.bench_function("clone_16k_vec", |b| {
        b.iter(|| black_box(v.clone()));
    });
    let mut target: DynamicArray<Payload> = DynamicArray::with_capacity(16_384);
    c.bench_function("clone_from_16k_in_place", |b| {
        b.iter(|| {
            target.clone_from(&array);
            black_box(target.len());
        });
    });
}

/// Benchmark: reserve up front then fill, against implicit growth.
fn bench_reserve(c: &mut Criterion) {
    c.bench_function("reserve_then_push_16k", |b| {
        b.iter(|| {
            let mut array: DynamicArray<Payload> = DynamicArray::new();
            array.reserve(16_384);
            for i in 0..16_384u64 {
                array.push_back(Payload::new(i));
            }
            black_box(array);
        });
    });
}

criterion_group!(
    benches,
    bench_push,
    bench_growth_factor,
    bench_front_insert,
    bench_churn,
    bench_clone,
    bench_reserve
);
criterion_main!(benches);
