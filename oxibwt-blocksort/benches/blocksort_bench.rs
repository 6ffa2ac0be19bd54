//! Block sorting benchmarks.
//!
//! Covers both sorting algorithms across data patterns that stress them
//! differently, plus the forward and inverse transform at block sizes.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxibwt_blocksort::{BlockSortConfig, BlockSorter, bwt};
use oxibwt_core::Block;
use std::hint::black_box;

type PatternGenerator = fn(usize) -> Vec<u8>;

mod test_data {
    /// Every byte the same; the worst case for the primary sorter.
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    pub fn random(size: usize) -> Vec<u8> {
        let mut seed: u64 = 0x123456789ABCDEF0;
        (0..size)
            .map(|_| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                (seed >> 32) as u8
            })
            .collect()
    }

    /// Short period; exhausts the primary sorter's budget.
    pub fn repetitive(size: usize) -> Vec<u8> {
        b"TOBEORNOTTOBEORTOBEORNOT"
            .iter()
            .copied()
            .cycle()
            .take(size)
            .collect()
    }

    pub fn text_like(size: usize) -> Vec<u8> {
        let words: &[&[u8]] = &[
            b"the", b"quick", b"brown", b"fox", b"jumps", b"over", b"lazy", b"dog", b"and",
            b"runs", b"through", b"forest", b"near", b"river", b"under", b"blue", b"sky",
        ];
        let mut data = Vec::with_capacity(size);
        let mut seed = 42u32;
        while data.len() < size {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            data.extend_from_slice(words[(seed >> 16) as usize % words.len()]);
            data.push(b' ');
        }
        data.truncate(size);
        data
    }
}

const PATTERNS: &[(&str, PatternGenerator)] = &[
    ("text", test_data::text_like),
    ("random", test_data::random),
    ("repetitive", test_data::repetitive),
    ("uniform", test_data::uniform),
];

/// Default strategy selection across data patterns.
fn bench_sort_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_patterns");
    let size = 256 * 1024;

    for (name, generator) in PATTERNS {
        let block = Block::from_data(&generator(size)).expect("valid block");
        let mut sorter = BlockSorter::with_capacity(BlockSortConfig::default(), size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &block, |b, block| {
            b.iter(|| {
                let sorted = sorter.sort(black_box(block)).expect("sort failed");
                black_box(sorted.origin());
            });
        });
    }

    group.finish();
}

/// Primary against fallback sorter on the same block.
fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("algorithms");
    let size = 128 * 1024;
    let block = Block::from_data(&test_data::text_like(size)).expect("valid block");

    let configs = [
        ("primary", BlockSortConfig::primary_first().with_work_factor(250)),
        ("fallback", BlockSortConfig::fallback_only()),
    ];

    for (name, config) in configs {
        let mut sorter = BlockSorter::with_capacity(config, size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &block, |b, block| {
            b.iter(|| {
                let sorted = sorter.sort(black_box(block)).expect("sort failed");
                black_box(sorted.origin());
            });
        });
    }

    group.finish();
}

fn bench_transform_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform_sizes");
    group.sample_size(20);

    for (size_name, size) in [("1KB", 1024), ("64KB", 64 * 1024), ("900KB", 900_000)] {
        let data = test_data::text_like(size);
        let (last, origin) = bwt::transform(&data).expect("transform failed");

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("forward", size_name),
            &data,
            |b, data| b.iter(|| bwt::transform(black_box(data))),
        );
        group.bench_with_input(
            BenchmarkId::new("inverse", size_name),
            &last,
            |b, last| b.iter(|| bwt::inverse_transform(black_box(last), origin)),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sort_patterns,
    bench_algorithms,
    bench_transform_sizes
);
criterion_main!(benches);
