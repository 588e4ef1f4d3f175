//! Throughput benchmarks for the container checksums.
//!
//! Compares CRC-32 (slicing-by-8 above 16 bytes) against Adler-32 on a few
//! data patterns, plus incremental vs single-shot CRC calculation.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxiflate_core::checksum::{Adler32, Crc32};
use std::hint::black_box;

type PatternGenerator = fn(usize) -> Vec<u8>;

mod test_data {
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    pub fn zeros(size: usize) -> Vec<u8> {
        vec![0; size]
    }

    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. ";
        text.iter().copied().cycle().take(size).collect()
    }
}

const SIZES: [usize; 4] = [64, 4 * 1024, 64 * 1024, 1024 * 1024];

fn bench_crc32(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32");

    for size in SIZES {
        let data = test_data::random(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| Crc32::compute(black_box(data)));
        });
    }

    group.finish();
}

fn bench_adler32(c: &mut Criterion) {
    let mut group = c.benchmark_group("adler32");

    for size in SIZES {
        let data = test_data::random(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| Adler32::checksum(black_box(data)));
        });
    }

    group.finish();
}

fn bench_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum_patterns");
    let size = 256 * 1024;
    let patterns: [(&str, PatternGenerator); 3] = [
        ("random", test_data::random),
        ("zeros", test_data::zeros),
        ("text", test_data::text_like),
    ];

    group.throughput(Throughput::Bytes(size as u64));
    for (name, generate) in patterns {
        let data = generate(size);
        group.bench_with_input(BenchmarkId::new("crc32", name), &data, |b, data| {
            b.iter(|| Crc32::compute(black_box(data)));
        });
        group.bench_with_input(BenchmarkId::new("adler32", name), &data, |b, data| {
            b.iter(|| Adler32::checksum(black_box(data)));
        });
    }

    group.finish();
}

fn bench_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32_incremental");
    let data = test_data::text_like(1024 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for chunk_size in [16, 1024, 64 * 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let mut crc = Crc32::new();
                    for chunk in data.chunks(chunk_size) {
                        crc.update(black_box(chunk));
                    }
                    crc.finalize()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_crc32,
    bench_adler32,
    bench_patterns,
    bench_incremental
);
criterion_main!(benches);
