//! Benchmarks for the block codes
//!
//! - Hamming encode/decode across block sizes
//! - CRC encode, clean decode and single-error repair

use bitcodec_core::BitBuffer;
use bitcodec_ecc::{CrcConfig, HammingCode};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

/// Reproducible pseudo-random bits
fn random_bits(len: usize) -> BitBuffer {
    let mut seed: u64 = 0x9E3779B97F4A7C15;
    (0..len)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            (seed >> 63) == 1
        })
        .collect()
}

fn bench_hamming(c: &mut Criterion) {
    let mut group = c.benchmark_group("hamming");

    for block_size in [8usize, 64, 512, 2048] {
        let code = HammingCode::new(block_size).unwrap();
        let message = random_bits(code.information_size());
        let mut damaged = code.encode_block(&message).unwrap();
        damaged.flip(block_size / 3).unwrap();

        group.throughput(Throughput::Elements(code.information_size() as u64));
        group.bench_with_input(BenchmarkId::new("encode", block_size), &message, |b, message| {
            b.iter(|| black_box(code.encode_block(message).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("decode_corrected", block_size), &damaged, |b, block| {
            b.iter(|| black_box(code.decode_block(block).unwrap()));
        });
    }

    group.finish();
}

fn bench_crc(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc");
    let crc = CrcConfig::default();

    for block_size in [256usize, 1024, 8192] {
        let message = random_bits(block_size);
        let codeword = crc.encode_block(&message);
        let mut damaged = codeword.clone();
        damaged.flip(block_size / 2).unwrap();

        group.throughput(Throughput::Elements(block_size as u64));
        group.bench_with_input(BenchmarkId::new("encode", block_size), &message, |b, message| {
            b.iter(|| black_box(crc.encode_block(message)));
        });
        group.bench_with_input(BenchmarkId::new("decode_clean", block_size), &codeword, |b, block| {
            b.iter(|| black_box(crc.decode_block(block).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("decode_repair", block_size), &damaged, |b, block| {
            b.iter(|| black_box(crc.decode_block(block).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hamming, bench_crc);
criterion_main!(benches);
