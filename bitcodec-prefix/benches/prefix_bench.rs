//! Benchmarks for prefix-code construction and decoding
//!
//! - Huffman vs Shannon-Fano table construction
//! - Bit-by-bit tree decoding

use bitcodec_core::Histogram;
use bitcodec_prefix::{CodeTree, huffman_codes, huffman_tree, shannon_fano_codes};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

/// Text-like data with a skewed byte distribution
fn skewed_bytes(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed: u64 = 0x0DDB1A5E5BAD5EED;
    for _ in 0..size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        let r = (seed >> 40) as u32;
        // Squaring biases toward low values
        data.push(b' ' + ((r % 96) * (r % 96) / 96) as u8);
    }
    data
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("code_build");
    let uniform: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();

    for (name, data) in [("skewed", skewed_bytes(64 * 1024)), ("uniform", uniform)] {
        let hist = Histogram::from_bytes(&data);
        group.bench_with_input(BenchmarkId::new("huffman", name), &hist, |b, hist| {
            b.iter(|| black_box(huffman_codes(hist).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("shannon_fano", name), &hist, |b, hist| {
            b.iter(|| black_box(shannon_fano_codes(hist).unwrap()));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_decode");

    for (size_name, size) in [("4KB", 4 * 1024), ("64KB", 64 * 1024)] {
        let data = skewed_bytes(size);
        let hist = Histogram::from_bytes(&data);
        let tree = huffman_tree(&hist).unwrap();
        let table = tree.code_table();
        let mut encoded = bitcodec_core::BitBuffer::new();
        for &byte in &data {
            encoded.extend_from(table.get(byte).unwrap());
        }

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("huffman", size_name), &encoded, |b, bits| {
            b.iter(|| {
                let mut tree: CodeTree = tree.clone();
                black_box(tree.decode(bits).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_decode);
criterion_main!(benches);
