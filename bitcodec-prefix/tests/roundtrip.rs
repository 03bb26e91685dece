//! Roundtrip tests for prefix-code compression.
//!
//! Exercises the full file pipeline (count, build, serialize tree, encode,
//! decode) for both code builders, plus tree serialization on its own.

use bitcodec_core::{BitReader, CancelToken, Histogram, NullProgress, StreamConfig};
use bitcodec_prefix::{
    Algorithm, CodeTree, compress_file, decompress_file, huffman_codes, shannon_fano_codes,
};
use proptest::prelude::*;
use std::fs;
use std::path::Path;

fn roundtrip_file(data: &[u8], algorithm: Algorithm, config: &StreamConfig) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("input");
    let enc = dir.path().join("input.enc");
    let dec = dir.path().join("input.dec");
    fs::write(&src, data).unwrap();

    let cancel = CancelToken::new();
    compress_file(&src, &enc, algorithm, config, &cancel, &NullProgress)
        .unwrap()
        .completed()
        .unwrap();
    decompress_file(&enc, &dec, config, &cancel, &NullProgress)
        .unwrap()
        .completed()
        .unwrap();
    fs::read(&dec).unwrap()
}

/// Check that no code is a prefix of another.
fn is_prefix_free(table: &bitcodec_prefix::CodeTable) -> bool {
    let codes: Vec<String> = table.iter().map(|(_, c)| c.to_string()).collect();
    for (i, a) in codes.iter().enumerate() {
        for (j, b) in codes.iter().enumerate() {
            if i != j && b.starts_with(a.as_str()) {
                return false;
            }
        }
    }
    true
}

// =============================================================================
// FIXED INPUTS
// =============================================================================

#[test]
fn test_all_byte_values_roundtrip() {
    let data: Vec<u8> = (0..=255u8).chain((0..=255u8).rev()).collect();
    for algorithm in [Algorithm::ShannonFano, Algorithm::Huffman] {
        assert_eq!(roundtrip_file(&data, algorithm, &StreamConfig::tiny()), data);
    }
}

#[test]
fn test_skewed_input_compresses() {
    let mut data = vec![b'e'; 5000];
    data.extend(b"the quick brown fox".repeat(10));
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("skewed");
    let enc = dir.path().join("skewed.enc");
    fs::write(&src, &data).unwrap();

    let summary = compress_file(
        &src,
        &enc,
        Algorithm::Huffman,
        &StreamConfig::default(),
        &CancelToken::new(),
        &NullProgress,
    )
    .unwrap()
    .completed()
    .unwrap();
    assert!(summary.compression_ratio < 0.3);
    assert_eq!(summary.output_bytes, fs::metadata(&enc).unwrap().len());
}

#[test]
fn test_corrupt_header_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let enc = dir.path().join("bad.enc");
    // Field 0, then a shape that never returns to the root
    fs::write(&enc, [0b000_00000]).unwrap();
    let result = decompress_file(
        &enc,
        &dir.path().join("bad.dec"),
        &StreamConfig::default(),
        &CancelToken::new(),
        &NullProgress,
    );
    assert!(result.is_err());
}

#[test]
fn test_summary_serializes_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("s");
    fs::write(&src, b"mississippi").unwrap();
    let summary = compress_file(
        &src,
        &dir.path().join("s.enc"),
        Algorithm::ShannonFano,
        &StreamConfig::default(),
        &CancelToken::new(),
        &NullProgress,
    )
    .unwrap()
    .completed()
    .unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["algorithm"], "shannon-fano");
    assert_eq!(json["input_bytes"], 11);
    assert_eq!(json["symbols"], 4);
}

// =============================================================================
// CANCELLATION DURING A RUN
// =============================================================================

/// Progress sink that cancels as soon as `label` reports progress.
fn cancel_during<'a>(cancel: &'a CancelToken, label: &'static str) -> impl Fn(&str) + 'a {
    move |message: &str| {
        if message.starts_with(label) {
            cancel.cancel();
        }
    }
}

/// The stopped run wrote at most a chunk of payload and released its output.
fn assert_stopped_early(output: &Path) {
    let written = fs::metadata(output).unwrap().len();
    assert!(written > 0, "output was never flushed");
    assert!(written < 4096, "run continued after cancellation: {written} bytes");
    fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(output)
        .unwrap();
    fs::remove_file(output).unwrap();
}

#[test]
fn test_compress_cancelled_while_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("input");
    let enc = dir.path().join("input.enc");
    let data: Vec<u8> = (0..64 * 1024).map(|i| (i * 131 + 7) as u8).collect();
    fs::write(&src, &data).unwrap();
    let config = StreamConfig::tiny();

    let cancel = CancelToken::new();
    let sink = cancel_during(&cancel, "Encoding...");
    let outcome =
        compress_file(&src, &enc, Algorithm::Huffman, &config, &cancel, &sink).unwrap();
    assert!(outcome.is_cancelled());
    assert_stopped_early(&enc);
}

#[test]
fn test_decompress_cancelled_while_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("input");
    let enc = dir.path().join("input.enc");
    let dec = dir.path().join("input.dec");
    let data: Vec<u8> = (0..64 * 1024).map(|i| (i * 131 + 7) as u8).collect();
    fs::write(&src, &data).unwrap();
    let config = StreamConfig::tiny();

    compress_file(
        &src,
        &enc,
        Algorithm::ShannonFano,
        &config,
        &CancelToken::new(),
        &NullProgress,
    )
    .unwrap();

    let cancel = CancelToken::new();
    let sink = cancel_during(&cancel, "Decoding...");
    let outcome = decompress_file(&enc, &dec, &config, &cancel, &sink).unwrap();
    assert!(outcome.is_cancelled());
    assert_stopped_early(&dec);
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_file_roundtrip(data in prop::collection::vec(any::<u8>(), 1..2000), huffman in any::<bool>()) {
        let algorithm = if huffman { Algorithm::Huffman } else { Algorithm::ShannonFano };
        prop_assert_eq!(roundtrip_file(&data, algorithm, &StreamConfig::tiny()), data);
    }

    #[test]
    fn test_tree_serialization_roundtrip(data in prop::collection::vec(any::<u8>(), 1..500)) {
        let hist = Histogram::from_bytes(&data);
        for table in [huffman_codes(&hist).unwrap(), shannon_fano_codes(&hist).unwrap()] {
            let tree = CodeTree::from_code_table(&table).unwrap();
            let header = tree.serialize().unwrap();
            let mut reader = BitReader::from_slice(header.as_bytes());
            let rebuilt = CodeTree::deserialize(&mut reader).unwrap();
            prop_assert_eq!(reader.bits_read(), header.len() as u64);
            prop_assert_eq!(rebuilt.code_table(), table);
        }
    }

    #[test]
    fn test_codes_are_prefix_free(data in prop::collection::vec(any::<u8>(), 1..500)) {
        let hist = Histogram::from_bytes(&data);
        prop_assert!(is_prefix_free(&huffman_codes(&hist).unwrap()));
        prop_assert!(is_prefix_free(&shannon_fano_codes(&hist).unwrap()));
    }

    #[test]
    fn test_huffman_never_longer_than_shannon_fano(data in prop::collection::vec(any::<u8>(), 1..500)) {
        let hist = Histogram::from_bytes(&data);
        let huffman = huffman_codes(&hist).unwrap().encoded_bits(&hist).unwrap();
        let shannon_fano = shannon_fano_codes(&hist).unwrap().encoded_bits(&hist).unwrap();
        prop_assert!(huffman <= shannon_fano);
    }
}
