//! File-level prefix-code compression.
//!
//! # File format
//!
//! ```text
//! ┌──────────┬──────────────────────────────┬─────────────────────────┐
//! │ 3 bits   │ serialized code tree         │ payload                 │
//! │ used bits│ shape bits, then one byte    │ concatenated codes,     │
//! │ of final │ per leaf                     │ final byte zero padded  │
//! │ byte     │                              │                         │
//! └──────────┴──────────────────────────────┴─────────────────────────┘
//! ```
//!
//! The leading field holds the number of meaningful bits in the last byte
//! of the file, with `0` standing for `8`. The decoder derives the total
//! bit length from it and the file length, then feeds every bit after the
//! header through the rebuilt tree.

use crate::huffman::huffman_tree;
use crate::shannon_fano::shannon_fano_codes;
use crate::tree::CodeTree;
use bitcodec_core::bitstream::read_full;
use bitcodec_core::error::{BitCodecError, Result};
use bitcodec_core::frequency::FrequencyCounter;
use bitcodec_core::{
    BitReader, BitWriter, CancelToken, OperationKind, Outcome, ProgressSink, ProgressTracker,
    StreamConfig, file_name, run_reported,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

/// Width of the final-byte-length field.
pub const FINAL_BYTE_FIELD_BITS: u8 = 3;

/// Prefix-code construction algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Recursive weight bisection.
    ShannonFano,
    /// Optimal bottom-up merging.
    #[default]
    Huffman,
}

impl Algorithm {
    /// Build the code tree for `hist` with this algorithm.
    pub fn build_tree(self, hist: &bitcodec_core::Histogram) -> Result<CodeTree> {
        match self {
            Algorithm::ShannonFano => CodeTree::from_code_table(&shannon_fano_codes(hist)?),
            Algorithm::Huffman => huffman_tree(hist),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::ShannonFano => write!(f, "Shannon-Fano"),
            Algorithm::Huffman => write!(f, "Huffman"),
        }
    }
}

/// Result of a completed compression.
#[derive(Debug, Clone, Serialize)]
pub struct CompressionSummary {
    /// Name of the encoded file.
    pub output_file: String,
    /// Algorithm used.
    pub algorithm: Algorithm,
    /// Size of the source.
    pub input_bytes: u64,
    /// Size of the encoded file.
    pub output_bytes: u64,
    /// Size of the 3-bit field plus the serialized tree.
    pub header_bits: u64,
    /// Number of distinct symbols.
    pub symbols: usize,
    /// `output_bytes / input_bytes`.
    pub compression_ratio: f64,
    /// Wall-clock time.
    pub elapsed_secs: f64,
}

impl fmt::Display for CompressionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Finished encoding. Encoded file: {}.\n\tTime elapsed: {:.2}s\n\tCompression ratio: {}",
            self.output_file, self.elapsed_secs, self.compression_ratio
        )
    }
}

/// Result of a completed decompression.
#[derive(Debug, Clone, Serialize)]
pub struct DecompressionSummary {
    /// Name of the decoded file.
    pub output_file: String,
    /// Size of the encoded source.
    pub input_bytes: u64,
    /// Size of the decoded file.
    pub output_bytes: u64,
    /// Wall-clock time.
    pub elapsed_secs: f64,
}

impl fmt::Display for DecompressionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Finished decoding. Decoded file: {}.\n\tTime elapsed: {:.2}s",
            self.output_file, self.elapsed_secs
        )
    }
}

/// Compress `input` into `output`.
///
/// Two passes over the source: one to count byte frequencies, one to
/// substitute every byte with its code. Fails with
/// [`BitCodecError::EmptyInput`] for a zero-byte source. A cancelled run
/// leaves whatever was already written in `output`.
pub fn compress_file<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    algorithm: Algorithm,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> Result<Outcome<CompressionSummary>> {
    let started = Instant::now();
    log::debug!(
        "compressing {} -> {} with {}",
        input.display(),
        output.display(),
        algorithm
    );

    let hist = match FrequencyCounter::new(config)
        .with_label("Creating an encoding dictionary...")
        .count_file(input, cancel, progress)?
    {
        Outcome::Completed(hist) => hist,
        Outcome::Cancelled => return Ok(Outcome::Cancelled),
    };
    if hist.is_empty() {
        return Err(BitCodecError::EmptyInput);
    }

    let tree = algorithm.build_tree(&hist)?;
    let table = tree.code_table();
    let header = tree.serialize()?;
    let payload_bits = table.encoded_bits(&hist)?;
    let header_bits = FINAL_BYTE_FIELD_BITS as u64 + header.len() as u64;
    let total_bits = header_bits + payload_bits;
    let final_byte_len = (total_bits % 8) as u8;

    let mut writer = BitWriter::create(output, config)?;
    writer.write_bits(final_byte_len, FINAL_BYTE_FIELD_BITS)?;
    writer.write_buffer(&header)?;

    let mut source = File::open(input)?;
    let input_bytes = hist.total();
    let mut tracker = ProgressTracker::new(progress, "Encoding...", input_bytes);
    let mut buf = vec![0u8; config.chunk_size];
    let mut done = 0u64;

    loop {
        if cancel.is_cancelled() {
            tracker.clear();
            writer.close()?;
            return Ok(Outcome::Cancelled);
        }
        let n = read_full(&mut source, &mut buf)?;
        if n == 0 {
            break;
        }
        for &byte in &buf[..n] {
            let code = table.get(byte).ok_or_else(|| {
                BitCodecError::invalid_value(format!("byte {byte:#04x} appeared after counting"))
            })?;
            writer.write_buffer(code)?;
        }
        done += n as u64;
        tracker.update(done);
    }

    if writer.bits_written() != total_bits {
        return Err(BitCodecError::invalid_value(format!(
            "source changed during compression: wrote {} bits, expected {}",
            writer.bits_written(),
            total_bits
        )));
    }
    let output_bytes = writer.bytes_written();
    writer.close()?;
    tracker.clear();

    Ok(Outcome::Completed(CompressionSummary {
        output_file: file_name(output),
        algorithm,
        input_bytes,
        output_bytes,
        header_bits,
        symbols: table.len(),
        compression_ratio: output_bytes as f64 / input_bytes as f64,
        elapsed_secs: started.elapsed().as_secs_f64(),
    }))
}

/// Decompress `input` into `output`.
pub fn decompress_file<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> Result<Outcome<DecompressionSummary>> {
    let started = Instant::now();
    log::debug!("decompressing {} -> {}", input.display(), output.display());

    let mut reader = BitReader::open(input, config)?;
    if reader.total_bits() == 0 {
        return Err(BitCodecError::EmptyInput);
    }

    let field = reader.read_bits(FINAL_BYTE_FIELD_BITS as usize)?.to_u64()?;
    let used = if field == 0 { 8 } else { field };
    let total_bits = reader.total_bits() - (8 - used);

    let mut tree = CodeTree::deserialize(&mut reader)?;
    if reader.bits_read() > total_bits {
        return Err(BitCodecError::invalid_header(format!(
            "code tree header ends at bit {} past the payload end {}",
            reader.bits_read(),
            total_bits
        )));
    }

    let mut writer = BitWriter::create(output, config)?;
    let header_bits = reader.bits_read();
    let mut tracker = ProgressTracker::new(progress, "Decoding...", total_bits - header_bits);
    let step = config.chunk_size as u64 * 8;

    while reader.bits_read() < total_bits {
        if cancel.is_cancelled() {
            tracker.clear();
            writer.close()?;
            reader.close();
            return Ok(Outcome::Cancelled);
        }
        let batch = step.min(total_bits - reader.bits_read());
        for _ in 0..batch {
            if let Some(symbol) = tree.feed_bit(reader.read_bit()?)? {
                writer.write_byte(symbol)?;
            }
        }
        tracker.update(reader.bits_read() - header_bits);
    }

    if !tree.at_root() {
        log::warn!(
            "{}: payload ends inside a code, trailing bits dropped",
            input.display()
        );
    }
    let output_bytes = writer.bytes_written();
    writer.close()?;
    reader.close();
    tracker.clear();

    Ok(Outcome::Completed(DecompressionSummary {
        output_file: file_name(output),
        input_bytes: reader.byte_len(),
        output_bytes,
        elapsed_secs: started.elapsed().as_secs_f64(),
    }))
}

/// Compress a file and describe the result in one report string.
///
/// Returns an empty string when cancelled and a short failure message on
/// error (details go to the dump file in the default dump directory).
pub fn compress<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    algorithm: Algorithm,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    compress_with_config(
        input,
        output,
        algorithm,
        &StreamConfig::default(),
        cancel,
        progress,
    )
}

/// [`compress`] with explicit stream settings; dumps go to
/// `config.dump_dir`.
pub fn compress_with_config<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    algorithm: Algorithm,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    run_reported(OperationKind::COMPRESS, &config.dump_dir, || {
        compress_file(input, output, algorithm, config, cancel, progress)
    })
}

/// Decompress a file and describe the result in one report string.
pub fn decompress<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    decompress_with_config(input, output, &StreamConfig::default(), cancel, progress)
}

/// [`decompress`] with explicit stream settings.
pub fn decompress_with_config<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    run_reported(OperationKind::DECOMPRESS, &config.dump_dir, || {
        decompress_file(input, output, config, cancel, progress)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcodec_core::NullProgress;
    use std::fs;

    fn roundtrip(data: &[u8], algorithm: Algorithm, config: &StreamConfig) -> CompressionSummary {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let enc = dir.path().join("src.bin.enc");
        let dec = dir.path().join("src.bin.dec");
        fs::write(&src, data).unwrap();

        let cancel = CancelToken::new();
        let summary = compress_file(&src, &enc, algorithm, config, &cancel, &NullProgress)
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(fs::metadata(&enc).unwrap().len(), summary.output_bytes);

        decompress_file(&enc, &dec, config, &cancel, &NullProgress)
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(fs::read(&dec).unwrap(), data);
        summary
    }

    #[test]
    fn test_roundtrip_text_both_algorithms() {
        let data = b"this is an example of a huffman tree".repeat(20);
        for algorithm in [Algorithm::ShannonFano, Algorithm::Huffman] {
            let summary = roundtrip(&data, algorithm, &StreamConfig::tiny());
            assert!(summary.compression_ratio < 1.0);
            assert_eq!(summary.input_bytes, data.len() as u64);
        }
    }

    #[test]
    fn test_roundtrip_single_symbol() {
        for algorithm in [Algorithm::ShannonFano, Algorithm::Huffman] {
            let summary = roundtrip(&[b'x'; 13], algorithm, &StreamConfig::default());
            assert_eq!(summary.symbols, 1);
        }
    }

    #[test]
    fn test_roundtrip_single_byte() {
        roundtrip(&[0], Algorithm::Huffman, &StreamConfig::default());
    }

    #[test]
    fn test_final_byte_field() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a");
        let enc = dir.path().join("a.enc");
        // Two symbols, one-bit codes: shape "01011" + 2 symbol bytes
        fs::write(&src, b"ab").unwrap();
        compress_file(
            &src,
            &enc,
            Algorithm::Huffman,
            &StreamConfig::default(),
            &CancelToken::new(),
            &NullProgress,
        )
        .unwrap();
        // 3 + 5 + 16 + 2 = 26 bits, 2 used in the final byte
        let bytes = fs::read(&enc).unwrap();
        assert_eq!(bytes.len(), 4);
        assert_eq!(bytes[0] >> 5, 2);
    }

    #[test]
    fn test_empty_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("empty");
        fs::write(&src, b"").unwrap();
        let err = compress_file(
            &src,
            &dir.path().join("out"),
            Algorithm::ShannonFano,
            &StreamConfig::default(),
            &CancelToken::new(),
            &NullProgress,
        )
        .unwrap_err();
        assert!(err.is_empty_input());

        let report = compress(
            &src,
            &dir.path().join("out"),
            Algorithm::Huffman,
            &CancelToken::new(),
            &NullProgress,
        );
        assert_eq!(report, "Encoding failed. Cannot encode an empty file");
    }

    #[test]
    fn test_cancelled_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::write(&src, vec![7u8; 4096]).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let report = compress(
            &src,
            &dir.path().join("out"),
            Algorithm::Huffman,
            &cancel,
            &NullProgress,
        );
        assert!(report.is_empty());
    }

    #[test]
    fn test_report_strings() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let enc = dir.path().join("src.txt.huff");
        let dec = dir.path().join("src.txt.out");
        fs::write(&src, b"abracadabra").unwrap();

        let cancel = CancelToken::new();
        let report = compress(&src, &enc, Algorithm::Huffman, &cancel, &NullProgress);
        assert!(report.starts_with("Finished encoding. Encoded file: src.txt.huff."));
        assert!(report.contains("\tCompression ratio: "));

        let report = decompress(&enc, &dec, &cancel, &NullProgress);
        assert!(report.starts_with("Finished decoding. Decoded file: src.txt.out."));
        assert_eq!(fs::read(&dec).unwrap(), b"abracadabra");
    }

    #[test]
    fn test_report_with_config_dumps_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.huff");
        fs::write(&bad, [0x00]).unwrap();
        let dump_dir = dir.path().join("dumps");
        fs::create_dir(&dump_dir).unwrap();
        let config = StreamConfig::tiny().with_dump_dir(&dump_dir);

        let report = decompress_with_config(
            &bad,
            &dir.path().join("out"),
            &config,
            &CancelToken::new(),
            &NullProgress,
        );
        assert_eq!(report, "Decoding failed. Details are in the decoder error dump file");
        assert!(dump_dir.join("decoder-error-dump.txt").exists());
    }
}
