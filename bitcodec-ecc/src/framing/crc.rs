//! CRC file encoder and decoder.

use crate::crc::{CrcConfig, CrcStatus, CrcTally};
use bitcodec_core::error::{BitCodecError, Result};
use bitcodec_core::{
    BitReader, BitWriter, CancelToken, OperationKind, Outcome, ProgressSink, ProgressTracker,
    StreamConfig, file_name, run_reported,
};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Instant;

fn check_layout(block_size: usize, crc: &CrcConfig) -> Result<()> {
    if block_size == 0 {
        return Err(BitCodecError::invalid_parameter("CRC block size must be positive"));
    }
    let width = crc.checksum_width();
    if width % 8 != 0 {
        return Err(BitCodecError::invalid_parameter(format!(
            "CRC checksum width {width} is not a whole number of bytes"
        )));
    }
    Ok(())
}

/// Result of a completed CRC encode.
#[derive(Debug, Clone, Serialize)]
pub struct CrcEncodeSummary {
    /// Name of the encoded file.
    pub output_file: String,
    /// Data bits per block.
    pub block_size: usize,
    /// Checksum bits per block.
    pub checksum_width: usize,
    /// Size of the source.
    pub input_bytes: u64,
    /// Size of the encoded file.
    pub output_bytes: u64,
    /// Blocks written.
    pub blocks: u64,
    /// Wall-clock time.
    pub elapsed_secs: f64,
}

impl fmt::Display for CrcEncodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Finished CRC-encoding. Encoded file: {}.\n\tTime elapsed: {:.2}s",
            self.output_file, self.elapsed_secs
        )
    }
}

/// Result of a completed CRC decode.
#[derive(Debug, Clone, Serialize)]
pub struct CrcDecodeSummary {
    /// Name of the decoded file.
    pub output_file: String,
    /// Data bits per block.
    pub block_size: usize,
    /// Size of the encoded source.
    pub input_bytes: u64,
    /// Size of the decoded file.
    pub output_bytes: u64,
    /// Block outcomes.
    pub tally: CrcTally,
    /// Wall-clock time.
    pub elapsed_secs: f64,
}

impl fmt::Display for CrcDecodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Finished CRC-decoding. Decoded file: {}.\n\tTime elapsed: {:.2}s\n\tOK/Corrupted: {}/{}\n\tCorrected: {}",
            self.output_file,
            self.elapsed_secs,
            self.tally.ok,
            self.tally.corrupted,
            self.tally.corrected
        )
    }
}

/// CRC-encode `input` into `output`, `block_size` data bits per block.
pub fn crc_encode_file<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    block_size: usize,
    crc: &CrcConfig,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> Result<Outcome<CrcEncodeSummary>> {
    let started = Instant::now();
    check_layout(block_size, crc)?;
    log::debug!(
        "crc-encoding {} -> {} with {}-bit blocks, polynomial {}",
        input.display(),
        output.display(),
        block_size,
        crc.polynomial
    );

    let mut reader = BitReader::open(input, config)?;
    if reader.total_bits() == 0 {
        return Err(BitCodecError::EmptyInput);
    }
    let mut writer = BitWriter::create(output, config)?;
    let mut tracker = ProgressTracker::new(progress, "CRC-encoding...", reader.total_bits());
    let mut blocks = 0u64;

    while !reader.is_exhausted() {
        if cancel.is_cancelled() {
            tracker.clear();
            writer.close()?;
            reader.close();
            return Ok(Outcome::Cancelled);
        }
        let message = reader.read_bits(block_size)?;
        writer.write_buffer(&crc.encode_block(&message))?;
        blocks += 1;
        tracker.update(reader.bits_read());
    }

    let output_bytes = writer.bytes_written();
    writer.close()?;
    reader.close();
    tracker.clear();

    Ok(Outcome::Completed(CrcEncodeSummary {
        output_file: file_name(output),
        block_size,
        checksum_width: crc.checksum_width(),
        input_bytes: reader.byte_len(),
        output_bytes,
        blocks,
        elapsed_secs: started.elapsed().as_secs_f64(),
    }))
}

/// Decode a CRC file written with `block_size` data bits per block.
pub fn crc_decode_file<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    block_size: usize,
    crc: &CrcConfig,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> Result<Outcome<CrcDecodeSummary>> {
    let started = Instant::now();
    check_layout(block_size, crc)?;
    let width = crc.checksum_width();
    let encoded_block = block_size + width;
    log::debug!(
        "crc-decoding {} -> {} with {}-bit blocks, correcting: {}",
        input.display(),
        output.display(),
        encoded_block,
        crc.correcting
    );

    let mut reader = BitReader::open(input, config)?;
    if reader.total_bits() == 0 {
        return Err(BitCodecError::EmptyInput);
    }
    let mut writer = BitWriter::create(output, config)?;
    let mut tracker = ProgressTracker::new(progress, "CRC-decoding...", reader.total_bits());
    let mut tally = CrcTally::default();

    while !reader.is_exhausted() {
        if cancel.is_cancelled() {
            tracker.clear();
            writer.close()?;
            reader.close();
            return Ok(Outcome::Cancelled);
        }
        let block = reader.read_bits(encoded_block)?;
        if block.len() <= width {
            log::warn!(
                "{}: dropping a {}-bit trailing fragment with no data",
                input.display(),
                block.len()
            );
            tally.record(CrcStatus::Corrupted);
            continue;
        }
        let (message, status) = crc.decode_block(&block)?;
        tally.record(status);
        writer.write_buffer(&message)?;
        tracker.update(reader.bits_read());
    }

    if tally.corrupted > 0 {
        log::warn!("{}: {} corrupted blocks", input.display(), tally.corrupted);
    }

    let output_bytes = writer.bytes_written();
    writer.close()?;
    reader.close();
    tracker.clear();

    Ok(Outcome::Completed(CrcDecodeSummary {
        output_file: file_name(output),
        block_size,
        input_bytes: reader.byte_len(),
        output_bytes,
        tally,
        elapsed_secs: started.elapsed().as_secs_f64(),
    }))
}

/// CRC-encode a file with the default polynomial and report the result.
pub fn crc_encode<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    block_size: usize,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    crc_encode_with_config(
        input,
        output,
        block_size,
        &CrcConfig::default(),
        &StreamConfig::default(),
        cancel,
        progress,
    )
}

/// [`crc_encode`] with an explicit code and stream settings; dumps go to
/// `config.dump_dir`.
pub fn crc_encode_with_config<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    block_size: usize,
    crc: &CrcConfig,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    run_reported(OperationKind::CRC_ENCODE, &config.dump_dir, || {
        crc_encode_file(input, output, block_size, crc, config, cancel, progress)
    })
}

/// CRC-decode a file with the default polynomial and report the result.
pub fn crc_decode<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    block_size: usize,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    crc_decode_with_config(
        input,
        output,
        block_size,
        &CrcConfig::default(),
        &StreamConfig::default(),
        cancel,
        progress,
    )
}

/// [`crc_decode`] with an explicit code and stream settings.
pub fn crc_decode_with_config<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    block_size: usize,
    crc: &CrcConfig,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    run_reported(OperationKind::CRC_DECODE, &config.dump_dir, || {
        crc_decode_file(input, output, block_size, crc, config, cancel, progress)
    })
}
