//! Hamming file encoder and decoder.

use crate::hamming::{HammingCode, HammingStatus, HammingTally};
use bitcodec_core::error::{BitCodecError, Result};
use bitcodec_core::{
    BitBuffer, BitReader, BitWriter, CancelToken, OperationKind, Outcome, ProgressSink,
    ProgressTracker, StreamConfig, file_name, run_reported,
};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Instant;

/// Block size of the leading overflow-count field.
pub const HEADER_BLOCK_SIZE: usize = 16;

fn header_code() -> Result<HammingCode> {
    HammingCode::new(HEADER_BLOCK_SIZE)
}

/// Result of a completed Hamming encode.
#[derive(Debug, Clone, Serialize)]
pub struct HammingEncodeSummary {
    /// Name of the encoded file.
    pub output_file: String,
    /// Encoded block size.
    pub block_size: usize,
    /// Size of the source.
    pub input_bytes: u64,
    /// Size of the encoded file.
    pub output_bytes: u64,
    /// Data blocks written, overflow block included.
    pub blocks: u64,
    /// Wall-clock time.
    pub elapsed_secs: f64,
}

impl fmt::Display for HammingEncodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Finished hamming-encoding. Encoded file: {}.\n\tTime elapsed: {:.2}s",
            self.output_file, self.elapsed_secs
        )
    }
}

/// Result of a completed Hamming decode.
#[derive(Debug, Clone, Serialize)]
pub struct HammingDecodeSummary {
    /// Name of the decoded file.
    pub output_file: String,
    /// Encoded block size.
    pub block_size: usize,
    /// Size of the encoded source.
    pub input_bytes: u64,
    /// Size of the decoded file.
    pub output_bytes: u64,
    /// Block outcomes, header block included.
    pub tally: HammingTally,
    /// Wall-clock time.
    pub elapsed_secs: f64,
}

impl fmt::Display for HammingDecodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Finished decoding. Decoded file: {}.\n\tTime elapsed: {:.2}s",
            self.output_file, self.elapsed_secs
        )?;
        for status in [
            HammingStatus::Fail,
            HammingStatus::Ok,
            HammingStatus::OneBitErrorCorrected,
            HammingStatus::TwoBitError,
        ] {
            write!(f, "\n\t{}: {}", status, self.tally.get(status))?;
        }
        Ok(())
    }
}

/// Hamming-encode `input` into `output` with `block_size`-bit blocks.
pub fn hamming_encode_file<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    block_size: usize,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> Result<Outcome<HammingEncodeSummary>> {
    let started = Instant::now();
    let code = HammingCode::new(block_size)?;
    let header = header_code()?;
    log::debug!(
        "hamming-encoding {} -> {} with {}-bit blocks",
        input.display(),
        output.display(),
        block_size
    );

    let mut reader = BitReader::open(input, config)?;
    if reader.total_bits() == 0 {
        return Err(BitCodecError::EmptyInput);
    }

    let info = code.information_size();
    let overflow = (reader.total_bits() % info as u64) as usize;
    let mut writer = BitWriter::create(output, config)?;
    let field = BitBuffer::from_u64(overflow as u64, header.information_size())?;
    writer.write_buffer(&header.encode_block(&field)?)?;

    let mut blocks = 0u64;
    if overflow > 0 {
        let mut message = reader.read_bits(overflow)?;
        message.pad_right(false, info - overflow);
        writer.write_buffer(&code.encode_block(&message)?)?;
        blocks += 1;
    }

    let mut tracker = ProgressTracker::new(progress, "Hamming-encoding...", reader.total_bits());
    while !reader.is_exhausted() {
        if cancel.is_cancelled() {
            tracker.clear();
            writer.close()?;
            reader.close();
            return Ok(Outcome::Cancelled);
        }
        let message = reader.read_bits(info)?;
        writer.write_buffer(&code.encode_block(&message)?)?;
        blocks += 1;
        tracker.update(reader.bits_read());
    }

    let output_bytes = writer.bytes_written();
    writer.close()?;
    reader.close();
    tracker.clear();

    Ok(Outcome::Completed(HammingEncodeSummary {
        output_file: file_name(output),
        block_size,
        input_bytes: reader.byte_len(),
        output_bytes,
        blocks,
        elapsed_secs: started.elapsed().as_secs_f64(),
    }))
}

/// Decode a Hamming file written with `block_size`-bit blocks.
///
/// Damaged blocks are tallied, not fatal. The run fails only when the
/// header cannot be trusted: a double error in the overflow field or a
/// count that does not fit the block size.
pub fn hamming_decode_file<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    block_size: usize,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> Result<Outcome<HammingDecodeSummary>> {
    let started = Instant::now();
    let code = HammingCode::new(block_size)?;
    let header = header_code()?;
    log::debug!(
        "hamming-decoding {} -> {} with {}-bit blocks",
        input.display(),
        output.display(),
        block_size
    );

    let mut reader = BitReader::open(input, config)?;
    if reader.total_bits() == 0 {
        return Err(BitCodecError::EmptyInput);
    }
    if reader.total_bits() < HEADER_BLOCK_SIZE as u64 {
        return Err(BitCodecError::invalid_header(format!(
            "{} bits is too short for the {HEADER_BLOCK_SIZE}-bit overflow field",
            reader.total_bits()
        )));
    }

    let mut tally = HammingTally::default();
    let (field, status) = header.decode_block(&reader.read_bits(HEADER_BLOCK_SIZE)?)?;
    tally.record(status);
    if status == HammingStatus::TwoBitError {
        return Err(BitCodecError::invalid_header(
            "overflow field has an uncorrectable double error",
        ));
    }
    let overflow = field.to_u64()? as usize;
    let info = code.information_size();
    if overflow >= info {
        return Err(BitCodecError::invalid_header(format!(
            "overflow count {overflow} does not fit {info}-bit blocks"
        )));
    }

    let mut writer = BitWriter::create(output, config)?;
    if overflow > 0 && reader.remaining_bits() >= block_size as u64 {
        let (message, status) = code.decode_block(&reader.read_bits(block_size)?)?;
        tally.record(status);
        writer.write_buffer(&message.slice(0..overflow)?)?;
    }

    let mut tracker = ProgressTracker::new(progress, "Hamming-decoding...", reader.total_bits());
    while reader.remaining_bits() >= block_size as u64 {
        if cancel.is_cancelled() {
            tracker.clear();
            writer.close()?;
            reader.close();
            return Ok(Outcome::Cancelled);
        }
        let (message, status) = code.decode_block(&reader.read_bits(block_size)?)?;
        tally.record(status);
        writer.write_buffer(&message)?;
        tracker.update(reader.bits_read());
    }

    if !reader.is_exhausted() {
        log::warn!(
            "{}: dropping {} trailing bits shorter than a block",
            input.display(),
            reader.remaining_bits()
        );
        tally.record(HammingStatus::Fail);
    }
    if tally.two_bit_errors > 0 {
        log::warn!(
            "{}: {} blocks with uncorrectable errors",
            input.display(),
            tally.two_bit_errors
        );
    }

    let output_bytes = writer.bytes_written();
    writer.close()?;
    reader.close();
    tracker.clear();

    Ok(Outcome::Completed(HammingDecodeSummary {
        output_file: file_name(output),
        block_size,
        input_bytes: reader.byte_len(),
        output_bytes,
        tally,
        elapsed_secs: started.elapsed().as_secs_f64(),
    }))
}

/// Hamming-encode a file and describe the result in one report string.
pub fn hamming_encode<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    block_size: usize,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    hamming_encode_with_config(
        input,
        output,
        block_size,
        &StreamConfig::default(),
        cancel,
        progress,
    )
}

/// [`hamming_encode`] with explicit stream settings; dumps go to
/// `config.dump_dir`.
pub fn hamming_encode_with_config<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    block_size: usize,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    run_reported(OperationKind::HAMMING_ENCODE, &config.dump_dir, || {
        hamming_encode_file(input, output, block_size, config, cancel, progress)
    })
}

/// Hamming-decode a file and describe the result in one report string.
pub fn hamming_decode<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    block_size: usize,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    hamming_decode_with_config(
        input,
        output,
        block_size,
        &StreamConfig::default(),
        cancel,
        progress,
    )
}

/// [`hamming_decode`] with explicit stream settings.
pub fn hamming_decode_with_config<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    block_size: usize,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    run_reported(OperationKind::HAMMING_DECODE, &config.dump_dir, || {
        hamming_decode_file(input, output, block_size, config, cancel, progress)
    })
}
