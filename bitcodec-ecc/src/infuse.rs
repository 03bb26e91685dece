//! Error infusion for exercising the decoders.
//!
//! Flips a fixed number of distinct, uniformly chosen bits in every block of
//! an encoded file. Pass a seed to reproduce the same corruption.

use crate::framing::HEADER_BLOCK_SIZE;
use bitcodec_core::error::{BitCodecError, Result};
use bitcodec_core::{
    BitBuffer, BitReader, BitWriter, CancelToken, OperationKind, Outcome, ProgressSink,
    ProgressTracker, StreamConfig, file_name, run_reported,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Instant;

/// Flip `errors` distinct bits of `block`.
///
/// Fails with [`BitCodecError::InvalidParameter`] when `errors` exceeds the
/// block length.
pub fn infuse_block<R: Rng + ?Sized>(
    block: &BitBuffer,
    errors: usize,
    rng: &mut R,
) -> Result<BitBuffer> {
    if errors > block.len() {
        return Err(BitCodecError::invalid_parameter(format!(
            "cannot flip {errors} bits of a {}-bit block",
            block.len()
        )));
    }
    let mut out = block.clone();
    for pos in rand::seq::index::sample(rng, block.len(), errors).iter() {
        out.flip(pos)?;
    }
    Ok(out)
}

/// Block structure of the file being corrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfuseLayout {
    /// Leading bits copied untouched.
    pub header_bits: usize,
    /// Bits per corrupted block.
    pub block_size: usize,
}

impl InfuseLayout {
    /// Layout of a Hamming file: the header field is left intact.
    pub fn hamming(block_size: usize) -> Self {
        Self {
            header_bits: HEADER_BLOCK_SIZE,
            block_size,
        }
    }

    /// Layout of a CRC file with `block_size` data bits per block.
    pub fn crc(block_size: usize, checksum_width: usize) -> Self {
        Self {
            header_bits: 0,
            block_size: block_size + checksum_width,
        }
    }
}

/// Result of a completed infusion.
#[derive(Debug, Clone, Serialize)]
pub struct InfuseSummary {
    /// Name of the corrupted file.
    pub output_file: String,
    /// Blocks processed.
    pub blocks: u64,
    /// Total bits flipped.
    pub flipped_bits: u64,
    /// Wall-clock time.
    pub elapsed_secs: f64,
}

impl fmt::Display for InfuseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Finished infusing errors. Corrupted file: {}.\n\tTime elapsed: {:.2}s\n\tBits flipped: {}",
            self.output_file, self.elapsed_secs, self.flipped_bits
        )
    }
}

/// Copy `input` to `output`, flipping `errors_per_block` bits in every block.
///
/// The final short block gets `min(errors_per_block, len)` flips.
#[allow(clippy::too_many_arguments)]
pub fn infuse_file<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    layout: InfuseLayout,
    errors_per_block: usize,
    seed: Option<u64>,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> Result<Outcome<InfuseSummary>> {
    let started = Instant::now();
    if layout.block_size == 0 {
        return Err(BitCodecError::invalid_parameter("infuse block size must be positive"));
    }
    if errors_per_block > layout.block_size {
        return Err(BitCodecError::invalid_parameter(format!(
            "cannot flip {errors_per_block} bits of a {}-bit block",
            layout.block_size
        )));
    }
    log::debug!(
        "infusing {} errors per {}-bit block into {} -> {} (seed {:?})",
        errors_per_block,
        layout.block_size,
        input.display(),
        output.display(),
        seed
    );

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut reader = BitReader::open(input, config)?;
    if reader.total_bits() == 0 {
        return Err(BitCodecError::EmptyInput);
    }
    let mut writer = BitWriter::create(output, config)?;
    if layout.header_bits > 0 {
        writer.write_buffer(&reader.read_bits(layout.header_bits)?)?;
    }

    let mut tracker = ProgressTracker::new(progress, "Infusing errors...", reader.total_bits());
    let mut blocks = 0u64;
    let mut flipped_bits = 0u64;

    while !reader.is_exhausted() {
        if cancel.is_cancelled() {
            tracker.clear();
            writer.close()?;
            reader.close();
            return Ok(Outcome::Cancelled);
        }
        let block = reader.read_bits(layout.block_size)?;
        let errors = errors_per_block.min(block.len());
        writer.write_buffer(&infuse_block(&block, errors, &mut rng)?)?;
        blocks += 1;
        flipped_bits += errors as u64;
        tracker.update(reader.bits_read());
    }

    writer.close()?;
    reader.close();
    tracker.clear();

    Ok(Outcome::Completed(InfuseSummary {
        output_file: file_name(output),
        blocks,
        flipped_bits,
        elapsed_secs: started.elapsed().as_secs_f64(),
    }))
}

/// Corrupt a file and describe the result in one report string.
pub fn infuse_errors<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    layout: InfuseLayout,
    errors_per_block: usize,
    seed: Option<u64>,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    infuse_errors_with_config(
        input,
        output,
        layout,
        errors_per_block,
        seed,
        &StreamConfig::default(),
        cancel,
        progress,
    )
}

/// [`infuse_errors`] with explicit stream settings; dumps go to
/// `config.dump_dir`.
#[allow(clippy::too_many_arguments)]
pub fn infuse_errors_with_config<P: ProgressSink + ?Sized>(
    input: &Path,
    output: &Path,
    layout: InfuseLayout,
    errors_per_block: usize,
    seed: Option<u64>,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> String {
    run_reported(OperationKind::INFUSE, &config.dump_dir, || {
        infuse_file(
            input,
            output,
            layout,
            errors_per_block,
            seed,
            config,
            cancel,
            progress,
        )
    })
}
