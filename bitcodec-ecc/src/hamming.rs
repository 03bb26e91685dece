//! Extended Hamming (SECDED) block code.
//!
//! Positions in a block of `B` bits are numbered from 0. Position 0 holds the
//! overall parity, each power-of-two position `2^k` holds parity bit `k`, and
//! the remaining `B - log2(B) - 1` positions carry the message in order.
//!
//! ```text
//! position  0   1   2   3   4   5   6   7
//!           P   p0  p1  d0  p2  d1  d2  d3      B = 8, 4 message bits
//! ```
//!
//! Parity bit `k` is bit `k` of the XOR of the positions of every set bit, so
//! a valid block has a zero syndrome and even overall parity. One flipped
//! bit makes the parity odd and the syndrome points at it; two flipped bits
//! leave the parity even with a nonzero syndrome.

use bitcodec_core::BitBuffer;
use bitcodec_core::error::{BitCodecError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest supported block size.
pub const MIN_BLOCK_SIZE: usize = 4;

/// Largest supported block size (bounded by the 11-bit file header field).
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Outcome of decoding one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HammingStatus {
    /// The block was too short to decode.
    Fail,
    /// No error detected.
    Ok,
    /// A single flipped bit was found and corrected.
    OneBitErrorCorrected,
    /// Two flipped bits were detected; the block is left as received.
    TwoBitError,
}

impl fmt::Display for HammingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HammingStatus::Fail => write!(f, "Failed"),
            HammingStatus::Ok => write!(f, "OK"),
            HammingStatus::OneBitErrorCorrected => write!(f, "1-bit error corrected"),
            HammingStatus::TwoBitError => write!(f, "2-bit error"),
        }
    }
}

/// Per-status block counts of a decode run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HammingTally {
    /// Blocks that could not be decoded.
    pub failed: u64,
    /// Blocks without errors.
    pub ok: u64,
    /// Blocks with a corrected single-bit error.
    pub corrected: u64,
    /// Blocks with a detected double-bit error.
    pub two_bit_errors: u64,
}

impl HammingTally {
    /// Count one block.
    pub fn record(&mut self, status: HammingStatus) {
        match status {
            HammingStatus::Fail => self.failed += 1,
            HammingStatus::Ok => self.ok += 1,
            HammingStatus::OneBitErrorCorrected => self.corrected += 1,
            HammingStatus::TwoBitError => self.two_bit_errors += 1,
        }
    }

    /// Count of blocks with `status`.
    pub fn get(&self, status: HammingStatus) -> u64 {
        match status {
            HammingStatus::Fail => self.failed,
            HammingStatus::Ok => self.ok,
            HammingStatus::OneBitErrorCorrected => self.corrected,
            HammingStatus::TwoBitError => self.two_bit_errors,
        }
    }

    /// Total blocks counted.
    pub fn blocks(&self) -> u64 {
        self.failed + self.ok + self.corrected + self.two_bit_errors
    }
}

/// Positions carrying message bits, in message order.
fn data_positions(block_size: usize) -> impl Iterator<Item = usize> {
    (3..block_size).filter(|p| !p.is_power_of_two())
}

/// Hamming SECDED code with a fixed block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HammingCode {
    block_size: usize,
    parity_bits: usize,
}

impl HammingCode {
    /// Code with `block_size` bits per encoded block.
    ///
    /// `block_size` must be a power of two between [`MIN_BLOCK_SIZE`] and
    /// [`MAX_BLOCK_SIZE`].
    pub fn new(block_size: usize) -> Result<Self> {
        if !block_size.is_power_of_two() || !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&block_size)
        {
            return Err(BitCodecError::invalid_parameter(format!(
                "Hamming block size {block_size} is not a power of two in {MIN_BLOCK_SIZE}..={MAX_BLOCK_SIZE}"
            )));
        }
        Ok(Self {
            block_size,
            parity_bits: block_size.trailing_zeros() as usize,
        })
    }

    /// Encoded block length in bits.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Message bits per block: `B - log2(B) - 1`.
    pub fn information_size(&self) -> usize {
        self.block_size - self.parity_bits - 1
    }

    fn check_block(&self, block: &BitBuffer) -> Result<()> {
        if block.len() != self.block_size {
            return Err(BitCodecError::invalid_value(format!(
                "Hamming block has {} bits, expected {}",
                block.len(),
                self.block_size
            )));
        }
        Ok(())
    }

    /// XOR of the positions of every set bit.
    pub fn syndrome(&self, block: &BitBuffer) -> usize {
        block.ones().fold(0, |acc, pos| acc ^ pos)
    }

    /// Encode exactly [`information_size`](Self::information_size) message bits.
    pub fn encode_block(&self, message: &BitBuffer) -> Result<BitBuffer> {
        if message.len() != self.information_size() {
            return Err(BitCodecError::invalid_value(format!(
                "Hamming message has {} bits, expected {}",
                message.len(),
                self.information_size()
            )));
        }

        let mut block = BitBuffer::zeros(self.block_size);
        for (pos, bit) in data_positions(self.block_size).zip(message.iter()) {
            if bit {
                block.set(pos, 1)?;
            }
        }

        let syndrome = self.syndrome(&block);
        for k in 0..self.parity_bits {
            if (syndrome >> k) & 1 == 1 {
                block.set(1 << k, 1)?;
            }
        }
        if block.count_ones() % 2 == 1 {
            block.set(0, 1)?;
        }
        Ok(block)
    }

    /// Check `block` and correct a single-bit error in place.
    ///
    /// | syndrome | overall parity | status |
    /// |---|---|---|
    /// | 0 | even | `Ok` |
    /// | `s` (including 0) | odd | bit `s` flipped back, `OneBitErrorCorrected` |
    /// | nonzero | even | `TwoBitError`, block left as received |
    ///
    /// A zero syndrome with odd parity is a flip of position 0, the overall
    /// parity bit, so it is corrected rather than reported `Ok`. This keeps
    /// every single-bit error reported as corrected.
    pub fn correct_block(&self, block: &mut BitBuffer) -> Result<HammingStatus> {
        self.check_block(block)?;
        let syndrome = self.syndrome(block);
        let odd = block.count_ones() % 2 == 1;

        let status = match (syndrome, odd) {
            (0, false) => HammingStatus::Ok,
            (pos, true) => {
                block.flip(pos)?;
                HammingStatus::OneBitErrorCorrected
            }
            (_, false) => HammingStatus::TwoBitError,
        };
        Ok(status)
    }

    /// Message bits of a block, parity positions stripped.
    pub fn extract(&self, block: &BitBuffer) -> Result<BitBuffer> {
        self.check_block(block)?;
        data_positions(self.block_size).map(|pos| block.get(pos)).collect()
    }

    /// Correct and extract one block.
    pub fn decode_block(&self, block: &BitBuffer) -> Result<(BitBuffer, HammingStatus)> {
        let mut block = block.clone();
        let status = self.correct_block(&mut block)?;
        Ok((self.extract(&block)?, status))
    }
}
