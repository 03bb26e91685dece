//! Polynomial checksum (CRC) block code.
//!
//! A block is read as a polynomial over GF(2), first bit highest. Encoding
//! appends `w = degree + 1` zero bits and XORs the remainder of the division
//! by the generator into that tail, so every codeword divides exactly.
//!
//! The correcting variant looks for the unique bit position whose flip makes
//! the remainder vanish. By linearity that is the position whose single-bit
//! remainder `x^k mod g` equals the received remainder, so the candidates
//! are walked with one shift-and-reduce per position instead of a full
//! division per trial flip.

use bitcodec_core::BitBuffer;
use bitcodec_core::error::{BitCodecError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default generator polynomial.
pub const DEFAULT_POLYNOMIAL: u64 = 0xD175;

/// Bit width of [`DEFAULT_POLYNOMIAL`].
pub const DEFAULT_POLYNOMIAL_WIDTH: usize = 16;

/// Outcome of decoding one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrcStatus {
    /// Remainder was zero.
    Ok,
    /// A single flipped bit was located and restored.
    Corrected,
    /// Nonzero remainder that could not be attributed to one bit.
    Corrupted,
}

impl fmt::Display for CrcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrcStatus::Ok => write!(f, "OK"),
            CrcStatus::Corrected => write!(f, "Corrected"),
            CrcStatus::Corrupted => write!(f, "Corrupted"),
        }
    }
}

/// Per-status block counts of a decode run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrcTally {
    /// Blocks with a zero remainder.
    pub ok: u64,
    /// Blocks repaired by a single flip.
    pub corrected: u64,
    /// Blocks left damaged.
    pub corrupted: u64,
}

impl CrcTally {
    /// Count one block.
    pub fn record(&mut self, status: CrcStatus) {
        match status {
            CrcStatus::Ok => self.ok += 1,
            CrcStatus::Corrected => self.corrected += 1,
            CrcStatus::Corrupted => self.corrupted += 1,
        }
    }

    /// Total blocks counted.
    pub fn blocks(&self) -> u64 {
        self.ok + self.corrected + self.corrupted
    }
}

/// Generator polynomial of a CRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrcPolynomial {
    bits: BitBuffer,
    /// Significant part: leading one through the last bit.
    divisor: BitBuffer,
    degree: usize,
}

impl Default for CrcPolynomial {
    fn default() -> Self {
        // 0xD175 has its top bit set: degree 15, width 16
        let bits = BitBuffer::from_bytes(vec![0xD1, 0x75]);
        Self {
            divisor: bits.clone(),
            bits,
            degree: DEFAULT_POLYNOMIAL_WIDTH - 1,
        }
    }
}

impl CrcPolynomial {
    /// Polynomial from its bit representation. Leading zeros are allowed.
    pub fn new(bits: BitBuffer) -> Result<Self> {
        let (Some(first), Some(degree)) = (bits.first_one(), bits.degree()) else {
            return Err(BitCodecError::invalid_parameter(
                "CRC polynomial has no set bit",
            ));
        };
        if degree == 0 {
            return Err(BitCodecError::invalid_parameter(
                "CRC polynomial must have degree of at least 1",
            ));
        }
        let divisor = bits.slice(first..bits.len())?;
        Ok(Self {
            bits,
            divisor,
            degree,
        })
    }

    /// Polynomial from the low `width` bits of `value`.
    pub fn from_u64(value: u64, width: usize) -> Result<Self> {
        Self::new(BitBuffer::from_u64(value, width)?)
    }

    /// Bit representation as given.
    pub fn bits(&self) -> &BitBuffer {
        &self.bits
    }

    /// Power of the highest set term.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Checksum length in bits: `degree + 1`.
    pub fn checksum_width(&self) -> usize {
        self.degree + 1
    }

    /// Remainder of `dividend` modulo the polynomial.
    ///
    /// The result has the dividend's length; only its last `degree` bits
    /// can be set.
    pub fn remainder(&self, dividend: &BitBuffer) -> BitBuffer {
        let mut rest = dividend.clone();
        let len = rest.len();
        while let Some(lead) = rest.first_one() {
            if len - 1 - lead < self.degree {
                break;
            }
            // The divisor fits because the dividend's degree is at least ours
            if rest.xor_at(lead, &self.divisor).is_err() {
                break;
            }
        }
        rest
    }

    /// Whether `block` divides exactly.
    pub fn divides(&self, block: &BitBuffer) -> bool {
        self.remainder(block).first_one().is_none()
    }

    /// `x * term mod g` for a reduced `term` of `checksum_width` bits.
    fn times_x(&self, term: &mut BitBuffer) {
        term.push_bit(false);
        if term.get(1).unwrap_or(false) {
            // Degree reached ours: subtract the divisor under bits 1..
            let _ = term.xor_at(1, &self.divisor);
        }
        let reduced = term.slice(1..term.len()).unwrap_or_default();
        *term = reduced;
    }
}

impl fmt::Display for CrcPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits)
    }
}

/// CRC block codec: a generator and whether to attempt single-bit repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrcConfig {
    /// Generator polynomial.
    pub polynomial: CrcPolynomial,
    /// Attempt single-bit correction on decode.
    pub correcting: bool,
}

impl Default for CrcConfig {
    fn default() -> Self {
        Self {
            polynomial: CrcPolynomial::default(),
            correcting: true,
        }
    }
}

impl CrcConfig {
    /// Codec with `polynomial`, correcting by default.
    pub fn new(polynomial: CrcPolynomial) -> Self {
        Self {
            polynomial,
            correcting: true,
        }
    }

    /// Enable or disable single-bit correction.
    pub fn with_correcting(mut self, correcting: bool) -> Self {
        self.correcting = correcting;
        self
    }

    /// Checksum length in bits.
    pub fn checksum_width(&self) -> usize {
        self.polynomial.checksum_width()
    }

    /// Append the checksum to `message`.
    pub fn encode_block(&self, message: &BitBuffer) -> BitBuffer {
        let width = self.checksum_width();
        let mut codeword = message.clone();
        codeword.pad_right(false, width);
        let remainder = self.polynomial.remainder(&codeword);
        codeword ^= &remainder;
        codeword
    }

    /// Verify `block`, repair it if allowed, and strip the checksum.
    ///
    /// Fails with [`BitCodecError::InvalidValue`] when the block is shorter
    /// than the checksum.
    pub fn decode_block(&self, block: &BitBuffer) -> Result<(BitBuffer, CrcStatus)> {
        let width = self.checksum_width();
        if block.len() < width {
            return Err(BitCodecError::invalid_value(format!(
                "CRC block has {} bits, less than the {}-bit checksum of {}",
                block.len(),
                width,
                self.polynomial
            )));
        }

        let mut block = block.clone();
        let remainder = self.polynomial.remainder(&block);
        let status = if remainder.first_one().is_none() {
            CrcStatus::Ok
        } else if !self.correcting {
            CrcStatus::Corrupted
        } else {
            match self.find_single_error(&remainder) {
                Some(pos) => {
                    block.flip(pos)?;
                    CrcStatus::Corrected
                }
                None => CrcStatus::Corrupted,
            }
        };

        block.pop_bits(width)?;
        Ok((block, status))
    }

    /// Position whose flip alone zeroes `remainder`, if exactly one exists.
    fn find_single_error(&self, remainder: &BitBuffer) -> Option<usize> {
        let width = self.checksum_width();
        let len = remainder.len();
        let target = remainder.slice(len - width..len).ok()?;

        // x^0, x^1, ... mod g, walking positions from the last bit backwards
        let mut term = BitBuffer::zeros(width);
        term.set(width - 1, 1).ok()?;

        let mut found = None;
        for pos in (0..len).rev() {
            if term == target {
                if found.is_some() {
                    return None;
                }
                found = Some(pos);
            }
            self.polynomial.times_x(&mut term);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> BitBuffer {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_polynomial() {
        let poly = CrcPolynomial::default();
        assert_eq!(poly, CrcPolynomial::from_u64(DEFAULT_POLYNOMIAL, 16).unwrap());
        assert_eq!(poly.degree(), 15);
        assert_eq!(poly.checksum_width(), 16);
    }

    #[test]
    fn test_leading_zeros_in_polynomial() {
        let poly = CrcPolynomial::new(bits("001011")).unwrap();
        assert_eq!(poly.degree(), 3);
        assert_eq!(poly.checksum_width(), 4);
        assert!(CrcPolynomial::new(bits("0000")).is_err());
        assert!(CrcPolynomial::new(bits("001")).is_err());
    }

    #[test]
    fn test_remainder_textbook() {
        // 11010011101100 mod 1011 = 100
        let poly = CrcPolynomial::new(bits("1011")).unwrap();
        let rem = poly.remainder(&bits("11010011101100000"));
        assert_eq!(rem.slice(rem.len() - 3..rem.len()).unwrap().to_string(), "100");
        assert!(poly.divides(&bits("1011")));
        assert!(!poly.divides(&bits("1010")));
    }

    #[test]
    fn test_encode_divides() {
        let crc = CrcConfig::default();
        let message: BitBuffer = (0..1024).map(|i| (i * 7) % 5 == 1).collect();
        let codeword = crc.encode_block(&message);
        assert_eq!(codeword.len(), 1024 + 16);
        assert!(crc.polynomial.divides(&codeword));
        assert_eq!(codeword.slice(0..1024).unwrap(), message);
        assert_eq!(crc.decode_block(&codeword).unwrap(), (message, CrcStatus::Ok));
    }

    #[test]
    fn test_single_flip_corrected() {
        let crc = CrcConfig::default();
        let message: BitBuffer = (0..200).map(|i| i % 3 == 0).collect();
        let codeword = crc.encode_block(&message);
        for pos in 0..codeword.len() {
            let mut damaged = codeword.clone();
            damaged.flip(pos).unwrap();
            let (decoded, status) = crc.decode_block(&damaged).unwrap();
            assert_eq!(status, CrcStatus::Corrected, "pos {pos}");
            assert_eq!(decoded, message);
        }
    }

    #[test]
    fn test_detect_only_never_ok() {
        let crc = CrcConfig::default().with_correcting(false);
        let message = bits("1100101011110000");
        let codeword = crc.encode_block(&message);
        for pos in 0..codeword.len() {
            let mut damaged = codeword.clone();
            damaged.flip(pos).unwrap();
            let (decoded, status) = crc.decode_block(&damaged).unwrap();
            assert_eq!(status, CrcStatus::Corrupted);
            assert_eq!(decoded.len(), message.len());
        }
    }

    #[test]
    fn test_ambiguous_flip_is_corrupted() {
        // x + 1 cannot tell positions apart: every single flip leaves remainder 1
        let crc = CrcConfig::new(CrcPolynomial::new(bits("11")).unwrap());
        let codeword = crc.encode_block(&bits("1010"));
        let mut damaged = codeword.clone();
        damaged.flip(0).unwrap();
        assert_eq!(crc.decode_block(&damaged).unwrap().1, CrcStatus::Corrupted);
    }

    #[test]
    fn test_short_block_rejected() {
        let crc = CrcConfig::default();
        assert!(crc.decode_block(&BitBuffer::zeros(15)).is_err());
        let (empty, status) = crc.decode_block(&BitBuffer::zeros(16)).unwrap();
        assert!(empty.is_empty());
        assert_eq!(status, CrcStatus::Ok);
    }
}
