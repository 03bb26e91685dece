//! Packed, variable-length bit sequences.
//!
//! [`BitBuffer`] stores an arbitrary number of bits MSB-first in a byte
//! vector. Bit 0 is the most significant bit of the first byte. When the
//! length is not a multiple of 8, the used bits of the final byte occupy its
//! high-order positions and every unused low-order bit is zero, so two
//! buffers holding the same bits always compare equal.
//!
//! # Example
//!
//! ```
//! use bitcodec_core::BitBuffer;
//!
//! let mut buf = BitBuffer::new();
//! buf.push_bit(true);
//! buf.push_bits(0b01, 2).unwrap();
//! buf.push_byte(0xF0);
//!
//! assert_eq!(buf.len(), 11);
//! assert_eq!(buf.to_string(), "10111110000");
//! assert_eq!(buf.as_bytes(), &[0b1011_1110, 0b0000_0000]);
//! ```

use crate::error::{BitCodecError, Result};
use num_bigint::BigUint;
use std::fmt;
use std::ops::{BitXor, BitXorAssign, Range};
use std::str::FromStr;

/// An owned, growable sequence of bits packed into bytes (MSB-first).
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitBuffer {
    /// Packed storage, `len.div_ceil(8)` bytes.
    bytes: Vec<u8>,
    /// Number of valid bits.
    len: usize,
}

impl BitBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    /// Create a buffer of `len` zero bits.
    pub fn zeros(len: usize) -> Self {
        Self {
            bytes: vec![0; len.div_ceil(8)],
            len,
        }
    }

    /// Wrap whole bytes; the resulting length is `8 * bytes.len()`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = bytes.len() * 8;
        Self { bytes, len }
    }

    /// Take the first `len` bits of `bytes`.
    pub fn from_bytes_with_len(mut bytes: Vec<u8>, len: usize) -> Result<Self> {
        if len > bytes.len() * 8 {
            return Err(BitCodecError::out_of_range(len, bytes.len() * 8));
        }
        bytes.truncate(len.div_ceil(8));
        let mut buf = Self { bytes, len };
        buf.mask_tail();
        Ok(buf)
    }

    /// Encode the low `width` bits of `value`, most significant first.
    pub fn from_u64(value: u64, width: usize) -> Result<Self> {
        let mut buf = Self::with_capacity(width);
        buf.push_u64(value, width)?;
        Ok(buf)
    }

    /// Minimal big-endian representation of `value` (empty for zero).
    pub fn from_biguint(value: &BigUint) -> Self {
        let bits = value.bits() as usize;
        if bits == 0 {
            return Self::new();
        }
        let mut buf = Self::from_bytes(value.to_bytes_be());
        let leading = buf.len - bits;
        // to_bytes_be has no leading zero bytes, so fewer than 8 bits to drop
        buf.drop_leading(leading);
        buf
    }

    /// Representation of `value` left-padded with zeros to exactly `len` bits.
    pub fn from_biguint_with_len(value: &BigUint, len: usize) -> Result<Self> {
        let minimal = Self::from_biguint(value);
        if minimal.len > len {
            return Err(BitCodecError::out_of_range(minimal.len, len));
        }
        let mut buf = Self::zeros(len - minimal.len);
        buf.extend_from(&minimal);
        Ok(buf)
    }

    /// Number of valid bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of storage bytes, including a partial final byte.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Number of complete bytes.
    #[inline]
    pub fn full_byte_count(&self) -> usize {
        self.len / 8
    }

    /// Number of bits in the trailing partial byte (0 when aligned).
    #[inline]
    pub fn partial_bits(&self) -> usize {
        self.len % 8
    }

    /// Packed storage. A partial final byte is left-justified and zero padded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the buffer, returning its packed storage.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[inline]
    fn bit_at(&self, index: usize) -> bool {
        (self.bytes[index / 8] >> (7 - index % 8)) & 1 == 1
    }

    /// Zero every unused low-order bit of the final byte.
    #[inline]
    fn mask_tail(&mut self) {
        let used = self.len % 8;
        if used != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= 0xFFu8 << (8 - used);
            }
        }
    }

    /// Remove `count < 8` bits from the front.
    fn drop_leading(&mut self, count: usize) {
        debug_assert!(count < 8);
        if count == 0 {
            return;
        }
        let shifted = self.slice(count..self.len).unwrap_or_default();
        *self = shifted;
    }

    // ------------------------------------------------------------------
    // Appending
    // ------------------------------------------------------------------

    /// Append a single bit.
    #[inline]
    pub fn push_bit(&mut self, bit: bool) {
        let offset = self.len % 8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> offset;
        }
        self.len += 1;
    }

    /// Append a full byte, most significant bit first.
    #[inline]
    pub fn push_byte(&mut self, byte: u8) {
        let offset = self.len % 8;
        if offset == 0 {
            self.bytes.push(byte);
        } else {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= byte >> offset;
            self.bytes.push(byte << (8 - offset));
        }
        self.len += 8;
    }

    /// Append the low `count` bits of `value` (1-8), most significant first.
    pub fn push_bits(&mut self, value: u8, count: u8) -> Result<()> {
        if !(1..=8).contains(&count) {
            return Err(BitCodecError::invalid_value(format!(
                "partial byte length {count} (must be 1-8)"
            )));
        }
        if count == 8 {
            self.push_byte(value);
            return Ok(());
        }
        // Left-justify the selected bits
        let justified = (value << (8 - count)) & (0xFFu8 << (8 - count));
        let offset = self.len % 8;
        if offset == 0 {
            self.bytes.push(justified);
        } else {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= justified >> offset;
            if offset + count as usize > 8 {
                self.bytes.push(justified << (8 - offset));
            }
        }
        self.len += count as usize;
        Ok(())
    }

    /// Append the low `width` bits of `value` (0-64), most significant first.
    pub fn push_u64(&mut self, value: u64, width: usize) -> Result<()> {
        if width > 64 {
            return Err(BitCodecError::invalid_value(format!(
                "field width {width} exceeds 64 bits"
            )));
        }
        if width < 64 && value >> width != 0 {
            return Err(BitCodecError::invalid_value(format!(
                "value {value} does not fit in {width} bits"
            )));
        }
        for shift in (0..width).rev() {
            self.push_bit((value >> shift) & 1 == 1);
        }
        Ok(())
    }

    /// Append every bit of `other`, whatever the alignment of either buffer.
    pub fn extend_from(&mut self, other: &BitBuffer) {
        if other.is_empty() {
            return;
        }
        if self.len % 8 == 0 {
            self.bytes.extend_from_slice(&other.bytes);
            self.len += other.len;
            return;
        }

        let full = other.full_byte_count();
        for &byte in &other.bytes[..full] {
            self.push_byte(byte);
        }
        let rest = other.partial_bits();
        if rest > 0 {
            let tail = other.bytes[full] >> (8 - rest);
            // rest is 1-7, always a valid partial length
            let _ = self.push_bits(tail, rest as u8);
        }
    }

    /// Append `count` copies of `bit`. Returns `self` for chaining.
    pub fn pad_right(&mut self, bit: bool, count: usize) -> &mut Self {
        if bit {
            for _ in 0..count {
                self.push_bit(true);
            }
        } else {
            let new_len = self.len + count;
            self.bytes.resize(new_len.div_ceil(8), 0);
            self.len = new_len;
        }
        self
    }

    // ------------------------------------------------------------------
    // Indexed access
    // ------------------------------------------------------------------

    /// Bit at `index` from the start.
    #[inline]
    pub fn get(&self, index: usize) -> Result<bool> {
        if index >= self.len {
            return Err(BitCodecError::out_of_range(index, self.len));
        }
        Ok(self.bit_at(index))
    }

    /// Bit `back` positions from the end (`1` is the last bit).
    pub fn get_from_end(&self, back: usize) -> Result<bool> {
        let index = self.index_from_end(back)?;
        Ok(self.bit_at(index))
    }

    fn index_from_end(&self, back: usize) -> Result<usize> {
        if back == 0 || back > self.len {
            return Err(BitCodecError::out_of_range(back, self.len));
        }
        Ok(self.len - back)
    }

    /// Set the bit at `index` to `value`, which must be 0 or 1.
    pub fn set(&mut self, index: usize, value: u8) -> Result<()> {
        if value > 1 {
            return Err(BitCodecError::invalid_value(format!(
                "bit value {value} (must be 0 or 1)"
            )));
        }
        if index >= self.len {
            return Err(BitCodecError::out_of_range(index, self.len));
        }
        let mask = 0x80u8 >> (index % 8);
        if value == 1 {
            self.bytes[index / 8] |= mask;
        } else {
            self.bytes[index / 8] &= !mask;
        }
        Ok(())
    }

    /// Set the bit `back` positions from the end.
    pub fn set_from_end(&mut self, back: usize, value: u8) -> Result<()> {
        let index = self.index_from_end(back)?;
        self.set(index, value)
    }

    /// Invert the bit at `index`.
    #[inline]
    pub fn flip(&mut self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(BitCodecError::out_of_range(index, self.len));
        }
        self.bytes[index / 8] ^= 0x80 >> (index % 8);
        Ok(())
    }

    /// Copy of the bits in `range`.
    pub fn slice(&self, range: Range<usize>) -> Result<BitBuffer> {
        if range.start > range.end || range.end > self.len {
            return Err(BitCodecError::out_of_range(range.end, self.len));
        }
        let len = range.end - range.start;
        if len == 0 {
            return Ok(BitBuffer::new());
        }

        let first = range.start / 8;
        let last = (range.end - 1) / 8;
        let shift = range.start % 8;
        let mut bytes = Vec::with_capacity(len.div_ceil(8));

        if shift == 0 {
            bytes.extend_from_slice(&self.bytes[first..=last]);
        } else {
            for i in first..=last {
                let hi = self.bytes[i] << shift;
                let lo = self.bytes.get(i + 1).map_or(0, |b| b >> (8 - shift));
                bytes.push(hi | lo);
            }
        }

        bytes.truncate(len.div_ceil(8));
        let mut out = BitBuffer { bytes, len };
        out.mask_tail();
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Remove and return the last bit.
    pub fn pop(&mut self) -> Option<bool> {
        if self.len == 0 {
            return None;
        }
        let bit = self.bit_at(self.len - 1);
        self.truncate(self.len - 1);
        Some(bit)
    }

    /// Remove the last `count` bits.
    pub fn pop_bits(&mut self, count: usize) -> Result<()> {
        if count > self.len {
            return Err(BitCodecError::out_of_range(count, self.len));
        }
        self.truncate(self.len - count);
        Ok(())
    }

    /// Shorten the buffer to `len` bits. No-op if it is already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.bytes.truncate(len.div_ceil(8));
        self.len = len;
        self.mask_tail();
    }

    /// Remove every bit.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.len = 0;
    }

    /// Remove and return every complete byte, keeping the partial tail.
    pub fn take_full_bytes(&mut self) -> Vec<u8> {
        let full = self.full_byte_count();
        let tail = self.bytes.split_off(full);
        self.len -= full * 8;
        std::mem::replace(&mut self.bytes, tail)
    }

    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    /// XOR `other` into `self`, with `other`'s first bit at `offset`.
    pub fn xor_at(&mut self, offset: usize, other: &BitBuffer) -> Result<()> {
        let end = offset + other.len;
        if end > self.len {
            return Err(BitCodecError::out_of_range(end, self.len));
        }
        let base = offset / 8;
        let shift = offset % 8;
        if shift == 0 {
            for (i, &b) in other.bytes.iter().enumerate() {
                self.bytes[base + i] ^= b;
            }
        } else {
            for (i, &b) in other.bytes.iter().enumerate() {
                self.bytes[base + i] ^= b >> shift;
                let spill = b << (8 - shift);
                if spill != 0 {
                    self.bytes[base + i + 1] ^= spill;
                }
            }
        }
        Ok(())
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Index of the first set bit.
    pub fn first_one(&self) -> Option<usize> {
        self.bytes
            .iter()
            .position(|&b| b != 0)
            .map(|i| i * 8 + self.bytes[i].leading_zeros() as usize)
    }

    /// Degree of the buffer read as a polynomial: the power of its highest
    /// set term, counting the last bit as `x^0`. `None` for all zeros.
    ///
    /// ```
    /// use bitcodec_core::BitBuffer;
    ///
    /// let poly: BitBuffer = "001001".parse().unwrap();
    /// assert_eq!(poly.degree(), Some(3));
    /// ```
    pub fn degree(&self) -> Option<usize> {
        self.first_one().map(|i| self.len - 1 - i)
    }

    /// Iterate over the bits, first to last.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bit_at(i))
    }

    /// Iterate over the indices of the set bits.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.bit_at(i))
    }

    /// Interpret the buffer as an unsigned big-endian integer.
    pub fn to_biguint(&self) -> BigUint {
        let mut value = BigUint::from_bytes_be(&self.bytes);
        let pad = self.bytes.len() * 8 - self.len;
        if pad > 0 {
            value >>= pad;
        }
        value
    }

    /// Interpret the buffer (at most 64 bits) as an unsigned integer.
    pub fn to_u64(&self) -> Result<u64> {
        if self.len > 64 {
            return Err(BitCodecError::out_of_range(self.len, 64));
        }
        Ok(self.iter().fold(0u64, |acc, bit| (acc << 1) | bit as u64))
    }
}

impl BitXor for &BitBuffer {
    type Output = BitBuffer;

    /// XOR with the shorter operand aligned to the tail (least significant
    /// end) of the longer one. This is mod-2 polynomial subtraction.
    fn bitxor(self, rhs: &BitBuffer) -> BitBuffer {
        let (long, short) = if self.len >= rhs.len {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let mut out = long.clone();
        // short fits inside long by construction
        let _ = out.xor_at(long.len - short.len, short);
        out
    }
}

impl BitXorAssign<&BitBuffer> for BitBuffer {
    fn bitxor_assign(&mut self, rhs: &BitBuffer) {
        if self.len >= rhs.len {
            let offset = self.len - rhs.len;
            let _ = self.xor_at(offset, rhs);
        } else {
            *self = &*self ^ rhs;
        }
    }
}

impl FromIterator<bool> for BitBuffer {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut buf = BitBuffer::new();
        buf.extend(iter);
        buf
    }
}

impl Extend<bool> for BitBuffer {
    fn extend<I: IntoIterator<Item = bool>>(&mut self, iter: I) {
        for bit in iter {
            self.push_bit(bit);
        }
    }
}

impl FromStr for BitBuffer {
    type Err = BitCodecError;

    /// Parse a string of `0`/`1` characters. `_` and spaces are ignored.
    fn from_str(s: &str) -> Result<Self> {
        let mut buf = BitBuffer::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '0' => buf.push_bit(false),
                '1' => buf.push_bit(true),
                '_' | ' ' => {}
                other => {
                    return Err(BitCodecError::invalid_value(format!(
                        "unexpected character {other:?} in bit string"
                    )));
                }
            }
        }
        Ok(buf)
    }
}

impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len <= 64 {
            write!(f, "BitBuffer({self}, len={})", self.len)
        } else {
            write!(f, "BitBuffer(len={}, bytes={:02x?}..)", self.len, &self.bytes[..8])
        }
    }
}
