//! MSB-first bit-level file I/O.
//!
//! [`BitReader`] and [`BitWriter`] move bits between a byte source/sink and
//! the codecs. Both use MSB-first ordering: the first bit of a stream is the
//! most significant bit of its first byte, matching the [`BitBuffer`] layout.
//!
//! The reader knows the length of its source up front so callers can drive
//! loops and progress reporting from [`BitReader::remaining_bits`]. The writer
//! batches whole bytes and only pads the final partial byte on
//! [`BitWriter::close`].
//!
//! Both types own their handle as an `Option` so `close` is idempotent and
//! any later use fails with [`BitCodecError::StreamClosed`]. The writer closes
//! itself on drop on a best-effort basis.
//!
//! # Example
//!
//! ```
//! use bitcodec_core::bitstream::{BitReader, BitWriter};
//! use bitcodec_core::StreamConfig;
//!
//! let config = StreamConfig::default();
//! let mut writer = BitWriter::new(Vec::new(), &config);
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_byte(0xFF).unwrap();
//! let output = writer.into_inner().unwrap();
//! assert_eq!(output, vec![0b1011_1111, 0b1110_0000]);
//!
//! let mut reader = BitReader::from_slice(&output);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(3).unwrap().to_string(), "011");
//! ```

use crate::bitbuffer::BitBuffer;
use crate::config::StreamConfig;
use crate::error::{BitCodecError, Result};
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

/// Read until `buf` is full or the source ends, returning the byte count.
pub fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Sequential MSB-first bit reader over any `Read` source of known length.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader, `None` once closed.
    reader: Option<R>,
    /// Current chunk of source bytes.
    chunk: Vec<u8>,
    /// Index of the current byte in `chunk`.
    chunk_pos: usize,
    /// Bits of the current byte already consumed (0-7).
    bit_offset: u8,
    /// Bytes requested per refill.
    chunk_size: usize,
    /// Length of the source in bits.
    total_bits: u64,
    /// Bits consumed so far.
    bits_read: u64,
}

impl BitReader<File> {
    /// Open a file for bit-level reading.
    pub fn open(path: impl AsRef<Path>, config: &StreamConfig) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let byte_len = file.metadata()?.len();
        Self::new(file, byte_len, config)
    }
}

impl<'a> BitReader<Cursor<&'a [u8]>> {
    /// Read bits from an in-memory slice.
    pub fn from_slice(data: &'a [u8]) -> Self {
        let len = data.len();
        Self {
            reader: Some(Cursor::new(data)),
            chunk: Vec::new(),
            chunk_pos: 0,
            bit_offset: 0,
            chunk_size: len.max(1),
            total_bits: len as u64 * 8,
            bits_read: 0,
        }
    }
}

impl<R: Read> BitReader<R> {
    /// Wrap a reader whose source holds exactly `byte_len` bytes.
    pub fn new(reader: R, byte_len: u64, config: &StreamConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader: Some(reader),
            chunk: Vec::new(),
            chunk_pos: 0,
            bit_offset: 0,
            chunk_size: config.chunk_size,
            total_bits: byte_len * 8,
            bits_read: 0,
        })
    }

    /// Total length of the source in bits.
    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    /// Total length of the source in bytes.
    pub fn byte_len(&self) -> u64 {
        self.total_bits / 8
    }

    /// Bits consumed so far.
    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    /// Whole bytes consumed so far.
    pub fn bytes_read(&self) -> u64 {
        self.bits_read / 8
    }

    /// Bits not yet consumed.
    pub fn remaining_bits(&self) -> u64 {
        self.total_bits - self.bits_read
    }

    /// Whether every bit has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.bits_read >= self.total_bits
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    /// Release the underlying reader. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.reader = None;
        self.chunk = Vec::new();
    }

    /// Make sure the current byte is loaded, fetching a new chunk if needed.
    fn ensure_byte(&mut self) -> Result<()> {
        if self.chunk_pos < self.chunk.len() {
            return Ok(());
        }
        let reader = self.reader.as_mut().ok_or(BitCodecError::StreamClosed)?;

        self.chunk.resize(self.chunk_size, 0);
        let filled = read_full(reader, &mut self.chunk)?;
        self.chunk.truncate(filled);
        self.chunk_pos = 0;

        if filled == 0 {
            return Err(BitCodecError::end_of_stream(self.bits_read));
        }
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        if self.reader.is_none() {
            return Err(BitCodecError::StreamClosed);
        }
        Ok(())
    }

    /// Read one bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        self.check_open()?;
        if self.is_exhausted() {
            return Err(BitCodecError::end_of_stream(self.bits_read));
        }
        self.ensure_byte()?;

        let byte = self.chunk[self.chunk_pos];
        let bit = (byte >> (7 - self.bit_offset)) & 1 == 1;
        self.bit_offset += 1;
        if self.bit_offset == 8 {
            self.bit_offset = 0;
            self.chunk_pos += 1;
        }
        self.bits_read += 1;
        Ok(bit)
    }

    /// Read one byte (8 bits, not necessarily aligned).
    pub fn read_byte(&mut self) -> Result<u8> {
        self.check_open()?;
        if self.remaining_bits() < 8 {
            return Err(BitCodecError::end_of_stream(self.bits_read));
        }
        if self.bit_offset == 0 {
            self.ensure_byte()?;
            let byte = self.chunk[self.chunk_pos];
            self.chunk_pos += 1;
            self.bits_read += 8;
            return Ok(byte);
        }

        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | self.read_bit()? as u8;
        }
        Ok(byte)
    }

    /// Read up to `count` bits.
    ///
    /// Returns a shorter buffer when fewer than `count` bits remain and fails
    /// with [`BitCodecError::EndOfStream`] when none remain.
    pub fn read_bits(&mut self, count: usize) -> Result<BitBuffer> {
        self.check_open()?;
        if count > 0 && self.is_exhausted() {
            return Err(BitCodecError::end_of_stream(self.bits_read));
        }
        let available = (count as u64).min(self.remaining_bits()) as usize;
        let mut out = BitBuffer::with_capacity(available);

        let mut left = available;
        while left > 0 {
            if self.bit_offset == 0 && left >= 8 {
                out.push_byte(self.read_byte()?);
                left -= 8;
            } else {
                out.push_bit(self.read_bit()?);
                left -= 1;
            }
        }
        Ok(out)
    }
}

/// Buffered MSB-first bit writer over any `Write` sink.
///
/// Bits collect in an internal [`BitBuffer`]. When more than
/// `write_threshold` whole bytes are pending they are written out and only
/// the trailing partial byte is kept.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Underlying writer, `None` once closed.
    writer: Option<W>,
    /// Bits not yet handed to the writer.
    pending: BitBuffer,
    /// Whole pending bytes tolerated before a flush.
    threshold: usize,
    /// Total bits accepted.
    bits_written: u64,
}

impl BitWriter<File> {
    /// Create (or truncate) a file for bit-level writing.
    pub fn create(path: impl AsRef<Path>, config: &StreamConfig) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(file, config))
    }
}

impl<W: Write> BitWriter<W> {
    /// Wrap a writer.
    pub fn new(writer: W, config: &StreamConfig) -> Self {
        Self {
            writer: Some(writer),
            pending: BitBuffer::with_capacity((config.write_threshold + 1) * 8),
            threshold: config.write_threshold,
            bits_written: 0,
        }
    }

    /// Total bits accepted so far.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Bytes the output will occupy once closed.
    pub fn bytes_written(&self) -> u64 {
        self.bits_written.div_ceil(8)
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    /// Get a reference to the underlying writer, if still open.
    pub fn get_ref(&self) -> Option<&W> {
        self.writer.as_ref()
    }

    fn check_open(&self) -> Result<()> {
        if self.writer.is_none() {
            return Err(BitCodecError::StreamClosed);
        }
        Ok(())
    }

    #[inline]
    fn maybe_flush(&mut self) -> Result<()> {
        if self.pending.full_byte_count() > self.threshold {
            self.flush_full_bytes()?;
        }
        Ok(())
    }

    /// Hand every whole pending byte to the writer.
    fn flush_full_bytes(&mut self) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(BitCodecError::StreamClosed)?;
        let bytes = self.pending.take_full_bytes();
        if !bytes.is_empty() {
            writer.write_all(&bytes)?;
        }
        Ok(())
    }

    /// Write one bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.check_open()?;
        self.pending.push_bit(bit);
        self.bits_written += 1;
        self.maybe_flush()
    }

    /// Write one byte, MSB first.
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.check_open()?;
        self.pending.push_byte(byte);
        self.bits_written += 8;
        self.maybe_flush()
    }

    /// Write the low `count` (1-8) bits of `value`.
    pub fn write_bits(&mut self, value: u8, count: u8) -> Result<()> {
        self.check_open()?;
        self.pending.push_bits(value, count)?;
        self.bits_written += count as u64;
        self.maybe_flush()
    }

    /// Write every bit of `bits`.
    pub fn write_buffer(&mut self, bits: &BitBuffer) -> Result<()> {
        self.check_open()?;
        self.pending.extend_from(bits);
        self.bits_written += bits.len() as u64;
        self.maybe_flush()
    }

    /// Write whole bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.check_open()?;
        for &byte in bytes {
            self.pending.push_byte(byte);
        }
        self.bits_written += bytes.len() as u64 * 8;
        self.maybe_flush()
    }

    /// Write out whole pending bytes and flush the sink.
    ///
    /// The trailing partial byte stays buffered so later bits keep their
    /// alignment.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_full_bytes()?;
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Write everything still pending, padding the final partial byte with
    /// zero bits, flush the sink and return it.
    fn finish(&mut self) -> Result<Option<W>> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(None);
        };
        // Already left-justified and zero padded
        let tail = std::mem::take(&mut self.pending);
        writer.write_all(tail.as_bytes())?;
        writer.flush()?;
        Ok(Some(writer))
    }

    /// Flush all pending bits and release the writer. Safe to call
    /// repeatedly.
    pub fn close(&mut self) -> Result<()> {
        self.finish().map(|_| ())
    }

    /// Close the stream and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.finish()?.ok_or(BitCodecError::StreamClosed)
    }
}

impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        // Best-effort close on drop
        let _ = self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_reader(data: &[u8]) -> BitReader<Cursor<&[u8]>> {
        BitReader::new(Cursor::new(data), data.len() as u64, &StreamConfig::tiny()).unwrap()
    }

    #[test]
    fn test_reader_msb_first() {
        // 0b10110101 = 0xB5
        let mut reader = BitReader::from_slice(&[0xB5]);
        let bits: Vec<bool> = (0..8).map(|_| reader.read_bit().unwrap()).collect();
        assert_eq!(
            bits,
            vec![true, false, true, true, false, true, false, true]
        );
        assert!(reader.is_exhausted());
        assert!(matches!(
            reader.read_bit(),
            Err(BitCodecError::EndOfStream { bits_read: 8 })
        ));
    }

    #[test]
    fn test_reader_unaligned_byte() {
        let mut reader = BitReader::from_slice(&[0b1010_1010, 0b1100_0000]);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_byte().unwrap(), 0b0101_0101);
        assert_eq!(reader.bits_read(), 9);
        assert_eq!(reader.bytes_read(), 1);
        assert!(reader.read_byte().is_err());
    }

    #[test]
    fn test_read_bits_partial_at_end() {
        let mut reader = BitReader::from_slice(&[0xF0, 0x0F]);
        assert_eq!(reader.read_bits(12).unwrap().to_string(), "111100000000");
        let rest = reader.read_bits(12).unwrap();
        assert_eq!(rest.to_string(), "1111");
        assert!(matches!(
            reader.read_bits(1),
            Err(BitCodecError::EndOfStream { .. })
        ));
    }

    #[test]
    fn test_reader_crosses_chunks() {
        let data: Vec<u8> = (0..100).collect();
        let mut reader = tiny_reader(&data);
        assert!(!reader.read_bit().unwrap());
        for i in 0..99u8 {
            let expected = (i << 1) | ((i + 1) >> 7);
            assert_eq!(reader.read_byte().unwrap(), expected);
        }
        assert_eq!(reader.remaining_bits(), 7);

        let mut reader = tiny_reader(&data);
        let all = reader.read_bits(800).unwrap();
        assert_eq!(all.as_bytes(), &data[..]);
    }

    #[test]
    fn test_reader_close_is_idempotent() {
        let mut reader = BitReader::from_slice(&[0xFF]);
        reader.close();
        reader.close();
        assert!(reader.is_closed());
        assert!(matches!(reader.read_bit(), Err(BitCodecError::StreamClosed)));
    }

    #[test]
    fn test_writer_pads_final_byte() {
        let mut writer = BitWriter::new(Vec::new(), &StreamConfig::default());
        writer.write_bit(true).unwrap();
        writer.write_bit(true).unwrap();
        writer.write_bits(0b1, 1).unwrap();
        assert_eq!(writer.bits_written(), 3);
        assert_eq!(writer.bytes_written(), 1);
        assert_eq!(writer.into_inner().unwrap(), vec![0b1110_0000]);
    }

    #[test]
    fn test_writer_threshold_flush_keeps_partial() {
        let mut writer = BitWriter::new(Vec::new(), &StreamConfig::tiny());
        writer.write_bit(true).unwrap();
        for i in 0..10u8 {
            writer.write_byte(i).unwrap();
        }
        // More than four whole bytes were pending, so some went out
        assert!(!writer.get_ref().unwrap().is_empty());

        let out = writer.into_inner().unwrap();
        let mut expected = BitBuffer::new();
        expected.push_bit(true);
        for i in 0..10u8 {
            expected.push_byte(i);
        }
        assert_eq!(out, expected.into_bytes());
    }

    #[test]
    fn test_writer_close_is_idempotent() {
        let mut writer = BitWriter::new(Vec::new(), &StreamConfig::default());
        writer.write_byte(0xAB).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(writer.is_closed());
        assert!(matches!(
            writer.write_bit(true),
            Err(BitCodecError::StreamClosed)
        ));
    }

    #[test]
    fn test_writer_buffer_roundtrip() {
        let bits: BitBuffer = "1_0110_1110_0101_1".parse().unwrap();
        let mut writer = BitWriter::new(Vec::new(), &StreamConfig::tiny());
        writer.write_buffer(&bits).unwrap();
        writer.write_bytes(&[0xC3, 0x3C]).unwrap();
        let out = writer.into_inner().unwrap();

        let mut reader = BitReader::from_slice(&out);
        assert_eq!(reader.read_bits(bits.len()).unwrap(), bits);
        assert_eq!(reader.read_byte().unwrap(), 0xC3);
        assert_eq!(reader.read_byte().unwrap(), 0x3C);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bits.bin");
        let config = StreamConfig::tiny();
        {
            let mut writer = BitWriter::create(&path, &config).unwrap();
            for i in 0..=255u8 {
                writer.write_bits(i, 5).unwrap();
            }
            // Dropped without close: flushed on drop
        }

        let mut reader = BitReader::open(&path, &config).unwrap();
        assert_eq!(reader.total_bits(), (256 * 5usize).div_ceil(8) as u64 * 8);
        for i in 0..=255u8 {
            let value = reader.read_bits(5).unwrap().to_u64().unwrap();
            assert_eq!(value, (i & 0x1F) as u64);
        }
    }
}
