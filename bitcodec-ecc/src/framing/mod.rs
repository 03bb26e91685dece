//! File-level framing for the block codes.
//!
//! # Hamming files
//!
//! ```text
//! ┌──────────────────┬──────────────────────┬─────────────────────────┐
//! │ 16-bit Hamming   │ overflow block       │ B-bit blocks            │
//! │ block: 11-bit    │ (only if O > 0):     │ information_size bits   │
//! │ overflow count O │ O bits, zero padded  │ of input each           │
//! └──────────────────┴──────────────────────┴─────────────────────────┘
//! ```
//!
//! `O` is the input bit length modulo the information size, so the blocks
//! after the overflow block always come out full.
//!
//! # CRC files
//!
//! ```text
//! ┌────────────────────┬────────────────────┬─────┬──────────────────────┐
//! │ N data + w check   │ N data + w check   │ ... │ rest data + w check  │
//! └────────────────────┴────────────────────┴─────┴──────────────────────┘
//! ```
//!
//! The final block holds whatever input bits remain. The checksum width must
//! be a whole number of bytes so block boundaries can be recovered from the
//! file length alone.

pub mod crc;
pub mod hamming;

pub use crc::{
    CrcDecodeSummary, CrcEncodeSummary, crc_decode, crc_decode_file, crc_decode_with_config,
    crc_encode, crc_encode_file, crc_encode_with_config,
};
pub use hamming::{
    HEADER_BLOCK_SIZE, HammingDecodeSummary, HammingEncodeSummary, hamming_decode,
    hamming_decode_file, hamming_decode_with_config, hamming_encode, hamming_encode_file,
    hamming_encode_with_config,
};
