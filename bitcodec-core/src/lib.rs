//! # bitcodec Core
//!
//! Core components for the bitcodec toolkit.
//!
//! This crate provides the bit-level building blocks shared by every codec:
//!
//! - [`bitbuffer`]: Packed, variable-length bit sequences with XOR arithmetic
//! - [`bitstream`]: MSB-first bit reader/writer over files
//! - [`frequency`]: Parallel byte histogram over a file
//! - [`progress`]: Cancellation tokens, progress sinks and outcomes
//! - [`operation`]: Report-string guard and diagnostic dump files
//! - [`worker`]: Running an operation on a background thread
//! - [`config`]: Stream tuning
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! bitcodec is layered like a small protocol stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Front end                                           │
//! │     bitcodec CLI, progress bar, JSON reports            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codecs                                              │
//! │     Shannon-Fano / Huffman compression, Hamming, CRC    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Bits (this crate)                                   │
//! │     BitBuffer, BitReader/BitWriter, Histogram, worker   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bitcodec_core::{BitBuffer, BitReader, Histogram};
//!
//! let mut bits = BitBuffer::new();
//! bits.push_byte(b'h');
//! bits.push_bits(0b11, 2).unwrap();
//!
//! let mut reader = BitReader::from_slice(bits.as_bytes());
//! assert_eq!(reader.read_byte().unwrap(), b'h');
//!
//! let hist = Histogram::from_bytes(b"abracadabra");
//! assert_eq!(hist.ordered()[0], (b'a', 5));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitbuffer;
pub mod bitstream;
pub mod config;
pub mod error;
pub mod frequency;
pub mod operation;
pub mod progress;
pub mod worker;

// Re-exports for convenience
pub use bitbuffer::BitBuffer;
pub use bitstream::{BitReader, BitWriter};
pub use config::StreamConfig;
pub use error::{BitCodecError, Result};
pub use frequency::{FrequencyCounter, Histogram, count_frequencies};
pub use operation::{Direction, OperationKind, file_name, run_reported};
pub use progress::{CancelToken, NullProgress, Outcome, ProgressSink, ProgressTracker};
pub use worker::{OperationHandle, spawn};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitbuffer::BitBuffer;
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::config::StreamConfig;
    pub use crate::error::{BitCodecError, Result};
    pub use crate::frequency::Histogram;
    pub use crate::progress::{CancelToken, NullProgress, Outcome, ProgressSink};
}
