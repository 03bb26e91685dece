//! Error types for bitcodec operations.
//!
//! A single error type covers every fault the codecs can raise: I/O,
//! bit-buffer contract violations, malformed headers and invalid codec
//! parameters. Decoding outcomes of the error-control codes (corrected,
//! corrupted and so on) are data, not errors, and never appear here.

use std::io;
use thiserror::Error;

/// The main error type for bitcodec operations.
#[derive(Debug, Error)]
pub enum BitCodecError {
    /// I/O error from the underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bit index or range outside the buffer.
    #[error("Index {index} out of range for length {len}")]
    OutOfRange {
        /// The offending index (or range end).
        index: usize,
        /// Length of the buffer at the time of access.
        len: usize,
    },

    /// A value that is not representable for the operation.
    #[error("Invalid value: {message}")]
    InvalidValue {
        /// Description of the rejected value.
        message: String,
    },

    /// The source contains no data.
    #[error("Empty input")]
    EmptyInput,

    /// Two prefix codes collide (one is a prefix of the other).
    #[error("Conflicting code for symbol {symbol:#04x}: {code}")]
    ConflictingCode {
        /// Symbol whose code could not be inserted.
        symbol: u8,
        /// The code, as a bit string.
        code: String,
    },

    /// A bit sequence that leads nowhere in the code tree.
    #[error("Invalid code at bit position {bit_position}")]
    InvalidCode {
        /// Number of bits fed before the failure.
        bit_position: u64,
    },

    /// Malformed file header.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// No bits left in the stream.
    #[error("Unexpected end of stream after {bits_read} bits")]
    EndOfStream {
        /// Bits consumed before the end was hit.
        bits_read: u64,
    },

    /// The stream was already closed.
    #[error("Stream already closed")]
    StreamClosed,

    /// A worker thread panicked before producing a result.
    #[error("Worker thread panicked: {message}")]
    WorkerPanicked {
        /// Panic payload, when it was a string.
        message: String,
    },

    /// Codec parameter outside its supported domain.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the parameter error.
        message: String,
    },
}

/// Result type alias for bitcodec operations.
pub type Result<T> = std::result::Result<T, BitCodecError>;

impl BitCodecError {
    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }

    /// Create an invalid value error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    /// Create a conflicting code error.
    pub fn conflicting_code(symbol: u8, code: impl Into<String>) -> Self {
        Self::ConflictingCode {
            symbol,
            code: code.into(),
        }
    }

    /// Create an invalid code error.
    pub fn invalid_code(bit_position: u64) -> Self {
        Self::InvalidCode { bit_position }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an end-of-stream error.
    pub fn end_of_stream(bits_read: u64) -> Self {
        Self::EndOfStream { bits_read }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Whether this error means the input had nothing to process.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::EmptyInput)
    }
}
