//! # bitcodec ECC
//!
//! Error-correcting and error-detecting block codes for the bitcodec toolkit.
//!
//! - [`hamming`]: Extended Hamming (SECDED) code with power-of-two blocks
//! - [`crc`]: Polynomial checksum with optional single-bit repair
//! - [`framing`]: File encoders/decoders with per-block outcome tallies
//! - [`infuse`]: Seeded bit-flip injection for testing the decoders
//!
//! Block outcomes (`Ok`, corrected, uncorrectable) are data: they are
//! counted into the decode summary and never raised as errors.
//!
//! ## Example
//!
//! ```rust
//! use bitcodec_core::BitBuffer;
//! use bitcodec_ecc::{CrcConfig, CrcStatus, HammingCode, HammingStatus};
//!
//! let code = HammingCode::new(16).unwrap();
//! let message: BitBuffer = "10110011101".parse().unwrap();
//! let mut block = code.encode_block(&message).unwrap();
//! block.flip(6).unwrap();
//! assert_eq!(
//!     code.decode_block(&block).unwrap(),
//!     (message.clone(), HammingStatus::OneBitErrorCorrected)
//! );
//!
//! let crc = CrcConfig::default();
//! let codeword = crc.encode_block(&message);
//! assert_eq!(crc.decode_block(&codeword).unwrap(), (message, CrcStatus::Ok));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod crc;
pub mod framing;
pub mod hamming;
pub mod infuse;

// Re-exports for convenience
pub use crc::{CrcConfig, CrcPolynomial, CrcStatus, CrcTally};
pub use framing::{
    CrcDecodeSummary, CrcEncodeSummary, HammingDecodeSummary, HammingEncodeSummary, crc_decode,
    crc_decode_file, crc_decode_with_config, crc_encode, crc_encode_file, crc_encode_with_config,
    hamming_decode, hamming_decode_file, hamming_decode_with_config, hamming_encode,
    hamming_encode_file, hamming_encode_with_config,
};
pub use hamming::{HammingCode, HammingStatus, HammingTally};
pub use infuse::{
    InfuseLayout, InfuseSummary, infuse_block, infuse_errors, infuse_errors_with_config,
    infuse_file,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::crc::{CrcConfig, CrcPolynomial, CrcStatus};
    pub use crate::framing::{
        crc_decode_file, crc_encode_file, hamming_decode_file, hamming_encode_file,
    };
    pub use crate::hamming::{HammingCode, HammingStatus};
    pub use crate::infuse::{InfuseLayout, infuse_file};
}
