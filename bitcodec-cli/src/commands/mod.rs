//! Command implementations for the bitcodec CLI.

pub mod compress;
pub mod crc;
pub mod entropy;
pub mod hamming;
pub mod infuse;

pub use compress::{AlgorithmArg, cmd_compress, cmd_decompress};
pub use crc::{CrcArgs, cmd_crc_decode, cmd_crc_encode};
pub use entropy::cmd_entropy;
pub use hamming::{cmd_hamming_decode, cmd_hamming_encode};
pub use infuse::{LayoutArg, cmd_infuse};
