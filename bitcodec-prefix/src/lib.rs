//! # bitcodec Prefix
//!
//! Prefix-code (entropy) compression for the bitcodec toolkit.
//!
//! - [`symbol`]: Symbol/code pairs and the 256-entry code table
//! - [`tree`]: Binary code tree with compact serialization and bit-by-bit decoding
//! - [`shannon_fano`]: Top-down Shannon-Fano code construction
//! - [`huffman`]: Bottom-up Huffman code construction
//! - [`codec`]: File compressor/decompressor with a 3-bit final-byte header
//! - [`entropy`]: Shannon entropy of strings, byte slices and files
//!
//! ## Example
//!
//! ```rust
//! use bitcodec_core::{BitReader, Histogram};
//! use bitcodec_prefix::{CodeTree, huffman_tree};
//!
//! let hist = Histogram::from_bytes(b"abracadabra");
//! let tree = huffman_tree(&hist).unwrap();
//! let table = tree.code_table();
//! assert_eq!(table.encoded_bits(&hist).unwrap(), 23);
//!
//! // The serialized tree rebuilds the same codes
//! let header = tree.serialize().unwrap();
//! let mut reader = BitReader::from_slice(header.as_bytes());
//! let rebuilt = CodeTree::deserialize(&mut reader).unwrap();
//! assert_eq!(rebuilt.code_table(), table);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod entropy;
pub mod huffman;
pub mod shannon_fano;
pub mod symbol;
pub mod tree;

// Re-exports for convenience
pub use codec::{
    Algorithm, CompressionSummary, DecompressionSummary, FINAL_BYTE_FIELD_BITS, compress,
    compress_file, compress_with_config, decompress, decompress_file, decompress_with_config,
};
pub use huffman::{huffman_codes, huffman_tree};
pub use shannon_fano::{shannon_fano_codes, shannon_fano_from_ordered};
pub use symbol::{CodeTable, SymbolEncoding};
pub use tree::CodeTree;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::codec::{Algorithm, compress_file, decompress_file};
    pub use crate::huffman::huffman_codes;
    pub use crate::shannon_fano::shannon_fano_codes;
    pub use crate::symbol::{CodeTable, SymbolEncoding};
    pub use crate::tree::CodeTree;
}
