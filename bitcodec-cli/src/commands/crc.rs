//! CRC encode and decode command implementations.

use crate::config::CliConfig;
use crate::utils::{CliResult, RunOptions, report, run_with_progress};
use bitcodec_core::OperationKind;
use bitcodec_ecc::{crc_decode_file, crc_encode_file};
use std::path::Path;

/// Command-line overrides for the CRC settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrcArgs {
    /// Data bits per block.
    pub block_size: Option<usize>,
    /// Generator polynomial.
    pub polynomial: Option<u64>,
    /// Significant bits of the polynomial.
    pub width: Option<usize>,
    /// Skip single-bit repair on decode.
    pub detect_only: bool,
}

/// Parse a polynomial given in hex ("0xD175", "d175") or binary ("0b1011").
pub fn parse_polynomial(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = if let Some(bin) = s.strip_prefix("0b") {
        u64::from_str_radix(bin, 2)
    } else {
        u64::from_str_radix(s.strip_prefix("0x").unwrap_or(s), 16)
    };
    parsed.map_err(|e| format!("invalid polynomial '{}': {}", s, e))
}

pub fn cmd_crc_encode(
    input: &Path,
    output: &Path,
    args: CrcArgs,
    config: &CliConfig,
    opts: &RunOptions,
) -> CliResult {
    let (input, output) = (input.to_path_buf(), output.to_path_buf());
    let block_size = args.block_size.unwrap_or(config.crc_block_size);
    let crc = config.crc_config(args.polynomial, args.width, args.detect_only)?;
    let stream = config.stream.clone();
    let result = run_with_progress("crc-encode", opts, move |cancel, progress| {
        crc_encode_file(&input, &output, block_size, &crc, &stream, cancel, progress)
    })?;
    report(OperationKind::CRC_ENCODE, &config.stream, result, opts.json)
}

pub fn cmd_crc_decode(
    input: &Path,
    output: &Path,
    args: CrcArgs,
    config: &CliConfig,
    opts: &RunOptions,
) -> CliResult {
    let (input, output) = (input.to_path_buf(), output.to_path_buf());
    let block_size = args.block_size.unwrap_or(config.crc_block_size);
    let crc = config.crc_config(args.polynomial, args.width, args.detect_only)?;
    let stream = config.stream.clone();
    let result = run_with_progress("crc-decode", opts, move |cancel, progress| {
        crc_decode_file(&input, &output, block_size, &crc, &stream, cancel, progress)
    })?;
    report(OperationKind::CRC_DECODE, &config.stream, result, opts.json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polynomial() {
        assert_eq!(parse_polynomial("0xD175"), Ok(0xD175));
        assert_eq!(parse_polynomial("d175"), Ok(0xD175));
        assert_eq!(parse_polynomial("0b1011"), Ok(0b1011));
        assert!(parse_polynomial("0xZZ").is_err());
    }
}
