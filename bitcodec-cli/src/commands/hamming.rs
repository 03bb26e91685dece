//! Hamming encode and decode command implementations.

use crate::config::CliConfig;
use crate::utils::{CliResult, RunOptions, report, run_with_progress};
use bitcodec_core::OperationKind;
use bitcodec_ecc::{hamming_decode_file, hamming_encode_file};
use std::path::Path;

pub fn cmd_hamming_encode(
    input: &Path,
    output: &Path,
    block_size: Option<usize>,
    config: &CliConfig,
    opts: &RunOptions,
) -> CliResult {
    let (input, output) = (input.to_path_buf(), output.to_path_buf());
    let block_size = block_size.unwrap_or(config.hamming_block_size);
    let stream = config.stream.clone();
    let result = run_with_progress("hamming-encode", opts, move |cancel, progress| {
        hamming_encode_file(&input, &output, block_size, &stream, cancel, progress)
    })?;
    report(OperationKind::HAMMING_ENCODE, &config.stream, result, opts.json)
}

pub fn cmd_hamming_decode(
    input: &Path,
    output: &Path,
    block_size: Option<usize>,
    config: &CliConfig,
    opts: &RunOptions,
) -> CliResult {
    let (input, output) = (input.to_path_buf(), output.to_path_buf());
    let block_size = block_size.unwrap_or(config.hamming_block_size);
    let stream = config.stream.clone();
    let result = run_with_progress("hamming-decode", opts, move |cancel, progress| {
        hamming_decode_file(&input, &output, block_size, &stream, cancel, progress)
    })?;
    report(OperationKind::HAMMING_DECODE, &config.stream, result, opts.json)
}
