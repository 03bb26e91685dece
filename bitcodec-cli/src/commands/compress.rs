//! Compress and decompress command implementations.

use crate::config::CliConfig;
use crate::utils::{CliResult, RunOptions, report, run_with_progress};
use bitcodec_core::OperationKind;
use bitcodec_prefix::{Algorithm, compress_file, decompress_file};
use clap::ValueEnum;
use std::path::Path;

/// Prefix-code construction algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    /// Optimal bottom-up merging (default)
    Huffman,
    /// Recursive weight bisection
    ShannonFano,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Huffman => Algorithm::Huffman,
            AlgorithmArg::ShannonFano => Algorithm::ShannonFano,
        }
    }
}

pub fn cmd_compress(
    input: &Path,
    output: &Path,
    algorithm: AlgorithmArg,
    config: &CliConfig,
    opts: &RunOptions,
) -> CliResult {
    let (input, output) = (input.to_path_buf(), output.to_path_buf());
    let stream = config.stream.clone();
    let algorithm = Algorithm::from(algorithm);
    let result = run_with_progress("compress", opts, move |cancel, progress| {
        compress_file(&input, &output, algorithm, &stream, cancel, progress)
    })?;
    report(OperationKind::COMPRESS, &config.stream, result, opts.json)
}

pub fn cmd_decompress(
    input: &Path,
    output: &Path,
    config: &CliConfig,
    opts: &RunOptions,
) -> CliResult {
    let (input, output) = (input.to_path_buf(), output.to_path_buf());
    let stream = config.stream.clone();
    let result = run_with_progress("decompress", opts, move |cancel, progress| {
        decompress_file(&input, &output, &stream, cancel, progress)
    })?;
    report(OperationKind::DECOMPRESS, &config.stream, result, opts.json)
}
