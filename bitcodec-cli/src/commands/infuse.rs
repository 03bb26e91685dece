//! Error infusion command implementation.

use crate::config::CliConfig;
use crate::utils::{CliResult, RunOptions, report, run_with_progress};
use bitcodec_core::OperationKind;
use bitcodec_ecc::{InfuseLayout, infuse_file};
use clap::ValueEnum;
use std::path::Path;

/// Block structure of the file to corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// Hamming-encoded file; the header block is left intact
    Hamming,
    /// CRC-encoded file; each block carries its checksum
    Crc,
}

impl LayoutArg {
    /// Resolve the layout, taking the block size from the config when unset.
    pub fn resolve(
        self,
        block_size: Option<usize>,
        config: &CliConfig,
    ) -> bitcodec_core::Result<InfuseLayout> {
        Ok(match self {
            LayoutArg::Hamming => {
                InfuseLayout::hamming(block_size.unwrap_or(config.hamming_block_size))
            }
            LayoutArg::Crc => {
                let crc = config.crc_config(None, None, false)?;
                InfuseLayout::crc(
                    block_size.unwrap_or(config.crc_block_size),
                    crc.checksum_width(),
                )
            }
        })
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_infuse(
    input: &Path,
    output: &Path,
    layout: LayoutArg,
    block_size: Option<usize>,
    errors: usize,
    seed: Option<u64>,
    config: &CliConfig,
    opts: &RunOptions,
) -> CliResult {
    let (input, output) = (input.to_path_buf(), output.to_path_buf());
    let layout = layout.resolve(block_size, config)?;
    let stream = config.stream.clone();
    let result = run_with_progress("infuse", opts, move |cancel, progress| {
        infuse_file(&input, &output, layout, errors, seed, &stream, cancel, progress)
    })?;
    report(OperationKind::INFUSE, &config.stream, result, opts.json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_layout() {
        let config = CliConfig::default();
        assert_eq!(
            LayoutArg::Hamming.resolve(None, &config).unwrap(),
            InfuseLayout::hamming(64)
        );
        assert_eq!(
            LayoutArg::Crc.resolve(Some(512), &config).unwrap(),
            InfuseLayout::crc(512, 16)
        );
    }
}
