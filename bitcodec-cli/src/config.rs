//! JSON configuration file for the CLI.

use bitcodec_core::StreamConfig;
use bitcodec_ecc::crc::{DEFAULT_POLYNOMIAL, DEFAULT_POLYNOMIAL_WIDTH};
use bitcodec_ecc::{CrcConfig, CrcPolynomial};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings read from `--config`. Missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Reader/writer tuning and dump directory.
    pub stream: StreamConfig,
    /// Hamming block size in bits.
    pub hamming_block_size: usize,
    /// CRC data bits per block.
    pub crc_block_size: usize,
    /// CRC generator polynomial.
    pub crc_polynomial: u64,
    /// Bits of `crc_polynomial` that are significant.
    pub crc_polynomial_width: usize,
    /// Repair single-bit errors while CRC-decoding.
    pub crc_correcting: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            hamming_block_size: 64,
            crc_block_size: 1024,
            crc_polynomial: DEFAULT_POLYNOMIAL,
            crc_polynomial_width: DEFAULT_POLYNOMIAL_WIDTH,
            crc_correcting: true,
        }
    }
}

impl CliConfig {
    /// Load the file at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
        config.stream.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// CRC settings with the given command-line overrides applied.
    pub fn crc_config(
        &self,
        polynomial: Option<u64>,
        width: Option<usize>,
        detect_only: bool,
    ) -> bitcodec_core::Result<CrcConfig> {
        let polynomial = CrcPolynomial::from_u64(
            polynomial.unwrap_or(self.crc_polynomial),
            width.unwrap_or(self.crc_polynomial_width),
        )?;
        Ok(CrcConfig::new(polynomial).with_correcting(self.crc_correcting && !detect_only))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = CliConfig::load(None).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.hamming_block_size, 64);
        assert_eq!(config.crc_block_size, 1024);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bitcodec.json");
        fs::write(
            &path,
            r#"{"hamming_block_size": 256, "stream": {"chunk_size": 4096}}"#,
        )
        .unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.hamming_block_size, 256);
        assert_eq!(config.stream.chunk_size, 4096);
        assert_eq!(config.stream.write_threshold, StreamConfig::default().write_threshold);
        assert_eq!(config.crc_polynomial, DEFAULT_POLYNOMIAL);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(CliConfig::load(Some(&path)).is_err());

        fs::write(&path, r#"{"stream": {"chunk_size": 0}}"#).unwrap();
        assert!(CliConfig::load(Some(&path)).is_err());

        assert!(CliConfig::load(Some(&dir.path().join("missing.json"))).is_err());
    }

    #[test]
    fn test_crc_overrides() {
        let config = CliConfig::default();
        let crc = config.crc_config(None, None, false).unwrap();
        assert!(crc.correcting);
        assert_eq!(crc.checksum_width(), 16);

        let crc = config.crc_config(Some(0b1011), Some(4), true).unwrap();
        assert!(!crc.correcting);
        assert_eq!(crc.checksum_width(), 4);

        assert!(config.crc_config(Some(0), Some(8), false).is_err());
    }
}
