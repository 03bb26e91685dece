//! Stream configuration shared by every file codec.

use crate::error::{BitCodecError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default read chunk size (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

/// Default number of whole buffered bytes before the writer flushes.
pub const DEFAULT_WRITE_THRESHOLD: usize = 4096;

/// I/O tuning for bit readers, bit writers and the frequency counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Bytes fetched from the source per read.
    pub chunk_size: usize,
    /// Whole bytes the writer may buffer before flushing.
    pub write_threshold: usize,
    /// Directory receiving diagnostic dump files.
    pub dump_dir: PathBuf,
}

impl StreamConfig {
    /// Small buffers, handy for exercising chunk boundaries in tests.
    pub fn tiny() -> Self {
        Self {
            chunk_size: 16,
            write_threshold: 4,
            dump_dir: PathBuf::from("."),
        }
    }

    /// Set the read chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the writer flush threshold.
    pub fn with_write_threshold(mut self, write_threshold: usize) -> Self {
        self.write_threshold = write_threshold;
        self
    }

    /// Set the diagnostic dump directory.
    pub fn with_dump_dir(mut self, dump_dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = dump_dir.into();
        self
    }

    /// Reject settings no stream can work with.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(BitCodecError::invalid_parameter(
                "chunk_size must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            write_threshold: DEFAULT_WRITE_THRESHOLD,
            dump_dir: PathBuf::from("."),
        }
    }
}
