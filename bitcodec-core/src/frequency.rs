//! Parallel byte-frequency counting.
//!
//! The source is read in chunks of [`StreamConfig::chunk_size`] bytes. Each
//! chunk is split into disjoint ranges that are tallied on the rayon pool
//! and merged into a shared array of 256 atomic counters. Accumulation is
//! commutative, so the histogram does not depend on chunk size or thread
//! count.

use crate::bitstream::read_full;
use crate::config::StreamConfig;
use crate::error::Result;
use crate::progress::{CancelToken, Outcome, ProgressSink, ProgressTracker};
use rayon::prelude::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Smallest range handed to a single rayon task.
const MIN_SPLIT: usize = 4096;

/// Occurrence count of every byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; 256],
}

impl Default for Histogram {
    fn default() -> Self {
        Self { counts: [0; 256] }
    }
}

impl Histogram {
    /// Empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap raw counts indexed by byte value.
    pub fn from_counts(counts: [u64; 256]) -> Self {
        Self { counts }
    }

    /// Count every byte of an in-memory slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hist = Self::new();
        hist.add_bytes(data);
        hist
    }

    /// Add one occurrence of `symbol`.
    pub fn add(&mut self, symbol: u8) {
        self.counts[symbol as usize] += 1;
    }

    /// Add every byte of `data`.
    pub fn add_bytes(&mut self, data: &[u8]) {
        for &b in data {
            self.counts[b as usize] += 1;
        }
    }

    /// Occurrences of `symbol`.
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Raw counts indexed by byte value.
    pub fn counts(&self) -> &[u64; 256] {
        &self.counts
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of byte values with a nonzero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Whether nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Nonzero entries ordered by descending count, ties by ascending symbol.
    pub fn ordered(&self) -> Vec<(u8, u64)> {
        let mut entries: Vec<(u8, u64)> = (0..=255u8)
            .map(|s| (s, self.counts[s as usize]))
            .filter(|&(_, c)| c > 0)
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }
}

/// Tally one chunk into the shared accumulator.
fn tally_chunk(chunk: &[u8], acc: &[AtomicU64; 256]) {
    let split = (chunk.len() / rayon::current_num_threads().max(1)).max(MIN_SPLIT);
    chunk.par_chunks(split).for_each(|part| {
        let mut local = [0u64; 256];
        for &b in part {
            local[b as usize] += 1;
        }
        for (slot, n) in acc.iter().zip(local) {
            if n > 0 {
                slot.fetch_add(n, Ordering::Relaxed);
            }
        }
    });
}

/// Default progress label.
pub const DEFAULT_LABEL: &str = "Counting frequencies...";

/// Byte-frequency counter over files or readers.
#[derive(Debug, Clone)]
pub struct FrequencyCounter<'a> {
    config: &'a StreamConfig,
    label: &'static str,
}

impl<'a> FrequencyCounter<'a> {
    /// Counter reading in chunks of `config.chunk_size` bytes.
    pub fn new(config: &'a StreamConfig) -> Self {
        Self {
            config,
            label: DEFAULT_LABEL,
        }
    }

    /// Set the label shown in progress messages.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Count byte frequencies of a reader holding `byte_len` bytes.
    ///
    /// Cancellation is checked before every chunk. On cancellation the sink
    /// is cleared and [`Outcome::Cancelled`] returned.
    pub fn count_reader<R: Read, P: ProgressSink + ?Sized>(
        &self,
        mut reader: R,
        byte_len: u64,
        cancel: &CancelToken,
        progress: &P,
    ) -> Result<Outcome<Histogram>> {
        self.config.validate()?;
        let acc: [AtomicU64; 256] = std::array::from_fn(|_| AtomicU64::new(0));
        let mut tracker = ProgressTracker::new(progress, self.label, byte_len);
        let mut buf = vec![0u8; self.config.chunk_size];
        let mut done = 0u64;

        loop {
            if cancel.is_cancelled() {
                tracker.clear();
                log::debug!("frequency count cancelled after {done} bytes");
                return Ok(Outcome::Cancelled);
            }
            let n = read_full(&mut reader, &mut buf)?;
            if n == 0 {
                break;
            }
            tally_chunk(&buf[..n], &acc);
            done += n as u64;
            tracker.update(done);
        }

        let counts: [u64; 256] = std::array::from_fn(|i| acc[i].load(Ordering::Relaxed));
        let hist = Histogram::from_counts(counts);
        log::debug!(
            "counted {} bytes, {} distinct symbols in {:.2}s",
            hist.total(),
            hist.distinct(),
            tracker.elapsed_secs()
        );
        Ok(Outcome::Completed(hist))
    }

    /// Count byte frequencies of a file.
    pub fn count_file<P: ProgressSink + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        cancel: &CancelToken,
        progress: &P,
    ) -> Result<Outcome<Histogram>> {
        let file = File::open(path.as_ref())?;
        let byte_len = file.metadata()?.len();
        self.count_reader(file, byte_len, cancel, progress)
    }
}

/// Count byte frequencies of a reader holding `byte_len` bytes.
pub fn count_reader<R: Read, P: ProgressSink + ?Sized>(
    reader: R,
    byte_len: u64,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> Result<Outcome<Histogram>> {
    FrequencyCounter::new(config).count_reader(reader, byte_len, cancel, progress)
}

/// Count byte frequencies of a file.
pub fn count_frequencies<P: ProgressSink + ?Sized>(
    path: impl AsRef<Path>,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> Result<Outcome<Histogram>> {
    FrequencyCounter::new(config).count_file(path, cancel, progress)
}
