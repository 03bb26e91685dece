//! Shannon entropy estimation.
//!
//! `H = -Σ p log2 p` over the observed symbol probabilities, in bits per
//! symbol. Zero counts contribute nothing.

use bitcodec_core::error::{BitCodecError, Result};
use bitcodec_core::frequency::FrequencyCounter;
use bitcodec_core::{CancelToken, Histogram, Outcome, ProgressSink, StreamConfig};
use std::collections::HashMap;
use std::path::Path;

/// Entropy of a distribution given by raw counts. `0.0` when all are zero.
pub fn from_counts(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let h: f64 = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum();
    // A single symbol sums to -0.0
    h.max(0.0)
}

/// Entropy of a byte histogram.
pub fn from_histogram(hist: &Histogram) -> f64 {
    from_counts(hist.counts())
}

/// Entropy of the bytes of `data`.
pub fn from_bytes(data: &[u8]) -> f64 {
    from_histogram(&Histogram::from_bytes(data))
}

/// Entropy of the characters of `text`.
///
/// ```
/// use bitcodec_prefix::entropy;
///
/// assert_eq!(entropy::from_str("aaaa"), 0.0);
/// assert_eq!(entropy::from_str("ab"), 1.0);
/// ```
pub fn from_str(text: &str) -> f64 {
    let mut counts: HashMap<char, u64> = HashMap::new();
    for c in text.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }
    let counts: Vec<u64> = counts.into_values().collect();
    from_counts(&counts)
}

/// Entropy of a file's bytes, in bits per byte.
///
/// Fails with [`BitCodecError::EmptyInput`] for a zero-byte file.
pub fn from_file<P: ProgressSink + ?Sized>(
    path: &Path,
    config: &StreamConfig,
    cancel: &CancelToken,
    progress: &P,
) -> Result<Outcome<f64>> {
    let outcome = FrequencyCounter::new(config)
        .with_label("Calculating entropy...")
        .count_file(path, cancel, progress)?;
    let Outcome::Completed(hist) = outcome else {
        return Ok(Outcome::Cancelled);
    };
    progress.clear();
    if hist.is_empty() {
        return Err(BitCodecError::EmptyInput);
    }
    let h = from_histogram(&hist);
    log::info!("entropy of {}: {:.6} bits/byte", path.display(), h);
    Ok(Outcome::Completed(h))
}

/// Entropy of a file, `None` when cancelled or when the file cannot be
/// counted (the reason is logged).
pub fn entropy<P: ProgressSink + ?Sized>(
    path: &Path,
    cancel: &CancelToken,
    progress: &P,
) -> Option<f64> {
    match from_file(path, &StreamConfig::default(), cancel, progress) {
        Ok(outcome) => outcome.completed(),
        Err(err) => {
            log::error!("entropy of {} failed: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcodec_core::NullProgress;

    #[test]
    fn test_known_values() {
        assert_eq!(from_str("aaaa"), 0.0);
        assert_eq!(from_str("ab"), 1.0);
        assert_eq!(from_str("abcd"), 2.0);
        assert_eq!(from_str(""), 0.0);
        assert!((from_str("aab") - 0.918_295_834_054_489_6).abs() < 1e-12);
    }

    #[test]
    fn test_zero_counts_ignored() {
        assert_eq!(from_counts(&[0, 5, 0, 5, 0]), 1.0);
        assert_eq!(from_counts(&[0, 0]), 0.0);
    }

    #[test]
    fn test_uniform_bytes() {
        let data: Vec<u8> = (0..=255u8).collect();
        assert!((from_bytes(&data) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ab.txt");
        std::fs::write(&path, b"abab").unwrap();
        let h = entropy(&path, &CancelToken::new(), &NullProgress);
        assert_eq!(h, Some(1.0));

        let empty = dir.path().join("empty");
        std::fs::write(&empty, b"").unwrap();
        let err = from_file(&empty, &StreamConfig::default(), &CancelToken::new(), &NullProgress)
            .unwrap_err();
        assert!(err.is_empty_input());
        assert_eq!(entropy(&empty, &CancelToken::new(), &NullProgress), None);
    }

    #[test]
    fn test_cancelled_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        std::fs::write(&path, vec![1u8; 1000]).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(entropy(&path, &cancel, &NullProgress), None);
    }
}
