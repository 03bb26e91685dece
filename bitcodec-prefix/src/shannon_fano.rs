//! Shannon-Fano code construction.
//!
//! Symbols are ordered by descending count and the ordered range is split
//! recursively. At each level the split point is the first index whose
//! cumulative count exceeds the midpoint between the cumulative counts at
//! both ends of the range; everything before it gets another `0`, the rest
//! another `1`. Ranges of a single symbol stop the recursion.

use crate::symbol::CodeTable;
use bitcodec_core::error::{BitCodecError, Result};
use bitcodec_core::{BitBuffer, Histogram};

/// Build Shannon-Fano codes for every counted symbol of `hist`.
///
/// Fails with [`BitCodecError::EmptyInput`] when nothing was counted. A
/// single distinct symbol gets the one-bit code `0`.
pub fn shannon_fano_codes(hist: &Histogram) -> Result<CodeTable> {
    let ordered = hist.ordered();
    shannon_fano_from_ordered(&ordered)
}

/// Build Shannon-Fano codes from `(symbol, count)` pairs already ordered by
/// descending count. Zero counts must have been removed.
pub fn shannon_fano_from_ordered(ordered: &[(u8, u64)]) -> Result<CodeTable> {
    if ordered.is_empty() {
        return Err(BitCodecError::EmptyInput);
    }
    if ordered.iter().any(|&(_, count)| count == 0) {
        return Err(BitCodecError::invalid_value(
            "Shannon-Fano input contains a zero count",
        ));
    }

    let mut table = CodeTable::new();
    if ordered.len() == 1 {
        table.insert(ordered[0].0, BitBuffer::from_u64(0, 1)?)?;
        return Ok(table);
    }

    let cumulative: Vec<u64> = ordered
        .iter()
        .scan(0u64, |sum, &(_, count)| {
            *sum += count;
            Some(*sum)
        })
        .collect();
    let mut codes = vec![BitBuffer::new(); ordered.len()];
    split(&cumulative, &mut codes, 0, ordered.len());

    for (&(symbol, _), code) in ordered.iter().zip(codes) {
        table.insert(symbol, code)?;
    }
    log::debug!(
        "Shannon-Fano: {} symbols, longest code {} bits",
        table.len(),
        table.max_code_len()
    );
    Ok(table)
}

/// Assign the next bit to every code in `lo..hi` and recurse.
fn split(cumulative: &[u64], codes: &mut [BitBuffer], lo: usize, hi: usize) {
    if hi - lo <= 1 {
        return;
    }

    let mid_value = (cumulative[hi - 1] + cumulative[lo]) / 2;
    // cumulative[lo] <= mid_value < cumulative[hi - 1] for positive counts,
    // so both halves are non-empty
    let left_end = (lo..hi)
        .find(|&i| cumulative[i] > mid_value)
        .unwrap_or(lo + 1)
        .max(lo + 1);

    for (i, code) in codes.iter_mut().enumerate().take(hi).skip(lo) {
        code.push_bit(i >= left_end);
    }

    split(cumulative, codes, lo, left_end);
    split(cumulative, codes, left_end, hi);
}
