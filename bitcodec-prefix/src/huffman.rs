//! Huffman code construction.
//!
//! Every counted symbol becomes a leaf in a min-heap keyed by weight. The two
//! lightest entries are popped, joined under a new node (first popped on the
//! left) and pushed back with the summed weight until one entry remains. That
//! entry is the root of the finished [`CodeTree`]; codes are read off its
//! root-to-leaf paths.
//!
//! Equal weights pop in insertion order, and leaves are inserted in the
//! histogram's ordered form, so the tree is deterministic.

use crate::symbol::CodeTable;
use crate::tree::{CodeTree, NodeId, TreeArena};
use bitcodec_core::Histogram;
use bitcodec_core::error::{BitCodecError, Result};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Build the Huffman merge tree for `hist`.
///
/// Fails with [`BitCodecError::EmptyInput`] when nothing was counted. A
/// single distinct symbol is placed as the left child of a fresh root, so it
/// gets the one-bit code `0`.
pub fn huffman_tree(hist: &Histogram) -> Result<CodeTree> {
    let ordered = hist.ordered();
    if ordered.is_empty() {
        return Err(BitCodecError::EmptyInput);
    }

    let mut arena = TreeArena::with_capacity(2 * ordered.len());
    // (weight, insertion sequence, node)
    let mut heap: BinaryHeap<Reverse<(u64, usize, NodeId)>> = BinaryHeap::new();
    let mut seq = 0usize;
    for &(symbol, count) in &ordered {
        let leaf = arena.leaf(symbol);
        heap.push(Reverse((count, seq, leaf)));
        seq += 1;
    }

    loop {
        let Some(Reverse((left_weight, _, left))) = heap.pop() else {
            return Err(BitCodecError::EmptyInput);
        };
        let Some(Reverse((right_weight, _, right))) = heap.pop() else {
            // Only one entry left: it is the root
            let root = if ordered.len() == 1 {
                arena.join(Some(left), None)
            } else {
                left
            };
            log::debug!("Huffman: {} symbols merged", ordered.len());
            return Ok(CodeTree::from_arena(arena, root));
        };
        let parent = arena.join(Some(left), Some(right));
        heap.push(Reverse((left_weight + right_weight, seq, parent)));
        seq += 1;
    }
}

/// Huffman codes for every counted symbol of `hist`.
pub fn huffman_codes(hist: &Histogram) -> Result<CodeTable> {
    Ok(huffman_tree(hist)?.code_table())
}
