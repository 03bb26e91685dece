//! Binary code tree.
//!
//! A [`CodeTree`] is a trie over prefix codes stored as an arena of nodes:
//! the left child follows bit 0, the right child bit 1, and only leaves carry
//! symbols. The same structure builds codes, decodes payload bits one at a
//! time and serializes itself into the compressed-file header.
//!
//! # Header format
//!
//! The shape is written depth first: a `0` for every descent into a present
//! child (left before right) and a `1` for every return to the parent,
//! including the final return from the root. The leaf symbols follow as one
//! byte each, in the order the leaves were visited.
//!
//! ```text
//!        root
//!       /    \         shape:   0 1 0 0 1 0 1 1 1
//!     'a'     *        symbols: 'a' 'b' 'c'
//!            / \
//!          'b' 'c'
//! ```

use crate::symbol::CodeTable;
use bitcodec_core::error::{BitCodecError, Result};
use bitcodec_core::{BitBuffer, BitReader};
use std::io::Read;

/// Index of a node in the arena.
pub(crate) type NodeId = usize;

/// Upper bound on nodes in a tree over 256 symbols.
const MAX_NODES: usize = 2 * 256 - 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) symbol: Option<u8>,
}

impl Node {
    fn leaf(symbol: u8) -> Self {
        Self {
            symbol: Some(symbol),
            ..Self::default()
        }
    }

    fn has_children(&self) -> bool {
        self.left.is_some() || self.right.is_some()
    }
}

/// Prefix-code trie with a decoding cursor.
#[derive(Debug, Clone)]
pub struct CodeTree {
    nodes: Vec<Node>,
    root: NodeId,
    cursor: NodeId,
    bits_fed: u64,
}

impl Default for CodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeTree {
    /// A tree holding only an empty root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            root: 0,
            cursor: 0,
            bits_fed: 0,
        }
    }

    /// Build a tree by inserting every code of `table` bit by bit.
    pub fn from_code_table(table: &CodeTable) -> Result<Self> {
        let mut tree = Self::new();
        for (symbol, code) in table.iter() {
            tree.insert(symbol, code)?;
        }
        Ok(tree)
    }

    /// Wrap an already merged arena (see [`TreeArena`]).
    pub(crate) fn from_arena(arena: TreeArena, root: NodeId) -> Self {
        Self {
            nodes: arena.nodes,
            root,
            cursor: root,
            bits_fed: 0,
        }
    }

    fn alloc(&mut self) -> NodeId {
        self.nodes.push(Node::default());
        self.nodes.len() - 1
    }

    /// Insert `code` for `symbol`.
    ///
    /// Fails with [`BitCodecError::ConflictingCode`] if the path crosses an
    /// existing leaf, or ends on a node that already has children or a
    /// symbol.
    pub fn insert(&mut self, symbol: u8, code: &BitBuffer) -> Result<()> {
        let conflict = || BitCodecError::conflicting_code(symbol, code.to_string());
        if code.is_empty() {
            return Err(conflict());
        }

        let mut id = self.root;
        for bit in code.iter() {
            if self.nodes[id].symbol.is_some() {
                return Err(conflict());
            }
            let existing = if bit {
                self.nodes[id].right
            } else {
                self.nodes[id].left
            };
            id = match existing {
                Some(child) => child,
                None => {
                    let child = self.alloc();
                    if bit {
                        self.nodes[id].right = Some(child);
                    } else {
                        self.nodes[id].left = Some(child);
                    }
                    child
                }
            };
        }

        let node = &mut self.nodes[id];
        if node.symbol.is_some() || node.has_children() {
            return Err(conflict());
        }
        node.symbol = Some(symbol);
        Ok(())
    }

    /// Number of leaves (symbols).
    pub fn leaf_count(&self) -> usize {
        self.reachable().filter(|&id| self.nodes[id].symbol.is_some()).count()
    }

    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        self.reachable().count()
    }

    fn reachable(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let node = &self.nodes[id];
            stack.extend(node.right);
            stack.extend(node.left);
            Some(id)
        })
    }

    // ------------------------------------------------------------------
    // Header serialization
    // ------------------------------------------------------------------

    /// Serialize shape and symbols into a header.
    ///
    /// A node with a right child but no left child cannot be represented,
    /// since the decoder always fills the left slot first; such trees fail
    /// with [`BitCodecError::InvalidValue`]. Both builders only produce
    /// trees where this never happens.
    pub fn serialize(&self) -> Result<BitBuffer> {
        let mut shape = BitBuffer::with_capacity(self.nodes.len() * 2);
        let mut symbols = Vec::new();
        self.serialize_node(self.root, &mut shape, &mut symbols)?;
        for symbol in symbols {
            shape.push_byte(symbol);
        }
        Ok(shape)
    }

    fn serialize_node(
        &self,
        id: NodeId,
        shape: &mut BitBuffer,
        symbols: &mut Vec<u8>,
    ) -> Result<()> {
        let node = &self.nodes[id];
        if node.left.is_none() && node.right.is_some() {
            return Err(BitCodecError::invalid_value(
                "code tree node has a right child but no left child",
            ));
        }
        for child in [node.left, node.right].into_iter().flatten() {
            shape.push_bit(false);
            self.serialize_node(child, shape, symbols)?;
        }
        if let Some(symbol) = node.symbol {
            symbols.push(symbol);
        }
        shape.push_bit(true);
        Ok(())
    }

    /// Rebuild a tree from a header produced by [`serialize`](Self::serialize).
    pub fn deserialize<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        let truncated = |err: BitCodecError| match err {
            BitCodecError::EndOfStream { bits_read } => BitCodecError::invalid_header(format!(
                "code tree header truncated at bit {bits_read}"
            )),
            other => other,
        };

        let mut tree = Self::new();
        let mut stack = vec![tree.root];
        let mut leaves = Vec::new();
        // An empty tree starts with a return, which must not mark the root
        let mut prev_down = false;

        while let Some(&top) = stack.last() {
            let down = !reader.read_bit().map_err(truncated)?;
            if down {
                if tree.nodes.len() >= MAX_NODES {
                    return Err(BitCodecError::invalid_header(
                        "code tree has more nodes than 256 symbols allow",
                    ));
                }
                let has_left = tree.nodes[top].left.is_some();
                let has_right = tree.nodes[top].right.is_some();
                if has_left && has_right {
                    return Err(BitCodecError::invalid_header(
                        "descent below a code tree node that already has two children",
                    ));
                }
                let child = tree.alloc();
                if has_left {
                    tree.nodes[top].right = Some(child);
                } else {
                    tree.nodes[top].left = Some(child);
                }
                stack.push(child);
            } else {
                stack.pop();
                if prev_down {
                    leaves.push(top);
                }
            }
            prev_down = down;
        }

        for id in leaves {
            let symbol = reader.read_byte().map_err(truncated)?;
            tree.nodes[id].symbol = Some(symbol);
        }
        Ok(tree)
    }

    // ------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------

    /// Advance the cursor by one payload bit.
    ///
    /// Returns the symbol when the cursor reaches a leaf, after resetting
    /// the cursor to the root. Fails with [`BitCodecError::InvalidCode`] if
    /// the required child does not exist.
    #[inline]
    pub fn feed_bit(&mut self, bit: bool) -> Result<Option<u8>> {
        let node = &self.nodes[self.cursor];
        let next = if bit { node.right } else { node.left };
        self.bits_fed += 1;

        let Some(next) = next else {
            return Err(BitCodecError::invalid_code(self.bits_fed));
        };
        match self.nodes[next].symbol {
            Some(symbol) => {
                self.cursor = self.root;
                Ok(Some(symbol))
            }
            None => {
                self.cursor = next;
                Ok(None)
            }
        }
    }

    /// Decode a whole bit sequence.
    pub fn decode(&mut self, bits: &BitBuffer) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for bit in bits.iter() {
            if let Some(symbol) = self.feed_bit(bit)? {
                out.push(symbol);
            }
        }
        Ok(out)
    }

    /// Whether the cursor sits at the root (no partial code pending).
    pub fn at_root(&self) -> bool {
        self.cursor == self.root
    }

    /// Move the cursor back to the root.
    pub fn reset(&mut self) {
        self.cursor = self.root;
        self.bits_fed = 0;
    }

    // ------------------------------------------------------------------
    // Code derivation
    // ------------------------------------------------------------------

    /// Read every code off its root-to-leaf path.
    pub fn code_table(&self) -> CodeTable {
        let mut table = CodeTable::new();
        let mut path = BitBuffer::new();
        self.collect_codes(self.root, &mut path, &mut table);
        table
    }

    fn collect_codes(&self, id: NodeId, path: &mut BitBuffer, table: &mut CodeTable) {
        let node = &self.nodes[id];
        if let Some(left) = node.left {
            path.push_bit(false);
            self.collect_codes(left, path, table);
            path.pop();
        }
        if let Some(right) = node.right {
            path.push_bit(true);
            self.collect_codes(right, path, table);
            path.pop();
        }
        if let Some(symbol) = node.symbol {
            // A well-formed tree holds each symbol once; keep the first path
            let _ = table.insert(symbol, path.clone());
        }
    }
}

/// Node storage used while merging subtrees bottom-up.
#[derive(Debug, Default)]
pub(crate) struct TreeArena {
    nodes: Vec<Node>,
}

impl TreeArena {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(n),
        }
    }

    pub(crate) fn leaf(&mut self, symbol: u8) -> NodeId {
        self.nodes.push(Node::leaf(symbol));
        self.nodes.len() - 1
    }

    pub(crate) fn join(&mut self, left: Option<NodeId>, right: Option<NodeId>) -> NodeId {
        self.nodes.push(Node {
            left,
            right,
            symbol: None,
        });
        self.nodes.len() - 1
    }
}
