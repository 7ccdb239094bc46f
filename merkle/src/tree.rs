use std::sync::Arc;

use crate::node::{self, Node, NodeId};
use crate::{Error, Hasher};

/// An ordered row of leaves plus the uniform length of the blocks they digest.
///
/// The leaf row is the caller-visible state: building a root never reorders, drops or
/// mutates it. [`Tree::root`] stacks parent levels above a private copy of the row, so
/// it can be called repeatedly and concurrently with readers holding earlier snapshots.
#[derive(Debug)]
pub struct Tree<H: Hasher> {
    nodes: Vec<Node<H>>,
    block_length: usize,
}

impl<H: Hasher> Clone for Tree<H> {
    fn clone(&self) -> Self {
        Self { nodes: self.nodes.clone(), block_length: self.block_length }
    }
}

impl<H: Hasher> Tree<H> {
    /// An empty tree over blocks of `block_length` bytes.
    pub fn new(block_length: usize) -> Self {
        Self { nodes: Vec::new(), block_length }
    }

    /// Rebuilds a leaf row from a flat piece table, splitting the digest concatenation
    /// at [`output_size`](Hasher::output_size) boundaries; each slice goes back through
    /// [`hash_from`](Hasher::hash_from).
    pub fn from_pieces(table: &PieceTable) -> Result<Self, Error> {
        let output_size = H::output_size();
        let uneven = || Error::UnevenPieces { len: table.pieces.len(), output_size };
        if output_size == 0 || table.pieces.len() % output_size != 0 {
            return Err(uneven());
        }

        let mut nodes = Vec::with_capacity(table.pieces.len() / output_size);
        for piece in table.pieces.chunks_exact(output_size) {
            let checksum = H::hash_from(piece).ok_or_else(uneven)?;
            nodes.push(Node::leaf(checksum));
        }

        Ok(Self { nodes, block_length: table.piece_length })
    }

    /// Appends a node to the leaf row.
    pub fn push(&mut self, node: Node<H>) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub(crate) fn pop(&mut self) -> Option<Node<H>> {
        self.nodes.pop()
    }

    /// The leaf row, in block order.
    pub fn nodes(&self) -> &[Node<H>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drops every leaf, keeping the block length.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Uniform byte length of the blocks behind the leaves, kept as metadata.
    pub fn block_length(&self) -> usize {
        self.block_length
    }

    /// Returns the concatenation of the digests of all blocks, in block order.
    ///
    /// Nodes without a digest, or with an empty one, are skipped.
    pub fn pieces(&self) -> Vec<u8> {
        let mut pieces = Vec::new();
        for checksum in self.nodes.iter().filter_map(Node::checksum) {
            let piece = checksum.as_ref();
            if !piece.is_empty() {
                pieces.extend_from_slice(piece);
            }
        }
        pieces
    }

    /// The serializable piece metadata over the current leaves.
    pub fn piece_table(&self) -> PieceTable {
        PieceTable { pieces: self.pieces(), piece_length: self.block_length }
    }

    /// Generates the parent levels above the current leaves and returns the root of the
    /// tree, or `None` if there is no leaf to build from.
    ///
    /// The pairing is re-run on every call over a private copy of the leaf row; the tree
    /// itself is left untouched.
    pub fn root(&self) -> Option<Root<H>> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut nodes = self.nodes.clone();
        let mut level: Vec<NodeId> = (0..nodes.len()).map(NodeId::new).collect();
        while level.len() > 1 {
            level = level_up(&mut nodes, &level);
        }

        Some(Root { nodes: nodes.into(), id: level[0] })
    }
}

impl<H: Hasher> Extend<Node<H>> for Tree<H> {
    fn extend<I: IntoIterator<Item = Node<H>>>(&mut self, nodes: I) {
        self.nodes.extend(nodes);
    }
}

/// Combines adjacent nodes of `level` under new parents appended to `nodes`.
///
/// A last node without a partner is pushed up as-is, to pair in the next level up.
fn level_up<H: Hasher>(nodes: &mut Vec<Node<H>>, level: &[NodeId]) -> Vec<NodeId> {
    let mut next = Vec::with_capacity(level.len().div_ceil(2));

    let mut pairs = level.chunks_exact(2);
    for pair in pairs.by_ref() {
        next.push(NodeId::new(nodes.len()));
        nodes.push(Node::internal(pair[0], pair[1]));
    }
    next.extend_from_slice(pairs.remainder());

    next
}

/// A pairing of every leaf present in a [`Tree`] when the root was built, down to a
/// single node.
///
/// A root owns its arena of nodes: the leaves come first in block order, then the parent
/// levels bottom-up. Later changes to the originating tree do not show through.
#[derive(Debug)]
pub struct Root<H: Hasher> {
    nodes: Arc<[Node<H>]>,
    id: NodeId,
}

impl<H: Hasher> Clone for Root<H> {
    fn clone(&self) -> Self {
        Self { nodes: Arc::clone(&self.nodes), id: self.id }
    }
}

impl<H: Hasher> Root<H> {
    /// Id of the root node itself.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Looks up a node of the pairing, eg. the offender reported by
    /// [`Error::NoChecksum`].
    pub fn node(&self, id: NodeId) -> Option<&Node<H>> {
        self.nodes.get(id.index())
    }

    /// Aggregates the checksum of the whole tree.
    ///
    /// Subtrees are checksummed on concurrent tasks; the digest is deterministic for a
    /// given pairing nonetheless, as every node absorbs its children left before right.
    pub async fn checksum(&self) -> Result<H::Hash, Error> {
        node::checksum(Arc::clone(&self.nodes), self.id).await
    }
}

/// The two-field piece metadata of a tree, as embedded in content-description documents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PieceTable {
    /// Flat concatenation of the leaf digests, in block order.
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    pub pieces: Vec<u8>,
    /// Uniform byte length of the blocks the digests cover.
    #[cfg_attr(feature = "serde", serde(rename = "piece length"))]
    pub piece_length: usize,
}
