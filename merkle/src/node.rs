use std::fmt;
use std::panic;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{Error, Hasher};

/// Index of a node within the arena of a built [`Root`](crate::Root), eg. to look up the
/// offender reported by [`Error::NoChecksum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in its arena; leaves come first, in block order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A vertex of a hash tree: either a leaf carrying the digest of one block, an internal
/// node deriving its checksum from exactly two children, or an empty placeholder with
/// nothing to derive a checksum from.
///
/// There is no way to build a node with a single child.
#[derive(Debug)]
pub struct Node<H: Hasher>(Shape<H>);

#[derive(Debug)]
enum Shape<H: Hasher> {
    Empty,
    Leaf(H::Hash),
    Internal { left: NodeId, right: NodeId },
}

// not derived: cloning copies digests and ids, it never needs H itself to be Clone
impl<H: Hasher> Clone for Node<H> {
    fn clone(&self) -> Self {
        Self(match &self.0 {
            Shape::Empty => Shape::Empty,
            Shape::Leaf(checksum) => Shape::Leaf(checksum.clone()),
            Shape::Internal { left, right } => Shape::Internal { left: *left, right: *right },
        })
    }
}

impl<H: Hasher> Node<H> {
    /// A leaf holding the precomputed digest of one block.
    pub fn leaf(checksum: impl Into<H::Hash>) -> Self {
        Self(Shape::Leaf(checksum.into()))
    }

    /// A node with no digest and no children; computing its checksum fails.
    pub fn empty() -> Self {
        Self(Shape::Empty)
    }

    pub(crate) fn internal(left: NodeId, right: NodeId) -> Self {
        Self(Shape::Internal { left, right })
    }

    /// The stored digest, present on leaves only.
    pub fn checksum(&self) -> Option<&H::Hash> {
        match &self.0 {
            Shape::Leaf(checksum) => Some(checksum),
            Shape::Empty | Shape::Internal { .. } => None,
        }
    }

    /// Ids of the two children, present on internal nodes only.
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.0 {
            Shape::Internal { left, right } => Some((left, right)),
            Shape::Empty | Shape::Leaf(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.0, Shape::Leaf(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.0, Shape::Empty)
    }
}

/// Aggregates the checksum of the subtree rooted at `id`.
///
/// The two children of an internal node are checksummed on concurrent tasks, but their
/// results are absorbed strictly left before right, keeping the digest deterministic
/// regardless of completion order. A failed subtree is reported as-is; its sibling task
/// is left to finish on its own and its result is discarded.
pub(crate) async fn checksum<H: Hasher>(
    nodes: Arc<[Node<H>]>,
    id: NodeId,
) -> Result<H::Hash, Error> {
    match &nodes[id.index()].0 {
        Shape::Leaf(checksum) => Ok(checksum.clone()),
        Shape::Internal { left, right } => {
            let (left, right) = (*left, *right);
            let left = spawn_checksum(Arc::clone(&nodes), left);
            let right = spawn_checksum(Arc::clone(&nodes), right);

            let mut hasher = H::default();
            let checksum = joined(left).await?;
            hasher.write(checksum.as_ref()).map_err(Error::hash_write)?;
            let checksum = joined(right).await?;
            hasher.write(checksum.as_ref()).map_err(Error::hash_write)?;

            Ok(hasher.finish())
        }
        Shape::Empty => Err(Error::NoChecksum(id)),
    }
}

// spawning type-erases the future, so the recursion does not nest opaque types
fn spawn_checksum<H: Hasher>(
    nodes: Arc<[Node<H>]>,
    id: NodeId,
) -> JoinHandle<Result<H::Hash, Error>> {
    tokio::spawn(checksum(nodes, id))
}

/// Waits on a subtree task, forwarding its panic instead of wrapping it.
async fn joined<T>(handle: JoinHandle<Result<T, Error>>) -> Result<T, Error> {
    match handle.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
        // never aborted: the handles are held until joined or dropped detached
        Err(_) => unreachable!("checksum task cancelled"),
    }
}
