use std::error;

use crate::NodeId;

/// An enum to deal with checksum computation errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The node carries no block digest and has no children to derive a checksum from.
    #[error("no block digest or children available to derive a checksum from node {0}")]
    NoChecksum(NodeId),

    /// The hash function failed to absorb bytes, either digesting a block or combining
    /// two child checksums.
    #[error("hash function failed to absorb bytes")]
    HashWrite(#[source] Box<dyn error::Error + Send + Sync>),

    /// A root checksum was requested over a tree without any leaf.
    #[error("cannot derive a root checksum from an empty tree")]
    EmptyTree,

    /// A flat piece table does not split evenly into whole digests.
    #[error("piece table of {len} bytes does not split into {output_size}-byte digests")]
    UnevenPieces {
        /// Byte length of the rejected piece table.
        len: usize,
        /// Digest size the table was split by.
        output_size: usize,
    },
}

impl Error {
    pub(crate) fn hash_write(err: impl error::Error + Send + Sync + 'static) -> Self {
        Self::HashWrite(Box::new(err))
    }
}
