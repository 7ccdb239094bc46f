//! A simple crate providing hash tree features (aka. Merkle tree) over the fixed-size
//! blocks of a byte stream, eg. the piece table of a shared file.
//!
//! Bytes fed to a [`StreamHasher`] are chunked into blocks of a uniform length, every
//! completed block is digested into a leaf of a [`Tree`], and a root checksum over
//! everything received so far can be requested at any point without ending the stream.
//! Computing a root checksums the two subtrees of every internal node on concurrent
//! tasks, while their results are absorbed strictly left before right so the digest
//! stays deterministic.
//!
//! # Pros of the current implementation
//! - No need for smart pointers to link parents and children together, eg. using `Rc` / `Weak` pointers:
//!   nodes live in an index-addressed arena, and a node with a single child cannot even be represented.
//! - Computing a root never alters the leaf row: parent levels are stacked above a private copy, so a
//!   snapshot stays valid while the stream keeps growing.
//! - Any `digest`-style hash function plugs in through the `digest_compat` feature.
//!
//! # Known limitations of the current implementation
//! - A [`StreamHasher`] is single-writer, not suitable for straight concurrent access to one instance.
//! - Parent levels are rebuilt from the leaves on every root computation rather than cached across calls.
//! - The default SHA-1 binding is a legacy digest kept for piece-table interoperability; substitute
//!   another hash function where collision resistance matters.

mod block;
mod error;
mod hasher;
mod node;
mod stream;
mod tree;

pub use block::{determine_block_size, BlockSizeError, MAX_BLOCK_SIZE};
pub use error::Error;
#[cfg(feature = "sha1")]
pub use hasher::DefaultHasher;
pub use hasher::Hasher;
pub use node::{Node, NodeId};
pub use stream::StreamHasher;
pub use tree::{PieceTable, Root, Tree};

#[cfg(feature = "digest_compat")]
pub mod compat;

#[cfg(test)]
mod testutil;
