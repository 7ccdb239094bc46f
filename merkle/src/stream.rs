use std::io;
use std::mem;
use std::num::NonZeroUsize;

use tracing::{debug, trace};

use crate::{Error, Hasher, Node, Tree};

/// An incremental, resettable checksum over a byte stream, backed by a hash tree.
///
/// Incoming bytes are chunked into blocks of a fixed length. Every completed block is
/// digested into a confirmed leaf right away, while the trailing incomplete block waits
/// in a buffer. [`sum`](Self::sum) answers with the root checksum over everything
/// received so far without ending the stream: the buffered bytes are digested into a
/// speculative leaf that the next operation takes back out, so later writes keep filling
/// the same block instead of fragmenting it at the snapshot boundary.
///
/// Instances are single-writer; the stream is mutated from one place at a time.
#[derive(Debug)]
pub struct StreamHasher<H: Hasher> {
    block_length: NonZeroUsize,
    tree: Tree<H>,
    partial: PartialBlock,
}

/// State of the trailing, not yet complete block.
#[derive(Debug)]
enum PartialBlock {
    /// The stream sits on a block boundary.
    Empty,
    /// Bytes waiting for the rest of their block.
    Buffering(Vec<u8>),
    /// Same bytes, additionally digested into the last leaf of the tree to answer a
    /// snapshot. Reverted before any further byte is accepted.
    Speculative(Vec<u8>),
}

impl PartialBlock {
    fn take(&mut self) -> Vec<u8> {
        match mem::replace(self, Self::Empty) {
            Self::Empty => Vec::new(),
            Self::Buffering(bytes) => bytes,
            // the speculative leaf is reverted before the buffer is touched
            Self::Speculative(_) => unreachable!("partial block taken while speculative"),
        }
    }
}

impl<H: Hasher> StreamHasher<H> {
    /// A hasher chunking its input into blocks of `block_length` bytes.
    pub fn new(block_length: NonZeroUsize) -> Self {
        Self {
            block_length,
            tree: Tree::new(block_length.get()),
            partial: PartialBlock::Empty,
        }
    }

    /// Absorbs `bytes` into the stream and returns how many were consumed, which is all
    /// of them.
    ///
    /// Completed blocks become confirmed leaves immediately; the remainder stays
    /// buffered for the next write. A hash failure is fatal to the stream: blocks
    /// completed before the failure have already produced leaves.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, Error> {
        self.revert_speculative();

        let length = self.block_length.get();
        let mut buffered = self.partial.take();
        let mut input = bytes;

        // top up the partial block left over from earlier writes
        if !buffered.is_empty() {
            let missing = (length - buffered.len()).min(input.len());
            buffered.extend_from_slice(&input[..missing]);
            input = &input[missing..];

            if buffered.len() == length {
                self.push_block(&buffered)?;
                buffered.clear();
            }
        }

        // whole blocks are digested straight from the input
        let mut blocks = input.chunks_exact(length);
        for block in blocks.by_ref() {
            self.push_block(block)?;
        }
        buffered.extend_from_slice(blocks.remainder());

        self.partial = match buffered.is_empty() {
            true => PartialBlock::Empty,
            false => PartialBlock::Buffering(buffered),
        };

        Ok(bytes.len())
    }

    /// Answers with the root checksum over every byte received so far, absorbing `extra`
    /// first, without ending the stream.
    ///
    /// Repeated snapshots without intervening writes return the same checksum and leave
    /// the leaf count alone. A stream that has seen no byte at all has no checksum.
    pub async fn sum(&mut self, extra: &[u8]) -> Result<H::Hash, Error> {
        self.revert_speculative();

        let length = self.block_length.get();
        let mut buffered = self.partial.take();
        buffered.extend_from_slice(extra);

        // flush the blocks completed by the extra bytes...
        let mut flushed = 0;
        while buffered.len() - flushed >= length {
            self.push_block(&buffered[flushed..flushed + length])?;
            flushed += length;
        }
        buffered.drain(..flushed);

        // ...and digest the open one speculatively, so the snapshot covers it
        if !buffered.is_empty() {
            let checksum = H::checksum(&buffered).map_err(Error::hash_write)?;
            self.tree.push(Node::leaf(checksum));
            self.partial = PartialBlock::Speculative(buffered);
        }

        debug!(
            leaves = self.tree.len(),
            speculative = matches!(self.partial, PartialBlock::Speculative(_)),
            "summing the stream"
        );

        let root = self.tree.root().ok_or(Error::EmptyTree)?;
        root.checksum().await
    }

    /// Forgets everything received so far, keeping the block length and hash function.
    pub fn reset(&mut self) {
        debug!(leaves = self.tree.len(), "resetting the stream");
        self.tree.clear();
        self.partial = PartialBlock::Empty;
    }

    /// The tree of leaves digested so far.
    ///
    /// Right after a snapshot the last leaf covers the partial block; the next write
    /// takes it back out.
    pub fn tree(&self) -> &Tree<H> {
        &self.tree
    }

    /// Byte length of the blocks the stream is chunked into.
    pub fn block_length(&self) -> usize {
        self.block_length.get()
    }

    /// Internal block size of the underlying hash function, in bytes; not the chunking
    /// length, see [`block_length`](Self::block_length).
    pub fn block_size(&self) -> usize {
        H::block_size()
    }

    /// Byte size of the checksums produced by the underlying hash function.
    pub fn output_size(&self) -> usize {
        H::output_size()
    }

    fn revert_speculative(&mut self) {
        self.partial = match mem::replace(&mut self.partial, PartialBlock::Empty) {
            PartialBlock::Speculative(bytes) => {
                let popped = self.tree.pop();
                debug_assert!(popped.is_some_and(|node| node.is_leaf()));
                trace!(len = bytes.len(), "reverted the speculative leaf");
                PartialBlock::Buffering(bytes)
            }
            partial => partial,
        };
    }

    fn push_block(&mut self, block: &[u8]) -> Result<(), Error> {
        let checksum = H::checksum(block).map_err(Error::hash_write)?;
        self.tree.push(Node::leaf(checksum));
        Ok(())
    }
}

/// Byte sink adapter, eg. for [`io::copy`].
impl<H: Hasher> io::Write for StreamHasher<H> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        StreamHasher::write(self, bytes).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}


#[cfg(all(test, feature = "sha1"))]
mod sha1_tests {
    use assert_matches::assert_matches;
    use hex_literal::hex;

    use super::*;
    use crate::DefaultHasher;

    const MESSAGE: &[u8] = b"the quick brown fox jumps over the lazy dog";
    const MESSAGE_SUM: [u8; 20] = hex!("48940c1c72636648ad40aa59c162f2208e835b38");

    fn fox_hasher() -> StreamHasher<DefaultHasher> {
        StreamHasher::new(NonZeroUsize::new(10).unwrap())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sums_without_ending_the_stream() {
        let mut hasher = fox_hasher();

        assert_eq!(hasher.write(MESSAGE).unwrap(), MESSAGE.len());
        // we are left with a partial last block
        assert_eq!(hasher.tree().len(), 4);

        assert_eq!(hasher.sum(&[]).await.unwrap()[..], MESSAGE_SUM);
        // count the leaves again, the partial block is covered now
        assert_eq!(hasher.tree().len(), 5);

        // sum again, ensure the same checksum
        assert_eq!(hasher.sum(&[]).await.unwrap()[..], MESSAGE_SUM);
        assert_eq!(hasher.tree().len(), 5);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rewrites_after_reset_and_beyond() {
        let mut hasher = fox_hasher();
        hasher.write(MESSAGE).unwrap();
        hasher.sum(&[]).await.unwrap();

        // a reset nulls the stream out
        hasher.reset();
        assert_matches!(hasher.sum(&[]).await, Err(Error::EmptyTree));

        // writing the message again digests to the same checksum
        hasher.write(MESSAGE).unwrap();
        assert_eq!(hasher.sum(&[]).await.unwrap()[..], MESSAGE_SUM);
        assert_eq!(hasher.tree().len(), 5);

        // more bytes take the speculative leaf back out and refill its block
        hasher.write(MESSAGE).unwrap();
        assert_eq!(hasher.tree().len(), 8);
        assert_ne!(hasher.sum(&[]).await.unwrap()[..], MESSAGE_SUM);
        assert_eq!(hasher.tree().len(), 9);
    }

    #[tokio::test]
    async fn copies_from_a_reader() {
        let mut hasher = fox_hasher();
        let copied = io::copy(&mut &MESSAGE[..], &mut hasher).unwrap();

        assert_eq!(copied, MESSAGE.len() as u64);
        assert_eq!(hasher.sum(&[]).await.unwrap()[..], MESSAGE_SUM);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn large_blocks_keep_their_leaf_checksums() {
        const BLOCK: usize = 512 * 1024;
        let expected = [
            hex!("6a521e1d2a632c26e53b83d2cc4b0edecfc1e68c"), // 0's
            hex!("316c136d75ffdeb6ac5f1262c45dd8c6ec50fd85"), // 1's
            hex!("a56e9c245b9c50d61a91c6c4299813b5e6313722"), // 2's
            hex!("58bed752c036310cc48d9dd0d25c4ee9ad0d7ff1"), // 3's
            hex!("bf382d8394213b897424803c27f3e2ec2223e5fd"), // 4's
        ];

        let mut hasher = StreamHasher::<DefaultHasher>::new(NonZeroUsize::new(BLOCK).unwrap());
        for value in 0..expected.len() as u8 {
            hasher.write(&vec![value; BLOCK]).unwrap();
        }
        hasher.sum(&[]).await.unwrap();

        assert_eq!(hasher.tree().len(), expected.len());
        for (node, checksum) in hasher.tree().nodes().iter().zip(expected) {
            assert_eq!(node.checksum().unwrap()[..], checksum);
        }
    }

    #[test]
    fn hash_function_metadata() {
        let hasher = fox_hasher();
        assert_eq!(hasher.block_length(), 10);
        assert_eq!(hasher.block_size(), 64); // SHA-1 internal block, not the chunking length
        assert_eq!(hasher.output_size(), 20);
    }
}
