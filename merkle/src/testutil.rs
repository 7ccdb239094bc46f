//! Deterministic stand-in hash functions for tests.

use std::convert::Infallible;

use crate::Hasher;

/// Concatenates everything it absorbs; the digest is the input itself.
#[derive(Debug, Default)]
pub(crate) struct ConcatHasher(Vec<u8>);

impl Hasher for ConcatHasher {
    type Hash = String;
    type Error = Infallible;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.0.extend_from_slice(bytes);
        Ok(())
    }

    fn finish(self) -> Self::Hash {
        String::from_utf8(self.0).unwrap()
    }

    fn block_size() -> usize {
        1
    }

    fn output_size() -> usize {
        0 // digests are as long as their input
    }

    fn hash_from(bytes: &[u8]) -> Option<Self::Hash> {
        String::from_utf8(bytes.to_vec()).ok()
    }
}

/// Parenthesizes everything it absorbs, keeping the combination structure visible, eg.
/// two sibling subtrees digest to `((left)(right))`.
#[derive(Debug, Default)]
pub(crate) struct ParenHasher(Vec<u8>);

impl Hasher for ParenHasher {
    type Hash = String;
    type Error = Infallible;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.0.extend_from_slice(bytes);
        Ok(())
    }

    fn finish(self) -> Self::Hash {
        format!("({})", String::from_utf8(self.0).unwrap())
    }

    fn block_size() -> usize {
        1
    }

    fn output_size() -> usize {
        0
    }

    fn hash_from(bytes: &[u8]) -> Option<Self::Hash> {
        String::from_utf8(bytes.to_vec()).ok()
    }
}

/// Echoes its input back as the digest, but refuses to absorb a `b'!'`.
#[derive(Debug, Default)]
pub(crate) struct FailingHasher(Vec<u8>);

#[derive(Debug, thiserror::Error)]
#[error("refusing to absorb a '!'")]
pub(crate) struct RefusedByte;

impl Hasher for FailingHasher {
    type Hash = Vec<u8>;
    type Error = RefusedByte;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if bytes.contains(&b'!') {
            return Err(RefusedByte);
        }
        self.0.extend_from_slice(bytes);
        Ok(())
    }

    fn finish(self) -> Self::Hash {
        self.0
    }

    fn block_size() -> usize {
        1
    }

    fn output_size() -> usize {
        0
    }

    fn hash_from(bytes: &[u8]) -> Option<Self::Hash> {
        Some(bytes.to_vec())
    }
}
