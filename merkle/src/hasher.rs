use std::error;
use std::fmt::Debug;

/// A trait to produce block and node digests, modeling incremental hash contexts.
///
/// A fresh context is obtained through [`Default`], bytes are absorbed with
/// [`write`](Self::write) and the digest comes out of the consuming
/// [`finish`](Self::finish). Checksum computation fans subtrees out across tasks, hence
/// the `Send + 'static` requirements on the hasher and its digest.
pub trait Hasher: Default + Send + 'static {
    /// The digest produced by this hasher.
    type Hash: AsRef<[u8]> + Clone + Debug + Send + Sync + 'static;
    /// The failure reported when absorbing bytes.
    type Error: error::Error + Send + Sync + 'static;

    /// Absorbs `bytes` into the context.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Produces the digest of everything absorbed so far.
    fn finish(self) -> Self::Hash;

    /// Internal block size of the hash function, in bytes.
    fn block_size() -> usize;

    /// Byte size of the digests produced by [`finish`](Self::finish).
    fn output_size() -> usize;

    /// Rebuilds a digest from its raw bytes, eg. a slice of a piece table; `None` when
    /// `bytes` cannot be a digest of this hash function.
    fn hash_from(bytes: &[u8]) -> Option<Self::Hash>;

    /// Restores the context to its initial state.
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Checksums `bytes` in one call, on a fresh context.
    fn checksum(bytes: impl AsRef<[u8]>) -> Result<Self::Hash, Self::Error> {
        let mut hasher = Self::default();
        hasher.write(bytes.as_ref())?;
        Ok(hasher.finish())
    }
}

/// The default hash function, bound to SHA-1 for interoperability with existing
/// piece-table ecosystems.
#[cfg(feature = "sha1")]
pub type DefaultHasher = sha1::Sha1;
