use std::convert::Infallible;

use digest::core_api::BlockSizeUser;

pub use digest::{Digest, Output};

impl<D: Digest + BlockSizeUser + Default + Send + 'static> crate::Hasher for D {
    type Hash = Output<D>;
    type Error = Infallible;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.update(bytes);
        Ok(())
    }

    fn finish(self) -> Self::Hash {
        self.finalize()
    }

    fn block_size() -> usize {
        <D as BlockSizeUser>::block_size()
    }

    fn output_size() -> usize {
        <D as Digest>::output_size()
    }

    fn hash_from(bytes: &[u8]) -> Option<Self::Hash> {
        match bytes.len() == <D as Digest>::output_size() {
            true => Some(Output::<D>::clone_from_slice(bytes)),
            false => None,
        }
    }
}
