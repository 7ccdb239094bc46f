use std::num::NonZeroUsize;

/// Reasonable max byte size for the blocks that are digested into tree leaves.
pub const MAX_BLOCK_SIZE: usize = 1024 * 16;

/// An enum to deal with block size selection errors.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BlockSizeError {
    /// No block size can cover zero bytes of content.
    #[error("cannot derive a block size for empty content")]
    Empty,

    /// No halving of the content size fits under [`MAX_BLOCK_SIZE`] while still dividing
    /// the content evenly.
    #[error("no block size of at most {MAX_BLOCK_SIZE} bytes evenly divides {0} bytes")]
    Indivisible(usize),
}

/// Returns a reasonable block size to chunk `total` bytes of content by.
///
/// The candidate starts out as `total` and is halved until it fits under
/// [`MAX_BLOCK_SIZE`]; it is only kept if it still divides the content evenly.
pub fn determine_block_size(total: usize) -> Result<NonZeroUsize, BlockSizeError> {
    let mut size = total;
    while size > MAX_BLOCK_SIZE {
        size /= 2;
    }

    let Some(block_size) = NonZeroUsize::new(size) else {
        return Err(BlockSizeError::Empty);
    };

    if total % block_size.get() != 0 {
        return Err(BlockSizeError::Indivisible(total));
    }

    Ok(block_size)
}
