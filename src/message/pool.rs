//! Fixed-capacity free list of [`MessageBuffer`]s.
//!
//! Replaces the ChibiOS `memory_pool_t pdb_msg_pool` (`chPoolAlloc`/
//! `chPoolFree` over a fixed-size slab, `lib/include/pdb_msg.h`) with a
//! `heapless`-backed free list protected by
//! [`crate::sync::primitives::CriticalSectionCell`], so it can be shared
//! between tasks and ISR contexts without an allocator.

use heapless::Vec;

use crate::error::PoolError;
use crate::sync::primitives::CriticalSectionCell;

use super::buffer::MessageBuffer;

/// A fixed-capacity pool of `N` [`MessageBuffer`]s.
///
/// `N` should cover the worst-case number of buffers simultaneously
/// in flight; see [`crate::constants::MESSAGE_POOL_SIZE`].
pub struct Pool<const N: usize> {
    free: CriticalSectionCell<Vec<MessageBuffer, N>>,
}

impl<const N: usize> Pool<N> {
    /// An empty pool; call [`Self::init`] once before use, or rely on
    /// [`Self::new`] to pre-fill it.
    pub const fn empty() -> Self {
        Self {
            free: CriticalSectionCell::new(Vec::new()),
        }
    }

    /// A pool pre-populated with `N` empty buffers, ready for immediate use.
    #[must_use]
    pub fn new() -> Self {
        let pool = Self::empty();
        pool.free.with(|free| {
            for _ in 0..N {
                let _ = free.push(MessageBuffer::EMPTY);
            }
        });
        pool
    }

    /// Check a buffer out of the pool, or report [`PoolError::Exhausted`] if
    /// none are free.
    pub fn alloc(&self) -> Result<MessageBuffer, PoolError> {
        self.free.with(|free| free.pop().ok_or(PoolError::Exhausted))
    }

    /// Return a buffer to the pool. If the pool is already full (a double
    /// free, which should not happen under correct ownership discipline),
    /// the buffer is silently dropped rather than panicking.
    pub fn free(&self, buffer: MessageBuffer) {
        self.free.with(|free| {
            let _ = free.push(buffer);
        });
    }

    /// Number of buffers currently checked out.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.free.with(|free| N - free.len())
    }
}

impl<const N: usize> Default for Pool<N> {
    fn default() -> Self {
        Self::new()
    }
}
