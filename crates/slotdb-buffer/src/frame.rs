//! Latched page frame.
//!
//! Pages do no internal locking. A caller that shares a page between
//! threads wraps its buffer in a `PageFrame`: any number of readers may hold
//! the read latch at once, a mutation needs the exclusive write latch for
//! the whole call.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use slotdb_common::types::PageId;

use crate::byte_buffer::ByteBuffer;

/// A page buffer guarded by a reader/writer latch.
pub struct PageFrame {
    /// Page ID held by this frame.
    page_id: PageId,
    /// Page data buffer.
    data: RwLock<ByteBuffer>,
}

impl PageFrame {
    /// Creates a frame holding a zeroed buffer of `page_size` bytes.
    pub fn new(page_id: PageId, page_size: usize) -> Self {
        Self::with_buffer(page_id, ByteBuffer::new(page_size))
    }

    /// Creates a frame around an existing buffer.
    pub fn with_buffer(page_id: PageId, buffer: ByteBuffer) -> Self {
        Self {
            page_id,
            data: RwLock::new(buffer),
        }
    }

    /// Returns the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Acquires the shared read latch.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, ByteBuffer> {
        self.data.read()
    }

    /// Acquires the exclusive write latch.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, ByteBuffer> {
        self.data.write()
    }

    /// Tries to acquire the exclusive write latch without blocking.
    #[inline]
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, ByteBuffer>> {
        self.data.try_write()
    }

    /// Consumes the frame and returns its buffer.
    pub fn into_inner(self) -> ByteBuffer {
        self.data.into_inner()
    }
}

impl std::fmt::Debug for PageFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFrame")
            .field("page_id", &self.page_id)
            .finish()
    }
}
