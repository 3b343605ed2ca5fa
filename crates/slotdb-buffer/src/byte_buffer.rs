//! Owned, resizable byte buffer.

use std::fmt;

use bytes::{Bytes, BytesMut};

use crate::buffer::Buffer;

/// An owned, zero-initialised byte buffer.
///
/// This is the simplest backing store for a single page: allocate it with
/// the page size, hand `&mut` to a page, and keep it for as long as the
/// page is needed.
///
/// # Example
///
/// ```rust
/// use slotdb_buffer::{Buffer, ByteBuffer};
///
/// let mut buffer = ByteBuffer::new(64);
/// buffer.write(0, b"hello");
/// assert_eq!(buffer.read(0, 5), b"hello");
/// assert_eq!(buffer.capacity(), 64);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    data: BytesMut,
}

impl ByteBuffer {
    /// Creates a zero-filled buffer of `capacity` bytes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            data: BytesMut::zeroed(capacity),
        }
    }

    /// Creates a buffer holding a copy of `bytes`.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            data: BytesMut::from(bytes),
        }
    }

    /// Returns the size of the buffer in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer holds no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Grows or shrinks the buffer. New bytes are zeroed.
    pub fn resize(&mut self, capacity: usize) {
        self.data.resize(capacity, 0);
    }

    /// Fills the entire buffer with zeros.
    pub fn zero(&mut self) {
        self.data.fill(0);
    }

    /// Returns the buffer as a byte slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns the buffer as a mutable byte slice.
    #[inline]
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns an immutable copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> Bytes {
        Bytes::copy_from_slice(&self.data)
    }

    /// Converts the buffer into immutable, cheaply cloneable bytes.
    #[must_use]
    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }
}

impl Buffer for ByteBuffer {
    #[inline]
    fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn read(&self, offset: usize, len: usize) -> &[u8] {
        self.as_slice().read(offset, len)
    }

    #[inline]
    fn write(&mut self, offset: usize, bytes: &[u8]) {
        self.as_mut_slice().write(offset, bytes);
    }

    #[inline]
    fn fill(&mut self, offset: usize, len: usize, value: u8) {
        Buffer::fill(self.as_mut_slice(), offset, len, value);
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            data: BytesMut::from(&bytes[..]),
        }
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.data.len())
            .finish()
    }
}
