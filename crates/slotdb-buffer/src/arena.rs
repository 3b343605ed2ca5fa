//! Page arena: one allocation carved into fixed-size page regions.
//!
//! ```text
//! +-----------+-----------+-----------+-----+-----------+
//! |  page 0   |  page 1   |  page 2   | ... |  page N-1 |
//! +-----------+-----------+-----------+-----+-----------+
//!  <page_size>
//! ```
//!
//! Each region is handed out as a [`PageRegion`], a `Buffer` whose offsets
//! are relative to the start of that page. A page built on a region can
//! never read or write its neighbours.

use slotdb_common::config::PageConfig;
use slotdb_common::types::PageId;
use tracing::debug;

use crate::buffer::Buffer;
use crate::byte_buffer::ByteBuffer;
use crate::error::{BufferError, BufferResult};

/// A contiguous block of memory split into equally sized page regions.
///
/// # Example
///
/// ```rust
/// use slotdb_buffer::{Buffer, PageArena};
/// use slotdb_common::config::PageConfig;
/// use slotdb_common::types::PageId;
///
/// let mut arena = PageArena::new(&PageConfig::for_testing()).unwrap();
/// let mut region = arena.region_mut(PageId::new(1)).unwrap();
/// region.write(0, b"abc");
/// assert_eq!(arena.region(PageId::new(1)).unwrap().read(0, 3), b"abc");
/// ```
#[derive(Debug)]
pub struct PageArena {
    data: ByteBuffer,
    page_size: usize,
    pages: usize,
}

impl PageArena {
    /// Creates an arena from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::Config` if the configuration is invalid.
    pub fn new(config: &PageConfig) -> BufferResult<Self> {
        config.validate()?;
        Self::with_geometry(config.page_size, config.pages)
    }

    /// Creates an arena of `pages` regions of `page_size` bytes each.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::Config` if either dimension is zero or the
    /// total size overflows.
    pub fn with_geometry(page_size: usize, pages: usize) -> BufferResult<Self> {
        if page_size == 0 || pages == 0 {
            return Err(BufferError::config("page_size and pages must be > 0"));
        }
        let total = page_size
            .checked_mul(pages)
            .ok_or_else(|| BufferError::config("arena size overflows usize"))?;

        debug!(page_size, pages, total, "allocating page arena");

        Ok(Self {
            data: ByteBuffer::new(total),
            page_size,
            pages,
        })
    }

    /// Returns the size of each region.
    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns the number of regions.
    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Returns the bytes of one region for read-only access.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::RegionOutOfRange` for a page outside the arena.
    pub fn region(&self, page_id: PageId) -> BufferResult<&[u8]> {
        let range = self.range_of(page_id)?;
        Ok(&self.data.as_slice()[range])
    }

    /// Returns one region as a writable buffer.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::RegionOutOfRange` for a page outside the arena.
    pub fn region_mut(&mut self, page_id: PageId) -> BufferResult<PageRegion<'_>> {
        let range = self.range_of(page_id)?;
        Ok(PageRegion {
            page_id,
            data: &mut self.data.as_mut_slice()[range],
        })
    }

    /// Iterates over every region in page id order.
    pub fn regions_mut(&mut self) -> impl Iterator<Item = PageRegion<'_>> {
        self.data
            .as_mut_slice()
            .chunks_exact_mut(self.page_size)
            .enumerate()
            .map(|(index, data)| PageRegion {
                page_id: PageId::new(index as u64),
                data,
            })
    }

    /// Zeroes every region.
    pub fn reset(&mut self) {
        self.data.zero();
    }

    fn range_of(&self, page_id: PageId) -> BufferResult<std::ops::Range<usize>> {
        if !page_id.is_valid() || page_id.as_u64() >= self.pages as u64 {
            return Err(BufferError::RegionOutOfRange {
                page_id,
                pages: self.pages,
            });
        }
        let start = page_id.index() * self.page_size;
        Ok(start..start + self.page_size)
    }
}

/// A mutable view of one page region inside a [`PageArena`].
#[derive(Debug)]
pub struct PageRegion<'a> {
    page_id: PageId,
    data: &'a mut [u8],
}

impl<'a> PageRegion<'a> {
    /// Returns the id of the page this region holds.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }
}

impl Buffer for PageRegion<'_> {
    #[inline]
    fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn read(&self, offset: usize, len: usize) -> &[u8] {
        Buffer::read(&*self.data, offset, len)
    }

    #[inline]
    fn write(&mut self, offset: usize, bytes: &[u8]) {
        Buffer::write(&mut *self.data, offset, bytes);
    }

    #[inline]
    fn fill(&mut self, offset: usize, len: usize, value: u8) {
        Buffer::fill(&mut *self.data, offset, len, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_geometry() {
        let arena = PageArena::with_geometry(128, 3).unwrap();
        assert_eq!(arena.page_size(), 128);
        assert_eq!(arena.page_count(), 3);
        assert_eq!(arena.region(PageId::new(2)).unwrap().len(), 128);
    }

    #[test]
    fn test_arena_rejects_invalid_config() {
        let config = PageConfig::default().with_pages(0);
        assert!(matches!(
            PageArena::new(&config),
            Err(BufferError::Config { .. })
        ));
        assert!(PageArena::with_geometry(0, 4).is_err());
    }

    #[test]
    fn test_region_out_of_range() {
        let mut arena = PageArena::with_geometry(64, 2).unwrap();
        assert!(matches!(
            arena.region_mut(PageId::new(2)),
            Err(BufferError::RegionOutOfRange { pages: 2, .. })
        ));
        assert!(arena.region(PageId::INVALID).is_err());
    }

    #[test]
    fn test_regions_are_isolated() {
        let mut arena = PageArena::with_geometry(64, 3).unwrap();
        {
            let mut region = arena.region_mut(PageId::new(1)).unwrap();
            assert_eq!(region.capacity(), 64);
            region.fill(0, 64, 0xAB);
        }

        assert!(arena.region(PageId::new(0)).unwrap().iter().all(|&b| b == 0));
        assert!(arena.region(PageId::new(1)).unwrap().iter().all(|&b| b == 0xAB));
        assert!(arena.region(PageId::new(2)).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_regions_mut_and_reset() {
        let mut arena = PageArena::with_geometry(32, 4).unwrap();
        for mut region in arena.regions_mut() {
            let id = region.page_id().as_u64() as u8;
            region.write(0, &[id]);
        }

        for i in 0..4u64 {
            assert_eq!(arena.region(PageId::new(i)).unwrap()[0], i as u8);
        }

        arena.reset();
        assert!(arena.region(PageId::new(3)).unwrap().iter().all(|&b| b == 0));
    }
}
