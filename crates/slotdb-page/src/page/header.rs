//! Page header format.
//!
//! Every page starts with a 12-byte header.
//!
//! # Header Layout (12 bytes)
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//!   0       4   slot_count (number of slot descriptors, live or tombstoned)
//!   4       4   free_space_start (first byte after the slot directory)
//!   8       4   free_space_end (first byte of the record heap)
//! ```
//!
//! All fields are little-endian `u32`.

use slotdb_buffer::Buffer;
use slotdb_common::constants::{PAGE_HEADER_SIZE, SLOT_DESCRIPTOR_SIZE};
use slotdb_common::{SlotError, SlotResult};

/// Offset of the slot count field.
pub const SLOT_COUNT_OFFSET: usize = 0;

/// Offset of the free space start field.
pub const FREE_SPACE_START_OFFSET: usize = 4;

/// Offset of the free space end field.
pub const FREE_SPACE_END_OFFSET: usize = 8;

/// Decoded page header.
///
/// This is a plain value: reading it copies the 12 header bytes out of the
/// buffer, and nothing changes on the page until it is written back.
///
/// # Example
///
/// ```rust
/// use slotdb_page::PageHeader;
///
/// let header = PageHeader::empty(128);
/// assert_eq!(header.slot_count, 0);
/// assert_eq!(header.free_space_start, 12);
/// assert_eq!(header.free_space_end, 128);
/// assert_eq!(PageHeader::decode(&header.encode()), header);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Number of slot descriptors in the directory.
    pub slot_count: u32,
    /// First unused byte after the slot directory.
    pub free_space_start: u32,
    /// First used byte of the record heap.
    pub free_space_end: u32,
}

impl PageHeader {
    /// Returns the header of an empty page of `capacity` bytes.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn empty(capacity: usize) -> Self {
        Self {
            slot_count: 0,
            free_space_start: PAGE_HEADER_SIZE as u32,
            free_space_end: capacity as u32,
        }
    }

    /// Decodes a header from its 12-byte representation.
    #[must_use]
    pub fn decode(bytes: &[u8; PAGE_HEADER_SIZE]) -> Self {
        let field = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };
        Self {
            slot_count: field(SLOT_COUNT_OFFSET),
            free_space_start: field(FREE_SPACE_START_OFFSET),
            free_space_end: field(FREE_SPACE_END_OFFSET),
        }
    }

    /// Encodes the header into its 12-byte representation.
    #[must_use]
    pub fn encode(&self) -> [u8; PAGE_HEADER_SIZE] {
        let mut bytes = [0u8; PAGE_HEADER_SIZE];
        bytes[SLOT_COUNT_OFFSET..SLOT_COUNT_OFFSET + 4]
            .copy_from_slice(&self.slot_count.to_le_bytes());
        bytes[FREE_SPACE_START_OFFSET..FREE_SPACE_START_OFFSET + 4]
            .copy_from_slice(&self.free_space_start.to_le_bytes());
        bytes[FREE_SPACE_END_OFFSET..FREE_SPACE_END_OFFSET + 4]
            .copy_from_slice(&self.free_space_end.to_le_bytes());
        bytes
    }

    /// Reads the header from the start of a buffer.
    pub fn read_from<B: Buffer + ?Sized>(buffer: &B) -> Self {
        Self {
            slot_count: buffer.read_u32_le(SLOT_COUNT_OFFSET),
            free_space_start: buffer.read_u32_le(FREE_SPACE_START_OFFSET),
            free_space_end: buffer.read_u32_le(FREE_SPACE_END_OFFSET),
        }
    }

    /// Writes the header to the start of a buffer.
    pub fn write_to<B: Buffer + ?Sized>(&self, buffer: &mut B) {
        buffer.write_u32_le(SLOT_COUNT_OFFSET, self.slot_count);
        buffer.write_u32_le(FREE_SPACE_START_OFFSET, self.free_space_start);
        buffer.write_u32_le(FREE_SPACE_END_OFFSET, self.free_space_end);
    }

    /// Returns the number of contiguous free bytes between the slot
    /// directory and the record heap.
    #[inline]
    #[must_use]
    pub fn free_space(&self) -> usize {
        self.free_space_end.saturating_sub(self.free_space_start) as usize
    }

    /// Returns the number of bytes occupied by the record heap.
    #[inline]
    #[must_use]
    pub fn heap_size(&self, capacity: usize) -> usize {
        capacity.saturating_sub(self.free_space_end as usize)
    }

    /// Checks the header against the capacity of the buffer it came from.
    ///
    /// # Errors
    ///
    /// Returns `SlotError::Corrupted` when the directory end does not match
    /// the slot count or the free region is not inside the page.
    pub fn validate(&self, capacity: usize) -> SlotResult<()> {
        let directory_end =
            PAGE_HEADER_SIZE as u64 + u64::from(self.slot_count) * SLOT_DESCRIPTOR_SIZE as u64;
        if u64::from(self.free_space_start) != directory_end {
            return Err(SlotError::corrupted(format!(
                "free_space_start {} does not match {} slots (expected {})",
                self.free_space_start, self.slot_count, directory_end
            )));
        }
        if self.free_space_start > self.free_space_end {
            return Err(SlotError::corrupted(format!(
                "free_space_start {} is past free_space_end {}",
                self.free_space_start, self.free_space_end
            )));
        }
        if self.free_space_end as usize > capacity {
            return Err(SlotError::corrupted(format!(
                "free_space_end {} is past page capacity {}",
                self.free_space_end, capacity
            )));
        }
        Ok(())
    }
}
