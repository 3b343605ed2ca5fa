//! Slot descriptor format.
//!
//! The slot directory starts right after the page header and holds one
//! 9-byte descriptor per slot id, in id order.
//!
//! # Descriptor Layout (9 bytes)
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//!   0       4   record_offset (u32 LE, from the start of the page)
//!   4       4   record_length (u32 LE)
//!   8       1   tombstone flag (0 = live, 1 = tombstoned)
//! ```

use slotdb_common::constants::{PAGE_HEADER_SIZE, SLOT_DESCRIPTOR_SIZE};
use slotdb_common::types::SlotId;

/// Offset of the record offset field within a descriptor.
pub const RECORD_OFFSET_OFFSET: usize = 0;

/// Offset of the record length field within a descriptor.
pub const RECORD_LENGTH_OFFSET: usize = 4;

/// Offset of the tombstone flag within a descriptor.
pub const TOMBSTONE_OFFSET: usize = 8;

/// Flag value of a live slot.
pub const FLAG_LIVE: u8 = 0;

/// Flag value of a tombstoned slot.
pub const FLAG_TOMBSTONED: u8 = 1;

/// Returns the byte offset of a slot's descriptor within the page.
#[inline]
#[must_use]
pub const fn descriptor_offset(slot_id: SlotId) -> usize {
    PAGE_HEADER_SIZE + slot_id as usize * SLOT_DESCRIPTOR_SIZE
}

/// A decoded slot descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDescriptor {
    /// Offset from the start of the page to the record bytes.
    pub record_offset: u32,
    /// Length of the record in bytes.
    pub record_length: u32,
    /// Raw tombstone flag byte.
    pub flag: u8,
}

impl SlotDescriptor {
    /// Creates a live descriptor.
    #[inline]
    #[must_use]
    pub const fn live(record_offset: u32, record_length: u32) -> Self {
        Self {
            record_offset,
            record_length,
            flag: FLAG_LIVE,
        }
    }

    /// Creates a tombstoned descriptor that references no heap bytes.
    #[inline]
    #[must_use]
    pub const fn vacant() -> Self {
        Self {
            record_offset: 0,
            record_length: 0,
            flag: FLAG_TOMBSTONED,
        }
    }

    /// Returns this descriptor with the tombstone flag set.
    #[inline]
    #[must_use]
    pub const fn tombstoned(self) -> Self {
        Self {
            flag: FLAG_TOMBSTONED,
            ..self
        }
    }

    /// Returns true if the slot has been deleted.
    #[inline]
    #[must_use]
    pub const fn is_tombstoned(&self) -> bool {
        self.flag == FLAG_TOMBSTONED
    }

    /// Returns true if the flag byte holds a known value.
    #[inline]
    #[must_use]
    pub const fn has_valid_flag(&self) -> bool {
        matches!(self.flag, FLAG_LIVE | FLAG_TOMBSTONED)
    }

    /// Returns the end of the record range (exclusive), widened to avoid
    /// overflow on corrupt input.
    #[inline]
    #[must_use]
    pub const fn record_end(&self) -> u64 {
        self.record_offset as u64 + self.record_length as u64
    }

    /// Reads a descriptor from bytes.
    #[inline]
    #[must_use]
    pub fn decode(bytes: &[u8; SLOT_DESCRIPTOR_SIZE]) -> Self {
        Self {
            record_offset: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            record_length: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            flag: bytes[TOMBSTONE_OFFSET],
        }
    }

    /// Writes the descriptor to bytes.
    #[inline]
    #[must_use]
    pub fn encode(&self) -> [u8; SLOT_DESCRIPTOR_SIZE] {
        let mut bytes = [0u8; SLOT_DESCRIPTOR_SIZE];
        bytes[RECORD_OFFSET_OFFSET..RECORD_OFFSET_OFFSET + 4]
            .copy_from_slice(&self.record_offset.to_le_bytes());
        bytes[RECORD_LENGTH_OFFSET..RECORD_LENGTH_OFFSET + 4]
            .copy_from_slice(&self.record_length.to_le_bytes());
        bytes[TOMBSTONE_OFFSET] = self.flag;
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_offset() {
        assert_eq!(descriptor_offset(0), 12);
        assert_eq!(descriptor_offset(1), 21);
        assert_eq!(descriptor_offset(10), 102);
    }

    #[test]
    fn test_encode_layout() {
        let slot = SlotDescriptor::live(0x0403_0201, 0x0807_0605);
        assert_eq!(slot.encode(), [1, 2, 3, 4, 5, 6, 7, 8, FLAG_LIVE]);

        let deleted = slot.tombstoned();
        assert_eq!(deleted.encode()[TOMBSTONE_OFFSET], FLAG_TOMBSTONED);
        assert_eq!(deleted.record_offset, slot.record_offset);
    }

    #[test]
    fn test_decode() {
        let bytes = [100, 0, 0, 0, 3, 0, 0, 0, 1];
        let slot = SlotDescriptor::decode(&bytes);
        assert_eq!(slot.record_offset, 100);
        assert_eq!(slot.record_length, 3);
        assert!(slot.is_tombstoned());
        assert_eq!(slot.encode(), bytes);
    }

    #[test]
    fn test_flags() {
        assert!(!SlotDescriptor::live(10, 2).is_tombstoned());
        assert!(SlotDescriptor::vacant().is_tombstoned());
        assert_eq!(SlotDescriptor::vacant().record_end(), 0);

        let bogus = SlotDescriptor {
            record_offset: 0,
            record_length: 0,
            flag: 7,
        };
        assert!(!bogus.has_valid_flag());
        assert!(!bogus.is_tombstoned());
    }

    #[test]
    fn test_record_end_does_not_overflow() {
        let slot = SlotDescriptor::live(u32::MAX, u32::MAX);
        assert_eq!(slot.record_end(), 2 * u64::from(u32::MAX));
    }
}
