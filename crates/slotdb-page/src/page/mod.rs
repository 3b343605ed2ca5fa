//! Slotted page layout and record operations.
//!
//! A page is a single fixed-size byte buffer holding variable-length records
//! addressed by page-relative slot ids.
//!
//! # Page Format
//!
//! ```text
//! 0            12                  free_space_start    free_space_end   capacity
//! +------------+-------------------+-------------------+----------------+
//! |   Header   |  Slot Directory   |    Free Space     |  Record Heap   |
//! |  12 bytes  |  9 bytes per slot |                   |                |
//! +------------+-------------------+-------------------+----------------+
//!                  grows forward →                       ← grows backward
//! ```
//!
//! The header holds three little-endian `u32` fields: `slot_count`,
//! `free_space_start` and `free_space_end`. Slot descriptor `i` lives at
//! `12 + 9 * i` and holds the record offset (`u32`), the record length
//! (`u32`) and a flag byte (0 = live, 1 = tombstoned).
//!
//! Slot ids are dense: every id below `slot_count` has a descriptor, and
//! nothing but [`SlottedPage::shrink_directory`] ever removes one.

mod compact;
mod header;
mod slot;
mod slotted;
mod validate;

pub use compact::CompactionStats;
pub use header::{PageHeader, FREE_SPACE_END_OFFSET, FREE_SPACE_START_OFFSET, SLOT_COUNT_OFFSET};
pub use slot::{descriptor_offset, SlotDescriptor, FLAG_LIVE, FLAG_TOMBSTONED};
pub use slotted::{RecordRef, SlottedPage, SlottedPageRef, UpdateOutcome};

pub use slotdb_common::constants::{
    MAX_PAGE_CAPACITY, MIN_PAGE_CAPACITY, PAGE_HEADER_SIZE, SLOT_DESCRIPTOR_SIZE,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(PAGE_HEADER_SIZE, 12);
        assert_eq!(SLOT_DESCRIPTOR_SIZE, 9);
        assert_eq!(MIN_PAGE_CAPACITY, PAGE_HEADER_SIZE + SLOT_DESCRIPTOR_SIZE + 1);
        assert_eq!(descriptor_offset(0), PAGE_HEADER_SIZE);
        assert_ne!(FLAG_LIVE, FLAG_TOMBSTONED);
    }

    #[test]
    fn test_smallest_page_holds_one_byte() {
        let mut buffer = vec![0u8; MIN_PAGE_CAPACITY];
        let mut page = SlottedPage::init(&mut buffer).unwrap();

        assert_eq!(page.max_record_len(), 1);
        let slot = page.insert(b"z").unwrap();
        assert_eq!(page.read(slot).unwrap(), b"z");
        assert_eq!(page.free_space(), 0);
    }
}
