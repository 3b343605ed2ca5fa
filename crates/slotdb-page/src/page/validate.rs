//! Bounds checks shared by every page operation.
//!
//! Page bytes may come from anywhere, so nothing read out of the header or
//! a descriptor is used as an offset before it is checked here. A failed
//! check is reported as `SlotError::Corrupted` and never reaches the
//! buffer as an out-of-range access.

use std::ops::Range;

use slotdb_buffer::Buffer;
use slotdb_common::constants::{
    MAX_PAGE_CAPACITY, MIN_PAGE_CAPACITY, PAGE_HEADER_SIZE, SLOT_DESCRIPTOR_SIZE,
};
use slotdb_common::types::SlotId;
use slotdb_common::{SlotError, SlotResult};
use tracing::warn;

use super::header::PageHeader;
use super::slot::{
    descriptor_offset, SlotDescriptor, RECORD_LENGTH_OFFSET, RECORD_OFFSET_OFFSET, TOMBSTONE_OFFSET,
};

/// Checks that a buffer can hold a page.
pub(crate) fn check_capacity(capacity: usize) -> SlotResult<()> {
    if capacity < MIN_PAGE_CAPACITY {
        return Err(SlotError::BufferTooSmall {
            capacity,
            min: MIN_PAGE_CAPACITY,
        });
    }
    if capacity > MAX_PAGE_CAPACITY {
        return Err(SlotError::BufferTooLarge { capacity });
    }
    Ok(())
}

/// Largest record a page of `capacity` bytes can ever hold.
#[inline]
pub(crate) fn max_record_len(capacity: usize) -> usize {
    capacity.saturating_sub(PAGE_HEADER_SIZE + SLOT_DESCRIPTOR_SIZE)
}

/// Checks a payload length against the page's addressable heap.
pub(crate) fn check_record_len(length: usize, max: usize) -> SlotResult<()> {
    if length == 0 || length > max {
        return Err(SlotError::InvalidLength { length, max });
    }
    Ok(())
}

/// Reads and validates the header of an existing page.
pub(crate) fn load_header<B: Buffer + ?Sized>(buffer: &B) -> SlotResult<PageHeader> {
    let capacity = buffer.capacity();
    check_capacity(capacity)?;

    let header = PageHeader::read_from(buffer);
    if let Err(err) = header.validate(capacity) {
        warn!(capacity, ?header, error = %err, "rejecting page with invalid header");
        return Err(err);
    }
    Ok(header)
}

/// Reads a descriptor. The caller guarantees `slot_id < slot_count` of a
/// validated header, so the descriptor lies inside the directory.
#[inline]
pub(crate) fn read_descriptor<B: Buffer + ?Sized>(buffer: &B, slot_id: SlotId) -> SlotDescriptor {
    let offset = descriptor_offset(slot_id);
    SlotDescriptor {
        record_offset: buffer.read_u32_le(offset + RECORD_OFFSET_OFFSET),
        record_length: buffer.read_u32_le(offset + RECORD_LENGTH_OFFSET),
        flag: buffer.read(offset + TOMBSTONE_OFFSET, 1)[0],
    }
}

/// Resolves a slot id to its live descriptor.
///
/// Fails with `InvalidSlot` past the directory, `DeletedRecord` for a
/// tombstone, and `Corrupted` if the descriptor is not a valid live slot.
pub(crate) fn live_slot<B: Buffer + ?Sized>(
    buffer: &B,
    header: &PageHeader,
    slot_id: SlotId,
) -> SlotResult<SlotDescriptor> {
    if slot_id >= header.slot_count {
        return Err(SlotError::InvalidSlot {
            slot_id,
            slot_count: header.slot_count,
        });
    }

    let slot = read_descriptor(buffer, slot_id);
    if !slot.has_valid_flag() {
        return Err(SlotError::corrupted(format!(
            "slot {slot_id} has unknown flag {:#04x}",
            slot.flag
        )));
    }
    if slot.is_tombstoned() {
        return Err(SlotError::DeletedRecord { slot_id });
    }

    record_range(&slot, header, buffer.capacity(), slot_id)?;
    Ok(slot)
}

/// Returns the heap range of a live descriptor after checking that it lies
/// inside the record heap.
pub(crate) fn record_range(
    slot: &SlotDescriptor,
    header: &PageHeader,
    capacity: usize,
    slot_id: SlotId,
) -> SlotResult<Range<usize>> {
    if slot.record_offset < header.free_space_end || slot.record_end() > capacity as u64 {
        return Err(SlotError::corrupted(format!(
            "slot {slot_id} range {}..{} is outside the record heap {}..{}",
            slot.record_offset,
            slot.record_end(),
            header.free_space_end,
            capacity
        )));
    }
    let start = slot.record_offset as usize;
    Ok(start..start + slot.record_length as usize)
}

/// Runs a full consistency check over the header and every descriptor.
///
/// Checks that every flag is known, every live record is non-empty and
/// inside the heap, and no two live records overlap.
pub(crate) fn verify_page<B: Buffer + ?Sized>(buffer: &B) -> SlotResult<()> {
    let header = load_header(buffer)?;
    let capacity = buffer.capacity();

    let mut ranges = Vec::new();
    for slot_id in 0..header.slot_count {
        let slot = read_descriptor(buffer, slot_id);
        if !slot.has_valid_flag() {
            return Err(SlotError::corrupted(format!(
                "slot {slot_id} has unknown flag {:#04x}",
                slot.flag
            )));
        }
        if slot.is_tombstoned() {
            continue;
        }
        if slot.record_length == 0 {
            return Err(SlotError::corrupted(format!(
                "live slot {slot_id} has an empty record"
            )));
        }
        ranges.push((record_range(&slot, &header, capacity, slot_id)?, slot_id));
    }

    ranges.sort_unstable_by_key(|(range, _)| range.start);
    for pair in ranges.windows(2) {
        let (first, first_id) = &pair[0];
        let (second, second_id) = &pair[1];
        if first.end > second.start {
            return Err(SlotError::corrupted(format!(
                "slots {first_id} and {second_id} overlap at {}..{}",
                second.start, first.end
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::slot::FLAG_TOMBSTONED;

    fn empty_page(capacity: usize) -> Vec<u8> {
        let mut buffer = vec![0u8; capacity];
        PageHeader::empty(capacity).write_to(&mut buffer);
        buffer
    }

    fn put_slot(buffer: &mut Vec<u8>, slot_id: SlotId, slot: SlotDescriptor) {
        buffer.write(descriptor_offset(slot_id), &slot.encode());
    }

    #[test]
    fn test_read_descriptor_matches_encoding() {
        let mut buffer = empty_page(64);
        let slot = SlotDescriptor::live(0x0102_0304, 7).tombstoned();
        put_slot(&mut buffer, 2, slot);

        assert_eq!(read_descriptor(&buffer, 2), slot);
        let raw: [u8; SLOT_DESCRIPTOR_SIZE] = buffer[30..39].try_into().unwrap();
        assert_eq!(SlotDescriptor::decode(&raw), slot);
    }

    #[test]
    fn test_check_capacity() {
        assert!(matches!(
            check_capacity(MIN_PAGE_CAPACITY - 1),
            Err(SlotError::BufferTooSmall { .. })
        ));
        assert!(check_capacity(MIN_PAGE_CAPACITY).is_ok());
    }

    #[test]
    fn test_check_record_len() {
        assert_eq!(max_record_len(128), 107);
        assert!(check_record_len(1, 107).is_ok());
        assert!(check_record_len(107, 107).is_ok());
        assert_eq!(
            check_record_len(0, 107),
            Err(SlotError::InvalidLength { length: 0, max: 107 })
        );
        assert!(check_record_len(108, 107).is_err());
    }

    #[test]
    fn test_load_header_rejects_garbage() {
        let buffer = vec![0xFFu8; 64];
        assert!(load_header(&buffer).unwrap_err().is_corruption());

        let small = vec![0u8; 8];
        assert!(matches!(
            load_header(&small),
            Err(SlotError::BufferTooSmall { capacity: 8, .. })
        ));
    }

    #[test]
    fn test_live_slot_errors() {
        let mut buffer = empty_page(64);
        let header = PageHeader {
            slot_count: 2,
            free_space_start: 30,
            free_space_end: 60,
        };
        header.write_to(&mut buffer);
        put_slot(&mut buffer, 0, SlotDescriptor::live(60, 4));
        put_slot(&mut buffer, 1, SlotDescriptor::live(60, 4).tombstoned());

        assert!(live_slot(&buffer, &header, 0).is_ok());
        assert_eq!(
            live_slot(&buffer, &header, 1),
            Err(SlotError::DeletedRecord { slot_id: 1 })
        );
        assert_eq!(
            live_slot(&buffer, &header, 2),
            Err(SlotError::InvalidSlot {
                slot_id: 2,
                slot_count: 2
            })
        );
    }

    #[test]
    fn test_live_slot_out_of_heap() {
        let mut buffer = empty_page(64);
        let header = PageHeader {
            slot_count: 1,
            free_space_start: 21,
            free_space_end: 60,
        };
        header.write_to(&mut buffer);

        put_slot(&mut buffer, 0, SlotDescriptor::live(62, 4));
        assert!(live_slot(&buffer, &header, 0).unwrap_err().is_corruption());

        put_slot(&mut buffer, 0, SlotDescriptor::live(30, 4));
        assert!(live_slot(&buffer, &header, 0).unwrap_err().is_corruption());

        put_slot(
            &mut buffer,
            0,
            SlotDescriptor {
                record_offset: 60,
                record_length: 4,
                flag: 9,
            },
        );
        assert!(live_slot(&buffer, &header, 0).unwrap_err().is_corruption());
    }

    #[test]
    fn test_verify_page() {
        let mut buffer = empty_page(64);
        let header = PageHeader {
            slot_count: 3,
            free_space_start: 39,
            free_space_end: 54,
        };
        header.write_to(&mut buffer);
        put_slot(&mut buffer, 0, SlotDescriptor::live(60, 4));
        put_slot(&mut buffer, 1, SlotDescriptor::live(54, 6));
        put_slot(
            &mut buffer,
            2,
            SlotDescriptor {
                record_offset: 0,
                record_length: 0,
                flag: FLAG_TOMBSTONED,
            },
        );
        assert!(verify_page(&buffer).is_ok());

        put_slot(&mut buffer, 1, SlotDescriptor::live(56, 6));
        let err = verify_page(&buffer).unwrap_err();
        assert!(err.to_string().contains("overlap"));

        put_slot(&mut buffer, 1, SlotDescriptor::live(56, 0));
        assert!(verify_page(&buffer).unwrap_err().to_string().contains("empty"));
    }
}
