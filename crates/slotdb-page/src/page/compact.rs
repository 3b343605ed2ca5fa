//! Explicit space reclamation for slotted pages.
//!
//! Deletes and growing updates leave dead bytes in the record heap. Nothing
//! reclaims them implicitly; callers decide when to run [`SlottedPage::compact`]
//! (usually after `insert` fails with `CapacityExceeded` while
//! `can_fit_after_compaction` holds, or when `should_compact` says so).

#![allow(clippy::cast_possible_truncation)]

use slotdb_buffer::Buffer;
use slotdb_common::constants::SLOT_DESCRIPTOR_SIZE;
use slotdb_common::SlotResult;
use tracing::debug;

use super::slot::{descriptor_offset, SlotDescriptor};
use super::slotted::SlottedPage;
use super::validate;

/// Summary of one compaction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionStats {
    /// Live records on the page after compaction.
    pub live_records: usize,
    /// Live records whose offset changed.
    pub relocated: usize,
    /// Bytes added to the contiguous free space.
    pub reclaimed_bytes: usize,
}

impl<B: Buffer + ?Sized> SlottedPage<'_, B> {
    /// Rewrites the record heap so that live records are packed against the
    /// end of the page, in slot id order, with no gaps.
    ///
    /// Slot ids do not change. Tombstoned slots keep their descriptor with
    /// offset and length cleared, so reads of them still report
    /// `DeletedRecord`. The reclaimed heap bytes are zeroed. Compacting an
    /// already compact page leaves it byte-for-byte unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Corrupted` if the page fails validation; the page is not
    /// modified in that case.
    pub fn compact(&mut self) -> SlotResult<CompactionStats> {
        self.verify()?;

        let mut header = self.header();
        let capacity = self.capacity();
        let heap_start = header.free_space_end as usize;

        // Live records are read from a copy so that placing one record never
        // clobbers another that has not moved yet.
        let snapshot = self
            .buffer()
            .read(heap_start, header.heap_size(capacity))
            .to_vec();

        let mut stats = CompactionStats::default();
        let mut cursor = capacity;

        for slot_id in 0..header.slot_count {
            let slot = validate::read_descriptor(self.buffer(), slot_id);

            if slot.is_tombstoned() {
                let cleared = SlotDescriptor::vacant().tombstoned();
                if slot != cleared {
                    self.write_slot(slot_id, cleared);
                }
                continue;
            }

            let length = slot.record_length as usize;
            let source = slot.record_offset as usize - heap_start;
            cursor -= length;

            if cursor != slot.record_offset as usize {
                self.buffer_mut()
                    .write(cursor, &snapshot[source..source + length]);
                self.write_slot(slot_id, SlotDescriptor::live(cursor as u32, length as u32));
                stats.relocated += 1;
            }
            stats.live_records += 1;
        }

        stats.reclaimed_bytes = cursor - heap_start;
        if stats.reclaimed_bytes > 0 {
            self.buffer_mut().fill(heap_start, stats.reclaimed_bytes, 0);
            header.free_space_end = cursor as u32;
            header.write_to(self.buffer_mut());
        }

        debug!(
            live_records = stats.live_records,
            relocated = stats.relocated,
            reclaimed_bytes = stats.reclaimed_bytes,
            free_space = header.free_space(),
            "compacted page"
        );
        Ok(stats)
    }

    /// Drops the trailing run of tombstoned slots from the directory and
    /// returns how many were dropped.
    ///
    /// Only slots past the last live record are removed, so no live slot id
    /// changes. The dropped ids become unallocated: the next inserts will
    /// hand them out again, so callers that keep ids of deleted records
    /// around must not shrink. Record bytes are not touched; run
    /// [`compact`](Self::compact) to reclaim them.
    pub fn shrink_directory(&mut self) -> usize {
        let mut header = self.header();
        let mut slot_count = header.slot_count;

        while slot_count > 0
            && validate::read_descriptor(self.buffer(), slot_count - 1).is_tombstoned()
        {
            slot_count -= 1;
        }

        let dropped = (header.slot_count - slot_count) as usize;
        if dropped == 0 {
            return 0;
        }

        self.buffer_mut().fill(
            descriptor_offset(slot_count),
            dropped * SLOT_DESCRIPTOR_SIZE,
            0,
        );
        header.slot_count = slot_count;
        header.free_space_start -= (dropped * SLOT_DESCRIPTOR_SIZE) as u32;
        header.write_to(self.buffer_mut());

        debug!(dropped, slot_count, "shrank slot directory");
        dropped
    }

    /// Returns true if the share of reclaimable heap bytes exceeds
    /// `threshold` (0.0 to 1.0).
    pub fn should_compact(&self, threshold: f64) -> bool {
        self.view().should_compact(threshold)
    }
}
