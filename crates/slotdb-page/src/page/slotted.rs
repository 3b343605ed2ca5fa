//! Slotted page format for variable-length records.
//!
//! A slotted page stores variable-length records behind an indirection
//! layer (the slot directory). This allows records to be:
//!
//! - Inserted without moving existing records
//! - Deleted by tombstoning their slot
//! - Relocated by update or compaction without changing their slot id
//!
//! The page never owns its bytes. [`SlottedPage`] borrows a [`Buffer`]
//! mutably for as long as it lives; [`SlottedPageRef`] borrows it shared,
//! so any number of read-only views can coexist.

#![allow(clippy::cast_possible_truncation)]

use slotdb_buffer::Buffer;
use slotdb_common::config::PageConfig;
use slotdb_common::constants::SLOT_DESCRIPTOR_SIZE;
use slotdb_common::types::SlotId;
use slotdb_common::{SlotError, SlotResult};
use tracing::{debug, trace, warn};

use super::header::PageHeader;
use super::slot::{descriptor_offset, SlotDescriptor, FLAG_TOMBSTONED, TOMBSTONE_OFFSET};
use super::validate;

/// A reference to a live record in a slotted page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRef<'a> {
    /// The slot ID.
    pub slot_id: SlotId,
    /// The record data.
    pub data: &'a [u8],
}

/// How an update placed the new payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The payload fit in the record's current bytes and was written there.
    InPlace,
    /// The payload was written to fresh heap space; the old bytes are
    /// fragmentation until the next compaction.
    Relocated,
}

/// A slotted page for storing variable-length records.
///
/// # Example
///
/// ```rust
/// use slotdb_page::SlottedPage;
///
/// let mut buffer = vec![0u8; 128];
/// let mut page = SlottedPage::init(&mut buffer).unwrap();
///
/// let slot_id = page.insert(b"Hello, slotdb!").unwrap();
/// assert_eq!(slot_id, 0);
/// assert_eq!(page.read(slot_id).unwrap(), b"Hello, slotdb!");
/// ```
pub struct SlottedPage<'a, B: Buffer + ?Sized> {
    buffer: &'a mut B,
}

impl<'a, B: Buffer + ?Sized> SlottedPage<'a, B> {
    /// Formats the buffer as an empty page.
    ///
    /// Only the header is written; the rest of the buffer is left as is.
    ///
    /// # Errors
    ///
    /// Returns `BufferTooSmall` or `BufferTooLarge` if the buffer cannot
    /// hold a page.
    pub fn init(buffer: &'a mut B) -> SlotResult<Self> {
        let capacity = buffer.capacity();
        validate::check_capacity(capacity)?;
        PageHeader::empty(capacity).write_to(buffer);
        debug!(capacity, "initialized empty page");
        Ok(Self { buffer })
    }

    /// Opens a buffer that already holds a page.
    ///
    /// The header is validated; descriptors are checked when they are used.
    ///
    /// # Errors
    ///
    /// Returns `Corrupted` if the header is inconsistent with the buffer.
    pub fn open(buffer: &'a mut B) -> SlotResult<Self> {
        validate::load_header(&*buffer)?;
        Ok(Self { buffer })
    }

    /// Opens an existing page, running a full [`verify`](Self::verify)
    /// first when the configuration asks for it.
    ///
    /// # Errors
    ///
    /// Returns `Corrupted` if the page fails validation.
    pub fn open_with_config(buffer: &'a mut B, config: &PageConfig) -> SlotResult<Self> {
        if config.verify_on_open {
            validate::verify_page(&*buffer)?;
        }
        Self::open(buffer)
    }

    /// Returns a read-only view of this page.
    #[inline]
    pub fn view(&self) -> SlottedPageRef<'_, B> {
        SlottedPageRef { buffer: &*self.buffer }
    }

    /// Reformats the page as empty, dropping every slot.
    ///
    /// Slot ids handed out before the reset are no longer valid.
    pub fn reset(&mut self) {
        let capacity = self.buffer.capacity();
        let slots = self.header().slot_count;
        PageHeader::empty(capacity).write_to(self.buffer);
        debug!(capacity, dropped_slots = slots, "reset page");
    }

    // =========================================================================
    // Record operations
    // =========================================================================

    /// Inserts a record and returns its new slot id.
    ///
    /// Slot ids are allocated in increasing order and never reused, even
    /// after deletes. Insert never compacts: when the page has enough
    /// reclaimable space but not enough contiguous space, it fails with
    /// `CapacityExceeded` and the caller decides whether to compact.
    ///
    /// # Errors
    ///
    /// - `InvalidLength` if the record is empty or larger than the page can hold
    /// - `CapacityExceeded` if the contiguous free space is too small
    pub fn insert(&mut self, record: &[u8]) -> SlotResult<SlotId> {
        let length = record.len();
        validate::check_record_len(length, self.max_record_len())?;

        let mut header = self.header();
        let required = length + SLOT_DESCRIPTOR_SIZE;
        let available = header.free_space();
        if available < required {
            return Err(SlotError::CapacityExceeded {
                required,
                available,
            });
        }

        let slot_id = header.slot_count;
        let record_offset = header.free_space_end as usize - length;

        self.buffer.write(record_offset, record);
        self.write_slot(
            slot_id,
            SlotDescriptor::live(record_offset as u32, length as u32),
        );

        header.slot_count += 1;
        header.free_space_start += SLOT_DESCRIPTOR_SIZE as u32;
        header.free_space_end = record_offset as u32;
        header.write_to(self.buffer);

        trace!(slot_id, length, record_offset, "inserted record");
        Ok(slot_id)
    }

    /// Returns the bytes of a live record.
    ///
    /// # Errors
    ///
    /// - `InvalidSlot` if the slot id is past the directory
    /// - `DeletedRecord` if the slot is tombstoned
    #[inline]
    pub fn read(&self, slot_id: SlotId) -> SlotResult<&[u8]> {
        self.view().read(slot_id)
    }

    /// Deletes a record by tombstoning its slot and returns the length of
    /// the deleted record.
    ///
    /// Only the tombstone flag is written. The record bytes stay where they
    /// are until the page is compacted.
    ///
    /// # Errors
    ///
    /// - `InvalidSlot` if the slot id is past the directory
    /// - `DeletedRecord` if the slot is already tombstoned
    pub fn delete(&mut self, slot_id: SlotId) -> SlotResult<usize> {
        let header = self.header();
        let slot = validate::live_slot(&*self.buffer, &header, slot_id)?;

        self.buffer
            .write(descriptor_offset(slot_id) + TOMBSTONE_OFFSET, &[FLAG_TOMBSTONED]);

        trace!(slot_id, length = slot.record_length, "deleted record");
        Ok(slot.record_length as usize)
    }

    /// Replaces the contents of a live record, keeping its slot id.
    ///
    /// A payload no longer than the current record is written in place and
    /// the recorded length shrinks. A longer payload is written to fresh
    /// heap space and the descriptor is pointed at it; this needs as many
    /// contiguous free bytes as the payload is long.
    ///
    /// # Errors
    ///
    /// - `InvalidSlot` / `DeletedRecord` as for [`delete`](Self::delete)
    /// - `InvalidLength` if the payload is empty or larger than the page can hold
    /// - `CapacityExceeded` if a relocated payload does not fit
    pub fn update(&mut self, slot_id: SlotId, record: &[u8]) -> SlotResult<UpdateOutcome> {
        let mut header = self.header();
        let slot = validate::live_slot(&*self.buffer, &header, slot_id)?;

        let length = record.len();
        validate::check_record_len(length, self.max_record_len())?;

        if length <= slot.record_length as usize {
            self.buffer.write(slot.record_offset as usize, record);
            if length < slot.record_length as usize {
                self.write_slot(
                    slot_id,
                    SlotDescriptor::live(slot.record_offset, length as u32),
                );
            }
            trace!(slot_id, old_length = slot.record_length, length, "updated record in place");
            return Ok(UpdateOutcome::InPlace);
        }

        let available = header.free_space();
        if available < length {
            return Err(SlotError::CapacityExceeded {
                required: length,
                available,
            });
        }

        let record_offset = header.free_space_end as usize - length;
        self.buffer.write(record_offset, record);
        self.write_slot(
            slot_id,
            SlotDescriptor::live(record_offset as u32, length as u32),
        );
        header.free_space_end = record_offset as u32;
        header.write_to(self.buffer);

        trace!(
            slot_id,
            old_offset = slot.record_offset,
            record_offset,
            length,
            "relocated record"
        );
        Ok(UpdateOutcome::Relocated)
    }

    /// Returns an iterator over all live records in slot id order.
    pub fn records(&self) -> impl Iterator<Item = RecordRef<'_>> {
        self.view().records()
    }

    // =========================================================================
    // Page state
    // =========================================================================

    /// Returns the decoded page header.
    #[inline]
    pub fn header(&self) -> PageHeader {
        PageHeader::read_from(&*self.buffer)
    }

    /// Returns the descriptor of a slot, live or tombstoned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSlot` if the slot id is past the directory.
    #[inline]
    pub fn slot(&self, slot_id: SlotId) -> SlotResult<SlotDescriptor> {
        self.view().slot(slot_id)
    }

    /// Returns the page capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Returns the number of slots, live or tombstoned.
    #[inline]
    pub fn slot_count(&self) -> u32 {
        self.header().slot_count
    }

    /// Returns the number of live records.
    pub fn live_count(&self) -> usize {
        self.view().live_count()
    }

    /// Returns the number of tombstoned slots.
    pub fn tombstone_count(&self) -> usize {
        self.view().tombstone_count()
    }

    /// Returns the largest record this page can ever hold.
    #[inline]
    pub fn max_record_len(&self) -> usize {
        validate::max_record_len(self.capacity())
    }

    /// Returns the contiguous free space between directory and heap.
    #[inline]
    pub fn free_space(&self) -> usize {
        self.header().free_space()
    }

    /// Returns the heap bytes not held by any live record.
    pub fn reclaimable_space(&self) -> usize {
        self.view().reclaimable_space()
    }

    /// Returns the free space the page would have after compaction.
    pub fn total_free_space(&self) -> usize {
        self.view().total_free_space()
    }

    /// Returns true if a record of `length` bytes can be inserted now.
    pub fn can_fit(&self, length: usize) -> bool {
        self.view().can_fit(length)
    }

    /// Returns true if a record of `length` bytes could be inserted after
    /// a compaction.
    pub fn can_fit_after_compaction(&self, length: usize) -> bool {
        self.view().can_fit_after_compaction(length)
    }

    /// Returns the fill ratio of the page (0.0 to 1.0).
    pub fn fill_ratio(&self) -> f64 {
        self.view().fill_ratio()
    }

    /// Runs a full consistency check of the page.
    ///
    /// # Errors
    ///
    /// Returns `Corrupted` describing the first violation found.
    pub fn verify(&self) -> SlotResult<()> {
        self.view().verify()
    }

    // =========================================================================
    // Private helpers
    // =========================================================================

    /// Writes a slot descriptor.
    pub(super) fn write_slot(&mut self, slot_id: SlotId, slot: SlotDescriptor) {
        self.buffer.write(descriptor_offset(slot_id), &slot.encode());
    }

    pub(super) fn buffer(&self) -> &B {
        self.buffer
    }

    pub(super) fn buffer_mut(&mut self) -> &mut B {
        self.buffer
    }
}

impl<B: Buffer + ?Sized> std::fmt::Debug for SlottedPage<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlottedPage")
            .field("capacity", &self.capacity())
            .field("header", &self.header())
            .finish()
    }
}

/// Read-only slotted page view.
pub struct SlottedPageRef<'a, B: Buffer + ?Sized> {
    buffer: &'a B,
}

impl<B: Buffer + ?Sized> Clone for SlottedPageRef<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Buffer + ?Sized> Copy for SlottedPageRef<'_, B> {}

impl<'a, B: Buffer + ?Sized> SlottedPageRef<'a, B> {
    /// Opens a read-only view of a buffer that already holds a page.
    ///
    /// # Errors
    ///
    /// Returns `Corrupted` if the header is inconsistent with the buffer.
    pub fn open(buffer: &'a B) -> SlotResult<Self> {
        validate::load_header(buffer)?;
        Ok(Self { buffer })
    }

    /// Returns the decoded page header.
    #[inline]
    pub fn header(&self) -> PageHeader {
        PageHeader::read_from(self.buffer)
    }

    /// Returns the page capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Returns the number of slots, live or tombstoned.
    #[inline]
    pub fn slot_count(&self) -> u32 {
        self.header().slot_count
    }

    /// Returns the descriptor of a slot, live or tombstoned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSlot` if the slot id is past the directory.
    pub fn slot(&self, slot_id: SlotId) -> SlotResult<SlotDescriptor> {
        let slot_count = self.slot_count();
        if slot_id >= slot_count {
            return Err(SlotError::InvalidSlot {
                slot_id,
                slot_count,
            });
        }
        Ok(validate::read_descriptor(self.buffer, slot_id))
    }

    /// Returns the bytes of a live record.
    ///
    /// # Errors
    ///
    /// - `InvalidSlot` if the slot id is past the directory
    /// - `DeletedRecord` if the slot is tombstoned
    /// - `Corrupted` if the descriptor points outside the record heap
    pub fn read(&self, slot_id: SlotId) -> SlotResult<&'a [u8]> {
        let header = self.header();
        let slot = validate::live_slot(&*self.buffer, &header, slot_id)?;
        Ok(self
            .buffer
            .read(slot.record_offset as usize, slot.record_length as usize))
    }

    /// Returns an iterator over all live records in slot id order.
    ///
    /// Slots whose descriptors fail validation are skipped; use
    /// [`verify`](Self::verify) to surface them.
    pub fn records(&self) -> impl Iterator<Item = RecordRef<'a>> + 'a {
        let page = *self;
        (0..page.slot_count()).filter_map(move |slot_id| match page.read(slot_id) {
            Ok(data) => Some(RecordRef { slot_id, data }),
            Err(SlotError::DeletedRecord { .. }) => None,
            Err(err) => {
                warn!(slot_id, error = %err, "skipping unreadable slot");
                None
            }
        })
    }

    /// Returns the number of live records.
    pub fn live_count(&self) -> usize {
        self.descriptors().filter(|slot| !slot.is_tombstoned()).count()
    }

    /// Returns the number of tombstoned slots.
    pub fn tombstone_count(&self) -> usize {
        self.descriptors().filter(SlotDescriptor::is_tombstoned).count()
    }

    /// Returns the total length of all live records.
    pub fn live_bytes(&self) -> usize {
        self.descriptors()
            .filter(|slot| !slot.is_tombstoned())
            .map(|slot| slot.record_length as usize)
            .sum()
    }

    /// Returns the contiguous free space between directory and heap.
    #[inline]
    pub fn free_space(&self) -> usize {
        self.header().free_space()
    }

    /// Returns the heap bytes not held by any live record: tombstoned
    /// records and tails left behind by in-place shrinking updates.
    pub fn reclaimable_space(&self) -> usize {
        self.header()
            .heap_size(self.capacity())
            .saturating_sub(self.live_bytes())
    }

    /// Returns the free space the page would have after compaction.
    pub fn total_free_space(&self) -> usize {
        self.free_space() + self.reclaimable_space()
    }

    /// Returns true if a record of `length` bytes can be inserted now.
    pub fn can_fit(&self, length: usize) -> bool {
        self.fits_within(length, self.free_space())
    }

    /// Returns true if a record of `length` bytes could be inserted after
    /// a compaction.
    pub fn can_fit_after_compaction(&self, length: usize) -> bool {
        self.fits_within(length, self.total_free_space())
    }

    /// Returns the fill ratio of the page (0.0 to 1.0): live record bytes
    /// plus directory bytes over everything past the header.
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_ratio(&self) -> f64 {
        let header = self.header();
        let usable = self.capacity() - slotdb_common::constants::PAGE_HEADER_SIZE;
        let used = self.live_bytes() + header.slot_count as usize * SLOT_DESCRIPTOR_SIZE;
        used as f64 / usable as f64
    }

    /// Returns true if the share of reclaimable heap bytes exceeds
    /// `threshold`.
    #[allow(clippy::cast_precision_loss)]
    pub fn should_compact(&self, threshold: f64) -> bool {
        let heap = self.header().heap_size(self.capacity());
        if heap == 0 {
            return false;
        }
        self.reclaimable_space() as f64 / heap as f64 > threshold
    }

    /// Runs a full consistency check of the page.
    ///
    /// # Errors
    ///
    /// Returns `Corrupted` describing the first violation found.
    pub fn verify(&self) -> SlotResult<()> {
        validate::verify_page(self.buffer)
    }

    fn fits_within(&self, length: usize, space: usize) -> bool {
        length > 0
            && length <= validate::max_record_len(self.capacity())
            && space >= length + SLOT_DESCRIPTOR_SIZE
    }

    fn descriptors(&self) -> impl Iterator<Item = SlotDescriptor> + 'a {
        let buffer = self.buffer;
        (0..self.slot_count()).map(move |slot_id| validate::read_descriptor(buffer, slot_id))
    }
}

impl<B: Buffer + ?Sized> std::fmt::Debug for SlottedPageRef<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlottedPageRef")
            .field("capacity", &self.capacity())
            .field("header", &self.header())
            .finish()
    }
}
