//! # slotdb-page
//!
//! Slotted page record store for slotdb.
//!
//! This crate packs variable-length records into one fixed-size buffer and
//! hands out page-relative slot ids that stay valid while other records are
//! inserted, updated, deleted, or compacted:
//!
//! - Inserts never move existing records
//! - Deletes only tombstone a slot; space is reclaimed lazily
//! - Compaction is explicit and never renumbers a slot

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Page layout and record operations
pub mod page;

pub use page::{
    CompactionStats, PageHeader, RecordRef, SlotDescriptor, SlottedPage, SlottedPageRef,
    UpdateOutcome,
};
pub use slotdb_common::{SlotError, SlotId, SlotResult};
