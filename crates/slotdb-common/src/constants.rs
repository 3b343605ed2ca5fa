//! System-wide constants for slotdb.
//!
//! The layout constants are part of the on-page binary format and must not
//! change without changing every reader of that format.

// =============================================================================
// Page Layout Constants
// =============================================================================

/// Size of the page header in bytes.
///
/// The header contains: slot_count (4), free_space_start (4),
/// free_space_end (4), all little-endian `u32`.
pub const PAGE_HEADER_SIZE: usize = 12;

/// Size of one slot descriptor in the slot directory.
///
/// Each descriptor contains: record_offset (4), record_length (4),
/// tombstone flag (1).
pub const SLOT_DESCRIPTOR_SIZE: usize = 9;

/// Smallest buffer that can hold a page with a single one-byte record.
pub const MIN_PAGE_CAPACITY: usize = PAGE_HEADER_SIZE + SLOT_DESCRIPTOR_SIZE + 1;

/// Largest buffer a page can address; offsets are stored as `u32`.
pub const MAX_PAGE_CAPACITY: usize = u32::MAX as usize;

// =============================================================================
// Configuration Limits
// =============================================================================

/// Default page size in bytes (8 KB).
pub const DEFAULT_PAGE_SIZE: usize = 8 * 1024;

/// Minimum configurable page size in bytes.
pub const MIN_PAGE_SIZE: usize = 64;

/// Maximum configurable page size in bytes (1 MB).
pub const MAX_PAGE_SIZE: usize = 1024 * 1024;

/// Default number of page regions in an arena.
pub const DEFAULT_ARENA_PAGES: usize = 16;

/// Default fraction of reclaimable heap bytes above which a page
/// reports that it should be compacted.
pub const DEFAULT_COMPACTION_THRESHOLD: f64 = 0.25;
