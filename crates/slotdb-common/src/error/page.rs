//! Page error types.
//!
//! Every failing page operation reports one of these variants synchronously.
//! None of them is retried internally, and a failed operation leaves the
//! page bytes exactly as they were before the call.

use std::fmt;
use thiserror::Error;

use crate::types::SlotId;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Invalid configuration.
    InvalidConfig = 0x0001,

    // Slot errors (0x0100 - 0x01FF)
    /// Slot id outside the slot directory.
    InvalidSlot = 0x0100,
    /// Slot id refers to a tombstoned slot.
    DeletedRecord = 0x0101,

    // Record errors (0x0200 - 0x02FF)
    /// Record length is zero or larger than the page can ever hold.
    InvalidLength = 0x0200,
    /// Not enough contiguous free space for the write.
    CapacityExceeded = 0x0201,

    // Page errors (0x0300 - 0x03FF)
    /// Page bytes violate the layout invariants.
    Corrupted = 0x0300,
    /// Buffer cannot hold a page.
    BufferTooSmall = 0x0301,
    /// Buffer is larger than the page format can address.
    BufferTooLarge = 0x0302,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Slot",
            0x02 => "Record",
            0x03 => "Page",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The error type for slotted page operations.
///
/// # Example
///
/// ```rust
/// use slotdb_common::error::{ErrorCode, SlotError};
///
/// let err = SlotError::DeletedRecord { slot_id: 3 };
/// assert_eq!(err.code(), ErrorCode::DeletedRecord);
/// assert_eq!(err.to_string(), "slot 3 refers to a deleted record");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    // ==========================================================================
    // Slot Errors
    // ==========================================================================
    /// Slot id is not in the current slot directory.
    #[error("slot {slot_id} out of range, page has {slot_count} slots")]
    InvalidSlot {
        /// The requested slot id.
        slot_id: SlotId,
        /// Number of slots in the directory.
        slot_count: u32,
    },

    /// Slot id refers to a tombstoned slot.
    #[error("slot {slot_id} refers to a deleted record")]
    DeletedRecord {
        /// The requested slot id.
        slot_id: SlotId,
    },

    // ==========================================================================
    // Record Errors
    // ==========================================================================
    /// Payload is empty or exceeds the page's addressable heap.
    #[error("invalid record length {length}, must be between 1 and {max}")]
    InvalidLength {
        /// Length of the rejected payload.
        length: usize,
        /// Largest record the page can hold.
        max: usize,
    },

    /// Not enough contiguous free space for the requested write.
    #[error("page capacity exceeded: {required} bytes required, {available} available")]
    CapacityExceeded {
        /// Contiguous bytes the write needs.
        required: usize,
        /// Contiguous free bytes currently available.
        available: usize,
    },

    // ==========================================================================
    // Page Errors
    // ==========================================================================
    /// Page bytes are not a consistent slotted page.
    #[error("page is corrupted: {reason}")]
    Corrupted {
        /// What was inconsistent.
        reason: String,
    },

    /// Buffer is too small to hold a page.
    #[error("buffer of {capacity} bytes is too small for a page, need at least {min}")]
    BufferTooSmall {
        /// Capacity of the buffer.
        capacity: usize,
        /// Minimum page capacity.
        min: usize,
    },

    /// Buffer is larger than a `u32` offset can address.
    #[error("buffer of {capacity} bytes exceeds the addressable page size")]
    BufferTooLarge {
        /// Capacity of the buffer.
        capacity: usize,
    },

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    Config {
        /// Error message.
        message: String,
    },
}

impl SlotError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidSlot { .. } => ErrorCode::InvalidSlot,
            Self::DeletedRecord { .. } => ErrorCode::DeletedRecord,
            Self::InvalidLength { .. } => ErrorCode::InvalidLength,
            Self::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            Self::Corrupted { .. } => ErrorCode::Corrupted,
            Self::BufferTooSmall { .. } => ErrorCode::BufferTooSmall,
            Self::BufferTooLarge { .. } => ErrorCode::BufferTooLarge,
            Self::Config { .. } => ErrorCode::InvalidConfig,
        }
    }

    /// Returns true if the caller may succeed by compacting and retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }

    /// Returns true if the page bytes themselves are unusable.
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self, Self::Corrupted { .. })
    }

    /// Creates a corruption error.
    #[must_use]
    pub fn corrupted(reason: impl Into<String>) -> Self {
        Self::Corrupted {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
