//! Error handling for slotdb.
//!
//! This module provides the unified error type and result alias used by
//! every page operation.

mod page;

pub use page::{ErrorCode, SlotError};

/// Result type alias for slotdb operations.
pub type SlotResult<T> = std::result::Result<T, SlotError>;
