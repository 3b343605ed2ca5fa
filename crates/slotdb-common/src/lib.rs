//! # slotdb-common
//!
//! Common types, errors, and configuration for slotdb.
//!
//! This crate provides the foundational pieces shared by the page, buffer
//! and CLI crates:
//!
//! - **Types**: page and slot identifiers
//! - **Errors**: the unified `SlotError` with stable error codes
//! - **Config**: `PageConfig`, loadable from any serde format
//! - **Constants**: on-page layout sizes and page size limits
//!
//! ## Example
//!
//! ```rust
//! use slotdb_common::error::{SlotError, SlotResult};
//! use slotdb_common::types::PageId;
//!
//! fn lookup(slot_id: u32, slot_count: u32) -> SlotResult<()> {
//!     if slot_id >= slot_count {
//!         return Err(SlotError::InvalidSlot { slot_id, slot_count });
//!     }
//!     Ok(())
//! }
//!
//! assert!(lookup(3, 2).is_err());
//! assert_eq!(PageId::new(7).as_u64(), 7);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::PageConfig;
pub use constants::*;
pub use error::{ErrorCode, SlotError, SlotResult};
pub use types::{PageId, SlotId};
