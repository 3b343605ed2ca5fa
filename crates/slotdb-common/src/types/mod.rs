//! Core identifier types for slotdb.

mod ids;

pub use ids::{PageId, SlotId};
