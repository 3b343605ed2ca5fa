//! Configuration structures for slotdb.

mod page;

pub use page::PageConfig;
