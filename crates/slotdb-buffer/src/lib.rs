//! # slotdb-buffer
//!
//! Byte storage for slotdb pages.
//!
//! A slotted page never owns its bytes. It borrows something implementing
//! [`Buffer`] for the duration of each call. This crate provides:
//!
//! - **Buffer**: the `read`/`write`/`capacity` contract pages are written against
//! - **ByteBuffer**: an owned, zero-initialised, resizable buffer
//! - **PageArena**: one allocation carved into fixed-size page regions
//! - **PageFrame**: a page buffer behind a reader/writer latch

#![warn(missing_docs)]
#![warn(clippy::all)]

mod arena;
mod buffer;
mod byte_buffer;
mod error;
mod frame;

pub use arena::{PageArena, PageRegion};
pub use buffer::Buffer;
pub use byte_buffer::ByteBuffer;
pub use error::{BufferError, BufferResult};
pub use frame::PageFrame;
