//! Page configuration.
//!
//! `PageConfig` is plain serde data so it can be embedded in any
//! configuration file format; the CLI reads it from a TOML `[page]` table.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ARENA_PAGES, DEFAULT_COMPACTION_THRESHOLD, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
    MIN_PAGE_SIZE,
};
use crate::error::{SlotError, SlotResult};

/// Configuration for slotted pages and the arenas that hold them.
///
/// # Example
///
/// ```rust
/// use slotdb_common::config::PageConfig;
///
/// let config = PageConfig::default().with_page_size(4096).with_pages(4);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.arena_size(), 16 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Size of each page in bytes.
    /// Default: 8192 (8 KB)
    pub page_size: usize,

    /// Number of page regions in an arena.
    /// Default: 16
    pub pages: usize,

    /// Fraction of heap bytes that may be reclaimable before a page
    /// reports that it should be compacted. Must be in (0.0, 1.0].
    /// Default: 0.25
    pub compaction_threshold: f64,

    /// Run a full consistency check whenever an existing page is opened.
    /// Default: false
    pub verify_on_open: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pages: DEFAULT_ARENA_PAGES,
            compaction_threshold: DEFAULT_COMPACTION_THRESHOLD,
            verify_on_open: false,
        }
    }
}

impl PageConfig {
    /// Creates a minimal configuration for testing.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            page_size: 256,
            pages: 4,
            verify_on_open: true,
            ..Default::default()
        }
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the number of arena pages.
    #[must_use]
    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    /// Sets the compaction threshold.
    #[must_use]
    pub fn with_compaction_threshold(mut self, threshold: f64) -> Self {
        self.compaction_threshold = threshold;
        self
    }

    /// Enables or disables verification on open.
    #[must_use]
    pub fn with_verify_on_open(mut self, enabled: bool) -> Self {
        self.verify_on_open = enabled;
        self
    }

    /// Returns the total number of bytes an arena built from this config holds.
    #[must_use]
    pub fn arena_size(&self) -> usize {
        self.page_size.saturating_mul(self.pages)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `SlotError::Config` describing the first invalid field.
    pub fn validate(&self) -> SlotResult<()> {
        if self.page_size < MIN_PAGE_SIZE {
            return Err(SlotError::config(format!(
                "page_size must be at least {MIN_PAGE_SIZE} bytes"
            )));
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(SlotError::config(format!(
                "page_size must be at most {MAX_PAGE_SIZE} bytes"
            )));
        }
        if self.pages == 0 {
            return Err(SlotError::config("pages must be > 0"));
        }
        if !(self.compaction_threshold > 0.0 && self.compaction_threshold <= 1.0) {
            return Err(SlotError::config(
                "compaction_threshold must be in (0.0, 1.0]",
            ));
        }
        Ok(())
    }
}
