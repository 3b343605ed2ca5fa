//! Buffer errors.

use slotdb_common::types::PageId;
use slotdb_common::SlotError;
use thiserror::Error;

/// Result type for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur while carving or accessing page buffers.
#[derive(Debug, Error)]
#[allow(missing_docs)] // Fields are documented by variant docs
pub enum BufferError {
    /// Page id is outside the arena.
    #[error("page {page_id} out of range, arena has {pages} pages")]
    RegionOutOfRange { page_id: PageId, pages: usize },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl BufferError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<SlotError> for BufferError {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::Config { message } => Self::Config { message },
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BufferError::RegionOutOfRange {
            page_id: PageId::new(8),
            pages: 4,
        };
        assert_eq!(err.to_string(), "page 8 out of range, arena has 4 pages");
    }

    #[test]
    fn test_from_config_error() {
        let err: BufferError = SlotError::config("pages must be > 0").into();
        assert!(matches!(err, BufferError::Config { message } if message == "pages must be > 0"));
    }
}
