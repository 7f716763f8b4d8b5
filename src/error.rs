//! Error types for the page store.
//!
//! This module defines all error types that can occur while converting, loading
//! and querying a page store. Spacing restoration has no error path.

use std::path::PathBuf;

/// Result type alias for page store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during conversion and queries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Requested page is outside the store or missing from it
    #[error("Page {page} not found (valid pages: 1-{max_page})")]
    NotFound {
        /// Requested page number
        page: u32,
        /// Highest page number in the store (0 for an empty store)
        max_page: u32,
    },

    /// Page range is reversed or exceeds the store
    #[error("Invalid page range {start}-{end}: {reason}")]
    InvalidRange {
        /// First page requested
        start: u32,
        /// Last page requested
        end: u32,
        /// Which constraint was violated
        reason: String,
    },

    /// A store line could not be turned into a page record
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number in the store file (0 when writing)
        line: usize,
        /// Reason the line was rejected
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output file could not be written
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Search keyword or pattern cannot be used
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The page extractor could not read the source document
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// No chapter with this number was detected
    #[error("Chapter {0} not found")]
    ChapterNotFound(u32),
}

impl Error {
    pub(crate) fn invalid_range(start: u32, end: u32, reason: impl Into<String>) -> Self {
        Error::InvalidRange {
            start,
            end,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = Error::NotFound {
            page: 900,
            max_page: 812,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("900"));
        assert!(msg.contains("1-812"));
    }

    #[test]
    fn test_invalid_range_error() {
        let err = Error::invalid_range(5, 3, "start is after end");
        let msg = format!("{}", err);
        assert!(msg.contains("5-3"));
        assert!(msg.contains("start is after end"));
    }

    #[test]
    fn test_malformed_record_error() {
        let err = Error::malformed(17, "text_length 4 does not match text (5 characters)");
        let msg = format!("{}", err);
        assert!(msg.contains("line 17"));
        assert!(msg.contains("text_length"));
    }

    #[test]
    fn test_write_error_names_path() {
        let err = Error::Write {
            path: PathBuf::from("/no/such/dir/out.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("/no/such/dir/out.txt"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
