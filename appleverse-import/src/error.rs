//! Error types for appleverse-import
//!
//! Only whole-run failures are errors. Per-file problems during a directory
//! scan and per-row insert failures are logged and counted instead.

use std::path::PathBuf;
use thiserror::Error;

/// Import pipeline error
#[derive(Debug, Error)]
pub enum ImportError {
    /// Source file or directory does not exist
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// File extension the reader cannot handle
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Source exists but could not be parsed
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// Every row lacked a cultivar name
    #[error("No usable rows in {}", .0.display())]
    NoUsableRows(PathBuf),

    /// Every insert failed; the previous catalogue was left in place
    #[error("No records were imported")]
    NothingImported,

    /// Background task failed to complete
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// appleverse-common error
    #[error("Common error: {0}")]
    Common(#[from] appleverse_common::Error),
}

impl ImportError {
    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        ImportError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;
