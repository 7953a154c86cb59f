//! Error types for the TDVF tooling.
//!
//! All tools share one error enum; every error is fatal to the invoking
//! binary (no retry, no partial output).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for TDVF tool operations.
#[derive(Debug, Error)]
pub enum TdvfError {
    /// Malformed hexadecimal address string
    #[error("not a valid 64-bit hex address: {0:?}")]
    Format(String),

    /// No matching file, log line, section or table entry
    #[error("not found: {0}")]
    NotFound(String),

    /// Several debug files map to the same module name
    #[error("ambiguous debug file match for module {module}: {candidates:?}")]
    AmbiguousMatch {
        module: String,
        candidates: Vec<PathBuf>,
    },

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Module table (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ELF parsing errors from the object reader
    #[error("object parse error: {0}")]
    Object(#[from] object::read::Error),
}

/// Result type alias for TDVF tool operations
pub type Result<T> = std::result::Result<T, TdvfError>;
