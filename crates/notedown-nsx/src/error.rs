//! Error types for archive reading

use std::path::PathBuf;
use thiserror::Error;

/// NSX archive error type
#[derive(Error, Debug)]
pub enum NsxError {
    /// The archive file could not be opened or is not a valid zip
    #[error("Cannot open archive '{path}': {reason}")]
    Open {
        /// Archive path
        path: PathBuf,
        /// Why it failed
        reason: String,
    },

    /// A logical name listed in the archive config is absent
    #[error("Archive entry '{0}' not found")]
    MissingEntry(String),

    /// An entry could not be read out of the container
    #[error("Failed to read archive entry '{entry}': {source}")]
    Read {
        /// Logical entry name
        entry: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// An entry is not the JSON record it should be
    #[error("Invalid JSON in archive entry '{entry}': {source}")]
    Json {
        /// Logical entry name
        entry: String,
        /// Underlying parse error
        source: serde_json::Error,
    },
}

/// Result type for archive operations
pub type NsxResult<T> = Result<T, NsxError>;
