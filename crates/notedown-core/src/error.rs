//! Error types for the core collaborator traits

use std::path::PathBuf;
use thiserror::Error;

/// Content writer error type
#[derive(Error, Debug)]
pub enum WriteError {
    /// The target path could not be written
    #[error("Failed to write '{path}': {source}")]
    Io {
        /// Path that failed to write
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The target path is not representable on this filesystem
    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Markup converter error type
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The converter binary could not be found or probed
    #[error("External converter unavailable: {0}")]
    Unavailable(String),

    /// The converter exited with a non-zero status
    #[error("Conversion failed (exit status {status}): {stderr}")]
    Failed {
        /// Process exit status code, -1 when unknown
        status: i32,
        /// Captured stderr output
        stderr: String,
    },

    /// The converter did not finish within the bounded wait
    #[error("Conversion timed out after {0} seconds")]
    TimedOut(u64),

    /// I/O failure while talking to the converter process
    #[error("Converter I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The converter produced output that is not valid UTF-8
    #[error("Converter produced non-UTF-8 output")]
    InvalidOutput,
}
