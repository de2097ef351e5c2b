//! Collaborator traits
//!
//! The pipeline treats content persistence and markup conversion as injected
//! collaborators so the conversion logic can be exercised with in-memory
//! doubles in tests.

use crate::error::{ConvertError, WriteError};
use std::path::Path;

/// Persists final note content and attachment payloads.
///
/// Write failures are reported to the caller, which logs them and continues;
/// a failed attachment never aborts the run.
pub trait ContentWriter {
    /// Store text content at the given path
    fn store_text(&self, path: &Path, content: &str) -> Result<(), WriteError>;

    /// Store binary content at the given path
    fn store_bytes(&self, path: &Path, content: &[u8]) -> Result<(), WriteError>;

    /// Probe whether a path already exists, used for filename collision
    /// avoidance before writing
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and its parents
    fn create_dir_all(&self, path: &Path) -> Result<(), WriteError>;
}

/// Opaque text-in/text-out markup transformation.
///
/// The real implementation shells out to pandoc; tests substitute an identity
/// or canned-output double.
pub trait MarkupConverter {
    /// Convert `input` from the named input format to the named output format
    fn convert(&self, input: &str, from: &str, to: &str) -> Result<String, ConvertError>;

    /// Probe converter availability once per run. Unavailability is fatal.
    fn check_available(&self) -> Result<(), ConvertError>;
}
