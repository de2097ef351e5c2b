//! Filesystem-backed content writer

use notedown_core::{ContentWriter, WriteError};
use std::path::Path;

/// Writes note content and attachment payloads straight to disk
pub struct FsWriter;

impl FsWriter {
    fn io(path: &Path, source: std::io::Error) -> WriteError {
        WriteError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ContentWriter for FsWriter {
    fn store_text(&self, path: &Path, content: &str) -> Result<(), WriteError> {
        std::fs::write(path, content).map_err(|e| Self::io(path, e))
    }

    fn store_bytes(&self, path: &Path, content: &[u8]) -> Result<(), WriteError> {
        std::fs::write(path, content).map_err(|e| Self::io(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), WriteError> {
        std::fs::create_dir_all(path).map_err(|e| Self::io(path, e))
    }
}
