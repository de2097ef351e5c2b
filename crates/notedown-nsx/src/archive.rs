//! Zip-backed archive access

use crate::error::{NsxError, NsxResult};
use crate::records::ArchiveConfig;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// Logical name of the archive's table of contents
const CONFIG_ENTRY: &str = "config.json";

/// An opened `.nsx` archive
#[derive(Debug)]
pub struct NsxArchive {
    path: PathBuf,
    zip: ZipArchive<File>,
}

impl NsxArchive {
    /// Open an archive file. Failure to open is fatal to the run.
    pub fn open(path: &Path) -> NsxResult<Self> {
        let file = File::open(path).map_err(|e| NsxError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let zip = ZipArchive::new(file).map_err(|e| NsxError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("Opened archive {} ({} entries)", path.display(), zip.len());
        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    /// Path this archive was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the archive's table of contents
    pub fn config(&mut self) -> NsxResult<ArchiveConfig> {
        self.read_json(CONFIG_ENTRY)
    }

    /// Read a JSON record by logical name
    pub fn read_json<T: DeserializeOwned>(&mut self, name: &str) -> NsxResult<T> {
        let bytes = self.read_bytes(name)?;
        serde_json::from_slice(&bytes).map_err(|e| NsxError::Json {
            entry: name.to_string(),
            source: e,
        })
    }

    /// Read a binary payload by logical name
    pub fn read_bytes(&mut self, name: &str) -> NsxResult<Vec<u8>> {
        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(NsxError::MissingEntry(name.to_string())),
            Err(e) => {
                return Err(NsxError::Read {
                    entry: name.to_string(),
                    source: std::io::Error::other(e),
                })
            }
        };
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes).map_err(|e| NsxError::Read {
            entry: name.to_string(),
            source: e,
        })?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_test_archive(entries: &[(&str, &[u8])]) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = ZipWriter::new(file.reopen().unwrap());
        for (name, bytes) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
        file
    }

    #[test]
    fn test_open_missing_archive() {
        let err = NsxArchive::open(Path::new("/nonexistent/export.nsx")).unwrap_err();
        assert!(matches!(err, NsxError::Open { .. }));
    }

    #[test]
    fn test_open_non_zip_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a zip archive").unwrap();
        let err = NsxArchive::open(file.path()).unwrap_err();
        assert!(matches!(err, NsxError::Open { .. }));
    }

    #[test]
    fn test_read_config_and_records() {
        let file = write_test_archive(&[
            (
                "config.json",
                br#"{"notebook": ["nb1"], "note": ["n1"]}"# as &[u8],
            ),
            ("nb1", br#"{"title": "Work"}"#),
            ("file_abc", b"\x89PNG payload"),
        ]);
        let mut archive = NsxArchive::open(file.path()).unwrap();

        let config = archive.config().unwrap();
        assert_eq!(config.notebook, vec!["nb1"]);
        assert_eq!(config.note, vec!["n1"]);

        let nb: crate::records::NotebookRecord = archive.read_json("nb1").unwrap();
        assert_eq!(nb.title.as_deref(), Some("Work"));

        let payload = archive.read_bytes("file_abc").unwrap();
        assert_eq!(payload, b"\x89PNG payload");
    }

    #[test]
    fn test_missing_entry_is_distinguishable() {
        let file = write_test_archive(&[("config.json", br#"{}"# as &[u8])]);
        let mut archive = NsxArchive::open(file.path()).unwrap();
        let err = archive.read_bytes("file_missing").unwrap_err();
        assert!(matches!(err, NsxError::MissingEntry(ref name) if name == "file_missing"));
    }

    #[test]
    fn test_invalid_json_entry() {
        let file = write_test_archive(&[("n1", b"not json" as &[u8])]);
        let mut archive = NsxArchive::open(file.path()).unwrap();
        let err = archive.read_json::<crate::records::NoteRecord>("n1").unwrap_err();
        assert!(matches!(err, NsxError::Json { .. }));
    }
}
