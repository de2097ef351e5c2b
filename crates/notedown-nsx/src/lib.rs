//! NSX archive reader
//!
//! An `.nsx` export is a zip container holding one JSON record per notebook
//! and note (named by their archive-assigned ids), a `config.json` listing
//! those ids, and binary attachment payloads under `file_<md5>` names. This
//! crate extracts records and payloads by logical name; it knows nothing
//! about conversion.

pub mod archive;
pub mod error;
pub mod records;

pub use archive::NsxArchive;
pub use error::{NsxError, NsxResult};
pub use records::{ArchiveConfig, AttachmentRecord, NoteRecord, NotebookRecord};
