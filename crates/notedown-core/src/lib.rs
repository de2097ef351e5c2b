//! Notedown core data model
//!
//! This crate holds the domain model shared by every other notedown crate:
//! - Note pages, notebooks, and attachments extracted from an archive
//! - Filename sanitization with collision disambiguation
//! - Collaborator traits for the pieces treated as external (content writing,
//!   markup conversion)
//! - The process-wide conversion summary

pub mod attachment;
pub mod error;
pub mod note_page;
pub mod notebook;
pub mod sanitize;
pub mod summary;
pub mod traits;

pub use attachment::{Attachment, AttachmentKind, AttachmentPayload};
pub use error::{ConvertError, WriteError};
pub use note_page::NotePage;
pub use notebook::{Notebook, RECYCLE_BIN_ID};
pub use sanitize::{clean_filename, disambiguate, folder_name};
pub use summary::ConversionSummary;
pub use traits::{ContentWriter, MarkupConverter};
