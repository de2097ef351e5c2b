//! Serde record types for the archive's JSON entries

use serde::Deserialize;
use std::collections::BTreeMap;

/// `config.json`: the archive's table of contents
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// Notebook record ids, archive enumeration order
    #[serde(default)]
    pub notebook: Vec<String>,
    /// Note record ids, archive enumeration order
    #[serde(default)]
    pub note: Vec<String>,
}

/// One notebook record
#[derive(Debug, Clone, Deserialize)]
pub struct NotebookRecord {
    /// Exported title; absent for the root/unfiled bucket
    pub title: Option<String>,
}

/// One note record
#[derive(Debug, Clone, Deserialize)]
pub struct NoteRecord {
    pub title: Option<String>,
    #[serde(default)]
    pub ctime: i64,
    #[serde(default)]
    pub mtime: i64,
    /// Owning notebook id; an id not present in the archive puts the note
    /// into the recycle-bin bucket
    pub parent_id: Option<String>,
    /// Raw note body: HTML with proprietary embedded markup
    pub content: Option<String>,
    #[serde(default)]
    pub tag: Vec<String>,
    /// Attachment records keyed by archive-assigned attachment id; exported
    /// as JSON `null` when the note has none. BTreeMap keeps archive-stable
    /// iteration order.
    #[serde(default)]
    pub attachment: Option<BTreeMap<String, AttachmentRecord>>,
}

/// One attachment entry inside a note record
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentRecord {
    /// Content hash; also the payload locator (`file_<md5>`)
    pub md5: Option<String>,
    /// Declared filename
    pub name: String,
    /// MIME type
    #[serde(rename = "type")]
    pub mime: Option<String>,
    /// Reference token matching `<img ref="...">` tags in the note body
    #[serde(rename = "ref")]
    pub ref_token: Option<String>,
    #[serde(default)]
    pub size: u64,
}

impl AttachmentRecord {
    /// Logical name of this attachment's payload inside the archive
    pub fn payload_locator(&self) -> Option<String> {
        self.md5.as_ref().map(|md5| format!("file_{}", md5))
    }

    /// Whether the declared MIME type marks this as an image
    pub fn is_image(&self) -> bool {
        self.mime
            .as_deref()
            .is_some_and(|m| m.starts_with("image/"))
    }
}
