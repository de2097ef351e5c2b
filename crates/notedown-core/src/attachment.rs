//! Attachment model
//!
//! One `Attachment` per embedded file, image, or generated chart artifact.
//! The attachment derives its clean output filename at construction time and
//! renders the HTML embed snippet appropriate to its kind. Payload bytes are
//! either a locator into the source archive or generated content (chart
//! images and CSV files).

use crate::sanitize::clean_filename;
use serde::{Deserialize, Serialize};

/// What kind of payload this is and which embed syntax it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentKind {
    /// Embedded image, referenced from the note body by content hash
    Image,
    /// Generic file, linked rather than embedded
    File,
    /// Rendered chart image, generated during conversion
    ChartImage,
    /// Chart data exported as CSV, generated during conversion
    ChartCsv,
}

/// Where the attachment's bytes come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AttachmentPayload {
    /// Logical name of the payload inside the source archive
    ArchiveRef(String),
    /// Generated binary content
    Bytes(Vec<u8>),
    /// Generated text content
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    /// Name as declared in the archive (or synthesized for chart artifacts)
    pub declared_name: String,
    /// Clean, collision-free output filename
    pub file_name: String,
    /// Content-hash token matching `<img ref="...">` tags in the note body
    pub ref_token: Option<String>,
    pub payload: AttachmentPayload,
}

impl Attachment {
    pub fn new(
        kind: AttachmentKind,
        declared_name: impl Into<String>,
        ref_token: Option<String>,
        payload: AttachmentPayload,
    ) -> Self {
        let declared_name = declared_name.into();
        let file_name = clean_filename(&declared_name);
        Self {
            kind,
            declared_name,
            file_name,
            ref_token,
            payload,
        }
    }

    /// Path relative to the owning notebook's folder
    pub fn notebook_relative_path(&self, attachment_folder: &str) -> String {
        format!("{}/{}", attachment_folder, self.file_name)
    }

    /// HTML embed snippet for this attachment, by kind
    pub fn html_link(&self, attachment_folder: &str) -> String {
        let rel = self.notebook_relative_path(attachment_folder);
        match self.kind {
            AttachmentKind::Image | AttachmentKind::ChartImage => {
                format!("<img src=\"{}\">", rel)
            }
            AttachmentKind::File | AttachmentKind::ChartCsv => {
                format!("<a href=\"{}\">{}</a>", rel, self.declared_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_cleaned_on_construction() {
        let att = Attachment::new(
            AttachmentKind::Image,
            "Holiday Photo.PNG",
            Some("abc123".to_string()),
            AttachmentPayload::ArchiveRef("file_abc123".to_string()),
        );
        assert_eq!(att.file_name, "holiday-photo.png");
        assert_eq!(att.declared_name, "Holiday Photo.PNG");
    }

    #[test]
    fn test_image_embed_snippet() {
        let att = Attachment::new(
            AttachmentKind::Image,
            "pic.png",
            None,
            AttachmentPayload::Bytes(vec![]),
        );
        assert_eq!(
            att.html_link("attachments"),
            "<img src=\"attachments/pic.png\">"
        );
    }

    #[test]
    fn test_file_embed_snippet() {
        let att = Attachment::new(
            AttachmentKind::File,
            "Budget 2024.xlsx",
            None,
            AttachmentPayload::ArchiveRef("file_def".to_string()),
        );
        assert_eq!(
            att.html_link("attachments"),
            "<a href=\"attachments/budget-2024.xlsx\">Budget 2024.xlsx</a>"
        );
    }
}
