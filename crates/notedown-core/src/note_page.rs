//! Note page model
//!
//! One `NotePage` per document in the source archive, mapped 1:1 to one
//! output file. The page is constructed from a single archive record, then
//! mutated by its owning [`crate::Notebook`] (title deduplication) and by the
//! conversion driver (output filename and folder assignment) before any
//! content processing starts.

use crate::attachment::Attachment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotePage {
    /// Archive-assigned note id
    pub id: String,
    /// Display title, renamed on duplicate detection within a notebook
    pub title: String,
    /// Title as exported, immutable; inter-note links match against this
    pub original_title: String,
    /// Creation time, epoch seconds
    pub ctime: i64,
    /// Modification time, epoch seconds
    pub mtime: i64,
    /// Raw note body: HTML with proprietary embedded markup
    pub raw_content: String,
    /// Tags as exported, untransformed
    pub tags: Vec<String>,
    /// Owning notebook id
    pub notebook_id: String,
    /// Notebook folder name, assigned when the page is adopted by a notebook
    pub notebook_folder: String,
    /// Output filename, assigned by the driver after title deduplication
    pub file_name: String,
    /// Attachments owned by this note, archive order
    pub attachments: Vec<Attachment>,
}

impl NotePage {
    /// Build a page from one archive record. Output naming fields start empty
    /// and are filled in by the notebook and the driver.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        ctime: i64,
        mtime: i64,
        raw_content: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        let title = title.into();
        Self {
            id: id.into(),
            original_title: title.clone(),
            title,
            ctime,
            mtime,
            raw_content: raw_content.into(),
            tags,
            notebook_id: String::new(),
            notebook_folder: String::new(),
            file_name: String::new(),
            attachments: Vec::new(),
        }
    }

    /// Relative path of this note inside the export tree
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.notebook_folder, self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_preserves_original_title() {
        let mut page = NotePage::new("n1", "Plans", 0, 0, "<p>hi</p>", vec![]);
        page.title = "Plans-1".to_string();
        assert_eq!(page.original_title, "Plans");
        assert_eq!(page.title, "Plans-1");
    }

    #[test]
    fn test_relative_path() {
        let mut page = NotePage::new("n1", "Plans", 0, 0, "", vec![]);
        page.notebook_folder = "work".to_string();
        page.file_name = "plans.md".to_string();
        assert_eq!(page.relative_path(), "work/plans.md");
    }
}
