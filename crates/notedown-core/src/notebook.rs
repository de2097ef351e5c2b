//! Notebook model
//!
//! A notebook groups note pages under a title-derived output folder. Sibling
//! note titles are deduplicated at adoption time with an incrementing numeric
//! suffix: the first page seen (archive order) keeps the base title, later
//! duplicates become `title-1`, `title-2`, and so on.

use crate::note_page::NotePage;
use crate::sanitize::folder_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserved synthetic notebook id collecting notes whose parent notebook is
/// absent from the archive (the recycle-bin-equivalent bucket).
pub const RECYCLE_BIN_ID: &str = "recycle-bin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    /// Archive-assigned notebook id, or [`RECYCLE_BIN_ID`]
    pub id: String,
    /// Notebook title as exported
    pub title: String,
    /// Output folder name, deduplicated against sibling notebooks
    pub folder_name: String,
    /// Owned pages, archive enumeration order
    pub pages: Vec<NotePage>,
    /// Duplicate counter per original title
    title_counts: HashMap<String, u32>,
}

impl Notebook {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        let folder = folder_name(&title);
        Self {
            id: id.into(),
            title,
            folder_name: folder,
            pages: Vec::new(),
            title_counts: HashMap::new(),
        }
    }

    /// The synthetic bucket for orphaned/unreachable notes
    pub fn recycle_bin() -> Self {
        Self::new(RECYCLE_BIN_ID, "Recycle bin")
    }

    /// Adopt a page: assign ownership fields and deduplicate its title
    /// against pages already in this notebook.
    pub fn add_page(&mut self, mut page: NotePage) {
        page.notebook_id = self.id.clone();
        page.notebook_folder = self.folder_name.clone();

        let count = self
            .title_counts
            .entry(page.original_title.clone())
            .or_insert(0);
        if *count > 0 {
            let mut suffixed = format!("{}-{}", page.original_title, count);
            // A user-authored title may already occupy the suffixed form;
            // keep bumping until the title is free.
            while self.pages.iter().any(|p| p.title == suffixed) {
                *count += 1;
                suffixed = format!("{}-{}", page.original_title, count);
            }
            page.title = suffixed;
        }
        *count += 1;

        self.pages.push(page);
    }
}
