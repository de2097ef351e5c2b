//! Process-wide conversion summary
//!
//! Counters reported at the end of a run. Single-threaded by design; would
//! need synchronization if conversion were ever parallelized.

use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub notebooks: usize,
    pub pages: usize,
    pub images: usize,
    pub attachments: usize,
    /// Notes whose external conversion failed and got the error sentinel body
    pub failed_pages: usize,
    /// Inter-note links that could not be resolved
    pub unresolved_links: usize,
}

impl ConversionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another summary (for example from one archive) into this one
    pub fn merge(&mut self, other: &ConversionSummary) {
        self.notebooks += other.notebooks;
        self.pages += other.pages;
        self.images += other.images;
        self.attachments += other.attachments;
        self.failed_pages += other.failed_pages;
        self.unresolved_links += other.unresolved_links;
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} notebooks, {} pages, {} images, {} attachments",
            self.notebooks, self.pages, self.images, self.attachments
        )?;
        if self.failed_pages > 0 {
            write!(f, ", {} pages failed conversion", self.failed_pages)?;
        }
        if self.unresolved_links > 0 {
            write!(f, ", {} unresolved links", self.unresolved_links)?;
        }
        Ok(())
    }
}
