//! Output dialect and input format tables
//!
//! The output dialect table is the behavioral contract of the converter:
//! each dialect maps to a pandoc target format and implies its own
//! post-processing. `obsidian` and `q_own_notes`/`gfm` share the `gfm`
//! pandoc target but diverge afterwards (obsidian rewrites image links to
//! the `![|width](path)` form).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported output dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputDialect {
    QOwnNotes,
    Gfm,
    Obsidian,
    Commonmark,
    PandocMarkdown,
    PandocMarkdownStrict,
    Multimarkdown,
    Html,
}

impl OutputDialect {
    /// Every supported dialect, in the order presented to users
    pub const ALL: [OutputDialect; 8] = [
        OutputDialect::QOwnNotes,
        OutputDialect::Gfm,
        OutputDialect::Obsidian,
        OutputDialect::Commonmark,
        OutputDialect::PandocMarkdown,
        OutputDialect::PandocMarkdownStrict,
        OutputDialect::Multimarkdown,
        OutputDialect::Html,
    ];

    /// The configuration key naming this dialect
    pub fn key(&self) -> &'static str {
        match self {
            OutputDialect::QOwnNotes => "q_own_notes",
            OutputDialect::Gfm => "gfm",
            OutputDialect::Obsidian => "obsidian",
            OutputDialect::Commonmark => "commonmark",
            OutputDialect::PandocMarkdown => "pandoc_markdown",
            OutputDialect::PandocMarkdownStrict => "pandoc_markdown_strict",
            OutputDialect::Multimarkdown => "multimarkdown",
            OutputDialect::Html => "html",
        }
    }

    /// Look a dialect up by configuration key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.key() == key)
    }

    /// The pandoc output format this dialect converts through
    pub fn pandoc_target(&self) -> &'static str {
        match self {
            OutputDialect::QOwnNotes | OutputDialect::Gfm | OutputDialect::Obsidian => "gfm",
            OutputDialect::Commonmark => "commonmark",
            OutputDialect::PandocMarkdown => "markdown",
            OutputDialect::PandocMarkdownStrict => "markdown_strict",
            OutputDialect::Multimarkdown => "markdown_mmd",
            OutputDialect::Html => "html",
        }
    }

    /// Whether this dialect produces markdown (versus HTML) output
    pub fn is_markdown(&self) -> bool {
        !matches!(self, OutputDialect::Html)
    }

    /// Whether image links get rewritten to the `![|width](path)` form
    pub fn uses_obsidian_image_links(&self) -> bool {
        matches!(self, OutputDialect::Obsidian)
    }

    /// Output file extension for this dialect
    pub fn file_extension(&self) -> &'static str {
        if self.is_markdown() {
            "md"
        } else {
            "html"
        }
    }
}

impl fmt::Display for OutputDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Recognized input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Zipped JSON+HTML note archive
    Nsx,
    /// Standalone HTML file
    Html,
    /// Standalone Markdown file
    Markdown,
}

impl InputFormat {
    /// Classify an input file by extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "nsx" => Some(InputFormat::Nsx),
            "html" | "htm" => Some(InputFormat::Html),
            "md" | "markdown" => Some(InputFormat::Markdown),
            _ => None,
        }
    }

    /// The pandoc input format for standalone files (archives convert their
    /// note bodies as HTML)
    pub fn pandoc_source(&self) -> &'static str {
        match self {
            InputFormat::Nsx | InputFormat::Html => "html",
            InputFormat::Markdown => "gfm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_keys_round_trip() {
        for dialect in OutputDialect::ALL {
            assert_eq!(OutputDialect::from_key(dialect.key()), Some(dialect));
        }
        assert_eq!(OutputDialect::from_key("docx"), None);
    }

    #[test]
    fn test_shared_pandoc_target() {
        assert_eq!(OutputDialect::QOwnNotes.pandoc_target(), "gfm");
        assert_eq!(OutputDialect::Gfm.pandoc_target(), "gfm");
        assert_eq!(OutputDialect::Obsidian.pandoc_target(), "gfm");
        assert!(OutputDialect::Obsidian.uses_obsidian_image_links());
        assert!(!OutputDialect::Gfm.uses_obsidian_image_links());
    }

    #[test]
    fn test_html_dialect_is_not_markdown() {
        assert!(!OutputDialect::Html.is_markdown());
        assert_eq!(OutputDialect::Html.file_extension(), "html");
        assert_eq!(OutputDialect::Multimarkdown.file_extension(), "md");
    }

    #[test]
    fn test_input_format_from_extension() {
        assert_eq!(InputFormat::from_extension("NSX"), Some(InputFormat::Nsx));
        assert_eq!(InputFormat::from_extension("htm"), Some(InputFormat::Html));
        assert_eq!(
            InputFormat::from_extension("markdown"),
            Some(InputFormat::Markdown)
        );
        assert_eq!(InputFormat::from_extension("pdf"), None);
    }
}
