//! Checklist extraction and reinsertion
//!
//! The external converter cannot represent checkboxes, so checklist items get
//! pulled out into unique placeholder tokens before conversion and reinserted
//! as `- [x]` / `- [ ]` markdown afterwards. Arbitrary pixel indentation
//! values collapse to dense nesting levels at reinsertion time.
//!
//! Placeholder tokens are explicit UUID strings stored on each item, never
//! derived from object identity.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;
use uuid::Uuid;

/// Which checkbox markup the source uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistDialect {
    /// Plain HTML `<input type="checkbox">` items
    Html,
    /// The proprietary editor's checkbox markup
    NoteStation,
}

/// What the extracted markup is replaced with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistTarget {
    /// Unique placeholder tokens, swapped for markdown after conversion
    Markdown,
    /// Synthesized valid checkbox HTML, kept as-is
    Html,
}

/// One extracted checklist item
#[derive(Debug, Clone)]
pub struct ChecklistItem {
    /// Placeholder token standing in for this item during conversion
    pub placeholder: String,
    pub checked: bool,
    /// Left indentation in pixels; zero when absent or using the wrong CSS
    /// property direction
    pub indent_px: u32,
    pub text: String,
}

static NOTESTATION_ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<div([^>]*)>\s*<input([^>]*class="[^"]*syno-notestation-editor-checkbox[^"]*"[^>]*)>(.*?)</div>"#,
    )
    .expect("notestation checklist regex")
});

static HTML_ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<(?:div|p)([^>]*)>\s*<input([^>]*type=["']checkbox["'][^>]*)>(.*?)</(?:div|p)>"#,
    )
    .expect("html checklist regex")
});

static PADDING_LEFT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"padding-left:\s*(\d+)").expect("padding regex"));

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

/// Checklist processor for one note's content
pub struct ChecklistProcessor {
    dialect: ChecklistDialect,
    items: Vec<ChecklistItem>,
}

impl ChecklistProcessor {
    pub fn new(dialect: ChecklistDialect) -> Self {
        Self {
            dialect,
            items: Vec::new(),
        }
    }

    /// Items extracted so far
    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// Find every checklist item in `html`, record it, and replace its markup
    /// according to the target. Absence of checklist markup is a no-op.
    pub fn extract(&mut self, html: &str, target: ChecklistTarget) -> String {
        let regex: &Regex = match self.dialect {
            ChecklistDialect::NoteStation => &NOTESTATION_ITEM_REGEX,
            ChecklistDialect::Html => &HTML_ITEM_REGEX,
        };

        let dialect = self.dialect;
        let items = &mut self.items;
        let out = regex.replace_all(html, |caps: &Captures| {
            let container_attrs = caps.get(1).map_or("", |m| m.as_str());
            let input_attrs = caps.get(2).map_or("", |m| m.as_str());
            let body = caps.get(3).map_or("", |m| m.as_str());

            let item = ChecklistItem {
                placeholder: format!("checklist-item-{}", Uuid::new_v4().simple()),
                checked: is_checked(dialect, input_attrs),
                indent_px: indent_of(container_attrs),
                text: strip_tags(body),
            };
            let replacement = match target {
                ChecklistTarget::Markdown => format!("<p>{}</p>", item.placeholder),
                ChecklistTarget::Html => synthesize_checkbox(&item),
            };
            items.push(item);
            replacement
        });

        if !self.items.is_empty() {
            debug!("Extracted {} checklist items", self.items.len());
        }
        out.into_owned()
    }

    /// Swap placeholders back in as tab-indented markdown task-list lines.
    ///
    /// Observed distinct indentation values map to a dense 0..n ranking so
    /// arbitrary pixel offsets become nesting levels. One line per item, each
    /// with a trailing newline.
    pub fn reinsert(&self, converted: &str) -> String {
        if self.items.is_empty() {
            return converted.to_string();
        }

        let mut indents: Vec<u32> = self.items.iter().map(|i| i.indent_px).collect();
        indents.sort_unstable();
        indents.dedup();

        let mut out = converted.to_string();
        for item in &self.items {
            let rank = indents.binary_search(&item.indent_px).unwrap_or(0);
            let marker = if item.checked { "x" } else { " " };
            let line = format!(
                "{}- [{}] {}\n",
                "\t".repeat(rank),
                marker,
                item.text
            );
            out = out.replace(&item.placeholder, &line);
        }
        out
    }
}

fn is_checked(dialect: ChecklistDialect, input_attrs: &str) -> bool {
    match dialect {
        ChecklistDialect::NoteStation => input_attrs.contains("checkbox-checked"),
        ChecklistDialect::Html => input_attrs.contains("checked"),
    }
}

/// Indentation from the container's style attribute. Only `padding-left`
/// counts; a wrong CSS property direction (`margin-right` and friends) means
/// top level.
fn indent_of(container_attrs: &str) -> u32 {
    PADDING_LEFT_REGEX
        .captures(container_attrs)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn strip_tags(body: &str) -> String {
    TAG_REGEX
        .replace_all(body, "")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

fn synthesize_checkbox(item: &ChecklistItem) -> String {
    let checked = if item.checked { " checked" } else { "" };
    format!(
        "<p style=\"padding-left: {}px\"><input type=\"checkbox\"{}> {}</p>",
        item.indent_px, checked, item.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const NSX_ITEMS: &str = concat!(
        r#"<div style="padding-left: 0px"><input class="syno-notestation-editor-checkbox syno-notestation-editor-checkbox-checked" type="image" src="x"/>Buy milk</div>"#,
        r#"<div style="padding-left: 30px"><input class="syno-notestation-editor-checkbox" type="image" src="x"/>Skim or <b>whole</b></div>"#,
        r#"<div style="padding-left: 60px"><input class="syno-notestation-editor-checkbox" type="image" src="x"/>Ask first</div>"#,
    );

    #[test]
    fn test_no_checklist_markup_is_noop() {
        let mut proc = ChecklistProcessor::new(ChecklistDialect::NoteStation);
        let html = "<p>No boxes here</p>";
        assert_eq!(proc.extract(html, ChecklistTarget::Markdown), html);
        assert!(proc.items().is_empty());
        assert_eq!(proc.reinsert(html), html);
    }

    #[test]
    fn test_extract_produces_one_placeholder_per_item() {
        let mut proc = ChecklistProcessor::new(ChecklistDialect::NoteStation);
        let out = proc.extract(NSX_ITEMS, ChecklistTarget::Markdown);
        assert_eq!(proc.items().len(), 3);
        for item in proc.items() {
            assert!(out.contains(&item.placeholder));
        }
        assert!(!out.contains("syno-notestation-editor-checkbox"));
    }

    #[test]
    fn test_round_trip_markdown_lines() {
        let mut proc = ChecklistProcessor::new(ChecklistDialect::NoteStation);
        let extracted = proc.extract(NSX_ITEMS, ChecklistTarget::Markdown);
        let reinserted = proc.reinsert(&extracted);

        let line_re = Regex::new(r"(?m)^\t*- \[[ x]\] .+$").unwrap();
        let lines: Vec<_> = line_re.find_iter(&reinserted).collect();
        assert_eq!(lines.len(), 3);
        assert!(reinserted.contains("- [x] Buy milk\n"));
        assert!(reinserted.contains("\t- [ ] Skim or whole\n"));
        assert!(reinserted.contains("\t\t- [ ] Ask first\n"));
    }

    #[test]
    fn test_indent_ranking_is_dense() {
        // 15px and 300px are adjacent levels, not 20 levels apart
        let html = concat!(
            r#"<div style="padding-left: 15px"><input class="syno-notestation-editor-checkbox"/>a</div>"#,
            r#"<div style="padding-left: 300px"><input class="syno-notestation-editor-checkbox"/>b</div>"#,
        );
        let mut proc = ChecklistProcessor::new(ChecklistDialect::NoteStation);
        let extracted = proc.extract(html, ChecklistTarget::Markdown);
        let out = proc.reinsert(&extracted);
        assert!(out.contains("- [ ] a\n"));
        assert!(out.contains("\t- [ ] b\n"));
    }

    #[test]
    fn test_wrong_css_direction_is_top_level() {
        let html = r#"<div style="margin-right: 30px"><input class="syno-notestation-editor-checkbox"/>sideways</div>"#;
        let mut proc = ChecklistProcessor::new(ChecklistDialect::NoteStation);
        proc.extract(html, ChecklistTarget::Markdown);
        assert_eq!(proc.items()[0].indent_px, 0);
    }

    #[test]
    fn test_html_dialect_checked_detection() {
        let html = concat!(
            r#"<div><input type="checkbox" checked>done</div>"#,
            r#"<p><input type="checkbox">open</p>"#,
        );
        let mut proc = ChecklistProcessor::new(ChecklistDialect::Html);
        proc.extract(html, ChecklistTarget::Markdown);
        assert_eq!(proc.items().len(), 2);
        assert!(proc.items()[0].checked);
        assert!(!proc.items()[1].checked);
    }

    #[test]
    fn test_html_target_synthesizes_checkbox_markup() {
        let html = r#"<div style="padding-left: 30px"><input class="syno-notestation-editor-checkbox syno-notestation-editor-checkbox-checked"/>done</div>"#;
        let mut proc = ChecklistProcessor::new(ChecklistDialect::NoteStation);
        let out = proc.extract(html, ChecklistTarget::Html);
        assert!(out.contains(r#"<input type="checkbox" checked>"#));
        assert!(out.contains("padding-left: 30px"));
        assert!(out.contains("done"));
        assert!(!out.contains("checklist-item-"));
    }
}
