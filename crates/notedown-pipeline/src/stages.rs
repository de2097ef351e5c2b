//! Single-string content transformation stages
//!
//! Every function here is a pure `&str -> String` transform over one note's
//! content; none touches shared state, so a failure or oddity in one note
//! can never corrupt a sibling note.

use notedown_core::Attachment;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static IMG_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<img([^>]*)/?>").expect("img tag regex"));

static REF_ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"ref="([^"]*)""#).expect("ref attr regex"));

static WIDTH_ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"width="(\d+)""#).expect("width attr regex"));

static SRC_ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src="([^"]*)""#).expect("src attr regex"));

static LIST_DIV_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<li([^>]*)>\s*<div[^>]*>").expect("list div regex"));

static EMPTY_DIV_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<div[^>]*>\s*(?:<br\s*/?>)?\s*</div>").expect("empty div regex"));

static DIV_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<div[^>]*>").expect("div open regex"));

static TABLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<table[^>]*>.*?</table>").expect("table regex"));

static FIRST_ROW_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<tr[^>]*>.*?</tr>").expect("table row regex"));

/// Rewrite proprietary `<img>` tags to point at the written attachment.
///
/// Source images reference their attachment through a content-hash `ref`
/// attribute. A matching attachment yields `<img src="<folder>/<name>">`
/// carrying over the width attribute when one exists; "no width attribute"
/// is the normalized case and emits no width at all. Tags with no matching
/// attachment are left untouched.
pub fn rewrite_image_tags(html: &str, attachments: &[Attachment], folder: &str) -> String {
    IMG_TAG_REGEX
        .replace_all(html, |caps: &Captures| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let Some(ref_token) = REF_ATTR_REGEX
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
            else {
                return whole.to_string();
            };
            let Some(attachment) = attachments
                .iter()
                .find(|a| a.ref_token.as_deref() == Some(ref_token))
            else {
                return whole.to_string();
            };

            let src = attachment.notebook_relative_path(folder);
            match WIDTH_ATTR_REGEX.captures(attrs).and_then(|c| c.get(1)) {
                Some(width) => format!("<img src=\"{}\" width=\"{}\">", src, width.as_str()),
                None => format!("<img src=\"{}\">", src),
            }
        })
        .into_owned()
}

/// Normalize structural markup the external converter handles poorly:
/// unwrap divs inside list items, collapse empty divs, and turn remaining
/// divs into paragraphs so line structure survives conversion.
pub fn clean_structure(html: &str) -> String {
    let out = LIST_DIV_OPEN_REGEX.replace_all(html, "<li$1>");
    let out = out.replace("</div></li>", "</li>");
    let out = EMPTY_DIV_REGEX.replace_all(&out, "<p></p>");
    let out = DIV_OPEN_REGEX.replace_all(&out, "<p>");
    out.replace("</div>", "</p>")
}

/// Give header-less tables a `<thead>` with `<th>` cells so the converter
/// emits a proper header row.
pub fn format_tables(html: &str) -> String {
    TABLE_REGEX
        .replace_all(html, |caps: &Captures| {
            let table = caps.get(0).map_or("", |m| m.as_str());
            if table.contains("<thead") {
                return table.to_string();
            }
            FIRST_ROW_REGEX
                .replace(table, |row: &Captures| {
                    let row = row.get(0).map_or("", |m| m.as_str());
                    let headed = row.replace("<td", "<th").replace("</td>", "</th>");
                    format!("<thead>{}</thead>", headed)
                })
                .into_owned()
        })
        .into_owned()
}

/// Obsidian image-link form: `<img src=... width=...>` tags surviving in the
/// converted markdown become `![|width](src)`, or `![](src)` without a width.
pub fn reformat_image_links(markdown: &str) -> String {
    IMG_TAG_REGEX
        .replace_all(markdown, |caps: &Captures| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let Some(src) = SRC_ATTR_REGEX
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
            else {
                return whole.to_string();
            };
            match WIDTH_ATTR_REGEX.captures(attrs).and_then(|c| c.get(1)) {
                Some(width) => format!("![|{}]({})", width.as_str(), src),
                None => format!("![]({})", src),
            }
        })
        .into_owned()
}

/// Converted output always ends with exactly one trailing newline run
pub fn ensure_final_newline(mut content: String) -> String {
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}
