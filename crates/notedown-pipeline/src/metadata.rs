//! Note metadata generation
//!
//! Produces the same title/timestamps/tags data in two shapes: an HTML
//! `<head>` meta block (HTML output) and a YAML front-matter block (markdown
//! output). Tag transforms run in a fixed order: hierarchical splitting
//! first, then space-to-hyphen normalization on each resulting part.

use chrono::DateTime;
use notedown_config::MetadataSettings;
use serde::Serialize;

/// Timestamp rendering used in both metadata shapes
pub fn format_timestamp(epoch_seconds: i64) -> String {
    DateTime::from_timestamp(epoch_seconds, 0)
        .unwrap_or_else(|| DateTime::from_timestamp(0, 0).expect("epoch zero"))
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[derive(Serialize)]
struct FrontMatter<'a> {
    title: &'a str,
    created: String,
    updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
}

/// Generates metadata blocks for one note
pub struct MetadataGenerator<'a> {
    settings: &'a MetadataSettings,
}

impl<'a> MetadataGenerator<'a> {
    pub fn new(settings: &'a MetadataSettings) -> Self {
        Self { settings }
    }

    /// Transform raw tags per the settings: split, then normalize spaces,
    /// then prefix. Duplicates introduced by splitting are dropped in order.
    pub fn tags(&self, raw: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for tag in raw {
            let parts: Vec<&str> = if self.settings.split_tags {
                tag.split('/').filter(|p| !p.trim().is_empty()).collect()
            } else {
                vec![tag.as_str()]
            };
            for part in parts {
                let mut name = part.trim().to_string();
                if self.settings.spaces_to_hyphens {
                    name = name.replace(' ', "-");
                }
                let tagged = format!("{}{}", self.settings.tag_prefix, name);
                if !out.contains(&tagged) {
                    out.push(tagged);
                }
            }
        }
        out
    }

    /// YAML front-matter block, terminated by a blank line
    pub fn front_matter(&self, title: &str, ctime: i64, mtime: i64, raw_tags: &[String]) -> String {
        let front = FrontMatter {
            title,
            created: format_timestamp(ctime),
            updated: format_timestamp(mtime),
            tags: self.settings.include_tags.then(|| self.tags(raw_tags)),
        };
        let yaml = serde_yaml::to_string(&front).unwrap_or_default();
        format!("---\n{}---\n\n", yaml)
    }

    /// HTML `<head>` meta block carrying the same data
    pub fn html_head(&self, title: &str, ctime: i64, mtime: i64, raw_tags: &[String]) -> String {
        let mut out = String::from("<head><meta charset=\"utf-8\"/>");
        out.push_str(&format!("<title>{}</title>", escape_html(title)));
        out.push_str(&format!(
            "<meta name=\"creation_time\" content=\"{}\"/>",
            format_timestamp(ctime)
        ));
        out.push_str(&format!(
            "<meta name=\"modified_time\" content=\"{}\"/>",
            format_timestamp(mtime)
        ));
        if self.settings.include_tags {
            out.push_str(&format!(
                "<meta name=\"tags\" content=\"{}\"/>",
                escape_html(&self.tags(raw_tags).join(","))
            ));
        }
        out.push_str("</head>");
        out
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
