//! Filename and folder-name sanitization
//!
//! Output names are derived from user-supplied note and attachment titles, so
//! they get normalized into a safe, portable form: lowercased, non-ASCII
//! stripped, whitespace and punctuation collapsed to single hyphens. The
//! cleaning function is idempotent, which keeps re-runs over already-converted
//! names stable.

use rand::distr::Alphanumeric;
use rand::Rng;

/// Length of the random suffix appended on filename collisions
const SUFFIX_LEN: usize = 4;

/// Clean one path component: lowercase ASCII alphanumerics, `_`, and single
/// hyphens only. Returns an empty string when nothing survives.
fn clean_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.chars() {
        if !ch.is_ascii() {
            continue;
        }
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            // Whitespace, punctuation, and control characters all collapse
            // into one separator.
            pending_sep = true;
        }
    }
    out
}

/// Derive a clean output filename from a declared attachment or note name.
///
/// The extension (text after the last dot, when alphanumeric) is cleaned
/// separately and reattached. An input that cleans to nothing becomes
/// `untitled`.
pub fn clean_filename(name: &str) -> String {
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_alphanumeric()) =>
        {
            (stem, Some(ext))
        }
        _ => (name, None),
    };

    let mut cleaned = clean_component(stem);
    if cleaned.is_empty() {
        cleaned = "untitled".to_string();
    }
    match ext.map(clean_component) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", cleaned, ext),
        _ => cleaned,
    }
}

/// Derive a clean folder name from a notebook title. Dots carry no extension
/// meaning for folders, so the whole title is cleaned as one component.
pub fn folder_name(title: &str) -> String {
    let cleaned = clean_component(title);
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

/// Insert a short random alphanumeric suffix before the extension, used when
/// probing finds the target filename already taken.
pub fn disambiguate(file_name: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!("{}-{}.{}", stem, suffix, ext)
        }
        _ => format!("{}-{}", file_name, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_filename_basic() {
        assert_eq!(clean_filename("My Note.PNG"), "my-note.png");
        assert_eq!(clean_filename("Shopping List"), "shopping-list");
        assert_eq!(clean_filename("a  b   c"), "a-b-c");
    }

    #[test]
    fn test_clean_filename_strips_non_ascii() {
        assert_eq!(clean_filename("Caf\u{e9} Notes.md"), "caf-notes.md");
        assert_eq!(clean_filename("\u{65e5}\u{672c}\u{8a9e}"), "untitled");
    }

    #[test]
    fn test_clean_filename_punctuation_collapses() {
        assert_eq!(clean_filename("a...b---c!!!d"), "a-b-c-d");
        assert_eq!(clean_filename("!!!"), "untitled");
    }

    #[test]
    fn test_clean_filename_idempotent() {
        for input in [
            "My Note.PNG",
            "Shopping List",
            "Caf\u{e9} / Bar.jpeg",
            "a...b---c",
            "",
            "untitled",
            "weird..ext.",
            "1 2 3.tar.gz",
        ] {
            let once = clean_filename(input);
            assert_eq!(clean_filename(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_folder_name() {
        assert_eq!(folder_name("My Notebook"), "my-notebook");
        assert_eq!(folder_name("v1.2 Plans"), "v1-2-plans");
        assert_eq!(folder_name(""), "untitled");
    }

    #[test]
    fn test_disambiguate_keeps_extension() {
        let out = disambiguate("photo.png");
        assert!(out.starts_with("photo-"));
        assert!(out.ends_with(".png"));
        assert_eq!(out.len(), "photo-.png".len() + SUFFIX_LEN);
    }

    #[test]
    fn test_disambiguate_no_extension() {
        let out = disambiguate("readme");
        assert!(out.starts_with("readme-"));
        assert_eq!(out.len(), "readme-".len() + SUFFIX_LEN);
    }
}
