//! Inter-note link resolution
//!
//! Notes reference each other through the proprietary
//! `notestation://remote/self/<opaque-id>` scheme. After export the target
//! notes have been renamed, deduplicated, and relocated into per-notebook
//! folders, so every such anchor gets rewritten to a relative path that is
//! valid in the output tree.
//!
//! Resolution is a state machine per archive:
//! Unscanned -> Discovered -> TitleMatched -> IdRecovered(optional) ->
//! Resolved | Unresolvable. It runs once per archive and MUST run only after
//! every page's output filename and notebook folder have been finalized.
//! Resolution is best-effort and heuristic by design: unresolved links are
//! reported, never fatal.

use notedown_core::Notebook;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, info};

static NOTE_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a[^>]*href="notestation://remote/self/([^"]+)"[^>]*>(.*?)</a>"#)
        .expect("note link regex")
});

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

/// One raw anchor occurrence referencing another note. Ephemeral; anchors
/// appearing twice produce two links.
#[derive(Debug, Clone)]
pub struct NoteLink {
    /// The whole anchor markup as found in the source
    pub raw: String,
    /// Display text, inner tags stripped
    pub text: String,
    /// Opaque reference id, stable across note renames
    pub ref_id: String,
    /// Id of the note the anchor appears in
    pub source_id: String,
    /// Candidate target note ids: empty until matched, more than one when
    /// duplicate titles collide
    pub targets: Vec<String>,
}

/// A link that stayed unresolvable, for the informational report
#[derive(Debug, Clone)]
pub struct UnresolvedLink {
    /// Title of the note containing the anchor
    pub source_title: String,
    /// The raw anchor markup
    pub raw: String,
}

/// Outcome of one archive-wide resolution pass.
///
/// Totality invariant: `resolved + unresolved.len() == discovered`.
#[derive(Debug, Default)]
pub struct LinkReport {
    pub discovered: usize,
    pub resolved: usize,
    pub unresolved: Vec<UnresolvedLink>,
}

/// Snapshot of one page's identity taken before content rewriting starts
struct PageInfo {
    id: String,
    original_title: String,
    title: String,
    file_name: String,
    folder: String,
}

/// Archive-wide link resolver
pub struct LinkResolver;

impl LinkResolver {
    /// Run the full state machine over every page in the archive and rewrite
    /// resolved anchors in place.
    ///
    /// Caller contract: every page's `file_name` and `notebook_folder` are
    /// final before this is called.
    pub fn resolve_and_rewrite(notebooks: &mut [Notebook]) -> LinkReport {
        let pages: Vec<PageInfo> = notebooks
            .iter()
            .flat_map(|nb| nb.pages.iter())
            .map(|p| PageInfo {
                id: p.id.clone(),
                original_title: p.original_title.clone(),
                title: p.title.clone(),
                file_name: p.file_name.clone(),
                folder: p.notebook_folder.clone(),
            })
            .collect();

        // Discovery: one link object per anchor occurrence
        let mut links = discover(notebooks);
        let discovered = links.len();

        // Title matching against original (pre-deduplication) titles
        for link in &mut links {
            link.targets = pages
                .iter()
                .filter(|p| p.original_title == link.text)
                .map(|p| p.id.clone())
                .collect();
        }

        // Renamed-link recovery: inherit candidates from any matched link
        // sharing the same opaque id
        let matched_by_ref: HashMap<&str, &Vec<String>> = links
            .iter()
            .filter(|l| !l.targets.is_empty())
            .map(|l| (l.ref_id.as_str(), &l.targets))
            .collect();
        let recovered: Vec<Option<Vec<String>>> = links
            .iter()
            .map(|l| {
                if l.targets.is_empty() {
                    matched_by_ref.get(l.ref_id.as_str()).map(|t| (*t).clone())
                } else {
                    None
                }
            })
            .collect();
        for (link, inherited) in links.iter_mut().zip(recovered) {
            if let Some(targets) = inherited {
                debug!(
                    "Recovered renamed link '{}' via reference id {}",
                    link.text, link.ref_id
                );
                link.targets = targets;
            }
        }

        // Reporting: unresolved links are expected outcomes, not errors
        let mut report = LinkReport {
            discovered,
            ..Default::default()
        };
        let title_of = |id: &str| {
            pages
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.title.clone())
                .unwrap_or_default()
        };
        for link in &links {
            if link.targets.is_empty() {
                info!(
                    "Could not resolve link in note '{}': {}",
                    title_of(&link.source_id),
                    link.raw
                );
                report.unresolved.push(UnresolvedLink {
                    source_title: title_of(&link.source_id),
                    raw: link.raw.clone(),
                });
            } else {
                report.resolved += 1;
            }
        }

        // Content rewrite, keyed by raw anchor markup per source note so a
        // raw anchor repeated within a note is covered by one replacement
        let mut replacements: HashMap<&str, HashMap<&str, String>> = HashMap::new();
        for link in links.iter().filter(|l| !l.targets.is_empty()) {
            let source_folder = pages
                .iter()
                .find(|p| p.id == link.source_id)
                .map(|p| p.folder.clone())
                .unwrap_or_default();
            let multiple = link.targets.len() > 1;
            let anchor: String = link
                .targets
                .iter()
                .filter_map(|id| pages.iter().find(|p| p.id == *id))
                .map(|target| {
                    let href = if target.folder == source_folder {
                        target.file_name.clone()
                    } else {
                        format!("../{}/{}", target.folder, target.file_name)
                    };
                    let tail = if multiple { "<br>" } else { "" };
                    format!("<a href=\"{}\">{}</a>{}", href, link.text, tail)
                })
                .collect();
            replacements
                .entry(link.source_id.as_str())
                .or_default()
                .insert(link.raw.as_str(), anchor);
        }

        for notebook in notebooks.iter_mut() {
            for page in &mut notebook.pages {
                if let Some(map) = replacements.get(page.id.as_str()) {
                    for (raw, replacement) in map {
                        page.raw_content = page.raw_content.replace(raw, replacement);
                    }
                }
            }
        }

        report
    }
}

/// Scan every page's raw content for internal-scheme anchors
fn discover(notebooks: &[Notebook]) -> Vec<NoteLink> {
    let mut links = Vec::new();
    for notebook in notebooks {
        for page in &notebook.pages {
            for caps in NOTE_LINK_REGEX.captures_iter(&page.raw_content) {
                let raw = caps.get(0).map_or("", |m| m.as_str()).to_string();
                let ref_id = caps.get(1).map_or("", |m| m.as_str()).to_string();
                let inner = caps.get(2).map_or("", |m| m.as_str());
                links.push(NoteLink {
                    raw,
                    text: TAG_REGEX.replace_all(inner, "").trim().to_string(),
                    ref_id,
                    source_id: page.id.clone(),
                    targets: Vec::new(),
                });
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use notedown_core::NotePage;

    fn page(id: &str, title: &str, content: &str) -> NotePage {
        NotePage::new(id, title, 0, 0, content, vec![])
    }

    fn anchor(ref_id: &str, text: &str) -> String {
        format!(
            "<a href=\"notestation://remote/self/{}\">{}</a>",
            ref_id, text
        )
    }

    /// Build notebooks with finalized filenames, the resolver's precondition
    fn finalize(notebooks: &mut [Notebook]) {
        for nb in notebooks.iter_mut() {
            for page in &mut nb.pages {
                page.file_name = format!(
                    "{}.md",
                    notedown_core::folder_name(&page.title)
                );
            }
        }
    }

    #[test]
    fn test_cross_notebook_link_rewritten_with_relative_path() {
        let mut x = Notebook::new("x", "Notebook X");
        x.add_page(page("a", "Page A", &anchor("ref-b", "Page B")));
        let mut y = Notebook::new("y", "Notebook Y");
        y.add_page(page("b", "Page B", "<p>content</p>"));
        let mut notebooks = vec![x, y];
        finalize(&mut notebooks);

        let report = LinkResolver::resolve_and_rewrite(&mut notebooks);
        assert_eq!(report.discovered, 1);
        assert_eq!(report.resolved, 1);
        assert!(report.unresolved.is_empty());
        assert!(notebooks[0].pages[0]
            .raw_content
            .contains("<a href=\"../notebook-y/page-b.md\">Page B</a>"));
    }

    #[test]
    fn test_same_notebook_link_uses_bare_filename() {
        let mut x = Notebook::new("x", "X");
        x.add_page(page("a", "Page A", &anchor("ref-b", "Page B")));
        x.add_page(page("b", "Page B", ""));
        let mut notebooks = vec![x];
        finalize(&mut notebooks);

        LinkResolver::resolve_and_rewrite(&mut notebooks);
        let content = &notebooks[0].pages[0].raw_content;
        assert!(content.contains("<a href=\"page-b.md\">Page B</a>"));
        assert!(!content.contains("../"));
    }

    #[test]
    fn test_duplicate_titles_emit_one_anchor_per_candidate() {
        let mut x = Notebook::new("x", "X");
        x.add_page(page("d1", "Dup", ""));
        x.add_page(page("d2", "Dup", ""));
        x.add_page(page("n", "Linker", &anchor("ref-d", "Dup")));
        let mut notebooks = vec![x];
        finalize(&mut notebooks);

        let report = LinkResolver::resolve_and_rewrite(&mut notebooks);
        assert_eq!(report.resolved, 1);
        let content = &notebooks[0].pages[2].raw_content;
        assert!(content.contains("<a href=\"dup.md\">Dup</a><br>"));
        assert!(content.contains("<a href=\"dup-1.md\">Dup</a><br>"));
    }

    #[test]
    fn test_renamed_link_recovers_via_reference_id() {
        let mut x = Notebook::new("x", "X");
        // The stale anchor's display text no longer matches any title, but a
        // second anchor with the same opaque id still does.
        let content = format!("{}{}", anchor("ref-b", "Old Title"), anchor("ref-b", "Page B"));
        x.add_page(page("a", "Page A", &content));
        x.add_page(page("b", "Page B", ""));
        let mut notebooks = vec![x];
        finalize(&mut notebooks);

        let report = LinkResolver::resolve_and_rewrite(&mut notebooks);
        assert_eq!(report.discovered, 2);
        assert_eq!(report.resolved, 2);
        let content = &notebooks[0].pages[0].raw_content;
        assert!(content.contains("<a href=\"page-b.md\">Old Title</a>"));
        assert!(content.contains("<a href=\"page-b.md\">Page B</a>"));
    }

    #[test]
    fn test_unresolvable_link_is_reported_not_fatal() {
        let mut x = Notebook::new("x", "X");
        x.add_page(page("a", "Page A", &anchor("ref-gone", "Deleted Note")));
        let mut notebooks = vec![x];
        finalize(&mut notebooks);

        let report = LinkResolver::resolve_and_rewrite(&mut notebooks);
        assert_eq!(report.discovered, 1);
        assert_eq!(report.resolved, 0);
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].source_title, "Page A");
        // Content untouched
        assert!(notebooks[0].pages[0]
            .raw_content
            .contains("notestation://remote/self/ref-gone"));
    }

    #[test]
    fn test_totality_resolved_plus_unresolved_equals_discovered() {
        let mut x = Notebook::new("x", "X");
        let content = format!(
            "{}{}{}",
            anchor("r1", "Page B"),
            anchor("r2", "Missing"),
            anchor("r1", "Page B")
        );
        x.add_page(page("a", "Page A", &content));
        x.add_page(page("b", "Page B", ""));
        let mut notebooks = vec![x];
        finalize(&mut notebooks);

        let report = LinkResolver::resolve_and_rewrite(&mut notebooks);
        assert_eq!(report.discovered, 3);
        assert_eq!(report.resolved + report.unresolved.len(), report.discovered);
    }

    #[test]
    fn test_matching_uses_original_title_after_dedup() {
        let mut x = Notebook::new("x", "X");
        x.add_page(page("d1", "Dup", ""));
        x.add_page(page("d2", "Dup", "")); // retitled to Dup-1 by dedup
        x.add_page(page("n", "Linker", &anchor("r", "Dup-1")));
        let mut notebooks = vec![x];
        finalize(&mut notebooks);

        // "Dup-1" is a dedup artifact, not an original title: no match
        let report = LinkResolver::resolve_and_rewrite(&mut notebooks);
        assert_eq!(report.resolved, 0);
        assert_eq!(report.unresolved.len(), 1);
    }
}
