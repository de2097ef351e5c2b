//! Per-note processing orchestrator
//!
//! Runs one note through the strictly sequential stage chain:
//!
//! Raw -> ImageTagsRewritten -> ChartsExtracted -> ChecklistsExtracted ->
//! StructureCleaned -> TablesFormatted -> MetadataPrepended(optional) ->
//! LinksPrepared -> [external conversion] -> ChecklistsReinserted ->
//! MetadataReinjected(optional) -> ImageLinksReformatted(optional) ->
//! FinalNewlineAppended.
//!
//! Inter-note links are prepared at archive scope (see [`crate::links`]):
//! the driver rewrites every page's raw content before per-note processing
//! starts, because link targets depend on all pages' finalized paths.
//!
//! Every stage transforms one in-memory string; a failure in one note never
//! touches a sibling note's state. Conversion failure substitutes the error
//! sentinel and the run continues.

use crate::chart::{ChartProcessor, ChartRenderer};
use crate::checklist::{ChecklistDialect, ChecklistProcessor, ChecklistTarget};
use crate::converter::CONVERSION_FAILURE_SENTINEL;
use crate::metadata::MetadataGenerator;
use crate::stages;
use notedown_config::{ConversionSettings, InputFormat};
use notedown_core::{Attachment, MarkupConverter, NotePage};
use tracing::{debug, error};

/// Result of processing one note
#[derive(Debug)]
pub struct ProcessedNote {
    /// Final content, ready to write
    pub content: String,
    /// Chart artifacts generated during processing, to be written alongside
    /// the note's archive attachments
    pub chart_attachments: Vec<Attachment>,
    /// True when the external conversion failed and `content` is the sentinel
    pub conversion_failed: bool,
}

/// Per-note stage coordinator
pub struct NoteProcessor<'a> {
    settings: &'a ConversionSettings,
    converter: &'a dyn MarkupConverter,
    renderer: &'a dyn ChartRenderer,
}

impl<'a> NoteProcessor<'a> {
    pub fn new(
        settings: &'a ConversionSettings,
        converter: &'a dyn MarkupConverter,
        renderer: &'a dyn ChartRenderer,
    ) -> Self {
        Self {
            settings,
            converter,
            renderer,
        }
    }

    /// Process one archive note page. The page's raw content must already
    /// have inter-note links prepared.
    pub fn process_page(&self, page: &NotePage) -> ProcessedNote {
        let dialect = self.settings.output_dialect;
        let folder = self.settings.attachment_folder.as_str();
        debug!("Processing note '{}' -> {}", page.title, dialect);

        let mut content = stages::rewrite_image_tags(&page.raw_content, &page.attachments, folder);

        // Charts must come out before structure cleanup flattens their
        // carrier divs into paragraphs
        let stem = file_stem(&page.file_name);
        let charts = ChartProcessor::new(self.renderer, folder);
        let (content_after_charts, chart_attachments) = charts.process(&content, stem);
        content = content_after_charts;

        // Checklist carrier divs hold the indentation style attribute, so
        // extraction must precede structure cleanup
        let mut checklists = ChecklistProcessor::new(ChecklistDialect::NoteStation);
        let target = if dialect.is_markdown() {
            ChecklistTarget::Markdown
        } else {
            ChecklistTarget::Html
        };
        content = checklists.extract(&content, target);
        content = stages::clean_structure(&content);
        content = stages::format_tables(&content);

        let metadata = MetadataGenerator::new(&self.settings.metadata);
        if self.settings.metadata.include_metadata && !dialect.is_markdown() {
            content = format!(
                "{}{}",
                metadata.html_head(&page.title, page.ctime, page.mtime, &page.tags),
                content
            );
        }

        let (mut output, conversion_failed) =
            match self.converter.convert(&content, "html", dialect.pandoc_target()) {
                Ok(converted) => (converted, false),
                Err(e) => {
                    error!("Conversion of note '{}' failed: {}", page.title, e);
                    (CONVERSION_FAILURE_SENTINEL.to_string(), true)
                }
            };

        if !conversion_failed {
            if dialect.is_markdown() {
                output = checklists.reinsert(&output);
                if self.settings.metadata.include_metadata {
                    output = format!(
                        "{}{}",
                        metadata.front_matter(&page.title, page.ctime, page.mtime, &page.tags),
                        output
                    );
                }
            }
            if dialect.uses_obsidian_image_links() {
                output = stages::reformat_image_links(&output);
            }
        }

        ProcessedNote {
            content: stages::ensure_final_newline(output),
            chart_attachments,
            conversion_failed,
        }
    }

    /// Process one standalone HTML or Markdown file's content.
    pub fn process_standalone(&self, raw: &str, format: InputFormat) -> ProcessedNote {
        let dialect = self.settings.output_dialect;
        let mut content = raw.to_string();

        let mut checklists = ChecklistProcessor::new(ChecklistDialect::Html);
        if format == InputFormat::Html {
            let target = if dialect.is_markdown() {
                ChecklistTarget::Markdown
            } else {
                ChecklistTarget::Html
            };
            content = checklists.extract(&content, target);
            content = stages::clean_structure(&content);
            content = stages::format_tables(&content);
        }

        let (mut output, conversion_failed) = match self.converter.convert(
            &content,
            format.pandoc_source(),
            dialect.pandoc_target(),
        ) {
            Ok(converted) => (converted, false),
            Err(e) => {
                error!("Standalone conversion failed: {}", e);
                (CONVERSION_FAILURE_SENTINEL.to_string(), true)
            }
        };

        if !conversion_failed {
            if dialect.is_markdown() {
                output = checklists.reinsert(&output);
            }
            if dialect.uses_obsidian_image_links() {
                output = stages::reformat_image_links(&output);
            }
        }

        ProcessedNote {
            content: stages::ensure_final_newline(output),
            chart_attachments: Vec::new(),
            conversion_failed,
        }
    }
}

fn file_stem(file_name: &str) -> &str {
    file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::SvgChartRenderer;
    use notedown_config::OutputDialect;
    use notedown_core::ConvertError;

    /// Converter double that echoes its input, keeping stage effects visible
    struct IdentityConverter;

    impl MarkupConverter for IdentityConverter {
        fn convert(&self, input: &str, _from: &str, _to: &str) -> Result<String, ConvertError> {
            Ok(input.to_string())
        }

        fn check_available(&self) -> Result<(), ConvertError> {
            Ok(())
        }
    }

    /// Converter double that always fails
    struct BrokenConverter;

    impl MarkupConverter for BrokenConverter {
        fn convert(&self, _input: &str, _from: &str, _to: &str) -> Result<String, ConvertError> {
            Err(ConvertError::TimedOut(30))
        }

        fn check_available(&self) -> Result<(), ConvertError> {
            Ok(())
        }
    }

    fn page_with(content: &str) -> NotePage {
        let mut page = NotePage::new("n1", "My Note", 1_600_000_000, 1_600_000_100, content, vec![]);
        page.file_name = "my-note.md".to_string();
        page.notebook_folder = "work".to_string();
        page
    }

    #[test]
    fn test_markdown_output_gets_front_matter() {
        let settings = ConversionSettings::quick(OutputDialect::Gfm);
        let renderer = SvgChartRenderer;
        let processor = NoteProcessor::new(&settings, &IdentityConverter, &renderer);

        let result = processor.process_page(&page_with("<p>body</p>"));
        assert!(!result.conversion_failed);
        assert!(result.content.starts_with("---\n"));
        assert!(result.content.contains("title: My Note"));
        assert!(result.content.contains("<p>body</p>"));
        assert!(result.content.ends_with('\n'));
    }

    #[test]
    fn test_html_output_gets_head_block_not_front_matter() {
        let settings = ConversionSettings::quick(OutputDialect::Html);
        let renderer = SvgChartRenderer;
        let processor = NoteProcessor::new(&settings, &IdentityConverter, &renderer);

        let result = processor.process_page(&page_with("<p>body</p>"));
        assert!(result.content.starts_with("<head>"));
        assert!(!result.content.contains("---\n"));
    }

    #[test]
    fn test_conversion_failure_substitutes_sentinel() {
        let settings = ConversionSettings::quick(OutputDialect::Gfm);
        let renderer = SvgChartRenderer;
        let processor = NoteProcessor::new(&settings, &BrokenConverter, &renderer);

        let result = processor.process_page(&page_with("<p>body</p>"));
        assert!(result.conversion_failed);
        assert!(result.content.contains("Conversion failure"));
        assert!(!result.content.contains("body"));
    }

    #[test]
    fn test_checklists_round_trip_through_conversion() {
        let settings = ConversionSettings::quick(OutputDialect::Gfm);
        let renderer = SvgChartRenderer;
        let processor = NoteProcessor::new(&settings, &IdentityConverter, &renderer);

        let content = r#"<div style="padding-left: 30px"><input class="syno-notestation-editor-checkbox syno-notestation-editor-checkbox-checked"/>done item</div>"#;
        let result = processor.process_page(&page_with(content));
        assert!(result.content.contains("- [x] done item\n"));
        assert!(!result.content.contains("checklist-item-"));
    }

    #[test]
    fn test_obsidian_rewrites_image_links() {
        let mut settings = ConversionSettings::quick(OutputDialect::Obsidian);
        settings.metadata.include_metadata = false;
        let renderer = SvgChartRenderer;
        let processor = NoteProcessor::new(&settings, &IdentityConverter, &renderer);

        let mut page = page_with(r#"<img src="s" ref="r1" width="300">"#);
        page.attachments.push(Attachment::new(
            notedown_core::AttachmentKind::Image,
            "pic.png",
            Some("r1".to_string()),
            notedown_core::AttachmentPayload::ArchiveRef("file_r1".to_string()),
        ));
        let result = processor.process_page(&page);
        assert!(result.content.contains("![|300](attachments/pic.png)"));
    }

    #[test]
    fn test_standalone_markdown_to_html() {
        let settings = ConversionSettings::quick(OutputDialect::Html);
        let renderer = SvgChartRenderer;
        let processor = NoteProcessor::new(&settings, &IdentityConverter, &renderer);

        let result = processor.process_standalone("# Title", InputFormat::Markdown);
        assert!(!result.conversion_failed);
        assert!(result.content.ends_with('\n'));
        assert!(result.chart_attachments.is_empty());
    }
}
