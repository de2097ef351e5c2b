//! Whole-archive conversion driver
//!
//! Turns one `.nsx` archive into an output directory tree: one folder per
//! notebook, each holding converted note files and an attachments subfolder.
//!
//! Ordering is load-bearing: every page's output filename and notebook
//! folder must be finalized across the entire archive before link resolution
//! runs, and link resolution must run before any per-note processing.

use crate::chart::ChartRenderer;
use crate::error::PipelineError;
use crate::links::LinkResolver;
use crate::orchestrator::NoteProcessor;
use notedown_config::ConversionSettings;
use notedown_core::{
    disambiguate, folder_name, Attachment, AttachmentKind, AttachmentPayload, ContentWriter,
    ConversionSummary, MarkupConverter, NotePage, Notebook, RECYCLE_BIN_ID,
};
use notedown_nsx::{NoteRecord, NotebookRecord, NsxArchive};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Drives conversion of one archive through model building, path assignment,
/// link resolution, per-note processing, and writing
pub struct ArchiveConverter<'a> {
    settings: &'a ConversionSettings,
    converter: &'a dyn MarkupConverter,
    renderer: &'a dyn ChartRenderer,
    writer: &'a dyn ContentWriter,
}

impl<'a> ArchiveConverter<'a> {
    pub fn new(
        settings: &'a ConversionSettings,
        converter: &'a dyn MarkupConverter,
        renderer: &'a dyn ChartRenderer,
        writer: &'a dyn ContentWriter,
    ) -> Self {
        Self {
            settings,
            converter,
            renderer,
            writer,
        }
    }

    /// Convert one archive into `output_root`. Only archive-level failures
    /// are fatal; per-note and per-attachment failures are logged and the
    /// run continues.
    pub fn convert_archive(
        &self,
        archive_path: &Path,
        output_root: &Path,
    ) -> Result<ConversionSummary, PipelineError> {
        info!("Converting archive {}", archive_path.display());
        let mut archive = NsxArchive::open(archive_path)?;
        let config = archive.config()?;

        let mut notebooks = self.build_notebooks(&mut archive, &config.notebook);
        self.adopt_notes(&mut archive, &config.note, &mut notebooks);
        // An unused recycle bin produces no output folder
        if notebooks
            .last()
            .is_some_and(|nb| nb.id == RECYCLE_BIN_ID && nb.pages.is_empty())
        {
            notebooks.pop();
        }
        self.assign_file_names(&mut notebooks);
        self.finalize_attachment_names(&mut notebooks, output_root);

        // Link resolution runs once per archive, strictly after every page's
        // filename and folder are final
        let report = LinkResolver::resolve_and_rewrite(&mut notebooks);
        debug!(
            "Links: {} discovered, {} resolved, {} unresolved",
            report.discovered,
            report.resolved,
            report.unresolved.len()
        );

        let mut summary = ConversionSummary::new();
        summary.notebooks = notebooks.len();
        summary.unresolved_links = report.unresolved.len();

        let processor = NoteProcessor::new(self.settings, self.converter, self.renderer);
        for notebook in &notebooks {
            let notebook_dir = output_root.join(&notebook.folder_name);
            let attachment_dir = notebook_dir.join(&self.settings.attachment_folder);
            self.writer.create_dir_all(&attachment_dir)?;

            for page in &notebook.pages {
                let processed = processor.process_page(page);
                for attachment in page.attachments.iter().chain(&processed.chart_attachments) {
                    self.write_attachment(&mut archive, attachment, &attachment_dir, &mut summary);
                }

                let note_path = notebook_dir.join(&page.file_name);
                match self.writer.store_text(&note_path, &processed.content) {
                    Ok(()) => summary.pages += 1,
                    Err(e) => error!("Failed to write note '{}': {}", page.title, e),
                }
                if processed.conversion_failed {
                    summary.failed_pages += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Build one notebook per archive record, plus the synthetic recycle-bin
    /// bucket, with sibling folder names deduplicated
    fn build_notebooks(&self, archive: &mut NsxArchive, ids: &[String]) -> Vec<Notebook> {
        let mut notebooks = Vec::new();
        let mut used_folders = HashSet::new();
        for id in ids {
            let record: NotebookRecord = match archive.read_json(id) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable notebook record '{}': {}", id, e);
                    continue;
                }
            };
            let title = match record.title {
                Some(title) if !title.is_empty() => title,
                _ => "Untitled notebook".to_string(),
            };
            let mut notebook = Notebook::new(id, title);
            notebook.folder_name = dedup_folder(&mut used_folders, &notebook.folder_name);
            notebooks.push(notebook);
        }

        let mut recycle_bin = Notebook::recycle_bin();
        recycle_bin.folder_name = dedup_folder(&mut used_folders, &recycle_bin.folder_name);
        notebooks.push(recycle_bin);
        notebooks
    }

    /// Read every note record, attach its attachments, and hand it to its
    /// notebook (or the recycle bin when the parent is unknown)
    fn adopt_notes(&self, archive: &mut NsxArchive, ids: &[String], notebooks: &mut [Notebook]) {
        for id in ids {
            let record: NoteRecord = match archive.read_json(id) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable note record '{}': {}", id, e);
                    continue;
                }
            };

            let mut page = NotePage::new(
                id,
                record.title.unwrap_or_else(|| "Untitled".to_string()),
                record.ctime,
                record.mtime,
                record.content.unwrap_or_default(),
                record.tag,
            );
            if let Some(attachments) = record.attachment {
                for (attachment_id, att) in attachments {
                    let Some(locator) = att.payload_locator() else {
                        warn!(
                            "Attachment '{}' of note '{}' has no payload locator",
                            attachment_id, page.title
                        );
                        continue;
                    };
                    let kind = if att.is_image() {
                        AttachmentKind::Image
                    } else {
                        AttachmentKind::File
                    };
                    page.attachments.push(Attachment::new(
                        kind,
                        att.name,
                        att.ref_token,
                        AttachmentPayload::ArchiveRef(locator),
                    ));
                }
            }

            let parent = record.parent_id.unwrap_or_default();
            let target = notebooks
                .iter_mut()
                .position(|nb| nb.id == parent)
                // The recycle bin is always the last notebook
                .unwrap_or(notebooks.len() - 1);
            notebooks[target].add_page(page);
        }
    }

    /// Assign every page's output filename from its deduplicated title.
    /// Distinct titles can still clean to the same filename, so filenames
    /// get their own per-notebook dedup pass.
    fn assign_file_names(&self, notebooks: &mut [Notebook]) {
        let extension = self.settings.output_dialect.file_extension();
        for notebook in notebooks.iter_mut() {
            let mut used = HashSet::new();
            for page in &mut notebook.pages {
                let base = folder_name(&page.title);
                let mut candidate = format!("{}.{}", base, extension);
                let mut counter = 1;
                while used.contains(&candidate) {
                    candidate = format!("{}-{}.{}", base, counter, extension);
                    counter += 1;
                }
                used.insert(candidate.clone());
                page.file_name = candidate;
            }
        }
    }

    /// Resolve attachment filename collisions per notebook before any note
    /// content is processed. Embed links are baked into note bodies from
    /// `file_name` during processing, so the name written to disk must be
    /// final by then: dedup against sibling attachments and probe the target
    /// directory, renaming with a random suffix until the name is free.
    fn finalize_attachment_names(&self, notebooks: &mut [Notebook], output_root: &Path) {
        for notebook in notebooks.iter_mut() {
            let attachment_dir = output_root
                .join(&notebook.folder_name)
                .join(&self.settings.attachment_folder);
            let mut used = HashSet::new();
            for page in &mut notebook.pages {
                for attachment in &mut page.attachments {
                    let mut candidate = attachment.file_name.clone();
                    while used.contains(&candidate)
                        || self.writer.exists(&attachment_dir.join(&candidate))
                    {
                        candidate = disambiguate(&attachment.file_name);
                    }
                    used.insert(candidate.clone());
                    attachment.file_name = candidate;
                }
            }
        }
    }

    /// Fetch and write one attachment. Failures are logged and skipped;
    /// sibling attachments still get written.
    fn write_attachment(
        &self,
        archive: &mut NsxArchive,
        attachment: &Attachment,
        attachment_dir: &Path,
        summary: &mut ConversionSummary,
    ) {
        let bytes = match &attachment.payload {
            AttachmentPayload::ArchiveRef(locator) => match archive.read_bytes(locator) {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!(
                        "Cannot read attachment payload '{}': {}",
                        attachment.declared_name, e
                    );
                    return;
                }
            },
            AttachmentPayload::Bytes(bytes) => bytes.clone(),
            AttachmentPayload::Text(text) => text.clone().into_bytes(),
        };

        // Archive attachment names are finalized before processing; this
        // probe is the last resort for generated chart artifacts colliding
        // with a file already on disk
        let mut path = attachment_dir.join(&attachment.file_name);
        if self.writer.exists(&path) {
            path = attachment_dir.join(disambiguate(&attachment.file_name));
        }

        match self.writer.store_bytes(&path, &bytes) {
            Ok(()) => match attachment.kind {
                AttachmentKind::Image | AttachmentKind::ChartImage => summary.images += 1,
                AttachmentKind::File | AttachmentKind::ChartCsv => summary.attachments += 1,
            },
            Err(e) => error!(
                "Failed to write attachment '{}': {}",
                attachment.declared_name, e
            ),
        }
    }
}

fn dedup_folder(used: &mut HashSet<String>, base: &str) -> String {
    let mut candidate = base.to_string();
    let mut counter = 1;
    while used.contains(&candidate) {
        candidate = format!("{}-{}", base, counter);
        counter += 1;
    }
    used.insert(candidate.clone());
    candidate
}
