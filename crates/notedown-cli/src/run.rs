//! Run orchestration: input discovery, converter probe, dispatch, reporting

use crate::cli::Cli;
use crate::writer::FsWriter;
use anyhow::{bail, Context, Result};
use notedown_config::{ConversionSettings, InputFormat};
use notedown_core::{disambiguate, folder_name, ContentWriter, ConversionSummary, MarkupConverter};
use notedown_pipeline::{ArchiveConverter, NoteProcessor, PandocConverter, SvgChartRenderer};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use walkdir::WalkDir;

/// Execute one full conversion run
pub fn run(cli: &Cli) -> Result<()> {
    let settings = cli.settings().context("Failed to load settings")?;

    // Input discovery comes first: an empty input set must be reportable
    // even on a machine without the converter installed
    let inputs = discover_inputs(&cli.source)?;
    if inputs.is_empty() {
        bail!(
            "No convertible input files (.nsx, .html, .md) found at '{}'",
            cli.source.display()
        );
    }
    info!("Discovered {} input file(s)", inputs.len());

    let converter =
        PandocConverter::with_binary(&cli.pandoc, settings.conversion_timeout_seconds);
    converter
        .check_available()
        .context("The external converter is required but could not be run")?;

    let writer = FsWriter;
    writer
        .create_dir_all(&cli.output)
        .with_context(|| format!("Cannot create output directory '{}'", cli.output.display()))?;
    let renderer = SvgChartRenderer;

    let mut summary = ConversionSummary::new();
    for (path, format) in &inputs {
        match format {
            InputFormat::Nsx => {
                let archive_summary =
                    ArchiveConverter::new(&settings, &converter, &renderer, &writer)
                        .convert_archive(path, &cli.output)
                        .with_context(|| {
                            format!("Failed to convert archive '{}'", path.display())
                        })?;
                summary.merge(&archive_summary);
            }
            InputFormat::Html | InputFormat::Markdown => {
                convert_standalone(
                    path,
                    *format,
                    &settings,
                    &converter,
                    &writer,
                    &cli.output,
                    &mut summary,
                );
            }
        }
    }

    if !settings.silent {
        println!("Converted: {}", summary);
    }
    Ok(())
}

/// Collect convertible files under `source` (or `source` itself), in a
/// stable name order
fn discover_inputs(source: &Path) -> Result<Vec<(PathBuf, InputFormat)>> {
    if !source.exists() {
        bail!("Input path '{}' does not exist", source.display());
    }
    if source.is_file() {
        return Ok(classify(source).map(|f| vec![(source.to_path_buf(), f)]).unwrap_or_default());
    }

    let mut inputs = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Cannot scan '{}'", source.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(format) = classify(entry.path()) {
            inputs.push((entry.into_path(), format));
        }
    }
    Ok(inputs)
}

fn classify(path: &Path) -> Option<InputFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(InputFormat::from_extension)
}

/// Convert one standalone HTML or Markdown file. Failures are per-file
/// recoverable: logged, counted, never fatal.
fn convert_standalone(
    path: &Path,
    format: InputFormat,
    settings: &ConversionSettings,
    converter: &dyn MarkupConverter,
    writer: &FsWriter,
    output: &Path,
    summary: &mut ConversionSummary,
) {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            error!("Cannot read '{}': {}", path.display(), e);
            return;
        }
    };

    let renderer = SvgChartRenderer;
    let processor = NoteProcessor::new(settings, converter, &renderer);
    let processed = processor.process_standalone(&raw, format);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    let file_name = format!(
        "{}.{}",
        folder_name(stem),
        settings.output_dialect.file_extension()
    );
    let mut target = output.join(&file_name);
    if writer.exists(&target) {
        target = output.join(disambiguate(&file_name));
    }

    match writer.store_text(&target, &processed.content) {
        Ok(()) => summary.pages += 1,
        Err(e) => error!("Failed to write '{}': {}", target.display(), e),
    }
    if processed.conversion_failed {
        summary.failed_pages += 1;
    }
}
