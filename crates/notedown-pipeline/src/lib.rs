//! Notedown conversion pipeline
//!
//! The pipeline coordinates per-note content transformation stages around the
//! opaque external converter (pandoc), resolves inter-note links once per
//! archive, and drives whole-archive conversion:
//!
//! 1. Archive records become notebooks, note pages, and attachments
//! 2. Every page's output filename and notebook folder are finalized
//! 3. Inter-note links are discovered, resolved, and rewritten archive-wide
//! 4. Each page runs the pre-conversion stages, the external converter, and
//!    the post-conversion stages, then gets written
//!
//! Link resolution is best-effort by design: unresolved links are reported,
//! never fatal. Per-note conversion failures produce a sentinel body and the
//! run continues.

pub mod chart;
pub mod checklist;
pub mod converter;
pub mod driver;
pub mod error;
pub mod links;
pub mod metadata;
pub mod orchestrator;
pub mod stages;

pub use chart::{ChartConfig, ChartKind, ChartProcessor, ChartRenderer, ChartTable, SvgChartRenderer};
pub use checklist::{ChecklistDialect, ChecklistProcessor, ChecklistTarget};
pub use converter::{PandocConverter, CONVERSION_FAILURE_SENTINEL};
pub use driver::ArchiveConverter;
pub use error::PipelineError;
pub use links::{LinkReport, LinkResolver, UnresolvedLink};
pub use metadata::MetadataGenerator;
pub use orchestrator::{NoteProcessor, ProcessedNote};
