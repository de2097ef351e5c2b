//! Pipeline error types
//!
//! Only fatal failures surface through `PipelineError`: an unreadable
//! archive, an unavailable converter, or an unwritable export root.
//! Everything else (attachment write failures, per-note conversion failures,
//! malformed chart markup, unresolved links) is contained and logged at the
//! stage boundary.

use notedown_core::{ConvertError, WriteError};
use notedown_nsx::NsxError;
use thiserror::Error;

/// Fatal pipeline error type
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Archive could not be opened or its table of contents read
    #[error(transparent)]
    Nsx(#[from] NsxError),

    /// External converter unavailable
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Export root directory could not be created or written
    #[error(transparent)]
    Write(#[from] WriteError),
}
