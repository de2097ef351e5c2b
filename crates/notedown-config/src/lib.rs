//! Notedown configuration
//!
//! One explicit [`ConversionSettings`] value is built at startup (from a TOML
//! file or a quick preset) and threaded through constructors; there is no
//! process-global configuration state.

mod dialect;
mod settings;

pub use dialect::{InputFormat, OutputDialect};
pub use settings::{ConfigError, ConversionSettings, MetadataSettings};
