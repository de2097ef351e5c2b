//! `ndn` command-line interface
//!
//! Discovers input files (`.nsx` archives, standalone HTML/Markdown), probes
//! the external converter, and drives the conversion pipeline over each
//! input. Per-note failures are logged and counted; the process exits
//! non-zero only for fatal conditions (no inputs, unreadable archive,
//! converter unavailable).

pub mod cli;
pub mod run;
pub mod writer;
