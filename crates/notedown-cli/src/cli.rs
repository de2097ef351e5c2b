use clap::{Parser, ValueEnum};
use notedown_config::{ConfigError, ConversionSettings, OutputDialect};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "ndn")]
#[command(about = "ndn - Batch converter for note archives and standalone notes")]
#[command(version)]
pub struct Cli {
    /// Input file or directory (.nsx archives, .html, .md files)
    pub source: PathBuf,

    /// Output directory; one subfolder per notebook
    #[arg(short = 'o', long, default_value = "notedown-export")]
    pub output: PathBuf,

    /// Quick preset: pick an output dialect, keep every other setting at its
    /// default
    #[arg(short = 'p', long, value_parser = parse_dialect, conflicts_with = "config")]
    pub preset: Option<OutputDialect>,

    /// Settings file path (TOML)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Suppress the console summary (logs are unaffected)
    #[arg(short, long)]
    pub silent: bool,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Converter binary to invoke (must accept pandoc's CLI)
    #[arg(long, default_value = "pandoc")]
    pub pandoc: String,
}

impl Cli {
    /// Build the run's settings from `--config` or `--preset` (clap rejects
    /// both together); neither flag means the default preset.
    pub fn settings(&self) -> Result<ConversionSettings, ConfigError> {
        let mut settings = match (&self.config, self.preset) {
            (Some(path), _) => ConversionSettings::from_toml_file(path)?,
            (None, Some(dialect)) => ConversionSettings::quick(dialect),
            (None, None) => ConversionSettings::default(),
        };
        if self.silent {
            settings.silent = true;
        }
        Ok(settings)
    }
}

fn parse_dialect(key: &str) -> Result<OutputDialect, String> {
    OutputDialect::from_key(key).ok_or_else(|| {
        let known: Vec<&str> = OutputDialect::ALL.iter().map(|d| d.key()).collect();
        format!("unknown dialect '{}' (expected one of: {})", key, known.join(", "))
    })
}
