//! External converter invocation
//!
//! The markup transformation itself is an opaque subprocess: pandoc reads the
//! note's markup on stdin and writes the converted text on stdout. One
//! invocation per note, with a bounded wait; on timeout or non-zero exit the
//! caller substitutes [`CONVERSION_FAILURE_SENTINEL`] and moves on to the
//! next note. No retries.

use notedown_core::{ConvertError, MarkupConverter};
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, error};
use wait_timeout::ChildExt;

/// Fixed body substituted for a note whose external conversion failed
pub const CONVERSION_FAILURE_SENTINEL: &str =
    "# Conversion failure\n\nThe external converter could not process this note's content.\n";

/// Pandoc subprocess converter
pub struct PandocConverter {
    binary: String,
    timeout: Duration,
}

impl PandocConverter {
    pub fn new(timeout_seconds: u64) -> Self {
        Self {
            binary: "pandoc".to_string(),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    /// Use a different converter binary (tests, non-PATH installs)
    pub fn with_binary(binary: impl Into<String>, timeout_seconds: u64) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

impl MarkupConverter for PandocConverter {
    fn check_available(&self) -> Result<(), ConvertError> {
        let status = Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| ConvertError::Unavailable(format!("{}: {}", self.binary, e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(ConvertError::Unavailable(format!(
                "'{} --version' exited with {}",
                self.binary, status
            )))
        }
    }

    fn convert(&self, input: &str, from: &str, to: &str) -> Result<String, ConvertError> {
        debug!("pandoc -f {} -t {} ({} bytes in)", from, to, input.len());
        let mut child = Command::new(&self.binary)
            .args(["-f", from, "-t", to, "--wrap=none"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ConvertError::Unavailable(format!("{}: {}", self.binary, e)))?;

        // Note bodies are small enough to fit the pipe buffers, so writing
        // stdin to completion before draining stdout is safe here. A write
        // failure means the converter died early; the exit status reports it.
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(input.as_bytes());
        }

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                error!("Conversion timed out after {:?}, killing pandoc", self.timeout);
                let _ = child.kill();
                let _ = child.wait();
                return Err(ConvertError::TimedOut(self.timeout.as_secs()));
            }
        };

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            return Err(ConvertError::Failed {
                status: status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }

        let mut stdout = Vec::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_end(&mut stdout)?;
        }
        String::from_utf8(stdout).map_err(|_| ConvertError::InvalidOutput)
    }
}
