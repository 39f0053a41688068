//! Per-run record of files that could not be concatenated.
//!
//! The log file is created (truncating any previous log) when the first
//! problem of a run is recorded and appended to afterwards. A run without
//! problems leaves no log file behind.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default file name of the error log.
pub const DEFAULT_ERROR_LOG: &str = "error.txt";

/// Error log handle owned by one run.
#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    created: bool,
    entries: Vec<String>,
}

impl ErrorLog {
    /// Log that will be written to `path` on the first recorded error.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            created: false,
            entries: Vec::new(),
        }
    }

    /// Where the log is (or would be) written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Messages recorded so far in this run.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append one message line.
    pub fn record(&mut self, message: &str) -> Result<()> {
        log::error!("{message}");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(self.created)
            .truncate(!self.created)
            .open(&self.path)?;
        writeln!(file, "{message}")?;
        self.created = true;
        self.entries.push(message.to_string());
        Ok(())
    }

    /// Record that `path` could not be read or transformed.
    pub fn record_file_error(&mut self, path: &Path, error: &Error) -> Result<()> {
        let message = match error {
            Error::InsufficientRolloverSpan { .. } | Error::MissingCompanion(_) => {
                format!("- ERROR:, file {} skipped: {error}", path.display())
            }
            _ => format!("- ERROR:, file {} is corrupt", path.display()),
        };
        self.record(&message)
    }
}
