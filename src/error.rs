//! Error types for concatenation runs.
//!
//! This module defines the [`Error`] enum which represents the failures that
//! can stop a whole operation. Most per-file problems never surface here as a
//! hard error: the concatenation engine records them in the run's
//! [`ErrorLog`](crate::ErrorLog) and moves on to the next file.
//!
//! # Example
//!
//! ```no_run
//! use spotter_sd_rs::{ChannelKind, Error, Result, index_channel_files};
//!
//! fn count_displacement_files(dir: &str) -> Result<usize> {
//!     match index_channel_files(dir, ChannelKind::Displacement, None) {
//!         Ok(files) => Ok(files.len()),
//!         Err(Error::Io(e)) => {
//!             eprintln!("cannot list {dir}: {e}");
//!             Err(Error::Io(e))
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while indexing, transforming or writing SD card files.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error while reading a source file or writing an output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A file name did not follow the `{sequence}_{TAG}.{ext}` convention.
    #[error("invalid SD card file name: {0}")]
    InvalidFileName(String),

    /// A source file could not be decoded or contained an unusable record.
    ///
    /// The engine treats this as recoverable: the file is skipped.
    #[error("file {path} is corrupt: {reason}")]
    CorruptFile {
        /// Offending file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// The companion displacement file does not span enough samples to fit
    /// the millis-to-epoch relation.
    ///
    /// Fatal for the contribution of `path` only.
    #[error(
        "insufficient millis span in {companion} for {path}: maximum at sample {max_index}"
    )]
    InsufficientRolloverSpan {
        /// File whose millis counter was being mapped
        path: PathBuf,
        /// Companion file the relation was fitted from
        companion: PathBuf,
        /// Sample index of the maximum millis value
        max_index: usize,
    },

    /// The companion file needed for the millis-to-epoch fit does not exist.
    #[error("companion file {0} is missing")]
    MissingCompanion(PathBuf),

    /// The gzip encoder reported a failure.
    #[error("compression failed: {0}")]
    Compression(String),

    /// JSON (de)serialization of options or run summaries failed.
    #[cfg(feature = "serde")]
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::CorruptFile`].
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::CorruptFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for concatenation operations.
pub type Result<T> = core::result::Result<T, Error>;
