//! Run configuration.
//!
//! [`ConcatOptions`] collects everything a directory run needs. Options can be
//! built in code with the `with_*` setters or stored as JSON.
//!
//! ```no_run
//! use spotter_sd_rs::{ChannelKind, ConcatOptions, OutputFormat};
//!
//! let options = ConcatOptions::new("/media/sd")
//!     .with_output_dir("/data/deployment-7")
//!     .with_output_format(OutputFormat::Gzip)
//!     .with_channels([ChannelKind::Displacement, ChannelKind::Spectra]);
//! # let _ = options;
//! ```

use std::path::{Path, PathBuf};

use crate::error_log::DEFAULT_ERROR_LOG;
use crate::{ChannelKind, OutputFormat};

#[cfg(feature = "serde")]
use crate::Result;

/// Options for [`concatenate_directory`](crate::concatenate_directory).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConcatOptions {
    /// Directory holding the SD card files.
    pub input_dir: PathBuf,
    /// Directory receiving the concatenated outputs; defaults to `input_dir`.
    pub output_dir: Option<PathBuf>,
    /// Encoding of the outputs.
    pub output_format: OutputFormat,
    /// Channels to concatenate, in processing order.
    pub channels: Vec<ChannelKind>,
    /// Error log location; defaults to `error.txt` in the output directory.
    pub error_log: Option<PathBuf>,
    /// Log one progress line per file.
    pub report_progress: bool,
}

impl Default for ConcatOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: None,
            output_format: OutputFormat::Text,
            channels: ChannelKind::ALL.to_vec(),
            error_log: None,
            report_progress: true,
        }
    }
}

impl ConcatOptions {
    /// Default options reading from `input_dir`.
    pub fn new<P: Into<PathBuf>>(input_dir: P) -> Self {
        Self {
            input_dir: input_dir.into(),
            ..Self::default()
        }
    }

    /// Write outputs to `dir` instead of the input directory.
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Select the output encoding.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Restrict the run to `channels`.
    pub fn with_channels<I: IntoIterator<Item = ChannelKind>>(mut self, channels: I) -> Self {
        self.channels = channels.into_iter().collect();
        self
    }

    /// Write the error log to `path`.
    pub fn with_error_log<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.error_log = Some(path.into());
        self
    }

    /// Enable or disable per-file progress messages.
    pub fn with_progress(mut self, report: bool) -> Self {
        self.report_progress = report;
        self
    }

    /// Effective output directory.
    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.input_dir)
    }

    /// Effective error log path.
    pub fn error_log_path(&self) -> PathBuf {
        self.error_log
            .clone()
            .unwrap_or_else(|| self.output_dir().join(DEFAULT_ERROR_LOG))
    }

    /// Save the options as pretty-printed JSON.
    #[cfg(feature = "serde")]
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load options from JSON; missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
