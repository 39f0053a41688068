#![forbid(unsafe_code)]

//! # spotter-sd-rs
//!
//! A Rust library for concatenating the raw log files a Spotter wave buoy
//! writes to its SD card.
//!
//! The buoy splits every data channel over many numbered files
//! (`0000_FLT.CSV`, `0001_FLT.CSV`, ...). This crate stitches each channel
//! back together into a single output, keeping one header, dropping debris
//! left by interrupted writes and correcting the quirks of older firmware
//! along the way.
//!
//! ## Features
//!
//! - **Indexing**: Find the files of a channel and order them by sequence number
//! - **Versioning**: Group files by the firmware build that wrote them, read from
//!   the system logs on the card
//! - **Normalization**: Per-channel line policies (numeric filtering, spectral
//!   ensemble reduction, millis clock rollover correction, smart-mooring
//!   validation and sorting)
//! - **Output**: Plain text or gzip outputs through one [`LineSink`] interface
//! - **Error logging**: Corrupt files are skipped and recorded in `error.txt`
//!
//! ## Quick Start
//!
//! ### Concatenating a whole card
//!
//! ```no_run
//! use spotter_sd_rs::{ConcatOptions, OutputFormat, Result, concatenate_directory};
//!
//! fn main() -> Result<()> {
//!     let options = ConcatOptions::new("/media/sd")
//!         .with_output_dir("/data/deployment-7")
//!         .with_output_format(OutputFormat::Text);
//!
//!     let summary = concatenate_directory(&options)?;
//!     println!("{} outputs written", summary.output_count());
//!     for message in &summary.errors {
//!         println!("{message}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Concatenating one channel
//!
//! ```no_run
//! use spotter_sd_rs::{
//!     ChannelKind, ErrorLog, OutputFormat, Result, VersionGroup, concatenate,
//! };
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let card = Path::new("/media/sd");
//!     let mut errors = ErrorLog::new(card.join("error.txt"));
//!     let written = concatenate(
//!         card,
//!         ChannelKind::Displacement,
//!         &VersionGroup::implicit(),
//!         &card.join("displacement.csv"),
//!         OutputFormat::Text,
//!         &mut errors,
//!     )?;
//!     if !written {
//!         println!("no displacement data on this card");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`index`] | SD card file discovery |
//! | [`firmware`] | Static registry of firmware builds |
//! | [`versions`] | System log scanning and version grouping |
//! | [`transform`] | Per-channel line normalization |
//! | [`concat`] | Concatenation engine |
//! | [`sink`] | Text and gzip output sinks |
//! | [`run`] | Whole-card runs with [`concatenate_directory`] |
//! | [`config`] | Run options, loadable from JSON |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`. A file that turns out to be corrupt does
//! not fail a run: it is skipped and recorded in the run's [`ErrorLog`].
//!
//! ## Logging
//!
//! Progress and warnings are emitted through the [`log`] facade. Install any
//! logger (for example `env_logger`) to see them.

mod channel;
mod error_log;

pub mod concat;
pub mod config;
pub mod error;
pub mod firmware;
pub mod index;
pub mod run;
pub mod sink;
pub mod transform;
pub mod versions;

// Re-export commonly used types at the crate root
pub use channel::{ChannelKind, SourceFile};
pub use concat::{ConcatenationJob, JobStats, concatenate, concatenate_channel};
pub use config::ConcatOptions;
pub use error::{Error, Result};
pub use error_log::{DEFAULT_ERROR_LOG, ErrorLog};
pub use index::{index_channel_files, parse_file_name};
pub use run::{ChannelOutput, GroupSummary, RunSummary, concatenate_directory};
#[cfg(feature = "compression")]
pub use sink::GzipSink;
pub use sink::{LineSink, OutputFormat, TextSink, open_sink};
pub use transform::LineTransformer;
pub use versions::{VersionGroup, resolve_versions};
