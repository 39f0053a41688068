//! Whole-card concatenation.
//!
//! [`concatenate_directory`] resolves the firmware version groups of an SD
//! card and runs one concatenation job per (group, channel). A card with a
//! single group writes its outputs straight into the output directory and
//! concatenates every file regardless of which system logs exist. A card with
//! several groups writes each group to its own numbered subdirectory
//! (`0/`, `1/`, ...) so incompatible files never share an output.
//!
//! ```no_run
//! use spotter_sd_rs::{ConcatOptions, Result, concatenate_directory};
//!
//! fn main() -> Result<()> {
//!     let summary = concatenate_directory(&ConcatOptions::new("/media/sd"))?;
//!     for group in &summary.groups {
//!         println!("{}: {} outputs", group.output_dir.display(), group.outputs.len());
//!     }
//!     if !summary.errors.is_empty() {
//!         println!("{} file(s) skipped", summary.errors.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::concat::{JobStats, concatenate_channel};
use crate::{ChannelKind, ConcatOptions, ErrorLog, Result, VersionGroup, resolve_versions};

/// One output written by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelOutput {
    /// Channel the output holds.
    pub channel: ChannelKind,
    /// Location of the output.
    pub path: PathBuf,
    /// Job counters.
    pub stats: JobStats,
}

/// Outputs of one version group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupSummary {
    /// The group, with `file_numbers` as used for the run.
    pub group: VersionGroup,
    /// Directory the group's outputs were written to.
    pub output_dir: PathBuf,
    /// Channels that produced an output, in processing order.
    pub outputs: Vec<ChannelOutput>,
}

impl GroupSummary {
    /// Output path of `channel`, if it produced one.
    pub fn output(&self, channel: ChannelKind) -> Option<&Path> {
        self.outputs
            .iter()
            .find(|o| o.channel == channel)
            .map(|o| o.path.as_path())
    }
}

/// Result of [`concatenate_directory`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    /// One entry per version group, in card order.
    pub groups: Vec<GroupSummary>,
    /// Messages written to the error log during the run.
    pub errors: Vec<String>,
    /// Error log location, if anything was logged.
    pub error_log: Option<PathBuf>,
}

impl RunSummary {
    /// Total number of outputs across all groups.
    pub fn output_count(&self) -> usize {
        self.groups.iter().map(|g| g.outputs.len()).sum()
    }

    /// Save the summary as pretty-printed JSON.
    #[cfg(feature = "serde")]
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a summary saved with [`save_to_file`](Self::save_to_file).
    #[cfg(feature = "serde")]
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Directory receiving the outputs of group `index` out of `group_count`.
pub fn group_output_dir(base: &Path, index: usize, group_count: usize) -> PathBuf {
    if group_count > 1 {
        base.join(index.to_string())
    } else {
        base.to_path_buf()
    }
}

/// Concatenate every configured channel of the SD card in
/// `options.input_dir`.
///
/// Per-file problems end up in the error log and in
/// [`RunSummary::errors`]; the returned error is reserved for failures that
/// stop the run (an unreadable input directory, an unwritable output).
pub fn concatenate_directory(options: &ConcatOptions) -> Result<RunSummary> {
    let mut groups = resolve_versions(&options.input_dir)?;
    if let [only] = groups.as_mut_slice() {
        only.file_numbers = None;
    }

    let base = options.output_dir();
    let mut errors = ErrorLog::new(options.error_log_path());
    let mut summary = RunSummary::default();
    let group_count = groups.len();

    for (index, group) in groups.into_iter().enumerate() {
        let output_dir = group_output_dir(base, index, group_count);
        std::fs::create_dir_all(&output_dir)?;
        log::info!(
            "Version group {index}: firmware {} (class {}), writing to {}",
            group.versions.join(", "),
            group.compatibility_class,
            output_dir.display()
        );

        let mut outputs = Vec::new();
        for &channel in &options.channels {
            let path = options
                .output_format
                .output_path(&output_dir, channel.output_stem());
            let stats = concatenate_channel(
                &options.input_dir,
                channel,
                &group,
                &path,
                options.output_format,
                &mut errors,
                options.report_progress,
            )?;
            if let Some(stats) = stats {
                outputs.push(ChannelOutput {
                    channel,
                    path,
                    stats,
                });
            }
        }

        summary.groups.push(GroupSummary {
            group,
            output_dir,
            outputs,
        });
    }

    if !errors.is_empty() {
        log::warn!(
            "{} file(s) could not be concatenated, see {}",
            errors.entries().len(),
            errors.path().display()
        );
        summary.error_log = Some(errors.path().to_path_buf());
    }
    summary.errors = errors.entries().to_vec();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_group_writes_in_place() {
        let base = Path::new("/out");
        assert_eq!(group_output_dir(base, 0, 1), PathBuf::from("/out"));
        assert_eq!(group_output_dir(base, 0, 2), PathBuf::from("/out/0"));
        assert_eq!(group_output_dir(base, 1, 2), PathBuf::from("/out/1"));
    }

    #[test]
    fn empty_card_produces_no_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let summary = concatenate_directory(&ConcatOptions::new(dir.path())).unwrap();
        assert_eq!(summary.groups.len(), 1);
        assert!(summary.groups[0].group.is_unrestricted());
        assert_eq!(summary.output_count(), 0);
        assert!(summary.errors.is_empty());
        assert!(summary.error_log.is_none());
    }
}
