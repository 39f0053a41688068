//! Concatenation engine.
//!
//! One [`ConcatenationJob`] covers one channel within one firmware version
//! group: its files are read in sequence order, normalized by the channel's
//! [`LineTransformer`] and written to a single [`LineSink`]. Only the header of
//! the first file that is processed successfully is kept.
//!
//! A file that cannot be read or transformed is recorded in the run's
//! [`ErrorLog`] and skipped; the job carries on with the next file.

use std::path::Path;

use crate::{
    ChannelKind, Error, ErrorLog, LineSink, OutputFormat, Result, SourceFile, VersionGroup,
    index_channel_files, open_sink, transform::LineTransformer,
};

/// Counters describing one finished job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JobStats {
    /// Files that contributed to the output.
    pub files_written: usize,
    /// Files skipped because they were unreadable or failed to transform.
    pub files_skipped: usize,
    /// Lines written, header included.
    pub lines_written: usize,
}

/// Read a source file as lines, without terminators.
///
/// Files that are not valid UTF-8 are reported as corrupt.
pub fn read_source_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|e| Error::corrupt(path, e.to_string()))?;
    Ok(text.lines().map(str::to_string).collect())
}

/// All files of one channel that share a compatibility class.
#[derive(Debug, Clone)]
pub struct ConcatenationJob {
    /// Channel being concatenated.
    pub channel: ChannelKind,
    /// Compatibility class of every file in the job.
    pub compatibility_class: u32,
    /// Files in ascending sequence order.
    pub files: Vec<SourceFile>,
}

impl ConcatenationJob {
    /// Create a job over already-indexed files.
    pub fn new(channel: ChannelKind, compatibility_class: u32, files: Vec<SourceFile>) -> Self {
        Self {
            channel,
            compatibility_class,
            files,
        }
    }

    /// The normalization policy of this job.
    pub fn transformer(&self) -> LineTransformer {
        LineTransformer::for_job(self.channel, self.compatibility_class)
    }

    fn process_file(
        &self,
        transformer: LineTransformer,
        file: &SourceFile,
    ) -> Result<Option<(String, Vec<String>)>> {
        let mut lines = read_source_lines(&file.path)?;
        if lines.is_empty() {
            return Ok(None);
        }
        let header = lines.remove(0);
        let body = transformer.transform(file, &header, lines)?;
        Ok(Some((header, body)))
    }

    /// Run the job into `sink`.
    ///
    /// Per-file failures go to `errors`; only failures of the sink or of the
    /// error log itself abort the job.
    pub fn run(
        &self,
        sink: &mut dyn LineSink,
        errors: &mut ErrorLog,
        report_progress: bool,
    ) -> Result<JobStats> {
        let transformer = self.transformer();
        let mut stats = JobStats::default();
        let mut header_written = false;

        for (index, file) in self.files.iter().enumerate() {
            if report_progress {
                log::info!(
                    "- {} (File {} of {})",
                    file.file_name(),
                    index + 1,
                    self.files.len()
                );
            }

            let (header, body) = match self.process_file(transformer, file) {
                Ok(Some(processed)) => processed,
                Ok(None) => continue,
                Err(e) => {
                    log::debug!("{}: {e}", file.path.display());
                    errors.record_file_error(&file.path, &e)?;
                    stats.files_skipped += 1;
                    continue;
                }
            };

            if !header_written {
                sink.write_line(header.trim_end_matches('\r'))?;
                header_written = true;
                stats.lines_written += 1;
            }
            sink.write_lines(&body)?;
            stats.lines_written += body.len();
            stats.files_written += 1;
        }

        Ok(stats)
    }
}

/// Concatenate `channel` for one version group into `output`.
///
/// Returns `Ok(None)` without creating `output` when the group has no files
/// for this channel; otherwise the statistics of the finished job. The sink
/// is completed on every path, including when a write fails.
pub fn concatenate_channel(
    input_dir: &Path,
    channel: ChannelKind,
    group: &VersionGroup,
    output: &Path,
    format: OutputFormat,
    errors: &mut ErrorLog,
    report_progress: bool,
) -> Result<Option<JobStats>> {
    let files = index_channel_files(input_dir, channel, group.file_numbers.as_ref())?;
    if files.is_empty() {
        log::info!("  No {channel} data files available.");
        return Ok(None);
    }

    log::info!("Concatenating all {channel} files:");
    let job = ConcatenationJob::new(channel, group.compatibility_class, files);
    let mut sink = open_sink(output, format)?;
    let result = job.run(sink.as_mut(), errors, report_progress);
    let finished = sink.finish();
    let stats = result?;
    finished?;
    Ok(Some(stats))
}

/// Concatenate `channel` for one version group; `false` means the channel
/// had no data and downstream processing should be skipped.
pub fn concatenate(
    input_dir: &Path,
    channel: ChannelKind,
    group: &VersionGroup,
    output: &Path,
    format: OutputFormat,
    errors: &mut ErrorLog,
) -> Result<bool> {
    concatenate_channel(input_dir, channel, group, output, format, errors, true)
        .map(|stats| stats.is_some())
}
