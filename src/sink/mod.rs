//! Line-oriented output destinations.
//!
//! A concatenation job writes its lines through a [`LineSink`]. Two
//! implementations exist: [`TextSink`] writes plain text and [`GzipSink`]
//! (with the `compression` feature) writes a gzip member. Both are generic
//! over [`std::io::Write`], so tests can target an in-memory `Vec<u8>`.
//!
//! A sink owns its destination for the whole job. [`LineSink::finish`] flushes
//! and completes the output; a sink that is dropped early (for example when a
//! write fails) still flushes what it can and releases its file handle.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::Result;

#[cfg(feature = "compression")]
mod gzip;

#[cfg(feature = "compression")]
pub use gzip::GzipSink;

/// Capacity of the buffered file writer behind every file sink.
pub const WRITE_BUFFER_CAPACITY: usize = 1_048_576;

/// Destination of a concatenation job.
pub trait LineSink {
    /// Write one line; the line terminator is added by the sink.
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Write several lines in order.
    fn write_lines(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            self.write_line(line)?;
        }
        Ok(())
    }

    /// Flush and complete the output.
    fn finish(&mut self) -> Result<()>;
}

/// Output encoding of concatenated files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputFormat {
    /// Plain UTF-8 text, `.csv`.
    #[default]
    Text,
    /// Gzip-compressed UTF-8 text, `.csv.gz`.
    Gzip,
}

impl OutputFormat {
    /// File extension (without leading dot) for outputs in this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "csv",
            OutputFormat::Gzip => "csv.gz",
        }
    }

    /// Output path for `stem` in `dir`.
    pub fn output_path(self, dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{stem}.{}", self.extension()))
    }
}

/// Plain text sink.
///
/// Dropping the sink drops the writer, which for a `BufWriter` flushes the
/// remaining buffer and closes the file.
pub struct TextSink<W: Write> {
    inner: W,
}

impl<W: Write> TextSink<W> {
    /// Wrap an existing writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Access the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> LineSink for TextSink<W> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Create the file at `path` and open a sink of the requested format on it.
///
/// An existing file is truncated.
pub fn open_sink(path: &Path, format: OutputFormat) -> Result<Box<dyn LineSink>> {
    let file = File::create(path)?;
    let writer = BufWriter::with_capacity(WRITE_BUFFER_CAPACITY, file);
    match format {
        OutputFormat::Text => Ok(Box::new(TextSink::new(writer))),
        #[cfg(feature = "compression")]
        OutputFormat::Gzip => Ok(Box::new(GzipSink::new(writer)?)),
        #[cfg(not(feature = "compression"))]
        OutputFormat::Gzip => Err(crate::Error::Compression(
            "gzip output requires the `compression` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_sink_terminates_lines() {
        let mut sink = TextSink::new(Vec::new());
        sink.write_line("a,b").unwrap();
        sink.write_lines(&["1,2".to_string(), "3,4".to_string()]).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.get_ref().len(), 12);
        assert_eq!(sink.into_inner().unwrap(), b"a,b\n1,2\n3,4\n");
    }

    #[test]
    fn output_paths_follow_format() {
        let dir = Path::new("/out");
        assert_eq!(
            OutputFormat::Text.output_path(dir, "displacement"),
            PathBuf::from("/out/displacement.csv")
        );
        assert_eq!(
            OutputFormat::Gzip.output_path(dir, "spectra"),
            PathBuf::from("/out/spectra.csv.gz")
        );
    }

    #[test]
    fn dropped_file_sink_keeps_written_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        {
            let mut sink = open_sink(&path, OutputFormat::Text).unwrap();
            sink.write_line("header").unwrap();
            sink.write_line("1").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "header\n1\n");
    }
}
