//! Gzip text sink.
//!
//! Lines are deflated as they arrive with `miniz_oxide`'s streaming
//! compressor and framed as a single gzip member (RFC 1952): a fixed 10-byte
//! header, the raw deflate stream, then the CRC-32 and length of the
//! uncompressed text.

use std::io::Write;

use crc32fast::Hasher as Crc32;
use miniz_oxide::deflate::core::{CompressorOxide, create_comp_flags_from_zip_params};
use miniz_oxide::deflate::stream::deflate;
use miniz_oxide::{MZError, MZFlush, MZStatus};

use super::LineSink;
use crate::{Error, Result};

/// Deflate compression level.
pub const COMPRESSION_LEVEL: i32 = 6;

// magic, CM=deflate, no flags, mtime 0, no extra flags, OS unknown
const GZIP_HEADER: [u8; 10] = [0x1f, 0x8b, 8, 0, 0, 0, 0, 0, 0, 0xff];
// negative window bits select a raw deflate stream without zlib framing
const RAW_WINDOW_BITS: i32 = -15;
const OUT_CHUNK: usize = 64 * 1024;

/// Sink writing gzip-compressed UTF-8 text.
pub struct GzipSink<W: Write> {
    inner: Option<W>,
    compressor: Box<CompressorOxide>,
    crc: Crc32,
    uncompressed_len: u64,
    out: Vec<u8>,
    finished: bool,
}

impl<W: Write> GzipSink<W> {
    /// Start a gzip member on `inner`; the header is written immediately.
    pub fn new(mut inner: W) -> Result<Self> {
        inner.write_all(&GZIP_HEADER)?;
        let flags = create_comp_flags_from_zip_params(COMPRESSION_LEVEL, RAW_WINDOW_BITS, 0);
        Ok(Self {
            inner: Some(inner),
            compressor: Box::new(CompressorOxide::new(flags)),
            crc: Crc32::new(),
            uncompressed_len: 0,
            out: vec![0; OUT_CHUNK],
            finished: false,
        })
    }

    /// Complete the member and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.finish()?;
        self.inner
            .take()
            .ok_or_else(|| Error::Compression("gzip sink already closed".to_string()))
    }

    fn writer(&mut self) -> Result<&mut W> {
        match self.inner.as_mut() {
            Some(w) if !self.finished => Ok(w),
            _ => Err(Error::Compression("write to a finished gzip sink".to_string())),
        }
    }

    fn compress(&mut self, mut input: &[u8], finish: bool) -> Result<()> {
        let flush = if finish { MZFlush::Finish } else { MZFlush::None };
        loop {
            let res = deflate(&mut self.compressor, input, &mut self.out, flush);
            input = &input[res.bytes_consumed..];
            if res.bytes_written > 0 {
                let writer = self
                    .inner
                    .as_mut()
                    .ok_or_else(|| Error::Compression("gzip sink already closed".to_string()))?;
                writer.write_all(&self.out[..res.bytes_written])?;
            }
            match res.status {
                Ok(MZStatus::StreamEnd) => return Ok(()),
                Ok(_) if !finish && input.is_empty() => return Ok(()),
                Ok(_) => {}
                // no progress possible without more input
                Err(MZError::Buf) if !finish && input.is_empty() => return Ok(()),
                Err(e) => return Err(Error::Compression(format!("deflate failed: {e:?}"))),
            }
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer()?;
        self.crc.update(bytes);
        self.uncompressed_len += bytes.len() as u64;
        self.compress(bytes, false)
    }
}

impl<W: Write> LineSink for GzipSink<W> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.write_bytes(line.as_bytes())?;
        self.write_bytes(b"\n")
    }

    fn finish(&mut self) -> Result<()> {
        if self.finished || self.inner.is_none() {
            return Ok(());
        }
        self.compress(&[], true)?;
        let crc = self.crc.clone().finalize();
        // ISIZE is the input length modulo 2^32
        let isize = (self.uncompressed_len & 0xffff_ffff) as u32;
        let writer = self.writer()?;
        writer.write_all(&crc.to_le_bytes())?;
        writer.write_all(&isize.to_le_bytes())?;
        writer.flush()?;
        self.finished = true;
        Ok(())
    }
}

impl<W: Write> Drop for GzipSink<W> {
    fn drop(&mut self) {
        if self.finished || self.inner.is_none() {
            return;
        }
        if let Err(e) = self.finish() {
            log::error!("Failed to complete gzip output: {e}");
        }
    }
}
