//! Spectral ensemble reduction.
//!
//! In production firmware every spectral record is the final average of one
//! ensemble. Debug firmware additionally writes every partial average, so for
//! one ensemble the counter climbs through successive records before dropping
//! back when the next ensemble starts. Only the last record before the drop is
//! kept.

/// Record prefixes carrying an ensemble counter.
pub const RECORD_MARKERS: [&str; 3] = ["SPEC_AVG", "SPECA_CC", "SPECA"];
/// Cross-correlation records are emitted as they come, even in debug mode.
pub const CROSS_CORRELATION_MARKER: &str = "SPECA_CC";
/// Number of leading lines inspected for debug-only markers.
pub const MODE_SCAN_LINES: usize = 11;
/// Zero-based comma field holding the ensemble counter.
pub const COUNTER_FIELD: usize = 4;

/// How the spectral file was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionMode {
    /// One record per ensemble.
    Production,
    /// Every partial average is recorded.
    Debug,
}

/// Classify a spectral file from its leading lines (header included).
///
/// Debug files contain `FFT` or `SPEC,` records near the top; production
/// files only ever contain averaged records.
pub fn detect_mode<'a, I>(lines: I) -> AcquisitionMode
where
    I: IntoIterator<Item = &'a str>,
{
    let debug = lines
        .into_iter()
        .take(MODE_SCAN_LINES)
        .any(|line| line.starts_with("FFT") || line.starts_with("SPEC,"));
    if debug {
        AcquisitionMode::Debug
    } else {
        AcquisitionMode::Production
    }
}

/// True if the line is a spectral record.
pub fn is_ensemble_record(line: &str) -> bool {
    RECORD_MARKERS.iter().any(|m| line.starts_with(m))
}

/// The ensemble counter of a spectral record, if it has one.
pub fn ensemble_counter(line: &str) -> Option<i64> {
    line.split(',').nth(COUNTER_FIELD)?.trim().parse().ok()
}

/// Reducer state for one spectral file.
#[derive(Debug, Clone)]
pub struct EnsembleState {
    mode: AcquisitionMode,
    last_counter: i64,
    pending: Option<String>,
}

impl EnsembleState {
    /// Fresh state for a file acquired in `mode`.
    pub fn new(mode: AcquisitionMode) -> Self {
        Self {
            mode,
            last_counter: 0,
            pending: None,
        }
    }

    /// Acquisition mode this state was created for.
    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    /// Feed one spectral record with its ensemble counter; returns the line
    /// to emit, if any.
    pub fn step(&mut self, line: &str, counter: i64) -> Option<String> {
        match self.mode {
            AcquisitionMode::Production => {
                self.last_counter = counter;
                Some(line.to_string())
            }
            AcquisitionMode::Debug if line.starts_with(CROSS_CORRELATION_MARKER) => {
                self.last_counter = 0;
                Some(line.to_string())
            }
            AcquisitionMode::Debug if counter < self.last_counter => {
                // counter dropped: the buffered line closed the previous ensemble
                self.last_counter = 0;
                self.pending.take()
            }
            AcquisitionMode::Debug => {
                self.last_counter = counter;
                self.pending = Some(line.to_string());
                None
            }
        }
    }
}

/// Reduce one spectral file body; `header` only takes part in mode detection.
///
/// Lines that are not spectral records are dropped. A record whose counter
/// cannot be read makes the whole file unusable: the error carries its
/// 1-based line number within the body.
pub fn reduce_ensembles(header: &str, body: &[String]) -> Result<Vec<String>, usize> {
    let mode = detect_mode(core::iter::once(header).chain(body.iter().map(String::as_str)));
    let mut state = EnsembleState::new(mode);
    let mut out = Vec::new();
    for (i, line) in body.iter().enumerate() {
        if !is_ensemble_record(line) {
            continue;
        }
        let counter = ensemble_counter(line).ok_or(i + 1)?;
        out.extend(state.step(line, counter));
    }
    Ok(out)
}
