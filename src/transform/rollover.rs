//! Millis clock rollover correction and epoch mapping.
//!
//! Older firmware timestamps some channels with a free-running 32-bit
//! millisecond counter instead of epoch seconds. The counter wraps to zero
//! after `u32::MAX`. The displacement file written alongside carries both the
//! counter and epoch time, which gives a linear map from one to the other.

use std::path::Path;

use crate::{Error, Result};

/// Amount added to a delta that wrapped.
pub const MILLIS_WRAP: i64 = 4_294_967_295;
/// Deltas more negative than this are treated as a wrap.
pub const WRAP_THRESHOLD: i64 = -4_294_000_000;
/// The maximum millis value must lie at or beyond this sample index.
pub const MIN_SPAN_SAMPLES: usize = 10;
/// Lines containing this token are header lines and pass through.
pub const HEADER_TOKEN: &str = "millis";

/// Running counter value for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RolloverState {
    previous: i64,
}

impl RolloverState {
    /// Fresh state; every file starts from zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last accumulated counter value.
    pub fn previous(&self) -> i64 {
        self.previous
    }

    /// Accumulate `millis`, correcting for a wrap of the device clock.
    ///
    /// Returns `None`, leaving the state untouched, when the value is so far
    /// out of range that the arithmetic would overflow.
    pub fn unwrap(&mut self, millis: i64) -> Option<i64> {
        let mut delta = millis.checked_sub(self.previous)?;
        if delta < WRAP_THRESHOLD {
            delta = delta.checked_add(MILLIS_WRAP)?;
        }
        self.previous = self.previous.checked_add(delta)?;
        Some(self.previous)
    }
}

/// Linear relation from millis counter to epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MillisToEpoch {
    millis0: f64,
    epoch0: f64,
    millis_span: f64,
    epoch_span: f64,
}

impl MillisToEpoch {
    /// Fit from `(millis, epoch)` samples using the first sample and the
    /// sample holding the (first) maximum millis value.
    ///
    /// Fails with the index of the maximum when it lies within the first
    /// [`MIN_SPAN_SAMPLES`] samples.
    pub fn fit(samples: &[(f64, f64)]) -> core::result::Result<Self, usize> {
        let Some(&(millis0, epoch0)) = samples.first() else {
            return Err(0);
        };
        let mut max_index = 0;
        for (i, &(m, _)) in samples.iter().enumerate() {
            if m > samples[max_index].0 {
                max_index = i;
            }
        }
        if max_index < MIN_SPAN_SAMPLES {
            return Err(max_index);
        }
        let (millis1, epoch1) = samples[max_index];
        Ok(Self {
            millis0,
            epoch0,
            millis_span: millis1 - millis0,
            epoch_span: epoch1 - epoch0,
        })
    }

    /// Fit from the companion displacement file of `path`.
    pub fn from_companion(path: &Path, companion: &Path) -> Result<Self> {
        if !companion.exists() {
            return Err(Error::MissingCompanion(companion.to_path_buf()));
        }
        let bytes = std::fs::read(companion)?;
        let text = String::from_utf8_lossy(&bytes);
        Self::fit(&parse_samples(&text)).map_err(|max_index| Error::InsufficientRolloverSpan {
            path: path.to_path_buf(),
            companion: companion.to_path_buf(),
            max_index,
        })
    }

    /// Map a corrected counter value to whole epoch seconds (truncated).
    pub fn epoch(&self, millis: i64) -> i64 {
        (self.epoch0 + (millis as f64 - self.millis0) * self.epoch_span / self.millis_span) as i64
    }
}

/// Read `(millis, epoch)` pairs from the first two columns of a displacement
/// file, skipping its header and any row where either value is not finite.
pub fn parse_samples(text: &str) -> Vec<(f64, f64)> {
    text.lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split(',');
            let millis: f64 = fields.next()?.trim().parse().ok()?;
            let epoch: f64 = fields.next()?.trim().parse().ok()?;
            (millis.is_finite() && epoch.is_finite()).then_some((millis, epoch))
        })
        .collect()
}

/// Replace the millis timestamp of every data line with epoch seconds.
///
/// Data lines must have exactly two fields and an integer counter; anything
/// else is dropped. Lines containing [`HEADER_TOKEN`] pass through.
pub fn map_millis_lines(lines: Vec<String>, map: &MillisToEpoch) -> Vec<String> {
    let mut state = RolloverState::new();
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if line.contains(HEADER_TOKEN) {
            out.push(line);
            continue;
        }
        let fields: Vec<&str> = line.trim().split(',').collect();
        let [millis, value] = fields.as_slice() else {
            continue;
        };
        let Ok(millis) = millis.trim().parse::<i64>() else {
            continue;
        };
        let Some(corrected) = state.unwrap(millis) else {
            log::debug!("Dropping out-of-range millis value {millis}");
            continue;
        };
        out.push(format!("{} , {}", map.epoch(corrected), value));
    }
    out
}
