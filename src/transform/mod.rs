//! Per-channel record normalization.
//!
//! Every concatenation job picks one [`LineTransformer`] for its channel and
//! firmware compatibility class. The transformer consumes one file's body
//! (header already removed) and yields the cleaned lines. Transformer state
//! never survives from one file to the next.
//!
//! | Channel | Policy |
//! |---------|--------|
//! | `SPC` | [`spectral`]: ensemble reduction |
//! | `SST` (class < 3) | [`rollover`]: millis to epoch mapping, then numeric filter |
//! | `SMD` | [`smart_mooring`]: validation and timestamp sort |
//! | anything else | [`numeric`]: keep numeric records |

pub mod numeric;
pub mod rollover;
pub mod smart_mooring;
pub mod spectral;

use crate::{ChannelKind, Error, Result, SourceFile};

/// Compatibility classes below this timestamp `SST` records with the millis
/// clock instead of epoch seconds.
pub const EPOCH_TIMESTAMP_CLASS: u32 = 3;

/// Normalization policy for one concatenation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTransformer {
    /// Keep lines whose first field is numeric (CSV files only).
    Numeric,
    /// Keep the final record of every spectral ensemble.
    Spectral,
    /// Convert millis timestamps to epoch seconds, then filter numerically.
    Rollover,
    /// Validate smart-mooring records and sort them by time.
    SmartMooring,
}

impl LineTransformer {
    /// Select the policy for a job.
    pub fn for_job(channel: ChannelKind, compatibility_class: u32) -> Self {
        match channel {
            ChannelKind::Spectra => LineTransformer::Spectral,
            ChannelKind::SmartMooring => LineTransformer::SmartMooring,
            ChannelKind::SurfaceTemperature if compatibility_class < EPOCH_TIMESTAMP_CLASS => {
                LineTransformer::Rollover
            }
            _ => LineTransformer::Numeric,
        }
    }

    /// Transform the body of `file`.
    ///
    /// `header` is the line removed from the top of the file; only the
    /// spectral policy looks at it. Errors are fatal for this file only.
    pub fn transform(
        &self,
        file: &SourceFile,
        header: &str,
        body: Vec<String>,
    ) -> Result<Vec<String>> {
        let lines = match self {
            LineTransformer::Spectral => {
                return spectral::reduce_ensembles(header, &body).map_err(|line| {
                    Error::corrupt(&file.path, format!("unreadable ensemble counter on line {line}"))
                });
            }
            LineTransformer::SmartMooring => {
                return Ok(smart_mooring::validate_and_sort(body));
            }
            LineTransformer::Rollover => {
                let companion = file.companion(ChannelKind::Displacement);
                let map = rollover::MillisToEpoch::from_companion(&file.path, &companion)?;
                rollover::map_millis_lines(body, &map)
            }
            LineTransformer::Numeric => body,
        };

        if file.is_csv() {
            Ok(numeric::filter_numeric(lines))
        } else {
            Ok(lines
                .into_iter()
                .map(numeric::strip_carriage_returns)
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn source(name: &str, channel: ChannelKind) -> SourceFile {
        SourceFile {
            sequence_number: 1,
            channel,
            path: PathBuf::from(name),
        }
    }

    #[test]
    fn selects_policy_per_channel() {
        use ChannelKind::*;
        assert_eq!(LineTransformer::for_job(Spectra, 3), LineTransformer::Spectral);
        assert_eq!(LineTransformer::for_job(SmartMooring, 0), LineTransformer::SmartMooring);
        assert_eq!(LineTransformer::for_job(SurfaceTemperature, 2), LineTransformer::Rollover);
        assert_eq!(LineTransformer::for_job(SurfaceTemperature, 3), LineTransformer::Numeric);
        assert_eq!(LineTransformer::for_job(Displacement, 0), LineTransformer::Numeric);
    }

    #[test]
    fn log_files_pass_through() {
        let file = source("0001_SYS.log", ChannelKind::System);
        let body = vec!["free text\r".to_string(), "SHA: 1".to_string()];
        let out = LineTransformer::Numeric.transform(&file, "h", body).unwrap();
        assert_eq!(out, vec!["free text", "SHA: 1"]);
    }

    #[test]
    fn csv_files_are_filtered() {
        let file = source("0001_FLT.CSV", ChannelKind::Displacement);
        let body = vec!["1,2".to_string(), "x,y".to_string()];
        let out = LineTransformer::Numeric.transform(&file, "h", body).unwrap();
        assert_eq!(out, vec!["1,2"]);
    }

    #[test]
    fn rollover_without_companion_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = SourceFile {
            sequence_number: 1,
            channel: ChannelKind::SurfaceTemperature,
            path: dir.path().join("0001_SST.CSV"),
        };
        let err = LineTransformer::Rollover
            .transform(&file, "millis,t", vec!["1,2".into()])
            .unwrap_err();
        assert!(matches!(err, Error::MissingCompanion(_)));
    }

    #[test]
    fn bad_spectral_counter_is_a_corrupt_file() {
        let file = source("0003_SPC.CSV", ChannelKind::Spectra);
        let body = vec!["SPEC_AVG,0,0,0,1,9".to_string(), "SPEC_AVG,0,0,0,?,9".to_string()];
        let err = LineTransformer::Spectral.transform(&file, "h", body).unwrap_err();
        assert!(matches!(err, Error::CorruptFile { .. }));
    }
}
