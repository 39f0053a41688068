//! Data channels written by the buoy and the files that carry them.

use core::fmt;
use core::str::FromStr;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// One logical data stream, identified on the SD card by a 3-letter tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelKind {
    /// `FLT`: filtered displacement samples.
    Displacement,
    /// `SPC`: spectral ensembles.
    Spectra,
    /// `SYS`: free-text system log, also the firmware version source.
    System,
    /// `LOC`: mean location.
    Location,
    /// `GPS`: raw GPS fixes.
    Gps,
    /// `SST`: sea surface temperature, timestamped with the millis clock.
    SurfaceTemperature,
    /// `SMD`: smart-mooring log.
    SmartMooring,
}

impl ChannelKind {
    /// Every channel, in the order a run processes them by default.
    pub const ALL: [ChannelKind; 7] = [
        ChannelKind::Displacement,
        ChannelKind::Spectra,
        ChannelKind::System,
        ChannelKind::Location,
        ChannelKind::Gps,
        ChannelKind::SurfaceTemperature,
        ChannelKind::SmartMooring,
    ];

    /// The tag used in file names, e.g. `FLT` in `0012_FLT.CSV`.
    pub fn tag(self) -> &'static str {
        match self {
            ChannelKind::Displacement => "FLT",
            ChannelKind::Spectra => "SPC",
            ChannelKind::System => "SYS",
            ChannelKind::Location => "LOC",
            ChannelKind::Gps => "GPS",
            ChannelKind::SurfaceTemperature => "SST",
            ChannelKind::SmartMooring => "SMD",
        }
    }

    /// Alternate tags accepted when indexing this channel.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            ChannelKind::Location => &["GPS"],
            _ => &[],
        }
    }

    /// Returns true if `tag` names this channel or one of its synonyms.
    pub fn accepts_tag(self, tag: &str) -> bool {
        tag == self.tag() || self.synonyms().contains(&tag)
    }

    /// File stem of the concatenated output for this channel.
    pub fn output_stem(self) -> &'static str {
        match self {
            ChannelKind::Displacement => "displacement",
            ChannelKind::Spectra => "spectra",
            ChannelKind::System => "system",
            ChannelKind::Location => "location",
            ChannelKind::Gps => "gps",
            ChannelKind::SurfaceTemperature => "sst",
            ChannelKind::SmartMooring => "smartmooring_data",
        }
    }

    /// Resolve a file-name tag to its primary channel.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ChannelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(&s.to_ascii_uppercase())
            .ok_or_else(|| Error::InvalidFileName(format!("unknown channel tag {s:?}")))
    }
}

/// A numbered file discovered on the SD card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Device-assigned sequence number, the numeric file-name prefix.
    pub sequence_number: u64,
    /// Channel the file was indexed for.
    pub channel: ChannelKind,
    /// Full path to the file.
    pub path: PathBuf,
}

impl SourceFile {
    /// File name without the directory, for progress messages.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// True for `.csv` files (any case); `.log` files are free text.
    pub fn is_csv(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    }

    /// Path of the file with the same sequence number on another channel.
    ///
    /// The tag in the file name is substituted, the rest of the name is kept,
    /// so `0007_SST.CSV` becomes `0007_FLT.CSV`.
    pub fn companion(&self, channel: ChannelKind) -> PathBuf {
        let name = self.file_name();
        let tag = format!("_{}.", self.tag_in_name().unwrap_or(self.channel.tag()));
        let replaced = name.replacen(&tag, &format!("_{}.", channel.tag()), 1);
        self.path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(replaced)
    }

    fn tag_in_name(&self) -> Option<&str> {
        let name = self.path.file_name()?.to_str()?;
        let (_, rest) = name.split_once('_')?;
        rest.get(..3)
    }
}
