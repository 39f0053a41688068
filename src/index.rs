//! SD card file discovery.
//!
//! The buoy writes each channel across many files named
//! `{sequence}_{TAG}.{ext}`, e.g. `0012_FLT.CSV`. This module finds the files
//! belonging to one channel and returns them in device order.
//!
//! ```no_run
//! use spotter_sd_rs::{ChannelKind, Result, index_channel_files};
//! use std::collections::BTreeSet;
//!
//! fn main() -> Result<()> {
//!     // Everything on the card
//!     let all = index_channel_files("/media/sd", ChannelKind::Displacement, None)?;
//!
//!     // Only the files written under one firmware group
//!     let group: BTreeSet<u64> = [10, 11, 12].into_iter().collect();
//!     let some = index_channel_files("/media/sd", ChannelKind::Displacement, Some(&group))?;
//!     assert!(some.len() <= all.len());
//!     Ok(())
//! }
//! ```

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::{ChannelKind, Error, Result, SourceFile};

static FILE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<seq>\d+)_(?P<tag>[A-Za-z]{3})\.(?P<ext>(?i:csv|log))$")
        .unwrap_or_else(|e| panic!("file name pattern: {e}"))
});

/// Split an SD card file name into its sequence number and channel tag.
///
/// Returns `None` when the name does not follow the convention or the
/// extension is not one of the accepted ones (`csv`, `log`, any case).
pub fn parse_file_name(name: &str) -> Option<(u64, &str)> {
    let caps = FILE_NAME_RE.captures(name)?;
    let seq = caps.name("seq")?.as_str().parse().ok()?;
    Some((seq, caps.name("tag")?.as_str()))
}

/// Sequence number of an SD card file, parsed from its name.
pub fn sequence_number(path: &Path) -> Result<u64> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidFileName(path.display().to_string()))?;
    parse_file_name(name)
        .map(|(seq, _)| seq)
        .ok_or_else(|| Error::InvalidFileName(name.to_string()))
}

/// List the files of `channel` in `dir`, ascending by sequence number.
///
/// When `restrict` is given only files whose sequence number is a member are
/// returned. An empty list is not an error: it means there is nothing to do
/// for this channel. If two files share a sequence number (for example a
/// `LOC` and a `GPS` file), the one carrying the channel's own tag is kept;
/// otherwise the first in name order.
pub fn index_channel_files<P: AsRef<Path>>(
    dir: P,
    channel: ChannelKind,
    restrict: Option<&BTreeSet<u64>>,
) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some((seq, tag)) = parse_file_name(name) else {
            continue;
        };
        if !channel.accepts_tag(tag) {
            continue;
        }
        if restrict.is_some_and(|set| !set.contains(&seq)) {
            continue;
        }
        let synonym = tag != channel.tag();
        files.push((
            synonym,
            SourceFile {
                sequence_number: seq,
                channel,
                path: entry.path(),
            },
        ));
    }

    // own tag before synonyms within one sequence number
    files.sort_by(|(a_syn, a), (b_syn, b)| {
        a.sequence_number
            .cmp(&b.sequence_number)
            .then_with(|| a_syn.cmp(b_syn))
            .then_with(|| a.path.cmp(&b.path))
    });
    let mut files: Vec<SourceFile> = files.into_iter().map(|(_, file)| file).collect();
    let before = files.len();
    files.dedup_by(|later, first| {
        if later.sequence_number == first.sequence_number {
            log::warn!(
                "Skipping {}: sequence number {} already provided by {}",
                later.file_name(),
                later.sequence_number,
                first.file_name()
            );
            true
        } else {
            false
        }
    });
    if files.len() != before {
        log::debug!("{} duplicate {} files dropped", before - files.len(), channel);
    }

    Ok(files)
}
