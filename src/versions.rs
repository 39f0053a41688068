//! Firmware version reconciliation.
//!
//! Each system-log (`SYS`) file records the firmware build that was running
//! when it was written. Files written by builds of the same compatibility
//! class (and with the same IIR weight type) can be concatenated together;
//! a change in either starts a new [`VersionGroup`]. Every channel is later
//! concatenated once per group, restricted to the group's sequence numbers.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::firmware::{self, DEFAULT_IIR_WEIGHT_TYPE, FirmwareRecord};
use crate::{ChannelKind, Result, index_channel_files};

/// Number of lines scanned per system log for the version markers.
pub const MAX_SCAN_LINES: usize = 80;

const IDENTIFIER_MARKER: &str = "SHA";
const IIR_MARKER: &str = "iir weight type";

/// Version markers found in one system-log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemLogInfo {
    /// Firmware identifier, if a marker line was found.
    pub identifier: Option<String>,
    /// IIR weight type, [`DEFAULT_IIR_WEIGHT_TYPE`] if not stated.
    pub iir_weight_type: i64,
}

impl Default for SystemLogInfo {
    fn default() -> Self {
        Self {
            identifier: None,
            iir_weight_type: DEFAULT_IIR_WEIGHT_TYPE,
        }
    }
}

/// Scan the first [`MAX_SCAN_LINES`] lines of a system log for the firmware
/// identifier and IIR weight type markers.
///
/// The identifier is the text after the last `:` on the first line containing
/// `SHA`; the weight type is the integer after the `:` on a line containing
/// `iir weight type`. Scanning stops as soon as both are found.
pub fn scan_system_log<R: BufRead>(reader: R) -> Result<SystemLogInfo> {
    let mut info = SystemLogInfo::default();
    let mut found_iir = false;

    for raw in reader.split(b'\n').take(MAX_SCAN_LINES) {
        let raw = raw?;
        let line = String::from_utf8_lossy(&raw);
        if line.contains(IDENTIFIER_MARKER) {
            let id = line.rsplit(':').next().unwrap_or_default().trim();
            info.identifier = Some(id.to_string());
        } else if line.contains(IIR_MARKER) {
            let value = line.rsplit(':').next().unwrap_or_default().trim();
            match value.parse() {
                Ok(v) => {
                    info.iir_weight_type = v;
                    found_iir = true;
                }
                Err(_) => log::debug!("Ignoring unparseable IIR weight type {value:?}"),
            }
        }
        if info.identifier.is_some() && found_iir {
            break;
        }
    }

    Ok(info)
}

/// A run of files that can be concatenated into the same outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VersionGroup {
    /// Firmware identifiers seen in this group, in order of appearance.
    pub identifiers: Vec<String>,
    /// Release versions matching `identifiers`.
    pub versions: Vec<String>,
    /// Compatibility class shared by every member.
    pub compatibility_class: u32,
    /// IIR weight type shared by every member.
    pub iir_weight_type: i64,
    /// Sequence numbers governed by this group; `None` means all files.
    pub file_numbers: Option<BTreeSet<u64>>,
}

impl VersionGroup {
    fn new(record: &FirmwareRecord, iir_weight_type: i64) -> Self {
        Self {
            identifiers: vec![record.identifier.to_string()],
            versions: vec![record.version.to_string()],
            compatibility_class: record.compatibility_class,
            iir_weight_type,
            file_numbers: Some(BTreeSet::new()),
        }
    }

    /// The group used when the card carries no system logs at all.
    pub fn implicit() -> Self {
        Self {
            file_numbers: None,
            ..Self::new(firmware::latest(), DEFAULT_IIR_WEIGHT_TYPE)
        }
    }

    /// True when the group does not restrict which files are concatenated.
    pub fn is_unrestricted(&self) -> bool {
        self.file_numbers.is_none()
    }

    /// True when `identifier` is already a member.
    pub fn contains_identifier(&self, identifier: &str) -> bool {
        self.identifiers.iter().any(|id| id == identifier)
    }

    /// Try to admit a file written by `record`; returns false when the file
    /// needs a group of its own.
    fn admit(&mut self, record: &FirmwareRecord, iir_weight_type: i64) -> bool {
        if iir_weight_type != self.iir_weight_type {
            return false;
        }
        if self.contains_identifier(record.identifier) {
            return true;
        }
        if record.compatibility_class == self.compatibility_class {
            self.identifiers.push(record.identifier.to_string());
            self.versions.push(record.version.to_string());
            return true;
        }
        false
    }

    fn push_file(&mut self, sequence_number: u64) {
        self.file_numbers
            .get_or_insert_with(BTreeSet::new)
            .insert(sequence_number);
    }
}

/// Resolve a registry record for an identifier, falling back to the latest
/// known build for unregistered identifiers.
fn resolve_identifier(identifier: &str) -> &'static FirmwareRecord {
    firmware::lookup(identifier).unwrap_or_else(|| {
        let latest = firmware::latest();
        log::warn!(
            "Unknown firmware identifier {identifier:?}; assuming compatibility with {} ({})",
            latest.version,
            latest.identifier
        );
        latest
    })
}

/// Group already-scanned system logs, given in sequence order.
///
/// A file joins the current group when its identifier is a member and its
/// IIR weight type matches, or when its (class, weight type) pair equals the
/// group's; otherwise it opens a new group. A file without an identifier
/// stays with the current group.
pub fn group_system_logs(logs: &[(u64, SystemLogInfo)]) -> Vec<VersionGroup> {
    if logs.is_empty() {
        return vec![VersionGroup::implicit()];
    }

    let mut groups: Vec<VersionGroup> = Vec::new();
    for (sequence_number, info) in logs {
        let record = info.identifier.as_deref().map(resolve_identifier);
        match (groups.last_mut(), record) {
            (None, Some(record)) => groups.push(VersionGroup::new(record, info.iir_weight_type)),
            (None, None) => {
                let latest = firmware::latest();
                log::warn!(
                    "Cannot determine firmware version from system log {sequence_number}; assuming {}",
                    latest.version
                );
                groups.push(VersionGroup::new(latest, info.iir_weight_type));
            }
            (Some(current), Some(record)) => {
                if !current.admit(record, info.iir_weight_type) {
                    groups.push(VersionGroup::new(record, info.iir_weight_type));
                }
            }
            (Some(_), None) => {}
        }
        if let Some(active) = groups.last_mut() {
            active.push_file(*sequence_number);
        }
    }
    groups
}

/// Scan an opened system log; a log that cannot be opened or read counts as
/// one without markers.
fn system_log_info<R: BufRead>(name: &str, opened: std::io::Result<R>) -> SystemLogInfo {
    match opened.map_err(Into::into).and_then(scan_system_log) {
        Ok(info) => info,
        Err(e) => {
            log::warn!("Cannot read system log {name}: {e}");
            SystemLogInfo::default()
        }
    }
}

/// Build the ordered list of version groups for the SD card in `dir`.
pub fn resolve_versions<P: AsRef<Path>>(dir: P) -> Result<Vec<VersionGroup>> {
    let logs = index_channel_files(dir, ChannelKind::System, None)?;
    let mut scanned = Vec::with_capacity(logs.len());
    for file in &logs {
        let opened = File::open(&file.path).map(BufReader::new);
        let info = system_log_info(&file.file_name(), opened);
        scanned.push((file.sequence_number, info));
    }
    let groups = group_system_logs(&scanned);
    log::info!(
        "{} system log(s) resolved into {} version group(s)",
        logs.len(),
        groups.len()
    );
    Ok(groups)
}
