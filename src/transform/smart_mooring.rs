//! Smart-mooring log validation and ordering.
//!
//! Smart-mooring lines look like `epoch,link,log type,data...`. The bridge
//! writes them out of order and occasionally garbles a sensor record, so the
//! log is filtered and then sorted by timestamp.

use super::numeric::{first_field, is_numeric};

/// Lines with fewer fields are truncated writes.
pub const MIN_FIELDS: usize = 5;
/// `RBRDT` records with more fields than this are corrupt.
pub const RBRDT_MAX_FIELDS: usize = 7;
/// Number of fields in a `BSYS` record once its message is quoted.
pub const BSYS_FIELDS: usize = 6;

const RBRDT_TAG: &str = "RBRDT";
const BSYS_TAG: &str = "BSYS";

fn is_corrupt_rbrdt(items: &[&str]) -> bool {
    items.len() > 3 && items[3] == RBRDT_TAG && items.len() > RBRDT_MAX_FIELDS
}

/// Validate one line, returning its timestamp and normalized text.
///
/// Returns `None` for lines to discard: non-numeric or zero timestamps, fewer
/// than [`MIN_FIELDS`] fields, or corrupt `RBRDT` records. A `BSYS` message
/// that itself contains commas is collapsed into one quoted field.
pub fn clean_line(line: &str) -> Option<(f64, String)> {
    let mut items: Vec<&str> = line.trim().split(',').collect();
    let timestamp: f64 = items[0].trim().parse().ok()?;
    if items.len() < MIN_FIELDS || timestamp == 0.0 || is_corrupt_rbrdt(&items) {
        return None;
    }

    if items.len() > BSYS_FIELDS && items[2] == BSYS_TAG {
        let message = format!("\"{}\"", items[BSYS_FIELDS - 1..].join(","));
        items.truncate(BSYS_FIELDS - 1);
        let mut text = items.join(",");
        text.push(',');
        text.push_str(&message);
        return Some((timestamp, text));
    }

    Some((timestamp, items.join(",")))
}

/// Filter and stably sort a smart-mooring file body by timestamp.
///
/// A non-numeric first line is treated as a header and kept at the top.
pub fn validate_and_sort(lines: Vec<String>) -> Vec<String> {
    let mut lines = lines.into_iter().peekable();
    let header = lines
        .next_if(|first| !first.trim().is_empty() && !is_numeric(first_field(first)))
        .map(|h| h.replace('\r', ""));

    let mut records: Vec<(f64, String)> = lines.filter_map(|l| clean_line(&l)).collect();
    records.sort_by(|a, b| a.0.total_cmp(&b.0));

    header
        .into_iter()
        .chain(records.into_iter().map(|(_, line)| line))
        .collect()
}
