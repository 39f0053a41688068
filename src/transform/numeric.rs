//! Generic numeric record filter.
//!
//! Delimited-text channels without a dedicated policy keep only the lines
//! whose first comma-separated field is a number. This drops repeated header
//! lines, truncated writes and other debris.

/// True if `field` parses as a floating-point number (surrounding whitespace
/// is ignored).
pub fn is_numeric(field: &str) -> bool {
    field.trim().parse::<f64>().is_ok()
}

/// The first comma-separated field of `line`.
pub fn first_field(line: &str) -> &str {
    line.split(',').next().unwrap_or_default()
}

/// Remove carriage returns left over from DOS line endings.
pub fn strip_carriage_returns(line: String) -> String {
    if line.contains('\r') {
        line.replace('\r', "")
    } else {
        line
    }
}

/// Keep only lines whose first field is numeric.
pub fn filter_numeric(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .filter(|line| is_numeric(first_field(line)))
        .map(strip_carriage_returns)
        .collect()
}
