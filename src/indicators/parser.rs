//! Cell-level parsing shared by every source adapter.

/// Markers that upstream exports use for "no value".
const MISSING_MARKERS: &[&str] = &["", "..", "NA", "N/A", "n/a", "nan", "NaN", "null", "NULL", "-"];

/// Parse an indicator value cell.
///
/// Missing markers and non-numeric or non-finite text are absent, never zero.
pub fn parse_value(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        return None;
    }
    let cleaned = strip_thousands(trimmed)?;
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Remove `,` thousands separators. Commas anywhere other than between
/// three-digit groups of the integer part (`1,5`, `0,25`, `1,23,456`) make
/// the cell unparsable.
fn strip_thousands(cell: &str) -> Option<String> {
    if !cell.contains(',') {
        return Some(cell.to_string());
    }

    let unsigned = cell.trim_start_matches(['-', '+']);
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    if fraction.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let mut groups = integer.split(',');
    let first = groups.next()?;
    let leading_ok = (1..=3).contains(&first.len()) && first.chars().all(|c| c.is_ascii_digit());
    let rest_ok = groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()));
    (leading_ok && rest_ok).then(|| cell.replace(',', ""))
}

/// Parse a year cell (`2020`, `"2020"`, ` 2020 `).
pub fn parse_year(cell: &str) -> Option<i32> {
    let trimmed = cell.trim().trim_matches('"');
    if trimmed.len() != 4 {
        return None;
    }
    trimmed.parse::<i32>().ok()
}

/// Normalise a country code cell to upper-case ISO3, rejecting anything else.
///
/// Aggregates such as `OWID_WRL` are rejected here rather than filtered later.
pub fn parse_iso3(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(trimmed.to_ascii_uppercase())
    } else {
        None
    }
}
