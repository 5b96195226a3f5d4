// Utility helpers for parsing and basic statistics.
//
// This module centralizes the "dirty" cell/number/date handling so the rest
// of the code can assume clean, typed values.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Accepted timestamp layouts for the date columns of the fault export.
/// A bare date parses to midnight.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%d/%m/%Y %H:%M"];

/// Normalize a raw spreadsheet cell: trim whitespace, map blank cells to
/// `None`.
pub fn clean_cell(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    Some(s.to_string())
}

/// Parse a non-blank timestamp cell against the accepted layouts.
///
/// Returns `None` when no layout matches; the loader decides whether that
/// is fatal (it is, for the declared date columns).
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Signed elapsed time in fractional minutes. Negative when `end` precedes
/// `start` in the raw data.
pub fn minutes_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_seconds() as f64 / 60.0
}

pub fn mean(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    // Aggregation callers never pass an empty slice (absent metrics are
    // represented as `None` one level up).
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in console messages (e.g., `1,042 faults loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_datetime_accepts_export_layouts() {
        assert!(parse_datetime("2021-10-05 08:30:00").is_some());
        assert!(parse_datetime("2021-10-05 08:30").is_some());
        assert!(parse_datetime("05/10/2021 08:30").is_some());
        // Bare dates land on midnight.
        let midnight = parse_datetime("2021-10-05").unwrap();
        assert_eq!(midnight.format("%H:%M:%S").to_string(), "00:00:00");
        assert!(parse_datetime("Oct 5th").is_none());
    }

    #[test]
    fn minutes_between_is_signed_and_fractional() {
        let a = parse_datetime("2021-10-05 08:00:00").unwrap();
        let b = parse_datetime("2021-10-05 08:13:30").unwrap();
        assert_eq!(minutes_between(a, b), 13.5);
        assert_eq!(minutes_between(b, a), -13.5);
    }
}
