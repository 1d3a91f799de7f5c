// Parsing and formatting helpers.
//
// Everything that touches raw cell text or renders numbers for humans lives
// here, so the aggregator can work on typed `CellValue`s only.
use crate::error::{ReportError, Result};
use crate::types::CellValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

static FLOAT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?\s*$").expect("valid float pattern"));

// Integers beyond 2^53 are left as text so identifiers keep their digits.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

const DATETIME_FORMATS: [&str; 9] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Type a raw CSV cell.
///
/// - Empty text becomes `Empty`.
/// - Exactly `true`/`TRUE` and `false`/`FALSE` become booleans.
/// - Plain decimal or exponent notation within the exact-integer range of an
///   `f64` becomes a number.
/// - Anything else stays text, untrimmed.
pub fn coerce_field(raw: &str) -> CellValue {
    match raw {
        "" => CellValue::Empty,
        "true" | "TRUE" => CellValue::Bool(true),
        "false" | "FALSE" => CellValue::Bool(false),
        _ if FLOAT_PATTERN.is_match(raw) => match raw.trim().parse::<f64>() {
            Ok(n) if n.abs() <= MAX_EXACT_FLOAT => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        },
        _ => CellValue::Text(raw.to_string()),
    }
}

pub fn coerce_optional(raw: Option<&str>) -> CellValue {
    raw.map(coerce_field).unwrap_or_default()
}

/// Parse a release date, with or without a time component.
///
/// Date-only strings resolve to midnight. RFC 3339 timestamps keep the wall
/// clock time of their own offset; nothing else carries a timezone.
pub fn parse_release_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.naive_local())
        .or_else(|| DATETIME_FORMATS.iter().find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Strict variant used for user-supplied dates such as `--as-of`.
pub fn parse_as_of(s: &str) -> Result<NaiveDateTime> {
    parse_release_datetime(s).ok_or_else(|| ReportError::InvalidDate(s.to_string()))
}

/// The date portion of a `NextRelDt` value: everything before the first space.
pub fn date_part(s: &str) -> &str {
    match s.find(' ') {
        Some(i) => &s[..i],
        None => s,
    }
}

/// Mean of a total over a count; `None` signals "no data".
pub fn average(total: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| total / count as f64)
}

/// Fraction of `part` in `whole`; `None` when `whole` is zero.
pub fn share(part: f64, whole: f64) -> Option<f64> {
    (whole != 0.0).then(|| part / whole)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with en-locale thousands separators, e.g. `1,234,567.89`.
    if !n.is_finite() {
        return n.to_string();
    }
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = match int_part.parse::<u64>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    let sign = if n.is_sign_negative() && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Currency rendering used in previews and exports: `$1,234.56`, `-$12.00`.
pub fn format_money(n: f64) -> String {
    let body = format_number(n, 2);
    match body.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", body),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

pub fn format_percent(fraction: Option<f64>) -> String {
    match fraction {
        Some(f) => format!("{}%", format_number(f * 100.0, 1)),
        None => "no data".to_string(),
    }
}
