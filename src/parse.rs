// src/parse.rs
//! Raw dashboard text → typed values. Pure; no I/O.
//!
//! Nothing here fails: text that does not parse becomes `None`, and the caller
//! decides what an absent value means (empty CSV cell, or the scrape-time fallback
//! for the page timestamp).

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use regex::Regex;

use crate::config::OperatingZone;
use crate::core::sanitize::{fold_digits, normalize_ws, strip_thousands};

/// Trailing "as of" token the dashboard prints after its update time.
pub const AS_OF_MARKER: &str = "現在";

/// Tried in order; first match wins.
pub const TIMESTAMP_FORMATS: [&str; 2] = ["%Y/%m/%d %H:%M", "%Y-%m-%d %H:%M"];

static NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[-+]?[0-9]+(?:[.,][0-9]+)?").ok());

/// First signed decimal in `raw`, ignoring thousands separators, units and noise.
/// A decimal comma counts as a decimal point.
pub fn parse_number(raw: &str) -> Option<f64> {
    if raw.trim().is_empty() {
        return None;
    }
    let cleaned = strip_thousands(&fold_digits(raw));
    let m = NUMBER.as_ref()?.find(&cleaned)?;
    m.as_str().replace(',', ".").parse().ok()
}

/// Parses values against one operating timezone.
#[derive(Clone, Copy, Debug)]
pub struct ValueParser {
    zone: OperatingZone,
}

impl ValueParser {
    pub fn new(zone: OperatingZone) -> Self {
        Self { zone }
    }

    pub fn number(&self, raw: Option<&str>) -> Option<f64> {
        raw.and_then(parse_number)
    }

    /// Minute-precision page time, or `None` when no known layout matches.
    pub fn timestamp(&self, raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
        let text = normalize_ws(&fold_digits(&raw?.replace(AS_OF_MARKER, "")));
        if text.is_empty() {
            return None;
        }
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&text, fmt).ok())
            .and_then(|naive| self.zone.offset().from_local_datetime(&naive).single())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_takes_first_match_only() {
        assert_eq!(parse_number("売電 3.5 / 4.0"), Some(3.5));
        assert_eq!(parse_number("-0.25kWh"), Some(-0.25));
        assert_eq!(parse_number("+7"), Some(7.0));
    }

    #[test]
    fn number_pattern_compiles() {
        assert!(NUMBER.is_some());
    }

    #[test]
    fn timestamp_rejects_seconds() {
        let p = ValueParser::new(OperatingZone::jst());
        assert_eq!(p.timestamp(Some("2024/05/01 09:30:15")), None);
    }

    #[test]
    fn timestamp_handles_wrapped_text() {
        let p = ValueParser::new(OperatingZone::jst());
        let t = p.timestamp(Some("2024-05-01\n 09:30\n現在")).unwrap();
        assert_eq!(t.to_rfc3339(), "2024-05-01T09:30:00+09:00");
    }
}
