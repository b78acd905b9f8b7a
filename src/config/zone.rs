// src/config/zone.rs
use chrono::{DateTime, FixedOffset, Timelike, Utc};

const JST_NAME: &str = "Asia/Tokyo";
/// Checked at compile time.
const JST_OFFSET: FixedOffset = match FixedOffset::east_opt(9 * 3600) {
    Some(offset) => offset,
    None => panic!("+09:00 is a valid offset"),
};

/// The single timezone every persisted timestamp is expressed in.
///
/// Passed by value into the parser and the renderer instead of living in a global.
/// Only zones without DST can be represented, which covers JST.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperatingZone {
    name: &'static str,
    offset: FixedOffset,
}

impl OperatingZone {
    pub fn new(name: &'static str, offset: FixedOffset) -> Self {
        Self { name, offset }
    }

    pub fn jst() -> Self {
        Self::new(JST_NAME, JST_OFFSET)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Wall clock, truncated to the minute.
    pub fn now_minute(&self) -> DateTime<FixedOffset> {
        truncate_minute(self.now())
    }
}

impl Default for OperatingZone {
    fn default() -> Self {
        Self::jst()
    }
}

pub fn truncate_minute(t: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    t.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn jst_is_plus_nine() {
        let z = OperatingZone::jst();
        assert_eq!(z.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(z.name(), "Asia/Tokyo");
    }

    #[test]
    fn truncation_drops_seconds_and_nanos() {
        let z = OperatingZone::jst();
        let t = z.offset().with_ymd_and_hms(2024, 5, 1, 9, 30, 59).unwrap()
            + chrono::Duration::milliseconds(250);
        let m = truncate_minute(t);
        assert_eq!(m.format("%Y-%m-%dT%H:%M:%S%.f").to_string(), "2024-05-01T09:30:00");
    }
}
