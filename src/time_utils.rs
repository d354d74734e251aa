// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and week/day arithmetic.

use chrono::{DateTime, Days, NaiveDate, SecondsFormat, Utc};

/// Calendar date format used on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time as an RFC3339 string.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// chrono accepts unpadded fields (`2024-1-5`), so the shape is checked first.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Calendar date of `day` (1-7) in a week starting on `week_start`.
pub fn date_for_day(week_start: NaiveDate, day: u8) -> Option<NaiveDate> {
    if !(1..=7).contains(&day) {
        return None;
    }
    week_start.checked_add_days(Days::new(u64::from(day - 1)))
}

/// Day number (1-7) of `date` within a week starting on `week_start`.
pub fn day_in_week(week_start: NaiveDate, date: NaiveDate) -> Option<u8> {
    let offset = date.signed_duration_since(week_start).num_days();
    if (0..7).contains(&offset) {
        Some(offset as u8 + 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_parse_iso_date_strict() {
        assert_eq!(parse_iso_date("2025-03-10"), Some(d("2025-03-10")));
        assert_eq!(parse_iso_date("2025-3-10"), None);
        assert_eq!(parse_iso_date("2025/03/10"), None);
        assert_eq!(parse_iso_date("2025-02-30"), None);
        assert_eq!(parse_iso_date(""), None);
    }

    #[test]
    fn test_date_for_day() {
        let start = d("2025-03-10");
        assert_eq!(date_for_day(start, 1), Some(start));
        assert_eq!(date_for_day(start, 3), Some(d("2025-03-12")));
        assert_eq!(date_for_day(start, 7), Some(d("2025-03-16")));
        assert_eq!(date_for_day(start, 0), None);
        assert_eq!(date_for_day(start, 8), None);
    }

    #[test]
    fn test_day_in_week() {
        let start = d("2025-03-10");
        assert_eq!(day_in_week(start, d("2025-03-10")), Some(1));
        assert_eq!(day_in_week(start, d("2025-03-16")), Some(7));
        assert_eq!(day_in_week(start, d("2025-03-17")), None);
        assert_eq!(day_in_week(start, d("2025-03-09")), None);
    }
}
