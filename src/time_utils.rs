// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Render a start date as `M/D/YYYY`.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` timestamp, or a bare
/// date. The calendar date is taken as written, without shifting time
/// zones. Anything unparseable comes back unchanged.
pub fn format_display_date(raw: &str) -> String {
    let trimmed = raw.trim();

    let date = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date())
        })
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.date())
        })
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"));

    match date {
        Ok(date) => date.format("%-m/%-d/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_keeps_local_calendar_date() {
        assert_eq!(format_display_date("2024-05-01T23:30:00-07:00"), "5/1/2024");
        assert_eq!(format_display_date("2024-12-31T08:00:00Z"), "12/31/2024");
    }

    #[test]
    fn test_naive_timestamp_and_date() {
        assert_eq!(format_display_date("2023-07-04T06:15:00"), "7/4/2023");
        assert_eq!(format_display_date("2023-07-04 06:15:00"), "7/4/2023");
        assert_eq!(format_display_date("2023-07-04"), "7/4/2023");
    }

    #[test]
    fn test_unparseable_is_returned_raw() {
        assert_eq!(format_display_date("yesterday"), "yesterday");
        assert_eq!(format_display_date("2023-13-45"), "2023-13-45");
    }
}
