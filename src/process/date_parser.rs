use chrono::{NaiveDate, NaiveDateTime};

use crate::config::TIMESTAMP_FORMAT;

/// Layouts tried after the fixed-width fast path, in order. Slash dates
/// with the year last are month-first.
const FALLBACK_LAYOUTS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts; the time becomes midnight.
const DATE_ONLY_LAYOUTS: [&str; 1] = ["%m/%d/%Y"];

/// Day-first layout written by the statistics job's upstream exports.
const DAY_FIRST_LAYOUT: &str = "%d/%m/%Y %H:%M";

/// Parse a calendar timestamp.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, either with a `HH:MM[:SS[.fff]]`
/// time (space or `T` separated), and month-first `MM/DD/YYYY` with or
/// without `HH:MM[:SS]`.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');
    if s.len() >= 10 {
        if let Some(ts) = parse_fixed_width(s) {
            return Some(ts);
        }
    }
    FALLBACK_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
        .or_else(|| {
            DATE_ONLY_LAYOUTS.iter().find_map(|layout| {
                NaiveDate::parse_from_str(s, layout)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
        })
}

/// Like [`parse_timestamp`], but `DD/MM/YYYY HH:MM` is tried first.
pub fn parse_day_first_timestamp(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim().trim_matches('"');
    NaiveDateTime::parse_from_str(trimmed, DAY_FIRST_LAYOUT)
        .ok()
        .or_else(|| parse_timestamp(trimmed))
}

/// Fast parse of `"YYYY-MM-DD[ HH:MM:SS[.fff]]"` (either `-` or `/` in the date).
fn parse_fixed_width(s: &str) -> Option<NaiveDateTime> {
    let b = s.as_bytes();
    let sep = b[4];
    if !(sep == b'-' || sep == b'/') || b[7] != sep {
        return None;
    }
    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(5..7)?.parse().ok()?;
    let day: u32 = s.get(8..10)?.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    if s.len() == 10 {
        return date.and_hms_opt(0, 0, 0);
    }
    if s.len() < 19 || !(b[10] == b' ' || b[10] == b'T') || b[13] != b':' || b[16] != b':' {
        return None;
    }
    let hour: u32 = s.get(11..13)?.parse().ok()?;
    let min: u32 = s.get(14..16)?.parse().ok()?;
    let sec: u32 = s.get(17..19)?.parse().ok()?;
    let nanos = match s.get(19..)? {
        "" => 0,
        frac if frac.starts_with('.') && frac.len() > 1 => {
            let digits = &frac[1..];
            if digits.len() > 9 || !digits.bytes().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let scale = 10u32.pow(9 - digits.len() as u32);
            digits.parse::<u32>().ok()? * scale
        }
        _ => return None,
    };
    date.and_hms_nano_opt(hour, min, sec, nanos)
}

/// Render as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse then re-render; `None` when unparseable.
pub fn normalize_timestamp(s: &str) -> Option<String> {
    parse_timestamp(s).map(|ts| format_timestamp(&ts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only_gets_midnight() {
        assert_eq!(
            normalize_timestamp("1875-03-02").as_deref(),
            Some("1875-03-02 00:00:00")
        );
    }

    #[test]
    fn full_timestamps_round_trip() {
        for s in [
            "2101-10-20 00:00:00",
            "2101/10/20 00:00:00",
            "2101-10-20T00:00:00",
        ] {
            assert_eq!(
                normalize_timestamp(s).as_deref(),
                Some("2101-10-20 00:00:00"),
                "{s}"
            );
        }
    }

    #[test]
    fn fractional_seconds_are_dropped_on_format() {
        assert_eq!(
            normalize_timestamp("2150-01-01 13:45:07.250").as_deref(),
            Some("2150-01-01 13:45:07")
        );
    }

    #[test]
    fn minute_precision() {
        assert_eq!(
            normalize_timestamp("2150-01-01 13:45").as_deref(),
            Some("2150-01-01 13:45:00")
        );
    }

    #[test]
    fn slash_dates_are_month_first() {
        assert_eq!(
            normalize_timestamp("03/13/2075").as_deref(),
            Some("2075-03-13 00:00:00")
        );
        assert_eq!(
            normalize_timestamp("03/02/1875").as_deref(),
            Some("1875-03-02 00:00:00")
        );
        assert_eq!(
            normalize_timestamp("02/03/1875 10:30").as_deref(),
            Some("1875-02-03 10:30:00")
        );
        assert_eq!(
            normalize_timestamp("12/31/2101 23:59:58").as_deref(),
            Some("2101-12-31 23:59:58")
        );
        assert!(parse_timestamp("13/03/2075").is_none());
    }

    #[test]
    fn day_first_variant_prefers_day_month() {
        assert_eq!(
            parse_day_first_timestamp("02/03/1875 10:30").map(|ts| format_timestamp(&ts)),
            Some("1875-03-02 10:30:00".to_string())
        );
        assert_eq!(
            parse_day_first_timestamp("2101-10-20 00:00:00").map(|ts| format_timestamp(&ts)),
            Some("2101-10-20 00:00:00".to_string())
        );
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("2101-02-30").is_none());
        assert!(parse_timestamp("2101-13-01 00:00:00").is_none());
        assert!(parse_timestamp("12345").is_none());
        assert!(parse_timestamp("2101-10-20 25:00:00").is_none());
        assert!(parse_timestamp("2101-10-20 00:00:00junk").is_none());
    }

    #[test]
    fn quoted_and_padded_input() {
        assert_eq!(
            normalize_timestamp(" \"2101-10-20\" ").as_deref(),
            Some("2101-10-20 00:00:00")
        );
    }
}
