// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Date and money helpers.
//!
//! All instants are local wall-clock times. User-entered dates are anchored
//! at noon so that a date never slides across a day boundary when it is
//! shifted by an offset change. Day arithmetic works on calendar fields and
//! ignores DST.

use std::sync::LazyLock;

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

static US_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid regex"));

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid regex"));

static MONTH_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("valid regex"));

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Anchor a calendar date at local noon.
pub fn at_noon(date: NaiveDate) -> NaiveDateTime {
    date.and_time(noon())
}

/// Parse `MM/DD/YYYY` (one or two digit month and day) into a noon-anchored date.
///
/// Returns `None` for any other shape, for years before 100, and for impossible
/// dates such as `02/30/2026`.
pub fn parse_us_date(text: &str) -> Option<NaiveDateTime> {
    let caps = US_DATE.captures(text.trim())?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    if year < 100 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day).map(at_noon)
}

/// Format as zero-padded `MM/DD/YYYY`.
pub fn format_us_date(at: &NaiveDateTime) -> String {
    format!("{:02}/{:02}/{}", at.month(), at.day(), at.year())
}

/// Format as `YYYY-MM-DD` for day-granularity inputs.
pub fn to_iso_date_input(at: &NaiveDateTime) -> String {
    format!("{:04}-{:02}-{:02}", at.year(), at.month(), at.day())
}

/// Parse a `YYYY-MM-DD` day input into a noon-anchored date.
pub fn parse_iso_date_input(text: &str) -> Option<NaiveDateTime> {
    let caps = ISO_DATE.captures(text.trim())?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(at_noon)
}

/// Add (or subtract) whole calendar days, keeping the time of day.
pub fn add_days(at: NaiveDateTime, days: i64) -> NaiveDateTime {
    let shifted = if days >= 0 {
        at.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        at.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(at)
}

/// Monday 00:00 of the ISO week containing `at`.
pub fn week_start(at: NaiveDateTime) -> NaiveDateTime {
    let back = i64::from(at.weekday().num_days_from_monday());
    add_days(at.date().and_time(NaiveTime::MIN), -back)
}

/// Last representable instant of the seven-day window starting at `start`.
pub fn week_end(start: NaiveDateTime) -> NaiveDateTime {
    add_days(start, 7) - Duration::milliseconds(1)
}

/// True when both instants fall on the same calendar day.
pub fn is_same_day(a: &NaiveDateTime, b: &NaiveDateTime) -> bool {
    a.date() == b.date()
}

/// `YYYY-MM` key of the month containing `at`.
pub fn month_key(at: &NaiveDateTime) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

/// Parse a `YYYY-MM` key into `(year, month)`.
pub fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    let caps = MONTH_KEY.captures(key.trim())?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

/// Shift a `YYYY-MM` key by `delta` months. Unparseable keys shift from `fallback`.
pub fn shift_month(key: &str, delta: i32, fallback: &NaiveDateTime) -> String {
    let (year, month) =
        parse_month_key(key).unwrap_or_else(|| (fallback.year(), fallback.month()));
    let index = year * 12 + (month as i32 - 1) + delta;
    let new_year = index.div_euclid(12);
    let new_month = index.rem_euclid(12) + 1;
    format!("{new_year:04}-{new_month:02}")
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 0,
    }
}

/// Parse a currency-like string into a number.
///
/// Every character other than ASCII digits and `.` is dropped first, so
/// `"$1,250.50"` becomes `1250.5`. Blank input and leftovers that are not a
/// finite number yield `None`.
pub fn money_to_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Render a number as a whole-dollar string; non-finite values render empty.
pub fn number_to_money(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    // Adding zero folds -0 into 0.
    format!("{:.0}", value.round() + 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        ymd(y, m, d).and_hms_opt(h, mi, s).unwrap()
    }

    #[test]
    fn parse_us_date_anchors_at_noon() {
        let parsed = parse_us_date("03/15/2026").unwrap();
        assert_eq!(parsed, ymd_hms(2026, 3, 15, 12, 0, 0));
    }

    #[test]
    fn parse_us_date_rejects_impossible_dates() {
        assert_eq!(parse_us_date("02/30/2026"), None);
        assert_eq!(parse_us_date("13/01/2026"), None);
        assert_eq!(parse_us_date("00/10/2026"), None);
    }

    #[test]
    fn parse_us_date_rejects_two_digit_era_years() {
        assert_eq!(parse_us_date("01/01/0050"), None);
        assert_eq!(parse_us_date("12/31/0099"), None);
        assert_eq!(
            parse_us_date("01/01/0100"),
            Some(ymd_hms(100, 1, 1, 12, 0, 0))
        );
    }

    #[test]
    fn parse_us_date_accepts_single_digit_fields() {
        assert_eq!(parse_us_date("1/1/2026"), parse_us_date("01/01/2026"));
        assert!(parse_us_date("1/1/2026").is_some());
    }

    #[test]
    fn parse_us_date_rejects_other_shapes() {
        assert_eq!(parse_us_date(""), None);
        assert_eq!(parse_us_date("2026-01-01"), None);
        assert_eq!(parse_us_date("1/1/26"), None);
        assert_eq!(parse_us_date("001/01/2026"), None);
        assert_eq!(parse_us_date("01/01/2026 extra"), None);
    }

    #[test]
    fn parse_us_date_trims_surrounding_space() {
        assert_eq!(
            parse_us_date("  7/4/2026 "),
            Some(ymd_hms(2026, 7, 4, 12, 0, 0))
        );
    }

    #[test]
    fn format_us_date_zero_pads() {
        assert_eq!(format_us_date(&ymd_hms(2026, 1, 5, 9, 30, 0)), "01/05/2026");
    }

    #[test]
    fn iso_date_input_roundtrips() {
        let at = ymd_hms(2026, 11, 2, 12, 0, 0);
        assert_eq!(to_iso_date_input(&at), "2026-11-02");
        assert_eq!(parse_iso_date_input("2026-11-02"), Some(at));
        assert_eq!(parse_iso_date_input("2026-02-30"), None);
    }

    #[test]
    fn add_days_crosses_month_and_year() {
        let at = ymd_hms(2026, 12, 29, 15, 0, 0);
        assert_eq!(add_days(at, 5), ymd_hms(2027, 1, 3, 15, 0, 0));
        assert_eq!(add_days(at, -29), ymd_hms(2026, 11, 30, 15, 0, 0));
    }

    #[test]
    fn week_start_is_monday_midnight() {
        // 2026-10-14 is a Wednesday.
        let wed = ymd_hms(2026, 10, 14, 18, 45, 0);
        assert_eq!(week_start(wed), ymd_hms(2026, 10, 12, 0, 0, 0));

        let mon = ymd_hms(2026, 10, 12, 0, 0, 0);
        assert_eq!(week_start(mon), mon);
    }

    #[test]
    fn week_start_of_sunday_goes_back_six_days() {
        let sun = ymd_hms(2026, 10, 18, 23, 59, 59);
        assert_eq!(week_start(sun), ymd_hms(2026, 10, 12, 0, 0, 0));
    }

    #[test]
    fn week_end_is_last_millisecond_of_sunday() {
        let start = ymd_hms(2026, 10, 12, 0, 0, 0);
        let end = week_end(start);
        assert_eq!(end.date(), ymd(2026, 10, 18));
        assert_eq!(end + Duration::milliseconds(1), ymd_hms(2026, 10, 19, 0, 0, 0));
    }

    #[test]
    fn month_keys_shift_across_years() {
        let fallback = ymd_hms(2026, 5, 1, 0, 0, 0);
        assert_eq!(shift_month("2026-01", -1, &fallback), "2025-12");
        assert_eq!(shift_month("2026-12", 1, &fallback), "2027-01");
        assert_eq!(shift_month("garbage", 1, &fallback), "2026-06");
        assert_eq!(parse_month_key("2026-13"), None);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2028, 2), 29);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2026, 12), 31);
    }

    #[test]
    fn money_to_number_strips_formatting() {
        assert_eq!(money_to_number("$1,250.50"), Some(1250.5));
        assert_eq!(money_to_number("  500 "), Some(500.0));
        assert_eq!(money_to_number(""), None);
        assert_eq!(money_to_number("   "), None);
        assert_eq!(money_to_number("n/a"), None);
        assert_eq!(money_to_number("1.2.3"), None);
    }

    #[test]
    fn number_to_money_rounds() {
        assert_eq!(number_to_money(1249.6), "1250");
        assert_eq!(number_to_money(f64::NAN), "");
        assert_eq!(number_to_money(-0.4), "0");
    }

    #[test]
    fn number_to_money_keeps_large_amounts_exact() {
        assert_eq!(number_to_money(1e20), "100000000000000000000");
        assert_eq!(number_to_money(9.3e18), "9300000000000000000");
    }

    proptest! {
        #[test]
        fn us_date_roundtrip_law(days in 0i64..80_000) {
            let base = ymd(1900, 1, 1);
            let date = base + chrono::Duration::days(days);
            let noon_dt = at_noon(date);
            let formatted = format_us_date(&noon_dt);
            prop_assert_eq!(parse_us_date(&formatted), Some(noon_dt));
        }
    }
}
