//! Calendar parsing for day (`YYYY-MM-DD`) and month (`YYYY-MM`) strings.
//!
//! Shape is checked first, then the value is rebuilt through `chrono` so that
//! impossible dates such as `2024-02-31` are rejected rather than rolled over.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

pub const INVALID_DAY: &str = "Data inválida";
pub const DAY_FORMAT: &str = "Data deve estar no formato YYYY-MM-DD";
pub const INVALID_MONTH: &str = "Mês inválido";
pub const MONTH_FORMAT: &str = "Mês deve estar no formato YYYY-MM";

/// `true` when `s` has length `len`, a `-` at each index in `dashes`, and
/// ASCII digits everywhere else.
fn matches_shape(s: &str, len: usize, dashes: &[usize]) -> bool {
    s.len() == len
        && s.bytes().enumerate().all(|(i, b)| {
            if dashes.contains(&i) {
                b == b'-'
            } else {
                b.is_ascii_digit()
            }
        })
}

/// Parse a `YYYY-MM-DD` calendar day.
///
/// # Errors
///
/// Returns the user-facing message: [`DAY_FORMAT`] for a bad shape,
/// [`INVALID_DAY`] when the components do not form a real date.
pub fn parse_day(s: &str) -> Result<NaiveDate, &'static str> {
    if !matches_shape(s, 10, &[4, 7]) {
        return Err(DAY_FORMAT);
    }
    let year: i32 = s[0..4].parse().map_err(|_| DAY_FORMAT)?;
    let month: u32 = s[5..7].parse().map_err(|_| DAY_FORMAT)?;
    let day: u32 = s[8..10].parse().map_err(|_| DAY_FORMAT)?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(INVALID_DAY)?;
    if date.year() != year || date.month() != month || date.day() != day {
        return Err(INVALID_DAY);
    }
    Ok(date)
}

/// Parse a `YYYY-MM` billing month. Returns `(year, month)`.
///
/// # Errors
///
/// [`MONTH_FORMAT`] for a bad shape, [`INVALID_MONTH`] when the month is not `1..=12`.
pub fn parse_month(s: &str) -> Result<(i32, u32), &'static str> {
    if !matches_shape(s, 7, &[4]) {
        return Err(MONTH_FORMAT);
    }
    let year: i32 = s[0..4].parse().map_err(|_| MONTH_FORMAT)?;
    let month: u32 = s[5..7].parse().map_err(|_| MONTH_FORMAT)?;
    if !(1..=12).contains(&month) {
        return Err(INVALID_MONTH);
    }
    Ok((year, month))
}

/// Parse an RFC 3339 instant, or a bare day taken as midnight UTC.
///
/// # Errors
///
/// Returns [`INVALID_DAY`] when neither form parses.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, &'static str> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let day = parse_day(s).map_err(|_| INVALID_DAY)?;
    Ok(day.and_hms_opt(0, 0, 0).ok_or(INVALID_DAY)?.and_utc())
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRange {
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
}

impl DayRange {
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start_day <= day && day <= self.end_day
    }
}

pub(crate) fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

pub(crate) fn last_of_month(day: NaiveDate) -> NaiveDate {
    let next_month = if day.month() == 12 {
        NaiveDate::from_ymd_opt(day.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(day.year(), day.month() + 1, 1)
    };
    next_month.and_then(|d| d.pred_opt()).unwrap_or(day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-02-29")]
    #[case("2026-01-01")]
    #[case("1999-12-31")]
    fn accepts_real_days(#[case] input: &str) {
        assert!(parse_day(input).is_ok(), "{input} should parse");
    }

    #[rstest]
    #[case("2024-02-31", INVALID_DAY)]
    #[case("2023-02-29", INVALID_DAY)]
    #[case("2026-13-01", INVALID_DAY)]
    #[case("2026-04-31", INVALID_DAY)]
    #[case("2026-1-01", DAY_FORMAT)]
    #[case("2026/01/01", DAY_FORMAT)]
    #[case("", DAY_FORMAT)]
    fn rejects_bad_days(#[case] input: &str, #[case] message: &str) {
        assert_eq!(parse_day(input), Err(message));
    }

    #[test]
    fn month_range_is_checked() {
        assert_eq!(parse_month("2026-01"), Ok((2026, 1)));
        assert_eq!(parse_month("2026-12"), Ok((2026, 12)));
        assert_eq!(parse_month("2026-00"), Err(INVALID_MONTH));
        assert_eq!(parse_month("2026-13"), Err(INVALID_MONTH));
        assert_eq!(parse_month("2026-1"), Err(MONTH_FORMAT));
    }

    #[test]
    fn datetime_accepts_rfc3339_and_bare_day() {
        let dt = parse_datetime("2026-01-15T10:30:00-03:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-15T13:30:00+00:00");
        let midnight = parse_datetime("2026-01-15").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2026-01-15T00:00:00+00:00");
        assert_eq!(parse_datetime("ontem"), Err(INVALID_DAY));
    }

    #[test]
    fn month_bounds() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        assert_eq!(first_of_month(day), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last_of_month(day), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let december = NaiveDate::from_ymd_opt(2025, 12, 5).unwrap();
        assert_eq!(last_of_month(december), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }
}
