use chrono::{DateTime, NaiveDate, TimeZone as _, Utc};

use crate::error::RoiError;

/// Milliseconds in a 365.25-day year, so leap years average out.
pub const MILLIS_PER_YEAR: f64 = 1000.0 * 60.0 * 60.0 * 24.0 * 365.25;

/// The date format used in configuration files.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/**
Convert a NaiveDate (YYYY-MM-DD) to a DateTime<Utc> at the beginning of that day (00:00:00 UTC).

## Arguments
* `date` - The NaiveDate to convert.

## Returns
The corresponding DateTime<Utc> or a RoiError if the date is invalid.
 */
pub fn date_to_datetime(date: &NaiveDate) -> Result<DateTime<Utc>, RoiError> {
    match date.and_hms_opt(0, 0, 0) {
        Some(naive_datetime) => Ok(Utc.from_utc_datetime(&naive_datetime)),
        None => Err(RoiError::DateConversionError(format!(
            "Failed to create naive datetime from date: {}",
            date
        ))),
    }
}

/**
Parse a `YYYY-MM-DD` string into midnight UTC of that day.

## Arguments
* `date` - The date string.

## Returns
The DateTime<Utc>, or a `ParseDateError` if the string is not a valid date.
 */
pub fn parse_date(date: &str) -> Result<DateTime<Utc>, RoiError> {
    let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)?;
    date_to_datetime(&date)
}

/**
Elapsed time between two instants in fractional years.

Negative when `end` is before `start`.
 */
pub fn years_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let duration = end.signed_duration_since(start);
    duration.num_milliseconds() as f64 / MILLIS_PER_YEAR
}

/// Formats a date the way the page shows it, e.g. `May 26, 2022`.
pub fn display_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_date_to_datetime_valid() {
        let date = NaiveDate::from_ymd_opt(2022, 5, 26).unwrap();
        let datetime = date_to_datetime(&date).unwrap();
        assert_eq!(datetime, Utc.with_ymd_and_hms(2022, 5, 26, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_valid() {
        let datetime = parse_date("2022-05-26").unwrap();
        assert_eq!(datetime, Utc.with_ymd_and_hms(2022, 5, 26, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        let result = parse_date("26/05/2022");
        assert!(matches!(result, Err(RoiError::ParseDateError(_))));
    }

    #[test]
    fn test_years_between_one_julian_year() {
        let start = parse_date("2022-05-26").unwrap();
        let end = start + Duration::milliseconds(MILLIS_PER_YEAR as i64);
        assert!((years_between(start, end) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_years_between_four_calendar_years() {
        // Four calendar years including one leap day is exactly 4 * 365.25 days.
        let start = parse_date("2020-01-01").unwrap();
        let end = parse_date("2024-01-01").unwrap();
        assert!((years_between(start, end) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_years_between_negative() {
        let start = parse_date("2024-01-01").unwrap();
        let end = parse_date("2023-01-01").unwrap();
        assert!(years_between(start, end) < 0.0);
    }

    #[test]
    fn test_years_between_same_instant() {
        let start = parse_date("2024-01-01").unwrap();
        assert_eq!(years_between(start, start), 0.0);
    }

    #[test]
    fn test_display_date() {
        let date = parse_date("2022-05-06").unwrap();
        assert_eq!(display_date(date), "May 6, 2022");
    }
}
