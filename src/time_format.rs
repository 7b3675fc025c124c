//! # Service Time Formats
//!
//! NOAA's datagetter takes `begin_date`/`end_date` as `YYYYMMDD HH:MM` and answers
//! with `YYYY-MM-DD HH:MM` timestamps. Both are rigid, so decoding is positional
//! rather than a general date parser, and every decoded date is validated.

use crate::{Result, TideChartError};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

/// Render an instant as a datagetter query date, UTC, seconds truncated.
///
/// Fails with [`TideChartError::InvalidInput`] for instants whose year does not
/// fit the four-digit field.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use tide_chart_lib::time_format::format_query_timestamp;
///
/// let t = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 59).unwrap();
/// assert_eq!(format_query_timestamp(&t).unwrap(), "20240307 09:05");
/// ```
pub fn format_query_timestamp(instant: &DateTime<Utc>) -> Result<String> {
    let year = instant.year();
    if !(0..=9999).contains(&year) {
        return Err(TideChartError::InvalidInput(format!(
            "year {year} cannot be sent as a query date"
        )));
    }

    Ok(format!(
        "{:04}{:02}{:02} {:02}:{:02}",
        year,
        instant.month(),
        instant.day(),
        instant.hour(),
        instant.minute()
    ))
}

/// Render an instant in the service's response format, `YYYY-MM-DD HH:MM`.
pub fn format_service_timestamp(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M").to_string()
}

/// Decode a service timestamp by fixed character offsets.
///
/// Layout: `[0:4)` year, `[5:7)` month, `[8:10)` day, `[11:13)` hour,
/// `[14:16)` minute. Separator characters are not inspected. Any slice that is
/// missing or not a plain decimal number, and any date or time that does not
/// exist (month 13, February 30th, hour 24), is a
/// [`TideChartError::MalformedTimestamp`] with `index` 0; callers decoding a batch
/// fill in the record position.
pub fn parse_service_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let malformed = || TideChartError::MalformedTimestamp {
        index: 0,
        text: text.to_string(),
        accumulated: 0,
    };

    let field = |start: usize, end: usize| -> Result<u32> {
        let slice = text.get(start..end).ok_or_else(malformed)?;
        if !slice.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        slice.parse::<u32>().map_err(|_| malformed())
    };

    let year = field(0, 4)?;
    let month = field(5, 7)?;
    let day = field(8, 10)?;
    let hour = field(11, 13)?;
    let minute = field(14, 16)?;

    let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(malformed)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(malformed)?;

    Ok(NaiveDateTime::new(date, time).and_utc())
}

/// Compute the prediction window for a run starting at `now`.
///
/// `begin` is the next full hour after `now`; `end` is `hours` later, so an
/// hourly product yields `hours + 1` samples.
pub fn prediction_window(now: &DateTime<Utc>, hours: u32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let top_of_hour = now
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .ok_or_else(|| TideChartError::InvalidInput(format!("cannot truncate {now} to the hour")))?;

    let begin = top_of_hour + Duration::hours(1);
    let end = begin + Duration::hours(i64::from(hours));
    Ok((begin, end))
}
