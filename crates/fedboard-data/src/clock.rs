//! U.S. Eastern wall-clock helpers for the market-hours refresh gate.
//!
//! Eastern time is UTC-5, or UTC-4 from 02:00 local on the second Sunday of
//! March until 02:00 local on the first Sunday of November.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Timelike, Utc, Weekday};
use std::time::Duration;

/// Page reload cadence while markets are open.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

const HOUR: i32 = 3600;

fn dst_bounds(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    // 02:00 EST is 07:00 UTC; 02:00 EDT is 06:00 UTC
    let start = NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2)?
        .and_hms_opt(7, 0, 0)?
        .and_utc();
    let end = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1)?
        .and_hms_opt(6, 0, 0)?
        .and_utc();
    Some((start, end))
}

pub fn is_dst(utc: DateTime<Utc>) -> bool {
    match dst_bounds(utc.year()) {
        Some((start, end)) => utc >= start && utc < end,
        None => false,
    }
}

pub fn eastern_offset(utc: DateTime<Utc>) -> FixedOffset {
    let hours = if is_dst(utc) { 4 } else { 5 };
    FixedOffset::west_opt(hours * HOUR).unwrap_or_else(|| Utc.fix())
}

pub fn to_eastern(utc: DateTime<Utc>) -> DateTime<FixedOffset> {
    utc.with_timezone(&eastern_offset(utc))
}

pub fn now_eastern() -> DateTime<FixedOffset> {
    to_eastern(Utc::now())
}

/// Weekdays, 08:00 through 17:30 Eastern inclusive.
pub fn is_market_hours(et: &DateTime<FixedOffset>) -> bool {
    let is_weekday = et.weekday().num_days_from_monday() <= 4;
    let (hour, minute) = (et.hour(), et.minute());
    let in_session = hour > 7 && (hour < 17 || (hour == 17 && minute <= 30));
    is_weekday && in_session
}

/// How often the dashboard should reload itself, if at all.
pub fn refresh_interval(utc: DateTime<Utc>) -> Option<Duration> {
    is_market_hours(&to_eastern(utc)).then_some(REFRESH_INTERVAL)
}
