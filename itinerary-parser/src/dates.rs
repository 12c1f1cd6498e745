use std::mem;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::warn;

use crate::error::Error;

/// Parsed bounds of the overall trip. The UTC variants are anchored at noon
/// so that progress calculations cannot shift across a day boundary in any
/// timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
}

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|month| *month == name)
        .map(|index| index as u32 + 1)
}

fn month_and_day(text: &str) -> Option<(u32, u32)> {
    let mut parts = text.split_whitespace();
    let month = month_number(parts.next()?)?;
    let day = parts.next()?.parse().ok()?;
    Some((month, day))
}

fn noon_utc(date: NaiveDate) -> DateTime<Utc> {
    // 12:00:00 is always a valid time of day.
    date.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

/// Parses `"<MonthName> <Day> - <MonthName> <Day>, <Year>"`, the header
/// format used by the `tripDates` field.
pub fn parse_trip_dates(text: &str) -> Result<TripDates, Error> {
    let fail = || Error::DateRange(text.to_string());

    let (start_raw, end_raw) = text.split_once(" - ").ok_or_else(fail)?;
    let (end_raw, year_raw) = end_raw.split_once(", ").ok_or_else(fail)?;
    let year = year_raw.trim().parse().map_err(|_| fail())?;

    let (start_month, start_day) = month_and_day(start_raw).ok_or_else(fail)?;
    let (end_month, end_day) = month_and_day(end_raw).ok_or_else(fail)?;

    let start = NaiveDate::from_ymd_opt(year, start_month, start_day).ok_or_else(fail)?;
    let end = NaiveDate::from_ymd_opt(year, end_month, end_day).ok_or_else(fail)?;

    Ok(TripDates {
        start,
        end,
        start_utc: noon_utc(start),
        end_utc: noon_utc(end),
    })
}

/// Parses `YYYY-MM-DD`. Malformed input is not fatal: the offending entity
/// is skipped by callers, so this only warns and returns `None`.
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            warn!("invalid ISO date `{text}`");
            None
        }
    }
}

/// Inverse of [`parse_iso_date`] for valid inputs.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// `"Monday, April 7"`, the per-day header.
pub fn day_name(date: NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}

/// Iterator over every date in an inclusive range.
pub struct DateRange {
    next: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn inclusive(start: NaiveDate, end: NaiveDate) -> Self {
        Self { next: start, end }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next <= self.end {
            let following = add_days(self.next, 1);
            Some(mem::replace(&mut self.next, following))
        } else {
            None
        }
    }
}
