//! Weekday and month helpers shared by fee quoting and schedule listing.
//!
//! Dates use `chrono::NaiveDate`, i.e. the proleptic Gregorian calendar.

use crate::domain::errors::FeeError;
use chrono::{Datelike, NaiveDate, Weekday};

/// Days of the week in display order (Monday first).
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const MONTH_NAMES: [&str; 12] = [
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

/// Lowercase name used as the stored form of a weekday ("monday" .. "sunday").
pub fn weekday_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Capitalized display name ("Monday").
pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parses a stored or user-entered weekday. Accepts full names and three-letter
/// abbreviations in any case.
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    s.trim().parse::<Weekday>().ok()
}

/// English month name for 1..=12, "Unknown" otherwise.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("Unknown")
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, FeeError> {
    if year < 1 || !(1..=12).contains(&month) {
        return Err(FeeError::InvalidPeriod { year, month });
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(FeeError::InvalidPeriod { year, month })
}

fn dates_in_month(year: i32, month: u32) -> Result<impl Iterator<Item = NaiveDate>, FeeError> {
    let first = first_of_month(year, month)?;
    Ok(first.iter_days().take_while(move |d| d.month() == month))
}

/// Number of days in the given month (28..=31).
pub fn days_in_month(year: i32, month: u32) -> Result<u32, FeeError> {
    Ok(dates_in_month(year, month)?.count() as u32)
}

/// Counts how many dates of `year`-`month` fall on `weekday`. Always 4 or 5.
pub fn count_weekday_in_month(year: i32, month: u32, weekday: Weekday) -> Result<u32, FeeError> {
    Ok(dates_in_month(year, month)?
        .filter(|d| d.weekday() == weekday)
        .count() as u32)
}
