//! Date and time helpers built on chrono
//! Author: kartik4091
//! Created: 2025-06-04
//!
//! Patterns are strftime patterns (`%Y-%m-%d`). A pattern with an unknown
//! specifier yields a parse error rather than a panic.
//!
//! Naive date-times carry no zone. Conversions to and from unix time treat
//! them as UTC unless the function name says `local`.

use std::fmt::{self, Write as _};
use std::time::SystemTime;

use chrono::format::{Item, StrftimeItems};
use chrono::{
    DateTime, Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;

use crate::error::{Error, Result};

pub const ISO_DATE_PATTERN: &str = "%Y-%m-%d";
pub const ISO_DATE_TIME_PATTERN: &str = "%Y-%m-%dT%H:%M:%S";
pub const READABLE_DATE_TIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

fn out_of_range(what: &str) -> Error {
    Error::validation(format!("Date arithmetic out of range: {}", what))
}

// Current instants

pub fn current_date() -> NaiveDate {
    Local::now().date_naive()
}

pub fn current_time() -> NaiveTime {
    Local::now().time()
}

pub fn current_date_time() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn current_zoned_date_time() -> DateTime<Local> {
    Local::now()
}

pub fn current_utc_date_time() -> DateTime<Utc> {
    Utc::now()
}

// Formatting and parsing

fn strftime_items(pattern: &str) -> Result<Vec<Item<'_>>> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(Error::parse(format!("Invalid date pattern: {}", pattern)));
    }
    Ok(items)
}

/// Writes through `fmt::Write` so a pattern asking for missing fields is an error.
fn render(formatted: impl fmt::Display, pattern: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", formatted)
        .map_err(|_| Error::parse(format!("Pattern {} does not fit this value", pattern)))?;
    Ok(out)
}

pub fn format_date_time(date_time: &NaiveDateTime, pattern: &str) -> Result<String> {
    let items = strftime_items(pattern)?;
    render(date_time.format_with_items(items.iter()), pattern)
}

pub fn format_date(date: &NaiveDate, pattern: &str) -> Result<String> {
    let items = strftime_items(pattern)?;
    render(date.format_with_items(items.iter()), pattern)
}

pub fn format_zoned<T>(date_time: &DateTime<T>, pattern: &str) -> Result<String>
where
    T: TimeZone,
    T::Offset: fmt::Display,
{
    let items = strftime_items(pattern)?;
    render(date_time.format_with_items(items.iter()), pattern)
}

pub fn parse_date_time(value: &str, pattern: &str) -> Result<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(value, pattern)?)
}

pub fn parse_date(value: &str, pattern: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value, pattern)?)
}

/// The input must carry an offset (`%z` or `%:z`).
pub fn parse_zoned_date_time(value: &str, pattern: &str) -> Result<DateTime<chrono::FixedOffset>> {
    Ok(DateTime::parse_from_str(value, pattern)?)
}

// Differences

/// Complete months from `start` to `end`, truncated toward zero.
fn complete_months(start: NaiveDate, end: NaiveDate) -> i64 {
    let start_months = start.year() as i64 * 12 + start.month0() as i64;
    let end_months = end.year() as i64 * 12 + end.month0() as i64;
    let mut months = end_months - start_months;
    let day_delta = end.day() as i64 - start.day() as i64;
    if months > 0 && day_delta < 0 {
        months -= 1;
    } else if months < 0 && day_delta > 0 {
        months += 1;
    }
    months
}

/// Moves `end` back (or forward) a day when its time of day has not caught up with `start`.
fn aligned_end_date(start: &NaiveDateTime, end: &NaiveDateTime) -> NaiveDate {
    let end_date = end.date();
    if end_date > start.date() && end.time() < start.time() {
        end_date.pred_opt().unwrap_or(end_date)
    } else if end_date < start.date() && end.time() > start.time() {
        end_date.succ_opt().unwrap_or(end_date)
    } else {
        end_date
    }
}

pub fn months_between(start: &NaiveDateTime, end: &NaiveDateTime) -> i64 {
    complete_months(start.date(), aligned_end_date(start, end))
}

pub fn years_between(start: &NaiveDateTime, end: &NaiveDateTime) -> i64 {
    months_between(start, end) / 12
}

pub fn days_between(start: &NaiveDateTime, end: &NaiveDateTime) -> i64 {
    (*end - *start).num_days()
}

pub fn hours_between(start: &NaiveDateTime, end: &NaiveDateTime) -> i64 {
    (*end - *start).num_hours()
}

pub fn minutes_between(start: &NaiveDateTime, end: &NaiveDateTime) -> i64 {
    (*end - *start).num_minutes()
}

pub fn seconds_between(start: &NaiveDateTime, end: &NaiveDateTime) -> i64 {
    (*end - *start).num_seconds()
}

pub fn months_between_dates(start: &NaiveDate, end: &NaiveDate) -> i64 {
    complete_months(*start, *end)
}

pub fn years_between_dates(start: &NaiveDate, end: &NaiveDate) -> i64 {
    complete_months(*start, *end) / 12
}

pub fn days_between_dates(start: &NaiveDate, end: &NaiveDate) -> i64 {
    (*end - *start).num_days()
}

// Arithmetic

/// Calendar arithmetic shared by dates and date-times.
pub trait CalendarShift: Sized + Copy {
    fn shift_days(self, days: i64) -> Option<Self>;
    fn shift_months(self, months: i64) -> Option<Self>;
}

impl CalendarShift for NaiveDate {
    fn shift_days(self, days: i64) -> Option<Self> {
        let magnitude = Days::new(days.unsigned_abs());
        if days >= 0 {
            self.checked_add_days(magnitude)
        } else {
            self.checked_sub_days(magnitude)
        }
    }

    fn shift_months(self, months: i64) -> Option<Self> {
        let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
        if months >= 0 {
            self.checked_add_months(magnitude)
        } else {
            self.checked_sub_months(magnitude)
        }
    }
}

impl CalendarShift for NaiveDateTime {
    fn shift_days(self, days: i64) -> Option<Self> {
        let magnitude = Days::new(days.unsigned_abs());
        if days >= 0 {
            self.checked_add_days(magnitude)
        } else {
            self.checked_sub_days(magnitude)
        }
    }

    fn shift_months(self, months: i64) -> Option<Self> {
        let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
        if months >= 0 {
            self.checked_add_months(magnitude)
        } else {
            self.checked_sub_months(magnitude)
        }
    }
}

pub fn add_days<T: CalendarShift>(value: T, days: i64) -> Result<T> {
    value.shift_days(days).ok_or_else(|| out_of_range("days"))
}

/// Clamps to the last day of the target month.
pub fn add_months<T: CalendarShift>(value: T, months: i64) -> Result<T> {
    value.shift_months(months).ok_or_else(|| out_of_range("months"))
}

pub fn add_years<T: CalendarShift>(value: T, years: i64) -> Result<T> {
    let months = years.checked_mul(12).ok_or_else(|| out_of_range("years"))?;
    value.shift_months(months).ok_or_else(|| out_of_range("years"))
}

pub fn subtract_days<T: CalendarShift>(value: T, days: i64) -> Result<T> {
    add_days(value, days.checked_neg().ok_or_else(|| out_of_range("days"))?)
}

pub fn subtract_months<T: CalendarShift>(value: T, months: i64) -> Result<T> {
    add_months(value, months.checked_neg().ok_or_else(|| out_of_range("months"))?)
}

pub fn subtract_years<T: CalendarShift>(value: T, years: i64) -> Result<T> {
    add_years(value, years.checked_neg().ok_or_else(|| out_of_range("years"))?)
}

fn shift_by(date_time: NaiveDateTime, delta: Option<TimeDelta>, what: &str) -> Result<NaiveDateTime> {
    delta
        .and_then(|d| date_time.checked_add_signed(d))
        .ok_or_else(|| out_of_range(what))
}

pub fn add_hours(date_time: NaiveDateTime, hours: i64) -> Result<NaiveDateTime> {
    shift_by(date_time, TimeDelta::try_hours(hours), "hours")
}

pub fn add_minutes(date_time: NaiveDateTime, minutes: i64) -> Result<NaiveDateTime> {
    shift_by(date_time, TimeDelta::try_minutes(minutes), "minutes")
}

pub fn add_seconds(date_time: NaiveDateTime, seconds: i64) -> Result<NaiveDateTime> {
    shift_by(date_time, TimeDelta::try_seconds(seconds), "seconds")
}

pub fn subtract_hours(date_time: NaiveDateTime, hours: i64) -> Result<NaiveDateTime> {
    shift_by(date_time, hours.checked_neg().and_then(TimeDelta::try_hours), "hours")
}

pub fn subtract_minutes(date_time: NaiveDateTime, minutes: i64) -> Result<NaiveDateTime> {
    shift_by(date_time, minutes.checked_neg().and_then(TimeDelta::try_minutes), "minutes")
}

pub fn subtract_seconds(date_time: NaiveDateTime, seconds: i64) -> Result<NaiveDateTime> {
    shift_by(date_time, seconds.checked_neg().and_then(TimeDelta::try_seconds), "seconds")
}

// Unix time

/// Seconds since the epoch, reading `date_time` as UTC.
pub fn to_unix_timestamp(date_time: &NaiveDateTime) -> i64 {
    date_time.and_utc().timestamp()
}

/// Seconds since the epoch, reading `date_time` in the system zone.
pub fn to_unix_timestamp_local(date_time: &NaiveDateTime) -> Result<i64> {
    Local
        .from_local_datetime(date_time)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| Error::validation(format!("{} does not exist in the local zone", date_time)))
}

/// Midnight UTC of `date`.
pub fn date_to_unix_timestamp(date: &NaiveDate) -> i64 {
    to_unix_timestamp(&start_of_day(*date))
}

pub fn zoned_to_unix_timestamp<T: TimeZone>(date_time: &DateTime<T>) -> i64 {
    date_time.timestamp()
}

fn utc_from_timestamp(timestamp: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| Error::validation(format!("Timestamp out of range: {}", timestamp)))
}

/// Inverse of [`to_unix_timestamp`].
pub fn from_unix_timestamp(timestamp: i64) -> Result<NaiveDateTime> {
    Ok(utc_from_timestamp(timestamp)?.naive_utc())
}

pub fn from_unix_timestamp_to_date(timestamp: i64) -> Result<NaiveDate> {
    Ok(utc_from_timestamp(timestamp)?.date_naive())
}

pub fn from_unix_timestamp_to_zoned(timestamp: i64, zone: &str) -> Result<DateTime<Tz>> {
    let tz = parse_zone(zone)?;
    Ok(utc_from_timestamp(timestamp)?.with_timezone(&tz))
}

// Calendar helpers

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59.999999999 on `date`.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    date.and_time(last)
}

/// Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> Result<NaiveDate> {
    let back = date.weekday().num_days_from_monday() as i64;
    add_days(date, -back)
}

/// Sunday of the week containing `date`.
pub fn end_of_week(date: NaiveDate) -> Result<NaiveDate> {
    let ahead = 6 - date.weekday().num_days_from_monday() as i64;
    add_days(date, ahead)
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(last_day_of_month(date)).unwrap_or(date)
}

pub fn start_of_year(date: NaiveDate) -> NaiveDate {
    date.with_ordinal(1).unwrap_or(date)
}

pub fn end_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

/// Quarter 1 to 4.
pub fn quarter(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

pub fn last_day_of_month(date: NaiveDate) -> u32 {
    days_in_month(date.year(), date.month()).unwrap_or(28)
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    if !(1..=12).contains(&month) {
        return Err(Error::validation(format!("Month must be between 1 and 12: {}", month)));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::validation(format!("Year out of range: {}", year)))?;
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or_else(|| out_of_range("month end"))?;
    Ok((next - first).num_days() as u32)
}

pub fn days_in_current_month() -> u32 {
    last_day_of_month(current_date())
}

pub fn day_of_week(date: NaiveDate) -> Weekday {
    date.weekday()
}

// Predicates, relative to the system clock and zone

pub fn is_future_date(date: NaiveDate) -> bool {
    date > current_date()
}

pub fn is_future_date_time(date_time: NaiveDateTime) -> bool {
    date_time > current_date_time()
}

pub fn is_past_date(date: NaiveDate) -> bool {
    date < current_date()
}

pub fn is_past_date_time(date_time: NaiveDateTime) -> bool {
    date_time < current_date_time()
}

pub fn is_today(date: NaiveDate) -> bool {
    date == current_date()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !is_weekend(date)
}

// Zones

/// IANA zone name or `UTC`.
pub fn parse_zone(zone: &str) -> Result<Tz> {
    zone.parse::<Tz>()
        .map_err(|e| Error::validation(format!("Unknown time zone {}: {}", zone, e)))
}

/// Attaches `zone` to a wall-clock time. Times skipped by a DST gap are rejected.
pub fn to_zoned(date_time: &NaiveDateTime, zone: &str) -> Result<DateTime<Tz>> {
    let tz = parse_zone(zone)?;
    tz.from_local_datetime(date_time)
        .earliest()
        .ok_or_else(|| Error::validation(format!("{} does not exist in {}", date_time, zone)))
}

/// Same instant, viewed in `zone`.
pub fn convert_to_time_zone<T: TimeZone>(date_time: &DateTime<T>, zone: &str) -> Result<DateTime<Tz>> {
    let tz = parse_zone(zone)?;
    Ok(date_time.with_timezone(&tz))
}

// System time, read as UTC

pub fn to_system_time(date_time: &NaiveDateTime) -> SystemTime {
    SystemTime::from(date_time.and_utc())
}

pub fn from_system_time(time: SystemTime) -> NaiveDateTime {
    DateTime::<Utc>::from(time).naive_utc()
}

// Misc

pub fn calculate_age(birth_date: NaiveDate) -> i64 {
    calculate_age_at(birth_date, current_date())
}

/// Whole years between `birth_date` and `reference`.
pub fn calculate_age_at(birth_date: NaiveDate, reference: NaiveDate) -> i64 {
    years_between_dates(&birth_date, &reference)
}

/// First `weekday` strictly after `date`.
pub fn next_day_of_week(date: NaiveDate, weekday: Weekday) -> Result<NaiveDate> {
    let current = date.weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    let ahead = match (target - current).rem_euclid(7) {
        0 => 7,
        n => n,
    };
    add_days(date, ahead)
}

/// Last `weekday` strictly before `date`.
pub fn previous_day_of_week(date: NaiveDate, weekday: Weekday) -> Result<NaiveDate> {
    let current = date.weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    let back = match (current - target).rem_euclid(7) {
        0 => 7,
        n => n,
    };
    add_days(date, -back)
}

/// Inclusive on both ends.
pub fn date_ranges_overlap(
    start1: NaiveDate,
    end1: NaiveDate,
    start2: NaiveDate,
    end2: NaiveDate,
) -> bool {
    start1 <= end2 && start2 <= end1
}

/// Every date from `start` to `end` inclusive.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
    if end < start {
        return Err(Error::validation(format!(
            "End date {} is before start date {}",
            end, start
        )));
    }
    Ok(start.iter_days().take_while(|d| *d <= end).collect())
}

/// Seconds elapsed since midnight.
pub fn seconds_of_day(time: &NaiveTime) -> u32 {
    time.num_seconds_from_midnight()
}
