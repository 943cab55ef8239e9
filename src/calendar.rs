//! Proleptic Gregorian calendar helpers over chrono's naive types.
//!
//! Field validation reports the offending field; every shift is checked and
//! fails with `OutOfRange` past the ends of chrono's calendar.

use chrono::{Days, Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};

/// Length of a month, or `None` when the year is outside chrono's range.
pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    (28..=31)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
}

/// Check a civil date, reporting the first offending field.
pub(crate) fn validate_date(year: i32, month: i64, day: i64) -> Result<(u8, u8)> {
    if !(1..=12).contains(&month) {
        return Err(Error::range("month", month, 1, 12));
    }
    let dim = days_in_month(year, month as u32).ok_or(Error::OutOfRange)? as i64;
    if !(1..=dim).contains(&day) {
        return Err(Error::range("day", day, 1, dim));
    }
    Ok((month as u8, day as u8))
}

pub(crate) fn validate_time(hour: i64, minute: i64, second: i64, nanosecond: i64) -> Result<()> {
    if !(0..=23).contains(&hour) {
        return Err(Error::range("hour", hour, 0, 23));
    }
    if !(0..=59).contains(&minute) {
        return Err(Error::range("minute", minute, 0, 59));
    }
    if !(0..=59).contains(&second) {
        return Err(Error::range("second", second, 0, 59));
    }
    if !(0..=999_999_999).contains(&nanosecond) {
        return Err(Error::range("nanosecond", nanosecond, 0, 999_999_999));
    }
    Ok(())
}

/// Move a date by whole months, clamping the day to the length of the
/// target month (Jan 31 + 1 month = Feb 28 or 29).
pub(crate) fn shift_months(date: NaiveDate, months: i64) -> Result<NaiveDate> {
    let step = Months::new(u32::try_from(months.unsigned_abs()).map_err(|_| Error::OutOfRange)?);
    if months >= 0 {
        date.checked_add_months(step)
    } else {
        date.checked_sub_months(step)
    }
    .ok_or(Error::OutOfRange)
}

pub(crate) fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    let step = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(step)
    } else {
        date.checked_sub_days(step)
    }
    .ok_or(Error::OutOfRange)
}

/// Whole calendar days from one date to another (negative when `to` is
/// earlier).
pub(crate) fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Shift a wall-clock date-time by calendar years, months and days, keeping
/// the time of day. Years and months are applied as one month count, so the
/// day is clamped at most once.
pub(crate) fn shift_naive(
    base: NaiveDateTime,
    years: i64,
    months: i64,
    days: i64,
) -> Result<NaiveDateTime> {
    let months = years
        .checked_mul(12)
        .and_then(|m| m.checked_add(months))
        .ok_or(Error::OutOfRange)?;
    let date = shift_months(base.date(), months)?;
    let date = shift_days(date, days)?;
    Ok(NaiveDateTime::new(date, base.time()))
}

pub(crate) fn naive(
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    nanosecond: u32,
) -> Result<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(year, month as u32, day as u32).ok_or(Error::OutOfRange)?;
    let time = NaiveTime::from_hms_nano_opt(hour as u32, minute as u32, second as u32, nanosecond)
        .ok_or(Error::OutOfRange)?;
    Ok(NaiveDateTime::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2016, 2), Some(29));
        assert_eq!(days_in_month(2017, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2017, 4), Some(30));
        assert_eq!(days_in_month(2017, 12), Some(31));
        assert_eq!(days_in_month(i32::MAX, 1), None);
    }

    #[test]
    fn month_shift_clamps_day() {
        assert_eq!(shift_months(date(2017, 1, 31), 1).unwrap(), date(2017, 2, 28));
        assert_eq!(shift_months(date(2016, 1, 31), 1).unwrap(), date(2016, 2, 29));
        assert_eq!(shift_months(date(2016, 2, 29), 12).unwrap(), date(2017, 2, 28));
        assert_eq!(shift_months(date(2017, 3, 31), -1).unwrap(), date(2017, 2, 28));
        assert_eq!(shift_months(date(2017, 11, 15), 3).unwrap(), date(2018, 2, 15));
        assert_eq!(shift_months(date(2017, 1, 15), -13).unwrap(), date(2015, 12, 15));
    }

    #[test]
    fn years_and_months_clamp_once() {
        let base = NaiveDateTime::new(date(2016, 1, 31), NaiveTime::MIN);
        let shifted = shift_naive(base, 1, 1, 0).unwrap();
        assert_eq!(shifted.date(), date(2017, 2, 28));
        let shifted = shift_naive(base, 0, 3, 1).unwrap();
        assert_eq!(shifted.date(), date(2016, 5, 1));
    }

    #[test]
    fn shifts_past_the_calendar_fail() {
        let base = NaiveDateTime::new(date(2017, 1, 1), NaiveTime::MIN);
        assert_eq!(shift_naive(base, i64::MAX, 0, 0), Err(Error::OutOfRange));
        assert_eq!(shift_naive(base, 0, i64::MIN, 0), Err(Error::OutOfRange));
        assert_eq!(shift_naive(base, 0, 0, i64::MAX), Err(Error::OutOfRange));
        assert_eq!(shift_naive(base, 0, 0, i64::MIN), Err(Error::OutOfRange));
        assert_eq!(shift_naive(base, 300_000, 0, 0), Err(Error::OutOfRange));
    }

    #[test]
    fn days_cross_year_boundary() {
        assert_eq!(shift_days(date(2016, 12, 31), 1).unwrap(), date(2017, 1, 1));
        assert_eq!(shift_days(date(2016, 3, 1), -1).unwrap(), date(2016, 2, 29));
        let a = date(2014, 2, 15);
        let b = date(2017, 4, 30);
        assert_eq!(days_between(a, b), 1170);
        assert_eq!(days_between(b, a), -1170);
    }

    #[test]
    fn field_validation() {
        assert!(validate_date(2017, 2, 29).is_err());
        assert!(validate_date(2016, 2, 29).is_ok());
        assert_eq!(
            validate_date(2016, 13, 1),
            Err(Error::range("month", 13, 1, 12))
        );
        assert_eq!(
            validate_time(24, 0, 0, 0),
            Err(Error::range("hour", 24, 0, 23))
        );
        assert!(validate_time(23, 59, 59, 999_999_999).is_ok());
        assert!(validate_time(0, 0, 0, 1_000_000_000).is_err());
    }
}
