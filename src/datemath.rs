//! Calendar-unit addition with an explicit policy for DST transitions.

use chrono::{NaiveDateTime, TimeDelta, TimeZone};
use tracing::debug;

use crate::calendar;
use crate::error::{Error, Result};
use crate::timestamp::{self, TimestampWithZone};
use crate::types::ArithmeticMode;
use crate::zone;

const NS_PER_US: i128 = 1_000;
const NS_PER_MS: i128 = 1_000_000;
const NS_PER_SEC: i128 = 1_000_000_000;
const NS_PER_MIN: i128 = 60 * NS_PER_SEC;
const NS_PER_HOUR: i128 = 60 * NS_PER_MIN;

/// Signed counts of calendar and clock units to add to a timestamp.
///
/// Years, months and days are calendar units: they move the date fields.
/// Hours and finer are durations: they move the instant.
///
/// ```ignore
/// let span = CalendarSpan::new().months(1).days(3).hours(4);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarSpan {
    years: i64,
    months: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    milliseconds: i64,
    microseconds: i64,
    nanoseconds: i64,
}

macro_rules! span_field {
    ($($field:ident => $getter:ident),* $(,)?) => {
        $(
            pub fn $field(self, $field: i64) -> CalendarSpan {
                CalendarSpan { $field, ..self }
            }

            pub fn $getter(&self) -> i64 {
                self.$field
            }
        )*
    };
}

impl CalendarSpan {
    pub fn new() -> CalendarSpan {
        CalendarSpan::default()
    }

    span_field! {
        years => get_years,
        months => get_months,
        days => get_days,
        hours => get_hours,
        minutes => get_minutes,
        seconds => get_seconds,
        milliseconds => get_milliseconds,
        microseconds => get_microseconds,
        nanoseconds => get_nanoseconds,
    }

    /// Every count negated. Fails if a count is `i64::MIN`.
    pub fn negate(&self) -> Result<CalendarSpan> {
        let neg = |v: i64| v.checked_neg().ok_or(Error::OutOfRange);
        Ok(CalendarSpan {
            years: neg(self.years)?,
            months: neg(self.months)?,
            days: neg(self.days)?,
            hours: neg(self.hours)?,
            minutes: neg(self.minutes)?,
            seconds: neg(self.seconds)?,
            milliseconds: neg(self.milliseconds)?,
            microseconds: neg(self.microseconds)?,
            nanoseconds: neg(self.nanoseconds)?,
        })
    }

    pub fn is_zero(&self) -> bool {
        *self == CalendarSpan::default()
    }

    fn has_date_part(&self) -> bool {
        self.years != 0 || self.months != 0 || self.days != 0
    }

    /// Hours and finer as a single nanosecond count. Cannot overflow.
    pub fn clock_nanoseconds(&self) -> i128 {
        self.hours as i128 * NS_PER_HOUR
            + self.minutes as i128 * NS_PER_MIN
            + self.seconds as i128 * NS_PER_SEC
            + self.milliseconds as i128 * NS_PER_MS
            + self.microseconds as i128 * NS_PER_US
            + self.nanoseconds as i128
    }
}

/// Add `span` to `start` under `mode`.
///
/// * [`ArithmeticMode::LocalZone`]: years, months and days change the wall
///   clock date in the start's zone (end-of-month clamped, DST gaps shifted
///   forward), so a day can be 23 or 25 hours.
/// * [`ArithmeticMode::UtcNormalized`]: the same field changes are made at
///   the start's UTC offset held fixed, so a day is always 24 hours, and the
///   result is rendered back in the start's zone.
///
/// In both modes hours and finer are added as elapsed time. The result is
/// always in the start's zone.
pub fn add_calendar_span(
    start: &TimestampWithZone,
    span: &CalendarSpan,
    mode: ArithmeticMode,
) -> Result<TimestampWithZone> {
    let base = if !span.has_date_part() {
        start.clone()
    } else {
        match mode {
            ArithmeticMode::LocalZone => add_local(start, span)?,
            ArithmeticMode::UtcNormalized => add_fixed_offset(start, span)?,
        }
    };
    let end = base.checked_add_nanoseconds(span.clock_nanoseconds())?;
    debug!(%mode, start = %start, end = %end, "added calendar span");
    Ok(end)
}

/// [`add_calendar_span`] after normalizing `start` into the zone named by
/// `zone_identifier` (empty keeps the start's zone).
pub fn add_in(
    start: &TimestampWithZone,
    zone_identifier: &str,
    span: &CalendarSpan,
    mode: ArithmeticMode,
) -> Result<TimestampWithZone> {
    let start = if zone_identifier.is_empty() {
        start.clone()
    } else {
        start.in_zone(&zone::resolve(zone_identifier)?)
    };
    add_calendar_span(&start, span, mode)
}

fn shift(naive: NaiveDateTime, span: &CalendarSpan) -> Result<NaiveDateTime> {
    calendar::shift_naive(naive, span.years, span.months, span.days)
}

fn add_local(start: &TimestampWithZone, span: &CalendarSpan) -> Result<TimestampWithZone> {
    let shifted = shift(start.naive_local(), span)?;
    let dt = timestamp::disambiguate(shifted, start.zone().tz())?;
    Ok(TimestampWithZone::from_datetime(dt).in_zone(start.zone()))
}

fn add_fixed_offset(start: &TimestampWithZone, span: &CalendarSpan) -> Result<TimestampWithZone> {
    let shifted = shift(start.naive_local(), span)?;
    let utc = shifted
        .checked_sub_signed(TimeDelta::seconds(start.offset_seconds() as i64))
        .ok_or(Error::OutOfRange)?;
    let dt = start.zone().tz().from_utc_datetime(&utc);
    Ok(TimestampWithZone::from_datetime(dt).in_zone(start.zone()))
}
