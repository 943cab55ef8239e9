//! Calendar walking for the policies whose years and months vary in length.
//!
//! Every candidate date is computed from one anchor with a cumulative
//! (years, months, days) offset, so end-of-month clamping never drifts: the
//! walk from Jan 31 visits Feb 28, Mar 31, Apr 30 rather than Feb 28,
//! Mar 28, Apr 28.

use chrono::{Datelike, NaiveDateTime};
use chrono_tz::Tz;
use tracing::trace;

use super::{DurationBreakdown, cumulative};
use crate::calendar;
use crate::error::{Error, Result};
use crate::timestamp::{self, TimestampWithZone};
use crate::types::{NS_PER_GREGORIAN_YEAR, Unit};

struct Walker {
    anchor: NaiveDateTime,
    origin: i128,
    tz: Tz,
    hi: i128,
    hi_local: NaiveDateTime,
}

impl Walker {
    fn new(origin: &TimestampWithZone, hi: &TimestampWithZone) -> Walker {
        Walker {
            anchor: origin.naive_local(),
            origin: origin.epoch_nanoseconds(),
            tz: origin.zone().tz(),
            hi: hi.epoch_nanoseconds(),
            hi_local: hi.naive_local(),
        }
    }

    /// The instant of the anchor's wall time moved by the given offset.
    fn at(&self, years: i64, months: i64, days: i64) -> Result<i128> {
        if years == 0 && months == 0 && days == 0 {
            return Ok(self.origin);
        }
        let naive = calendar::shift_naive(self.anchor, years, months, days)?;
        let dt = timestamp::disambiguate(naive, self.tz)?;
        Ok(TimestampWithZone::from_datetime(dt).epoch_nanoseconds())
    }

    fn fits(&self, years: i64, months: i64, days: i64) -> Result<bool> {
        match self.at(years, months, days) {
            Ok(t) => Ok(t <= self.hi),
            // past the end of the representable calendar, so past `hi`
            Err(Error::OutOfRange) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn years(&self) -> Result<i64> {
        let estimate = (self.hi_local.year() - self.anchor.year()) as i64;
        walk(estimate, |y| self.fits(y, 0, 0))
    }

    /// Months, then days split into weeks, then the clock remainder, all
    /// after `years` whole years. Years themselves are left to the caller.
    fn finish(&self, out: &mut DurationBreakdown, years: i64) -> Result<()> {
        let from = calendar::shift_naive(self.anchor, years, 0, 0)?;
        let estimate = (self.hi_local.year() - from.year()) as i64 * 12
            + self.hi_local.month() as i64
            - from.month() as i64;
        let months = walk(estimate, |m| self.fits(years, m, 0))?;

        let from = calendar::shift_naive(self.anchor, years, months, 0)?;
        let estimate = calendar::days_between(from.date(), self.hi_local.date());
        let days = walk(estimate, |d| self.fits(years, months, d))?;
        let weeks = days / 7;

        let year_end = self.at(years, 0, 0)?;
        let month_end = self.at(years, months, 0)?;
        let week_end = self.at(years, months, weeks * 7)?;
        let day_end = self.at(years, months, days)?;

        out.set(Unit::Months, months as u128, elapsed(year_end, month_end));
        out.set(Unit::Weeks, weeks as u128, elapsed(month_end, week_end));
        out.set(Unit::WeekDays, (days % 7) as u128, elapsed(week_end, day_end));
        out.set(Unit::DateDays, days as u128, elapsed(month_end, day_end));
        trace!(years, months, days, "calendar walk");
        cumulative::divide(out, &Unit::CLOCK, elapsed(day_end, self.hi));
        Ok(())
    }
}

fn elapsed(from: i128, to: i128) -> u128 {
    debug_assert!(from <= to);
    (to - from).unsigned_abs()
}

/// The largest `n >= 0` with `fits(n)`, searched from `estimate`. `fits`
/// must be monotone and `fits(0)` must hold.
fn walk(estimate: i64, fits: impl Fn(i64) -> Result<bool>) -> Result<i64> {
    let mut n = estimate.max(0);
    while n > 0 && !fits(n)? {
        n -= 1;
    }
    while fits(n + 1)? {
        n += 1;
    }
    Ok(n)
}

/// Whole calendar years, months and days from `lo`, then the clock
/// remainder. With `with_years` false the years fold into months.
pub(super) fn calendar(
    out: &mut DurationBreakdown,
    lo: &TimestampWithZone,
    hi: &TimestampWithZone,
    with_years: bool,
) -> Result<()> {
    let walker = Walker::new(lo, hi);
    if with_years {
        let years = walker.years()?;
        let year_end = walker.at(years, 0, 0)?;
        out.set(Unit::Years, years as u128, elapsed(walker.origin, year_end));
        walker.finish(out, years)
    } else {
        walker.finish(out, 0)
    }
}

/// Years by the 365.2425-day mean year, then months and days walked on
/// the calendar from wherever that many mean years lands.
pub(super) fn gregorian(
    out: &mut DurationBreakdown,
    lo: &TimestampWithZone,
    hi: &TimestampWithZone,
    magnitude: u128,
) -> Result<()> {
    let years = magnitude / NS_PER_GREGORIAN_YEAR;
    let years_ns = years * NS_PER_GREGORIAN_YEAR;
    // magnitude < 2^75, see DurationSpan
    let anchor = lo.checked_add_nanoseconds(years_ns as i128)?;
    out.set(Unit::Years, years, years_ns);
    let walker = Walker::new(&anchor, hi);
    walker.finish(out, 0)
}
