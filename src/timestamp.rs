use std::cmp::Ordering;
use std::fmt;

use chrono::{
    DateTime, Datelike, MappedLocalTime, NaiveDateTime, Offset, TimeDelta, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

use crate::calendar;
use crate::error::{Error, Result};
use crate::format::{self, DEFAULT_PATTERN};
use crate::zone::Zone;

const NS_PER_SEC: i128 = 1_000_000_000;

/// Seconds from the Unix epoch to 0001-01-01T00:00:00Z, the zero timestamp.
const ZERO_EPOCH_SECONDS: i64 = -62_135_596_800;

/// An instant plus the zone it is rendered in.
///
/// Equality and ordering look only at the instant; use
/// [`same_rendering`](TimestampWithZone::same_rendering) to also compare the
/// zone.
#[derive(Clone)]
pub struct TimestampWithZone {
    dt: DateTime<Tz>,
    zone: Zone,
}

impl TimestampWithZone {
    pub fn from_datetime(dt: DateTime<Tz>) -> TimestampWithZone {
        let zone = Zone::from_tz(dt.timezone());
        TimestampWithZone { dt, zone }
    }

    /// Build a timestamp from wall-clock fields in `zone`.
    ///
    /// A wall time skipped by a DST gap moves forward by the length of the
    /// gap; a repeated wall time resolves to the earlier instant.
    #[allow(clippy::too_many_arguments)]
    pub fn from_civil(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        nanosecond: u32,
        zone: &Zone,
    ) -> Result<TimestampWithZone> {
        let (month, day) = calendar::validate_date(year, month as i64, day as i64)?;
        calendar::validate_time(hour as i64, minute as i64, second as i64, nanosecond as i64)?;
        let naive = calendar::naive(
            year,
            month,
            day,
            hour as u8,
            minute as u8,
            second as u8,
            nanosecond,
        )?;
        TimestampWithZone::from_local(naive, zone)
    }

    pub fn from_local(naive: NaiveDateTime, zone: &Zone) -> Result<TimestampWithZone> {
        let dt = disambiguate(naive, zone.tz())?;
        Ok(TimestampWithZone { dt, zone: *zone })
    }

    pub fn from_epoch_nanoseconds(ns: i128, zone: &Zone) -> Result<TimestampWithZone> {
        let secs = i64::try_from(ns.div_euclid(NS_PER_SEC)).map_err(|_| Error::OutOfRange)?;
        let nanos = ns.rem_euclid(NS_PER_SEC) as u32;
        let utc = DateTime::from_timestamp(secs, nanos).ok_or(Error::OutOfRange)?;
        Ok(TimestampWithZone {
            dt: utc.with_timezone(&zone.tz()),
            zone: *zone,
        })
    }

    pub fn now(zone: &Zone) -> TimestampWithZone {
        TimestampWithZone {
            dt: Utc::now().with_timezone(&zone.tz()),
            zone: *zone,
        }
    }

    /// 0001-01-01T00:00:00 UTC, standing in for "never set".
    pub fn zero() -> TimestampWithZone {
        let utc = DateTime::from_timestamp(ZERO_EPOCH_SECONDS, 0).unwrap_or_default();
        TimestampWithZone {
            dt: utc.with_timezone(&Tz::UTC),
            zone: Zone::utc(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.dt.timestamp() == ZERO_EPOCH_SECONDS && self.dt.timestamp_subsec_nanos() == 0
    }

    /// The same instant rendered in another zone.
    pub fn in_zone(&self, zone: &Zone) -> TimestampWithZone {
        TimestampWithZone {
            dt: self.dt.with_timezone(&zone.tz()),
            zone: *zone,
        }
    }

    pub fn datetime(&self) -> &DateTime<Tz> {
        &self.dt
    }

    pub fn utc(&self) -> DateTime<Utc> {
        self.dt.with_timezone(&Utc)
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn naive_local(&self) -> NaiveDateTime {
        self.dt.naive_local()
    }

    pub fn year(&self) -> i32 {
        self.dt.year()
    }

    pub fn month(&self) -> u32 {
        self.dt.month()
    }

    pub fn day(&self) -> u32 {
        self.dt.day()
    }

    pub fn hour(&self) -> u32 {
        self.dt.hour()
    }

    pub fn minute(&self) -> u32 {
        self.dt.minute()
    }

    pub fn second(&self) -> u32 {
        self.dt.second()
    }

    pub fn nanosecond(&self) -> u32 {
        self.dt.nanosecond()
    }

    /// Zone abbreviation in effect at this instant, e.g. `CST` or `CDT`.
    pub fn abbreviation(&self) -> String {
        self.dt.offset().to_string()
    }

    pub fn offset_seconds(&self) -> i32 {
        self.dt.offset().fix().local_minus_utc()
    }

    /// Nanoseconds since the Unix epoch. Never overflows for any instant
    /// chrono can represent.
    pub fn epoch_nanoseconds(&self) -> i128 {
        self.dt.timestamp() as i128 * NS_PER_SEC + self.dt.timestamp_subsec_nanos() as i128
    }

    /// Signed nanoseconds from `self` to `later`.
    pub fn nanoseconds_until(&self, later: &TimestampWithZone) -> i128 {
        later.epoch_nanoseconds() - self.epoch_nanoseconds()
    }

    pub fn checked_add_nanoseconds(&self, ns: i128) -> Result<TimestampWithZone> {
        let target = self
            .epoch_nanoseconds()
            .checked_add(ns)
            .ok_or(Error::OutOfRange)?;
        TimestampWithZone::from_epoch_nanoseconds(target, &self.zone)
    }

    /// Same instant and same zone.
    pub fn same_rendering(&self, other: &TimestampWithZone) -> bool {
        self.dt == other.dt && self.zone == other.zone
    }

    /// Render with a pattern; the empty pattern means [`DEFAULT_PATTERN`].
    pub fn format(&self, pattern: &str) -> String {
        format::format(self, pattern)
    }

    pub fn parse(input: &str, pattern: &str) -> Result<TimestampWithZone> {
        format::parse(input, pattern)
    }

    pub fn parse_in(input: &str, pattern: &str, zone: &Zone) -> Result<TimestampWithZone> {
        format::parse_in(input, pattern, zone)
    }
}

/// Map a wall time to a single instant in `tz`.
pub(crate) fn disambiguate(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        MappedLocalTime::Single(dt) => Ok(dt),
        MappedLocalTime::Ambiguous(a, b) => Ok(a.min(b)),
        MappedLocalTime::None => {
            // Gap: read the wall time with the offset in force before the
            // transition, which lands the same distance past the gap.
            let off_a = tz.offset_from_utc_datetime(&naive).fix().local_minus_utc();
            let probe = naive
                .checked_sub_signed(TimeDelta::seconds(off_a as i64))
                .ok_or(Error::OutOfRange)?;
            let off_b = tz.offset_from_utc_datetime(&probe).fix().local_minus_utc();
            let before = off_a.min(off_b);
            let utc = naive
                .checked_sub_signed(TimeDelta::seconds(before as i64))
                .ok_or(Error::OutOfRange)?;
            Ok(tz.from_utc_datetime(&utc))
        }
    }
}

/// All instants a wall time maps to in `tz`, earliest first.
pub(crate) fn candidates(naive: NaiveDateTime, tz: Tz) -> Vec<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        MappedLocalTime::Single(dt) => vec![dt],
        MappedLocalTime::Ambiguous(a, b) => {
            if a <= b {
                vec![a, b]
            } else {
                vec![b, a]
            }
        }
        MappedLocalTime::None => vec![],
    }
}

impl Default for TimestampWithZone {
    fn default() -> Self {
        TimestampWithZone::zero()
    }
}

impl PartialEq for TimestampWithZone {
    fn eq(&self, other: &Self) -> bool {
        self.dt == other.dt
    }
}

impl Eq for TimestampWithZone {}

impl PartialOrd for TimestampWithZone {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimestampWithZone {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dt.cmp(&other.dt)
    }
}

impl fmt::Debug for TimestampWithZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.format(DEFAULT_PATTERN), self.zone.name())
    }
}

impl fmt::Display for TimestampWithZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DEFAULT_PATTERN))
    }
}
