use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub const NS_PER_US: u128 = 1_000;
pub const NS_PER_MS: u128 = 1_000_000;
pub const NS_PER_SEC: u128 = 1_000_000_000;
pub const NS_PER_MIN: u128 = 60 * NS_PER_SEC;
pub const NS_PER_HOUR: u128 = 60 * NS_PER_MIN;
pub const NS_PER_DAY: u128 = 24 * NS_PER_HOUR;
pub const NS_PER_WEEK: u128 = 7 * NS_PER_DAY;

/// Mean Gregorian year: 365.2425 days (146097 days per 400 years).
pub const NS_PER_GREGORIAN_YEAR: u128 = 31_556_952 * NS_PER_SEC;

/// One unit of a [`DurationBreakdown`](crate::DurationBreakdown).
///
/// `Weeks` + `WeekDays` and `DateDays` are two views of the same stretch of
/// calendar days: `DateDays == Weeks * 7 + WeekDays`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Unit {
    Years,
    Months,
    Weeks,
    WeekDays,
    DateDays,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl Unit {
    pub const ALL: [Unit; 11] = [
        Unit::Years,
        Unit::Months,
        Unit::Weeks,
        Unit::WeekDays,
        Unit::DateDays,
        Unit::Hours,
        Unit::Minutes,
        Unit::Seconds,
        Unit::Milliseconds,
        Unit::Microseconds,
        Unit::Nanoseconds,
    ];

    /// Sub-day units, largest first.
    pub(crate) const CLOCK: [Unit; 6] = [
        Unit::Hours,
        Unit::Minutes,
        Unit::Seconds,
        Unit::Milliseconds,
        Unit::Microseconds,
        Unit::Nanoseconds,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Unit::Years => "Years",
            Unit::Months => "Months",
            Unit::Weeks => "Weeks",
            Unit::WeekDays => "WeekDays",
            Unit::DateDays => "Days",
            Unit::Hours => "Hours",
            Unit::Minutes => "Minutes",
            Unit::Seconds => "Seconds",
            Unit::Milliseconds => "Milliseconds",
            Unit::Microseconds => "Microseconds",
            Unit::Nanoseconds => "Nanoseconds",
        }
    }

    /// Length of the unit when it has a fixed size. Years and months vary.
    pub fn fixed_nanoseconds(self) -> Option<u128> {
        match self {
            Unit::Years | Unit::Months => None,
            Unit::Weeks => Some(NS_PER_WEEK),
            Unit::WeekDays | Unit::DateDays => Some(NS_PER_DAY),
            Unit::Hours => Some(NS_PER_HOUR),
            Unit::Minutes => Some(NS_PER_MIN),
            Unit::Seconds => Some(NS_PER_SEC),
            Unit::Milliseconds => Some(NS_PER_MS),
            Unit::Microseconds => Some(NS_PER_US),
            Unit::Nanoseconds => Some(1),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Selects which units a decomposition fills in.
///
/// There is no "unspecified" variant. The integer and string conversions
/// reject the zero value and the empty string instead of defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocationPolicy {
    StandardCalendar = 1,
    CumulativeMonths = 2,
    CumulativeWeeks = 3,
    CumulativeDays = 4,
    CumulativeHours = 5,
    CumulativeMinutes = 6,
    CumulativeSeconds = 7,
    CumulativeMilliseconds = 8,
    CumulativeMicroseconds = 9,
    CumulativeNanoseconds = 10,
    GregorianCalendar = 11,
}

impl AllocationPolicy {
    pub const ALL: [AllocationPolicy; 11] = [
        AllocationPolicy::StandardCalendar,
        AllocationPolicy::CumulativeMonths,
        AllocationPolicy::CumulativeWeeks,
        AllocationPolicy::CumulativeDays,
        AllocationPolicy::CumulativeHours,
        AllocationPolicy::CumulativeMinutes,
        AllocationPolicy::CumulativeSeconds,
        AllocationPolicy::CumulativeMilliseconds,
        AllocationPolicy::CumulativeMicroseconds,
        AllocationPolicy::CumulativeNanoseconds,
        AllocationPolicy::GregorianCalendar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AllocationPolicy::StandardCalendar => "standard",
            AllocationPolicy::CumulativeMonths => "months",
            AllocationPolicy::CumulativeWeeks => "weeks",
            AllocationPolicy::CumulativeDays => "days",
            AllocationPolicy::CumulativeHours => "hours",
            AllocationPolicy::CumulativeMinutes => "minutes",
            AllocationPolicy::CumulativeSeconds => "seconds",
            AllocationPolicy::CumulativeMilliseconds => "milliseconds",
            AllocationPolicy::CumulativeMicroseconds => "microseconds",
            AllocationPolicy::CumulativeNanoseconds => "nanoseconds",
            AllocationPolicy::GregorianCalendar => "gregorian",
        }
    }

    pub fn is_cumulative(self) -> bool {
        !matches!(
            self,
            AllocationPolicy::StandardCalendar | AllocationPolicy::GregorianCalendar
        )
    }

    /// The coarsest unit the policy fills. Everything coarser is folded in.
    pub fn largest_unit(self) -> Unit {
        match self {
            AllocationPolicy::StandardCalendar | AllocationPolicy::GregorianCalendar => {
                Unit::Years
            }
            AllocationPolicy::CumulativeMonths => Unit::Months,
            AllocationPolicy::CumulativeWeeks => Unit::Weeks,
            AllocationPolicy::CumulativeDays => Unit::DateDays,
            AllocationPolicy::CumulativeHours => Unit::Hours,
            AllocationPolicy::CumulativeMinutes => Unit::Minutes,
            AllocationPolicy::CumulativeSeconds => Unit::Seconds,
            AllocationPolicy::CumulativeMilliseconds => Unit::Milliseconds,
            AllocationPolicy::CumulativeMicroseconds => Unit::Microseconds,
            AllocationPolicy::CumulativeNanoseconds => Unit::Nanoseconds,
        }
    }

    /// Units populated under this policy, largest first.
    pub fn units(self) -> &'static [Unit] {
        static CALENDAR: [Unit; 11] = Unit::ALL;
        static CLOCK: [Unit; 6] = Unit::CLOCK;
        static WEEKS: [Unit; 8] = [
            Unit::Weeks,
            Unit::WeekDays,
            Unit::Hours,
            Unit::Minutes,
            Unit::Seconds,
            Unit::Milliseconds,
            Unit::Microseconds,
            Unit::Nanoseconds,
        ];
        match self {
            AllocationPolicy::StandardCalendar | AllocationPolicy::GregorianCalendar => &CALENDAR,
            AllocationPolicy::CumulativeMonths => &CALENDAR[1..],
            AllocationPolicy::CumulativeWeeks => &WEEKS,
            AllocationPolicy::CumulativeDays => &CALENDAR[4..],
            AllocationPolicy::CumulativeHours => &CLOCK,
            AllocationPolicy::CumulativeMinutes => &CLOCK[1..],
            AllocationPolicy::CumulativeSeconds => &CLOCK[2..],
            AllocationPolicy::CumulativeMilliseconds => &CLOCK[3..],
            AllocationPolicy::CumulativeMicroseconds => &CLOCK[4..],
            AllocationPolicy::CumulativeNanoseconds => &CLOCK[5..],
        }
    }

    pub fn populates(self, unit: Unit) -> bool {
        self.units().contains(&unit)
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for AllocationPolicy {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Error> {
        match value {
            0 => Err(Error::UnspecifiedPolicy),
            1..=11 => Ok(AllocationPolicy::ALL[(value - 1) as usize]),
            _ => Err(Error::UnknownPolicy(value.to_string())),
        }
    }
}

impl FromStr for AllocationPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let key = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let key = key
            .strip_prefix("cumulative-")
            .unwrap_or(&key)
            .to_string();
        match key.as_str() {
            "" | "unspecified" => Err(Error::UnspecifiedPolicy),
            "standard" | "standard-calendar" | "standardcalendar" | "calendar" => {
                Ok(AllocationPolicy::StandardCalendar)
            }
            "gregorian" | "gregorian-calendar" | "gregoriancalendar" => {
                Ok(AllocationPolicy::GregorianCalendar)
            }
            other => AllocationPolicy::ALL
                .into_iter()
                .find(|p| p.name() == other || format!("cumulative{}", p.name()) == other)
                .ok_or_else(|| Error::UnknownPolicy(s.to_string())),
        }
    }
}

/// How calendar units are added near DST transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticMode {
    /// Calendar fields change in the timestamp's own zone. A day may be 23
    /// or 25 hours long.
    LocalZone = 1,
    /// Arithmetic happens at the start's UTC offset held fixed and the
    /// result is converted back, so a day is always 24 hours.
    UtcNormalized = 2,
}

impl ArithmeticMode {
    pub fn name(self) -> &'static str {
        match self {
            ArithmeticMode::LocalZone => "local",
            ArithmeticMode::UtcNormalized => "utc",
        }
    }
}

impl fmt::Display for ArithmeticMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for ArithmeticMode {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Error> {
        match value {
            0 => Err(Error::UnspecifiedMode),
            1 => Ok(ArithmeticMode::LocalZone),
            2 => Ok(ArithmeticMode::UtcNormalized),
            _ => Err(Error::UnknownMode(value.to_string())),
        }
    }
}

impl FromStr for ArithmeticMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "" | "unspecified" => Err(Error::UnspecifiedMode),
            "local" | "local-zone" | "localzone" => Ok(ArithmeticMode::LocalZone),
            "utc" | "utc-normalized" | "utcnormalized" => Ok(ArithmeticMode::UtcNormalized),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}
