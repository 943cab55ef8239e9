use std::fmt;

use num_bigint::Sign;

use crate::span::DurationSpan;
use crate::timestamp::TimestampWithZone;
use crate::types::{AllocationPolicy, Unit};

/// How many of one unit a span holds, and how much time those units cover.
///
/// For fixed-size units `nanoseconds == count * unit size`. For years and
/// months it is the length actually walked on the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitCount {
    pub count: u128,
    pub nanoseconds: u128,
}

/// A span broken into units under one [`AllocationPolicy`].
///
/// Units the policy does not populate hold zero. `Weeks` + `WeekDays` and
/// `DateDays` describe the same days twice; sums use the weeks view when
/// the policy has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationBreakdown {
    policy: AllocationPolicy,
    span: DurationSpan,
    counts: [UnitCount; 11],
}

impl DurationBreakdown {
    pub(crate) fn new(policy: AllocationPolicy, span: DurationSpan) -> DurationBreakdown {
        DurationBreakdown {
            policy,
            span,
            counts: [UnitCount::default(); 11],
        }
    }

    pub(crate) fn set(&mut self, unit: Unit, count: u128, nanoseconds: u128) {
        debug_assert!(self.policy.populates(unit), "{unit} under {}", self.policy);
        self.counts[unit as usize] = UnitCount { count, nanoseconds };
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    pub fn span(&self) -> &DurationSpan {
        &self.span
    }

    pub fn start(&self) -> &TimestampWithZone {
        self.span.start()
    }

    pub fn end(&self) -> &TimestampWithZone {
        self.span.end()
    }

    pub fn sign(&self) -> Sign {
        self.span.sign()
    }

    /// Raw `end - start`, or `None` when it does not fit 64 bits.
    pub fn raw_nanoseconds(&self) -> Option<i64> {
        self.span.nanoseconds()
    }

    pub fn get(&self, unit: Unit) -> UnitCount {
        self.counts[unit as usize]
    }

    pub fn count(&self, unit: Unit) -> u128 {
        self.get(unit).count
    }

    pub fn years(&self) -> u128 {
        self.count(Unit::Years)
    }

    pub fn months(&self) -> u128 {
        self.count(Unit::Months)
    }

    pub fn weeks(&self) -> u128 {
        self.count(Unit::Weeks)
    }

    pub fn week_days(&self) -> u128 {
        self.count(Unit::WeekDays)
    }

    pub fn date_days(&self) -> u128 {
        self.count(Unit::DateDays)
    }

    pub fn hours(&self) -> u128 {
        self.count(Unit::Hours)
    }

    pub fn minutes(&self) -> u128 {
        self.count(Unit::Minutes)
    }

    pub fn seconds(&self) -> u128 {
        self.count(Unit::Seconds)
    }

    pub fn milliseconds(&self) -> u128 {
        self.count(Unit::Milliseconds)
    }

    pub fn microseconds(&self) -> u128 {
        self.count(Unit::Microseconds)
    }

    pub fn nanoseconds(&self) -> u128 {
        self.count(Unit::Nanoseconds)
    }

    /// Units the policy fills, largest first, zeros included.
    pub fn populated_units(&self) -> impl Iterator<Item = (Unit, UnitCount)> + '_ {
        self.policy
            .units()
            .iter()
            .map(move |&unit| (unit, self.get(unit)))
    }

    /// `DateDays` repeats `Weeks` + `WeekDays` when both views are filled.
    fn is_partition(&self, unit: Unit) -> bool {
        unit != Unit::DateDays || !self.policy.populates(Unit::Weeks)
    }

    /// Sum of the nanoseconds of every unit, each day counted once. Equals
    /// the span's magnitude.
    pub fn total_nanoseconds(&self) -> u128 {
        self.populated_units()
            .filter(|(unit, _)| self.is_partition(*unit))
            .map(|(_, c)| c.nanoseconds)
            .sum()
    }

    pub fn format_start(&self, pattern: &str) -> String {
        self.start().format(pattern)
    }

    pub fn format_end(&self, pattern: &str) -> String {
        self.end().format(pattern)
    }
}

impl fmt::Display for DurationBreakdown {
    /// Non-zero units as `N-Unit`, e.g. `3-Years 2-Months 3-Hours`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (unit, c) in self.populated_units() {
            if c.count == 0 || !self.is_partition(unit) {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}-{}", c.count, unit)?;
            first = false;
        }
        if first {
            write!(f, "0-{}", Unit::Nanoseconds)?;
        }
        Ok(())
    }
}
