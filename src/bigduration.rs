//! Durations wider than 64 bits of nanoseconds.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use num_bigint::{BigInt, BigUint, Sign};
use tracing::trace;

use crate::datemath::{self, CalendarSpan};
use crate::error::{Error, Result};
use crate::timestamp::TimestampWithZone;
use crate::types::ArithmeticMode;
use crate::zone;

/// Largest piece handed to the date math in one step.
const CHUNK: u128 = i64::MAX as u128;

const NS_PER_SEC: i64 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Materialized {
    start: TimestampWithZone,
    end: TimestampWithZone,
    mode: ArithmeticMode,
}

/// A sign plus an arbitrary-precision nanosecond magnitude.
///
/// The sign is the only carrier of direction, and is `NoSign` exactly when
/// the magnitude is zero. A value that was never set has no magnitude at
/// all, which is different from a zero duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigDuration {
    sign: Sign,
    magnitude: Option<BigUint>,
    materialized: Option<Materialized>,
}

impl Default for BigDuration {
    fn default() -> Self {
        BigDuration::unset()
    }
}

impl BigDuration {
    pub fn unset() -> BigDuration {
        BigDuration {
            sign: Sign::NoSign,
            magnitude: None,
            materialized: None,
        }
    }

    pub fn from_nanoseconds(nanoseconds: i64) -> BigDuration {
        BigDuration::from_big_int(BigInt::from(nanoseconds))
    }

    pub fn from_time_delta(delta: TimeDelta) -> BigDuration {
        let ns = BigInt::from(delta.num_seconds()) * NS_PER_SEC + delta.subsec_nanos();
        BigDuration::from_big_int(ns)
    }

    pub fn from_big_int(value: BigInt) -> BigDuration {
        BigDuration {
            sign: value.sign(),
            magnitude: Some(value.magnitude().clone()),
            materialized: None,
        }
    }

    /// The exact span between two timestamps, both rendered in
    /// `zone_identifier` (empty keeps the start's zone).
    pub fn from_start_end(
        start: &TimestampWithZone,
        end: &TimestampWithZone,
        zone_identifier: &str,
    ) -> Result<BigDuration> {
        if start.is_zero() && end.is_zero() {
            return Err(Error::UninitializedTimestamp);
        }
        let zone = if zone_identifier.is_empty() {
            *start.zone()
        } else {
            zone::resolve(zone_identifier)?
        };
        let value = BigInt::from(end.epoch_nanoseconds()) - BigInt::from(start.epoch_nanoseconds());
        Ok(BigDuration {
            materialized: Some(Materialized {
                start: start.in_zone(&zone),
                end: end.in_zone(&zone),
                mode: ArithmeticMode::LocalZone,
            }),
            ..BigDuration::from_big_int(value)
        })
    }

    pub fn is_set(&self) -> bool {
        self.magnitude.is_some()
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn magnitude(&self) -> Option<&BigUint> {
        self.magnitude.as_ref()
    }

    pub fn to_big_int(&self) -> Option<BigInt> {
        self.magnitude
            .as_ref()
            .map(|m| BigInt::from_biguint(self.sign, m.clone()))
    }

    /// The value as 64-bit nanoseconds, if set and small enough.
    pub fn nanoseconds(&self) -> Option<i64> {
        self.to_big_int().and_then(|v| i64::try_from(&v).ok())
    }

    /// The start and end from the last materialization, kept current by
    /// [`add`](BigDuration::add).
    pub fn materialized(&self) -> Option<(&TimestampWithZone, &TimestampWithZone)> {
        self.materialized.as_ref().map(|m| (&m.start, &m.end))
    }

    /// Add signed nanoseconds. An unset value starts from zero.
    pub fn add(&mut self, nanoseconds: i64) -> Result<()> {
        let value = self.to_big_int().unwrap_or_default() + nanoseconds;
        self.replace(value)
    }

    pub fn add_big(&mut self, other: &BigDuration) -> Result<()> {
        let other = other.to_big_int().ok_or(Error::NilDuration)?;
        let value = self.to_big_int().unwrap_or_default() + other;
        self.replace(value)
    }

    /// Swap in a new value, re-placing any materialization first so a
    /// failure leaves `self` untouched.
    fn replace(&mut self, value: BigInt) -> Result<()> {
        let materialized = match &self.materialized {
            Some(m) => {
                let end = place(value.sign(), value.magnitude(), &m.start, m.mode)?;
                Some(Materialized {
                    end,
                    ..m.clone()
                })
            }
            None => None,
        };
        *self = BigDuration {
            materialized,
            ..BigDuration::from_big_int(value)
        };
        Ok(())
    }

    /// Anchor the duration at `base`, returning `(start, end)` and
    /// remembering them.
    pub fn materialize(
        &mut self,
        base: &TimestampWithZone,
        mode: ArithmeticMode,
    ) -> Result<(TimestampWithZone, TimestampWithZone)> {
        let (start, end) = self.materialized_at(base, mode)?;
        self.materialized = Some(Materialized {
            start: start.clone(),
            end: end.clone(),
            mode,
        });
        Ok((start, end))
    }

    /// [`materialize`](BigDuration::materialize) without remembering the
    /// result.
    pub fn materialized_at(
        &self,
        base: &TimestampWithZone,
        mode: ArithmeticMode,
    ) -> Result<(TimestampWithZone, TimestampWithZone)> {
        let magnitude = self.magnitude.as_ref().ok_or(Error::NilDuration)?;
        let end = place(self.sign, magnitude, base, mode)?;
        Ok((base.clone(), end))
    }
}

/// Walk from `base` in chunks of at most `i64::MAX` nanoseconds, full
/// chunks first, then the remainder.
fn place(
    sign: Sign,
    magnitude: &BigUint,
    base: &TimestampWithZone,
    mode: ArithmeticMode,
) -> Result<TimestampWithZone> {
    let magnitude = u128::try_from(magnitude).map_err(|_| Error::OutOfRange)?;
    let signed = i128::try_from(magnitude).map_err(|_| Error::OutOfRange)?;
    let signed = if sign == Sign::Minus { -signed } else { signed };
    // Fail before walking if the end is not representable.
    let expected = base.checked_add_nanoseconds(signed)?;

    let direction: i64 = if sign == Sign::Minus { -1 } else { 1 };
    let full = magnitude / CHUNK;
    let rest = (magnitude % CHUNK) as i64;
    trace!(%mode, full, rest, "materializing wide duration");

    let mut end = base.clone();
    let chunk = CalendarSpan::new().nanoseconds(direction * i64::MAX);
    for _ in 0..full {
        end = datemath::add_calendar_span(&end, &chunk, mode)?;
    }
    if rest != 0 {
        let tail = CalendarSpan::new().nanoseconds(direction * rest);
        end = datemath::add_calendar_span(&end, &tail, mode)?;
    }
    debug_assert!(end == expected);
    Ok(end)
}

impl FromStr for BigDuration {
    type Err = Error;

    /// Signed decimal nanoseconds of any length.
    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim().replace('_', "");
        digits
            .parse::<BigInt>()
            .map(BigDuration::from_big_int)
            .map_err(|_| Error::InvalidNanoseconds(s.to_string()))
    }
}

impl fmt::Display for BigDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_big_int() {
            Some(value) => write!(f, "{value}"),
            None => f.write_str("unset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::zone::resolve;

    fn base() -> TimestampWithZone {
        let zone = resolve("America/Chicago").unwrap();
        TimestampWithZone::from_civil(2000, 1, 1, 0, 0, 0, 0, &zone).unwrap()
    }

    fn consistent(d: &BigDuration) -> bool {
        let zero = d.magnitude().is_some_and(|m| m.bits() == 0);
        (d.sign() == Sign::NoSign) == zero
    }

    #[test]
    fn sign_tracks_magnitude_through_adds() {
        use Sign::{Minus, NoSign, Plus};
        let mut d = BigDuration::from_nanoseconds(5);
        assert!(consistent(&d));
        let steps = [
            (-5, NoSign),
            (-3, Minus),
            (i64::MAX, Plus),
            (i64::MAX, Plus),
            (i64::MIN, Plus),
            (i64::MIN, Minus),
            (3, Minus),
            (2, NoSign),
            (0, NoSign),
            (-1, Minus),
            (7, Plus),
        ];
        for (step, sign) in steps {
            d.add(step).unwrap();
            assert!(consistent(&d), "after {step}: {d}");
            assert_eq!(d.sign(), sign, "after {step}: {d}");
        }
        assert_eq!(d.nanoseconds(), Some(6));

        d.add(-6).unwrap();
        assert_eq!(d.sign(), NoSign);
        assert_eq!(d.nanoseconds(), Some(0));
    }

    #[test]
    fn add_past_64_bits() {
        let mut d = BigDuration::from_nanoseconds(i64::MAX);
        d.add(i64::MAX).unwrap();
        assert_eq!(d.nanoseconds(), None);
        assert_eq!(
            d.to_big_int(),
            Some(BigInt::from(i64::MAX) * 2)
        );
        d.add_big(&BigDuration::from_nanoseconds(i64::MIN)).unwrap();
        assert_eq!(d.nanoseconds(), Some(i64::MAX - 1));
        d.add_big(&BigDuration::from_nanoseconds(i64::MIN)).unwrap();
        assert_eq!(d.sign(), Sign::Minus);
        assert_eq!(d.nanoseconds(), Some(-2));
    }

    #[test]
    fn unset_is_not_zero() {
        let mut d = BigDuration::unset();
        assert!(!d.is_set());
        let err = d.materialize(&base(), ArithmeticMode::LocalZone).unwrap_err();
        assert_eq!(err, Error::NilDuration);
        assert_eq!(err.kind(), ErrorKind::UninitializedState);

        let mut zero = BigDuration::from_nanoseconds(0);
        let (start, end) = zero.materialize(&base(), ArithmeticMode::LocalZone).unwrap();
        assert_eq!(start, end);

        d.add(10).unwrap();
        assert_eq!(d.nanoseconds(), Some(10));
        assert_eq!(
            BigDuration::from_nanoseconds(1).add_big(&BigDuration::unset()),
            Err(Error::NilDuration)
        );
    }

    #[test]
    fn materialize_is_exact_and_idempotent() {
        let value = BigInt::from(i64::MAX) * 3 + 12_345;
        for sign in [1, -1] {
            let mut d = BigDuration::from_big_int(&value * sign);
            let first = d.materialize(&base(), ArithmeticMode::LocalZone).unwrap();
            let second = d.materialize(&base(), ArithmeticMode::LocalZone).unwrap();
            assert!(first.0.same_rendering(&second.0));
            assert!(first.1.same_rendering(&second.1));
            assert_eq!(
                BigInt::from(first.0.nanoseconds_until(&first.1)),
                &value * sign
            );
            assert_eq!(first.1.zone().name(), "America/Chicago");
        }
    }

    #[test]
    fn modes_agree_for_pure_durations() {
        let d = BigDuration::from_big_int(BigInt::from(i64::MAX) * 2);
        let (_, local) = d.materialized_at(&base(), ArithmeticMode::LocalZone).unwrap();
        let (_, utc) = d.materialized_at(&base(), ArithmeticMode::UtcNormalized).unwrap();
        assert!(local.same_rendering(&utc));
    }

    #[test]
    fn thousands_of_years() {
        let ns_per_year = BigInt::from(31_556_952_000_000_000i64);
        let d = BigDuration::from_big_int(ns_per_year * 30_000);
        let (_, end) = d.materialized_at(&base(), ArithmeticMode::LocalZone).unwrap();
        assert_eq!(end.year(), 32_000);
    }

    #[test]
    fn beyond_the_calendar_is_out_of_range() {
        let d: BigDuration = "1000000000000000000000000000000".parse().unwrap();
        assert_eq!(
            d.materialized_at(&base(), ArithmeticMode::LocalZone),
            Err(Error::OutOfRange)
        );
    }

    #[test]
    fn failed_add_leaves_value_untouched() {
        let utc = resolve("UTC").unwrap();
        let late = TimestampWithZone::from_civil(262_000, 1, 1, 0, 0, 0, 0, &utc).unwrap();
        let mut d = BigDuration::from_nanoseconds(1);
        d.materialize(&late, ArithmeticMode::LocalZone).unwrap();
        let before = d.clone();
        assert_eq!(d.add(i64::MAX), Err(Error::OutOfRange));
        assert_eq!(d, before);
    }

    #[test]
    fn add_moves_the_materialized_end() {
        let mut d = BigDuration::from_nanoseconds(NS_PER_SEC);
        d.materialize(&base(), ArithmeticMode::LocalZone).unwrap();
        d.add(-3 * NS_PER_SEC).unwrap();
        let (start, end) = d.materialized().unwrap();
        assert_eq!(start.nanoseconds_until(end), -2 * NS_PER_SEC as i128);
        assert_eq!(d.sign(), Sign::Minus);
    }

    #[test]
    fn from_start_end_uses_wide_arithmetic() {
        let utc = resolve("UTC").unwrap();
        let a = TimestampWithZone::from_civil(-200_000, 1, 1, 0, 0, 0, 0, &utc).unwrap();
        let b = TimestampWithZone::from_civil(200_000, 1, 1, 0, 0, 0, 0, &utc).unwrap();
        let d = BigDuration::from_start_end(&a, &b, "Asia/Tokyo").unwrap();
        assert_eq!(d.sign(), Sign::Plus);
        assert_eq!(
            d.to_big_int(),
            Some(BigInt::from(b.epoch_nanoseconds()) - BigInt::from(a.epoch_nanoseconds()))
        );
        let (start, end) = d.materialized().unwrap();
        assert_eq!(end.zone().name(), "Asia/Tokyo");
        assert_eq!(start, &a);

        let zero = TimestampWithZone::zero();
        assert_eq!(
            BigDuration::from_start_end(&zero, &zero, ""),
            Err(Error::UninitializedTimestamp)
        );
        assert!(matches!(
            BigDuration::from_start_end(&a, &b, "Atlantis"),
            Err(Error::UnknownZone(_))
        ));
    }

    #[test]
    fn conversions() {
        let d = BigDuration::from_time_delta(TimeDelta::days(-3) + TimeDelta::nanoseconds(5));
        assert_eq!(d.sign(), Sign::Minus);
        assert_eq!(d.nanoseconds(), Some(-3 * 86_400 * NS_PER_SEC + 5));
        assert_eq!(d.to_string(), (-3 * 86_400 * NS_PER_SEC + 5).to_string());
        assert_eq!(BigDuration::unset().to_string(), "unset");
        assert!(matches!(
            "12x".parse::<BigDuration>(),
            Err(Error::InvalidNanoseconds(_))
        ));
    }
}
