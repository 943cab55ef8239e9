use std::fmt;

use num_bigint::{BigInt, Sign};

use crate::bigduration::BigDuration;
use crate::error::{Error, Result};
use crate::timestamp::TimestampWithZone;
use crate::types::ArithmeticMode;
use crate::zone::Zone;

/// The directed elapsed time from `start` to `end`.
///
/// `end` may precede `start`; the sign carries the direction and the
/// magnitude is always non-negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationSpan {
    start: TimestampWithZone,
    end: TimestampWithZone,
    sign: Sign,
    magnitude: u128,
}

fn sign_of(ns: i128) -> Sign {
    match ns.signum() {
        1 => Sign::Plus,
        -1 => Sign::Minus,
        _ => Sign::NoSign,
    }
}

impl DurationSpan {
    pub fn between(start: &TimestampWithZone, end: &TimestampWithZone) -> Result<DurationSpan> {
        if start.is_zero() && end.is_zero() {
            return Err(Error::UninitializedTimestamp);
        }
        let ns = start.nanoseconds_until(end);
        Ok(DurationSpan {
            start: start.clone(),
            end: end.clone(),
            sign: sign_of(ns),
            magnitude: ns.unsigned_abs(),
        })
    }

    /// The span of `nanoseconds` starting at `start`; the end lands in the
    /// start's zone.
    pub fn elapsed(start: &TimestampWithZone, nanoseconds: i64) -> Result<DurationSpan> {
        let end = start.checked_add_nanoseconds(nanoseconds as i128)?;
        DurationSpan::between(start, &end)
    }

    /// A span from a recorded start, end and raw count, which must agree.
    pub fn from_parts(
        start: &TimestampWithZone,
        end: &TimestampWithZone,
        nanoseconds: i64,
    ) -> Result<DurationSpan> {
        if nanoseconds > 0 && end < start {
            return Err(Error::EndBeforeStart {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        let span = DurationSpan::between(start, end)?;
        if span.signed_nanoseconds() != nanoseconds as i128 {
            return Err(Error::DurationMismatch {
                start: start.to_string(),
                end: end.to_string(),
                nanoseconds,
            });
        }
        Ok(span)
    }

    /// Materialize `duration` against `start`; spans past 64 bits land here.
    pub fn from_big(
        start: &TimestampWithZone,
        duration: &BigDuration,
        mode: ArithmeticMode,
    ) -> Result<DurationSpan> {
        let (start, end) = duration.materialized_at(start, mode)?;
        DurationSpan::between(&start, &end)
    }

    pub fn set_between(&mut self, start: &TimestampWithZone, end: &TimestampWithZone) -> Result<()> {
        *self = DurationSpan::between(start, end)?;
        Ok(())
    }

    pub fn set_elapsed(&mut self, start: &TimestampWithZone, nanoseconds: i64) -> Result<()> {
        *self = DurationSpan::elapsed(start, nanoseconds)?;
        Ok(())
    }

    /// The same span with both ends rendered in `zone`.
    pub fn in_zone(&self, zone: &Zone) -> DurationSpan {
        DurationSpan {
            start: self.start.in_zone(zone),
            end: self.end.in_zone(zone),
            ..self.clone()
        }
    }

    pub fn start(&self) -> &TimestampWithZone {
        &self.start
    }

    pub fn end(&self) -> &TimestampWithZone {
        &self.end
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn magnitude(&self) -> u128 {
        self.magnitude
    }

    pub fn is_zero(&self) -> bool {
        self.sign == Sign::NoSign
    }

    pub fn signed_nanoseconds(&self) -> i128 {
        // Any two chrono instants are less than 2^75 ns apart.
        match self.sign {
            Sign::Minus => -(self.magnitude as i128),
            _ => self.magnitude as i128,
        }
    }

    /// The raw count as a 64-bit value, or `None` past ±292 years.
    pub fn nanoseconds(&self) -> Option<i64> {
        i64::try_from(self.signed_nanoseconds()).ok()
    }

    /// The earlier and later end, in that order.
    pub(crate) fn ordered(&self) -> (&TimestampWithZone, &TimestampWithZone) {
        if self.sign == Sign::Minus {
            (&self.end, &self.start)
        } else {
            (&self.start, &self.end)
        }
    }

    pub fn to_big(&self) -> BigDuration {
        BigDuration::from_big_int(BigInt::from(self.signed_nanoseconds()))
    }
}

impl fmt::Display for DurationSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({}ns)",
            self.start,
            self.end,
            self.signed_nanoseconds()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::resolve;

    fn chicago(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> TimestampWithZone {
        let zone = resolve("America/Chicago").unwrap();
        TimestampWithZone::from_civil(y, mo, d, h, mi, s, 0, &zone).unwrap()
    }

    #[test]
    fn sign_follows_direction() {
        let a = chicago(2014, 2, 15, 19, 54, 30);
        let b = chicago(2017, 4, 30, 22, 58, 32);

        let forward = DurationSpan::between(&a, &b).unwrap();
        assert_eq!(forward.sign(), Sign::Plus);
        assert_eq!(forward.magnitude(), 101_095_442_000_000_000);

        let backward = DurationSpan::between(&b, &a).unwrap();
        assert_eq!(backward.sign(), Sign::Minus);
        assert_eq!(backward.magnitude(), forward.magnitude());
        assert_eq!(backward.ordered().0, &a);

        let none = DurationSpan::between(&a, &a).unwrap();
        assert_eq!(none.sign(), Sign::NoSign);
        assert_eq!(none.magnitude(), 0);
        assert!(none.is_zero());
    }

    #[test]
    fn both_ends_zero_is_uninitialized() {
        let zero = TimestampWithZone::zero();
        assert_eq!(
            DurationSpan::between(&zero, &zero),
            Err(Error::UninitializedTimestamp)
        );
        assert_eq!(
            DurationSpan::elapsed(&zero, 0),
            Err(Error::UninitializedTimestamp)
        );
        assert!(DurationSpan::elapsed(&zero, 1).is_ok());
    }

    #[test]
    fn recorded_parts_must_agree() {
        let a = chicago(2020, 1, 1, 0, 0, 0);
        let b = chicago(2020, 1, 1, 0, 0, 1);
        assert!(DurationSpan::from_parts(&a, &b, 1_000_000_000).is_ok());

        let err = DurationSpan::from_parts(&b, &a, 1_000_000_000).unwrap_err();
        assert!(matches!(err, Error::EndBeforeStart { .. }));
        assert_eq!(err.kind(), crate::ErrorKind::Ordering);

        let err = DurationSpan::from_parts(&a, &b, 5).unwrap_err();
        assert!(matches!(err, Error::DurationMismatch { .. }));
        assert!(DurationSpan::from_parts(&b, &a, -1_000_000_000).is_ok());
    }

    #[test]
    fn set_replaces_every_field() {
        let a = chicago(2020, 1, 1, 0, 0, 0);
        let mut span = DurationSpan::elapsed(&a, 5).unwrap();
        span.set_elapsed(&a, -7).unwrap();
        assert_eq!(span.nanoseconds(), Some(-7));
        assert_eq!(span.sign(), Sign::Minus);

        let before = span.clone();
        let zero = TimestampWithZone::zero();
        assert!(span.set_between(&zero, &zero).is_err());
        assert_eq!(span, before);
    }

    #[test]
    fn nanoseconds_beyond_64_bits() {
        let zone = resolve("UTC").unwrap();
        let a = TimestampWithZone::from_civil(1000, 1, 1, 0, 0, 0, 0, &zone).unwrap();
        let b = TimestampWithZone::from_civil(3000, 1, 1, 0, 0, 0, 0, &zone).unwrap();
        let span = DurationSpan::between(&a, &b).unwrap();
        assert_eq!(span.nanoseconds(), None);
        assert_eq!(
            span.to_big().to_big_int(),
            Some(BigInt::from(span.signed_nanoseconds()))
        );
    }

    #[test]
    fn normalizing_keeps_the_instants() {
        let a = chicago(2020, 6, 1, 12, 0, 0);
        let span = DurationSpan::elapsed(&a, 90_000_000_000).unwrap();
        let tokyo = resolve("Asia/Tokyo").unwrap();
        let moved = span.in_zone(&tokyo);
        assert_eq!(moved, span);
        assert_eq!(moved.start().hour(), 2);
        assert_eq!(moved.end().zone().name(), "Asia/Tokyo");
    }
}
