//! Breaking an elapsed span into calendar and clock units.
//!
//! [`AllocationPolicy::StandardCalendar`] and
//! [`AllocationPolicy::CumulativeMonths`] walk the calendar in the span's
//! zone; [`AllocationPolicy::GregorianCalendar`] counts mean years and walks
//! the rest; every other policy is plain division by fixed unit sizes.
//! Negative spans are broken down by magnitude, walking from the earlier
//! end, and the breakdown keeps the caller's start and end.

mod breakdown;
mod cumulative;
mod walk;

use tracing::debug;

pub use breakdown::{DurationBreakdown, UnitCount};

use crate::error::Result;
use crate::span::DurationSpan;
use crate::timestamp::TimestampWithZone;
use crate::types::AllocationPolicy;
use crate::zone;

/// What a breakdown is computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Basis {
    Between {
        start: TimestampWithZone,
        end: TimestampWithZone,
    },
    Elapsed {
        start: TimestampWithZone,
        nanoseconds: i64,
    },
    /// A recorded start, end and raw count that must agree with each other.
    Recorded {
        start: TimestampWithZone,
        end: TimestampWithZone,
        nanoseconds: i64,
    },
}

impl Basis {
    pub fn start(&self) -> &TimestampWithZone {
        match self {
            Basis::Between { start, .. }
            | Basis::Elapsed { start, .. }
            | Basis::Recorded { start, .. } => start,
        }
    }

    pub fn span(&self) -> Result<DurationSpan> {
        match self {
            Basis::Between { start, end } => DurationSpan::between(start, end),
            Basis::Elapsed { start, nanoseconds } => DurationSpan::elapsed(start, *nanoseconds),
            Basis::Recorded {
                start,
                end,
                nanoseconds,
            } => DurationSpan::from_parts(start, end, *nanoseconds),
        }
    }
}

/// Break down `basis` after rendering both ends in `zone_identifier` (empty
/// keeps the start's zone).
pub fn decompose(
    basis: &Basis,
    zone_identifier: &str,
    policy: AllocationPolicy,
) -> Result<DurationBreakdown> {
    let zone = if zone_identifier.is_empty() {
        *basis.start().zone()
    } else {
        zone::resolve(zone_identifier)?
    };
    let span = basis.span()?.in_zone(&zone);
    decompose_span(&span, policy)
}

/// Break down a span in the zone its ends are already rendered in.
pub fn decompose_span(span: &DurationSpan, policy: AllocationPolicy) -> Result<DurationBreakdown> {
    debug!(%policy, span = %span, "decomposing");
    let mut out = DurationBreakdown::new(policy, span.clone());
    let (lo, hi) = span.ordered();
    match policy {
        AllocationPolicy::StandardCalendar => walk::calendar(&mut out, lo, hi, true)?,
        AllocationPolicy::CumulativeMonths => walk::calendar(&mut out, lo, hi, false)?,
        AllocationPolicy::GregorianCalendar => walk::gregorian(&mut out, lo, hi, span.magnitude())?,
        _ => cumulative::divide(&mut out, policy.units(), span.magnitude()),
    }
    debug_assert_eq!(out.total_nanoseconds(), span.magnitude());
    Ok(out)
}
