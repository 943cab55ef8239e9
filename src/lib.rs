//! Calendar-aware elapsed time.
//!
//! * [`decompose`] breaks the span between two timestamps into years,
//!   months, weeks, days and clock units under an [`AllocationPolicy`].
//! * [`add_calendar_span`] adds calendar units under an [`ArithmeticMode`]
//!   that decides what a day means across a DST transition.
//! * [`BigDuration`] carries spans too wide for 64-bit nanoseconds and
//!   places them on the calendar in 64-bit steps.
//!
//! Zones come from the IANA database bundled by `chrono-tz`; see
//! [`zone::resolve`].

pub mod bigduration;
mod calendar;
pub mod datemath;
pub mod decompose;
pub mod error;
pub mod format;
pub mod span;
pub mod timestamp;
pub mod types;
pub mod zone;

pub use bigduration::BigDuration;
pub use datemath::{CalendarSpan, add_calendar_span, add_in};
pub use decompose::{Basis, DurationBreakdown, UnitCount, decompose, decompose_span};
pub use error::{Error, ErrorKind, Result};
pub use format::{DEFAULT_PATTERN, format, parse, parse_in};
pub use span::DurationSpan;
pub use timestamp::TimestampWithZone;
pub use types::{AllocationPolicy, ArithmeticMode, Unit};
pub use zone::{Zone, is_convertible, resolve};
