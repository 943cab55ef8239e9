//! Errors returned by every fallible operation in the crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A caller-supplied value violates a precondition.
    Validation,
    /// End precedes start where a non-negative span is required.
    Ordering,
    /// A zone identifier or abbreviation could not be resolved.
    ZoneResolution,
    /// A value was used before it was ever set.
    UninitializedState,
}

impl ErrorKind {
    /// Ordering errors are a refinement of validation errors.
    pub fn is_validation(self) -> bool {
        matches!(self, ErrorKind::Validation | ErrorKind::Ordering)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Both endpoints are the zero timestamp.
    #[error("uninitialized timestamp: start and end are both the zero value")]
    UninitializedTimestamp,

    /// A positive elapsed duration was paired with an end before its start.
    #[error("end {end} precedes start {start} but the duration is positive")]
    EndBeforeStart { start: String, end: String },

    /// The explicit duration does not match the distance between endpoints.
    #[error("duration of {nanoseconds}ns does not match the span from {start} to {end}")]
    DurationMismatch {
        start: String,
        end: String,
        nanoseconds: i64,
    },

    #[error("allocation policy is unspecified")]
    UnspecifiedPolicy,

    #[error("unknown allocation policy '{0}'")]
    UnknownPolicy(String),

    #[error("arithmetic mode is unspecified")]
    UnspecifiedMode,

    #[error("unknown arithmetic mode '{0}'")]
    UnknownMode(String),

    /// A numeric field is outside its allowed range.
    #[error("{field} {value} is outside {min}..={max}")]
    FieldOutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The result of an operation is not a representable date-time.
    #[error("date-time arithmetic overflowed the representable range")]
    OutOfRange,

    #[error("unknown time zone '{0}'")]
    UnknownZone(String),

    #[error("zone abbreviation '{abbreviation}' is ambiguous ({candidates})")]
    AmbiguousAbbreviation {
        abbreviation: String,
        candidates: String,
    },

    /// The local time zone of the host could not be determined.
    #[error("cannot determine the local time zone: {0}")]
    LocalZone(String),

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("cannot parse '{input}' with pattern '{pattern}'")]
    Parse { input: String, pattern: String },

    /// Parsed offset or abbreviation disagrees with the zone.
    #[error("'{found}' does not match zone {zone} at that wall time")]
    OffsetMismatch { found: String, zone: String },

    #[error("invalid nanosecond count '{0}'")]
    InvalidNanoseconds(String),

    /// The magnitude of an arbitrary-precision duration was never set.
    #[error("nil duration: magnitude was never initialized")]
    NilDuration,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EndBeforeStart { .. } => ErrorKind::Ordering,
            Error::UnknownZone(_) | Error::AmbiguousAbbreviation { .. } | Error::LocalZone(_) => {
                ErrorKind::ZoneResolution
            }
            Error::NilDuration => ErrorKind::UninitializedState,
            _ => ErrorKind::Validation,
        }
    }

    pub(crate) fn range(field: &'static str, value: i64, min: i64, max: i64) -> Error {
        Error::FieldOutOfRange {
            field,
            value,
            min,
            max,
        }
    }
}
