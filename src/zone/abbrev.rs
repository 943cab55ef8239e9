//! Zone abbreviations and the IANA zones they can stand for.
//!
//! An abbreviation is convertible only when it names exactly one zone.

use tracing::trace;

use super::Zone;
use crate::error::{Error, Result};
use crate::timestamp::TimestampWithZone;

const ABBREVIATIONS: &[(&str, &[&str])] = &[
    ("UTC", &["Etc/UTC"]),
    ("GMT", &["Etc/GMT"]),
    ("EST", &["America/New_York"]),
    ("EDT", &["America/New_York"]),
    ("CST", &["America/Chicago", "Asia/Shanghai", "America/Havana"]),
    ("CDT", &["America/Chicago", "America/Havana"]),
    ("MST", &["America/Denver", "America/Phoenix"]),
    ("MDT", &["America/Denver"]),
    ("PST", &["America/Los_Angeles", "Asia/Manila"]),
    ("PDT", &["America/Los_Angeles"]),
    ("AKST", &["America/Anchorage"]),
    ("AKDT", &["America/Anchorage"]),
    ("HST", &["Pacific/Honolulu"]),
    ("AST", &["America/Halifax", "America/Puerto_Rico"]),
    ("ADT", &["America/Halifax"]),
    ("NST", &["America/St_Johns"]),
    ("NDT", &["America/St_Johns"]),
    ("BST", &["Europe/London"]),
    ("IST", &["Asia/Kolkata", "Europe/Dublin", "Asia/Jerusalem"]),
    ("WET", &["Europe/Lisbon"]),
    ("WEST", &["Europe/Lisbon"]),
    ("CET", &["Europe/Berlin"]),
    ("CEST", &["Europe/Berlin"]),
    ("EET", &["Europe/Athens"]),
    ("EEST", &["Europe/Athens"]),
    ("MSK", &["Europe/Moscow"]),
    ("SAST", &["Africa/Johannesburg"]),
    ("JST", &["Asia/Tokyo"]),
    ("KST", &["Asia/Seoul"]),
    ("HKT", &["Asia/Hong_Kong"]),
    ("AWST", &["Australia/Perth"]),
    ("ACST", &["Australia/Adelaide", "Australia/Darwin"]),
    ("ACDT", &["Australia/Adelaide"]),
    ("AEST", &["Australia/Sydney", "Australia/Brisbane"]),
    ("AEDT", &["Australia/Sydney"]),
    ("NZST", &["Pacific/Auckland"]),
    ("NZDT", &["Pacific/Auckland"]),
];

pub(crate) fn candidates(abbreviation: &str) -> Option<&'static [&'static str]> {
    ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(abbreviation.trim()))
        .map(|&(_, zones)| zones)
}

/// Resolve an abbreviation that names exactly one zone.
pub fn resolve_abbreviation(abbreviation: &str) -> Result<Zone> {
    match candidates(abbreviation) {
        Some([only]) => super::resolve_iana(only),
        Some(many) => Err(Error::AmbiguousAbbreviation {
            abbreviation: abbreviation.to_string(),
            candidates: many.join(", "),
        }),
        None => Err(Error::UnknownZone(abbreviation.to_string())),
    }
}

/// Whether the timestamp's current abbreviation maps back to a single
/// IANA zone. On success the returned timestamp is the same instant
/// rendered in that zone; otherwise it is returned unchanged.
pub fn is_convertible(timestamp: &TimestampWithZone) -> (bool, TimestampWithZone) {
    let abbreviation = timestamp.abbreviation();
    match resolve_abbreviation(&abbreviation) {
        Ok(zone) => {
            trace!(%abbreviation, zone = zone.name(), "abbreviation is convertible");
            (true, timestamp.in_zone(&zone))
        }
        Err(err) => {
            trace!(%abbreviation, %err, "abbreviation is not convertible");
            (false, timestamp.clone())
        }
    }
}
