//! Time zone resolution on top of the IANA database bundled by `chrono-tz`.

mod abbrev;
mod military;

use std::fmt;

use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, trace};

use crate::error::{Error, Result};

pub use abbrev::{is_convertible, resolve_abbreviation};

const SECS_PER_DAY: i64 = 86_400;

/// A resolved time zone: the IANA rules plus the name it was resolved as.
///
/// Military zones keep their phonetic name (`"Zulu"`, `"Alpha"`) while
/// using the matching `Etc/GMT` rules.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    tz: Tz,
    name: &'static str,
}

impl Zone {
    pub fn utc() -> Zone {
        Zone::from_tz(Tz::UTC)
    }

    pub fn from_tz(tz: Tz) -> Zone {
        Zone {
            tz,
            name: tz.name(),
        }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total UTC offset in seconds at an instant.
    pub fn offset_seconds_at(&self, instant: &DateTime<Utc>) -> i32 {
        self.tz
            .offset_from_utc_datetime(&instant.naive_utc())
            .fix()
            .local_minus_utc()
    }

    /// Whether the zone has a fixed offset (no transitions at all).
    pub fn is_fixed(&self) -> bool {
        let name = self.tz.name();
        name == "UTC" || name.starts_with("Etc/")
    }

    /// First offset change strictly after `after` and no later than `until`.
    ///
    /// Scans in one-day steps and then narrows to the exact second, so two
    /// transitions within the same day are reported as one.
    pub fn next_transition(
        &self,
        after: &DateTime<Utc>,
        until: &DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if self.is_fixed() || after >= until {
            return None;
        }
        let mut lo = after.timestamp();
        let end = until.timestamp();
        let mut lo_off = self.offset_at_second(lo);
        while lo < end {
            let hi = lo.saturating_add(SECS_PER_DAY).min(end);
            let hi_off = self.offset_at_second(hi);
            if hi_off != lo_off {
                let exact = self.find_exact_transition(lo, hi, lo_off);
                trace!(zone = self.name, at = exact, "offset transition");
                return DateTime::from_timestamp(exact, 0);
            }
            lo = hi;
            lo_off = hi_off;
        }
        None
    }

    /// Whether the offset changes anywhere in `[a, b]`, in either order.
    pub fn has_transition_between(&self, a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.offset_seconds_at(lo) != self.offset_seconds_at(hi)
            || self.next_transition(lo, hi).is_some()
    }

    fn offset_at_second(&self, epoch_secs: i64) -> i32 {
        match DateTime::from_timestamp(epoch_secs, 0) {
            Some(dt) => self.offset_seconds_at(&dt),
            None => 0,
        }
    }

    /// Binary search for the first second whose offset differs from `lo_off`.
    fn find_exact_transition(&self, mut lo: i64, mut hi: i64, lo_off: i32) -> i64 {
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.offset_at_second(mid) == lo_off {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        hi
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.tz.name() {
            write!(f, "Zone({})", self.name)
        } else {
            write!(f, "Zone({} = {})", self.name, self.tz.name())
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Resolve a zone identifier.
///
/// Accepts, in order: the empty string (UTC), `"Local"`, IANA names (exact,
/// then case-insensitive), military letters and phonetic names, and finally
/// zone abbreviations that name a single zone.
pub fn resolve(identifier: &str) -> Result<Zone> {
    let id = identifier.trim();
    if id.is_empty() {
        return Ok(Zone::utc());
    }
    if id.eq_ignore_ascii_case("Local") {
        return local();
    }
    if let Ok(tz) = id.parse::<Tz>() {
        trace!(identifier = id, "resolved IANA zone");
        return Ok(Zone::from_tz(tz));
    }
    if let Some(zone) = military::lookup(id) {
        return match zone {
            military::Military::Local => local(),
            military::Military::Fixed { name, hours } => {
                let tz = resolve_iana(&military::etc_zone_name(hours))?.tz;
                trace!(identifier = id, military = name, "resolved military zone");
                Ok(Zone { tz, name })
            }
        };
    }
    if let Ok(tz) = Tz::from_str_insensitive(id) {
        trace!(identifier = id, "resolved IANA zone ignoring case");
        return Ok(Zone::from_tz(tz));
    }
    match resolve_abbreviation(id) {
        Err(Error::UnknownZone(_)) => {
            debug!(identifier = id, "unknown time zone");
            Err(Error::UnknownZone(identifier.to_string()))
        }
        other => other,
    }
}

pub(crate) fn resolve_iana(name: &str) -> Result<Zone> {
    name.parse::<Tz>()
        .map(Zone::from_tz)
        .map_err(|_| Error::UnknownZone(name.to_string()))
}

/// The host's configured zone.
pub fn local() -> Result<Zone> {
    let name = iana_time_zone::get_timezone().map_err(|e| Error::LocalZone(e.to_string()))?;
    debug!(zone = %name, "host time zone");
    resolve_iana(&name).map_err(|_| Error::LocalZone(format!("'{name}' is not an IANA zone")))
}

/// A fixed-offset zone for a whole number of hours east of UTC.
pub(crate) fn fixed_hours(hours: i8) -> Result<Zone> {
    resolve_iana(&military::etc_zone_name(hours))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn resolves_iana_names() {
        let zone = resolve("America/Chicago").unwrap();
        assert_eq!(zone.name(), "America/Chicago");
        assert_eq!(zone.tz(), Tz::America__Chicago);
        let zone = resolve("america/chicago").unwrap();
        assert_eq!(zone.tz(), Tz::America__Chicago);
    }

    #[test]
    fn empty_identifier_is_utc() {
        assert_eq!(resolve("").unwrap(), Zone::utc());
    }

    #[test]
    fn resolves_military_zones() {
        let zulu = resolve("Z").unwrap();
        assert_eq!(zulu.name(), "Zulu");
        assert_eq!(zulu.offset_seconds_at(&utc(2020, 1, 1, 0)), 0);

        let alpha = resolve("alpha").unwrap();
        assert_eq!(alpha.name(), "Alpha");
        assert_eq!(alpha.offset_seconds_at(&utc(2020, 1, 1, 0)), 3600);

        let yankee = resolve("Y").unwrap();
        assert_eq!(yankee.offset_seconds_at(&utc(2020, 1, 1, 0)), -12 * 3600);
    }

    #[test]
    fn resolves_unambiguous_abbreviation() {
        assert_eq!(resolve("JST").unwrap().name(), "Asia/Tokyo");
        assert!(matches!(
            resolve("IST"),
            Err(Error::AmbiguousAbbreviation { .. })
        ));
    }

    #[test]
    fn unknown_zone_is_a_resolution_error() {
        let err = resolve("Mars/Olympus_Mons").unwrap_err();
        assert_eq!(err, Error::UnknownZone("Mars/Olympus_Mons".to_string()));
        assert_eq!(err.kind(), crate::ErrorKind::ZoneResolution);
    }

    #[test]
    fn resolution_is_stable() {
        for id in ["America/Chicago", "Z", "Kilo", "UTC", "EDT"] {
            assert_eq!(resolve(id).unwrap(), resolve(id).unwrap(), "{id}");
        }
    }

    #[test]
    fn finds_chicago_spring_forward() {
        let chicago = resolve("America/Chicago").unwrap();
        let at = chicago
            .next_transition(&utc(2018, 3, 1, 0), &utc(2018, 4, 1, 0))
            .unwrap();
        // 2018-03-11 02:00 CST
        assert_eq!(at, utc(2018, 3, 11, 8));
        assert!(chicago.has_transition_between(&utc(2018, 3, 10, 0), &utc(2018, 3, 12, 0)));
        assert!(!chicago.has_transition_between(&utc(2018, 5, 1, 0), &utc(2018, 6, 1, 0)));
        // spring forward and fall back cancel out but are still seen
        assert!(chicago.has_transition_between(&utc(2018, 1, 1, 0), &utc(2018, 12, 31, 0)));
    }

    #[test]
    fn fixed_zones_have_no_transitions() {
        let kilo = resolve("K").unwrap();
        assert!(kilo.is_fixed());
        assert!(!kilo.has_transition_between(&utc(2000, 1, 1, 0), &utc(2030, 1, 1, 0)));
        assert_eq!(fixed_hours(-5).unwrap().name(), "Etc/GMT+5");
    }
}
