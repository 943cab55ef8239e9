//! Pattern-based rendering and parsing of [`TimestampWithZone`].
//!
//! | token        | meaning                                  |
//! |--------------|------------------------------------------|
//! | `YYYY`       | year, at least four digits               |
//! | `MM` / `DD`  | month / day, two digits                  |
//! | `HH`         | hour 00-23                               |
//! | `mm` / `ss`  | minute / second                          |
//! | `n`..`nnnnnnnnn` | fraction of a second, truncated      |
//! | `ZZZZ`       | zone abbreviation (`CST`, `CDT`, `UTC`)   |
//! | `Z`          | numeric offset `±hh:mm`                  |
//!
//! Anything else is copied literally.

use std::fmt::Write;
use std::sync::LazyLock;

use chrono::Offset;
use regex::{Captures, Regex};
use tracing::trace;

use crate::calendar;
use crate::error::{Error, Result};
use crate::timestamp::{self, TimestampWithZone};
use crate::zone::{self, Zone};

pub const DEFAULT_PATTERN: &str = "YYYY-MM-DD HH:mm:ss.nnnnnnnnn ZZZZ";

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"YYYY|MM|DD|HH|mm|ss|n{1,9}|ZZZZ|Z").expect("token regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'p> {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Fraction(u32),
    Abbreviation,
    Offset,
    Literal(&'p str),
}

fn effective(pattern: &str) -> &str {
    if pattern.is_empty() {
        DEFAULT_PATTERN
    } else {
        pattern
    }
}

fn tokenize(pattern: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in TOKEN.find_iter(pattern) {
        if m.start() > last {
            tokens.push(Token::Literal(&pattern[last..m.start()]));
        }
        tokens.push(match m.as_str() {
            "YYYY" => Token::Year,
            "MM" => Token::Month,
            "DD" => Token::Day,
            "HH" => Token::Hour,
            "mm" => Token::Minute,
            "ss" => Token::Second,
            "ZZZZ" => Token::Abbreviation,
            "Z" => Token::Offset,
            digits => Token::Fraction(digits.len() as u32),
        });
        last = m.end();
    }
    if last < pattern.len() {
        tokens.push(Token::Literal(&pattern[last..]));
    }
    tokens
}

pub(crate) fn format_offset(offset_seconds: i32) -> String {
    let sign = if offset_seconds >= 0 { '+' } else { '-' };
    let abs = offset_seconds.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 3600, (abs / 60) % 60)
}

/// Render a timestamp. The empty pattern means [`DEFAULT_PATTERN`].
pub fn format(ts: &TimestampWithZone, pattern: &str) -> String {
    let mut out = String::new();
    for token in tokenize(effective(pattern)) {
        // Writing to a String cannot fail.
        let _ = match token {
            Token::Year if ts.year() < 0 => write!(out, "-{:04}", -(ts.year() as i64)),
            Token::Year => write!(out, "{:04}", ts.year()),
            Token::Month => write!(out, "{:02}", ts.month()),
            Token::Day => write!(out, "{:02}", ts.day()),
            Token::Hour => write!(out, "{:02}", ts.hour()),
            Token::Minute => write!(out, "{:02}", ts.minute()),
            Token::Second => write!(out, "{:02}", ts.second()),
            Token::Fraction(digits) => {
                let value = ts.nanosecond() / 10u32.pow(9 - digits);
                write!(out, "{value:0width$}", width = digits as usize)
            }
            Token::Abbreviation => write!(out, "{}", ts.abbreviation()),
            Token::Offset => write!(out, "{}", format_offset(ts.offset_seconds())),
            Token::Literal(text) => write!(out, "{text}"),
        };
    }
    out
}

struct Pattern {
    regex: Regex,
    has_abbreviation: bool,
    has_offset: bool,
}

fn compile(pattern: &str) -> Result<Pattern> {
    let invalid = |reason: &str| Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };
    let tokens = tokenize(pattern);
    for (token, name) in [
        (Token::Year, "YYYY"),
        (Token::Month, "MM"),
        (Token::Day, "DD"),
    ] {
        if !tokens.contains(&token) {
            return Err(invalid(&format!("missing {name}")));
        }
    }
    let mut source = String::from("^");
    let mut has_abbreviation = false;
    let mut has_offset = false;
    for token in &tokens {
        match token {
            Token::Year => source.push_str(r"(?P<year>[+-]?\d{4,6})"),
            Token::Month => source.push_str(r"(?P<month>\d{2})"),
            Token::Day => source.push_str(r"(?P<day>\d{2})"),
            Token::Hour => source.push_str(r"(?P<hour>\d{2})"),
            Token::Minute => source.push_str(r"(?P<minute>\d{2})"),
            Token::Second => source.push_str(r"(?P<second>\d{2})"),
            Token::Fraction(digits) => {
                let _ = write!(source, r"(?P<fraction>\d{{{digits}}})");
            }
            Token::Abbreviation => {
                has_abbreviation = true;
                source.push_str(r"(?P<abbreviation>[A-Za-z][A-Za-z0-9_/+\-]*|[+-]\d{2,4})");
            }
            Token::Offset => {
                has_offset = true;
                source.push_str(r"(?P<offset>[+-]\d{2}:\d{2})");
            }
            Token::Literal(text) => source.push_str(&regex::escape(text)),
        }
    }
    source.push('$');
    let regex = Regex::new(&source).map_err(|_| invalid("a field appears more than once"))?;
    Ok(Pattern {
        regex,
        has_abbreviation,
        has_offset,
    })
}

struct Fields {
    naive: chrono::NaiveDateTime,
    abbreviation: Option<String>,
    offset_seconds: Option<i32>,
}

fn number(caps: &Captures<'_>, name: &str) -> Option<i64> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

fn parse_offset(text: &str) -> Option<i32> {
    let sign = if text.starts_with('-') { -1 } else { 1 };
    let (h, m) = text[1..].split_once(':')?;
    Some(sign * (h.parse::<i32>().ok()? * 3600 + m.parse::<i32>().ok()? * 60))
}

fn extract(input: &str, pattern: &str) -> Result<Fields> {
    let compiled = compile(pattern)?;
    let caps = compiled.regex.captures(input.trim()).ok_or_else(|| Error::Parse {
        input: input.to_string(),
        pattern: pattern.to_string(),
    })?;
    let year = number(&caps, "year").unwrap_or(0);
    let year = i32::try_from(year).map_err(|_| Error::range("year", year, -262_143, 262_142))?;
    let (month, day) = calendar::validate_date(
        year,
        number(&caps, "month").unwrap_or(0),
        number(&caps, "day").unwrap_or(0),
    )?;
    let hour = number(&caps, "hour").unwrap_or(0);
    let minute = number(&caps, "minute").unwrap_or(0);
    let second = number(&caps, "second").unwrap_or(0);
    let nanosecond = match caps.name("fraction") {
        Some(m) => {
            let digits = m.as_str().len() as u32;
            m.as_str().parse::<i64>().unwrap_or(0) * 10i64.pow(9 - digits)
        }
        None => 0,
    };
    calendar::validate_time(hour, minute, second, nanosecond)?;
    let naive = calendar::naive(
        year,
        month,
        day,
        hour as u8,
        minute as u8,
        second as u8,
        nanosecond as u32,
    )?;
    let offset_seconds = match caps.name("offset") {
        Some(m) => Some(parse_offset(m.as_str()).ok_or_else(|| Error::Parse {
            input: input.to_string(),
            pattern: pattern.to_string(),
        })?),
        None => None,
    };
    trace!(
        input,
        pattern,
        has_abbreviation = compiled.has_abbreviation,
        has_offset = compiled.has_offset,
        "parsed fields"
    );
    Ok(Fields {
        naive,
        abbreviation: caps.name("abbreviation").map(|m| m.as_str().to_string()),
        offset_seconds,
    })
}

/// Pick the instant for parsed wall-clock fields in `zone`, using a parsed
/// abbreviation or offset to choose between repeated wall times.
fn place(fields: &Fields, zone: &Zone, check_abbreviation: bool) -> Result<TimestampWithZone> {
    let options = timestamp::candidates(fields.naive, zone.tz());
    let mismatch = |found: &str| Error::OffsetMismatch {
        found: found.to_string(),
        zone: zone.name().to_string(),
    };
    let chosen = match (&fields.offset_seconds, &fields.abbreviation) {
        (Some(offset), _) => {
            let found = format_offset(*offset);
            options
                .into_iter()
                .find(|dt| dt.offset().fix().local_minus_utc() == *offset)
                .ok_or_else(|| mismatch(&found))?
        }
        (None, Some(abbr)) if check_abbreviation => options
            .into_iter()
            .find(|dt| dt.offset().to_string().eq_ignore_ascii_case(abbr))
            .ok_or_else(|| mismatch(abbr))?,
        _ => timestamp::disambiguate(fields.naive, zone.tz())?,
    };
    Ok(TimestampWithZone::from_datetime(chosen).in_zone(zone))
}

/// Parse a timestamp whose zone comes from the text itself.
///
/// `ZZZZ` may hold an abbreviation that names a single zone or any zone
/// identifier [`zone::resolve`] accepts. A lone `Z` offset yields the
/// matching `Etc/GMT` zone for whole hours and UTC otherwise.
pub fn parse(input: &str, pattern: &str) -> Result<TimestampWithZone> {
    let pattern = effective(pattern);
    let fields = extract(input, pattern)?;
    if let Some(abbr) = &fields.abbreviation {
        let (zone, is_abbreviation) = match zone::resolve_abbreviation(abbr) {
            Ok(zone) => (zone, true),
            Err(Error::UnknownZone(_)) => (zone::resolve(abbr)?, false),
            Err(err) => return Err(err),
        };
        return place(&fields, &zone, is_abbreviation);
    }
    if let Some(offset) = fields.offset_seconds {
        let whole_hours = if offset % 3600 == 0 {
            i8::try_from(offset / 3600).ok()
        } else {
            None
        };
        let zone = match whole_hours.map(zone::fixed_hours) {
            Some(Ok(zone)) => zone,
            // Etc/GMT zones cover UTC-12 to UTC+14
            Some(Err(Error::UnknownZone(_))) | None => Zone::utc(),
            Some(Err(err)) => return Err(err),
        };
        let utc = TimestampWithZone::from_local(fields.naive, &Zone::utc())?;
        return utc
            .checked_add_nanoseconds(-(offset as i128) * 1_000_000_000)
            .map(|ts| ts.in_zone(&zone));
    }
    Err(Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: "no ZZZZ or Z field to take the zone from".to_string(),
    })
}

/// Parse a timestamp in a known zone.
pub fn parse_in(input: &str, pattern: &str, zone: &Zone) -> Result<TimestampWithZone> {
    let pattern = effective(pattern);
    let fields = extract(input, pattern)?;
    place(&fields, zone, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::resolve;

    fn chicago() -> Zone {
        resolve("America/Chicago").unwrap()
    }

    #[test]
    fn default_pattern() {
        let ts = TimestampWithZone::from_civil(2014, 2, 15, 19, 54, 30, 5, &chicago()).unwrap();
        assert_eq!(ts.format(""), "2014-02-15 19:54:30.000000005 CST");
        assert_eq!(ts.format(""), ts.format(DEFAULT_PATTERN));
        assert_eq!(ts.to_string(), "2014-02-15 19:54:30.000000005 CST");
    }

    #[test]
    fn custom_pattern() {
        let ts = TimestampWithZone::from_civil(2017, 4, 30, 22, 58, 32, 987_654_321, &chicago())
            .unwrap();
        assert_eq!(ts.format("DD/MM/YYYY HH:mm Z"), "30/04/2017 22:58 -05:00");
        assert_eq!(ts.format("ss.nnn"), "32.987");
        assert_eq!(ts.format("ss.n"), "32.9");
    }

    #[test]
    fn tokenizer_keeps_literals() {
        assert_eq!(
            tokenize("YYYY-MM at HH"),
            vec![
                Token::Year,
                Token::Literal("-"),
                Token::Month,
                Token::Literal(" at "),
                Token::Hour
            ]
        );
    }

    #[test]
    fn parse_in_zone() {
        let ts = parse_in("2014-02-15 19:54:30.000000000 CST", "", &chicago()).unwrap();
        let expected = TimestampWithZone::from_civil(2014, 2, 15, 19, 54, 30, 0, &chicago()).unwrap();
        assert!(ts.same_rendering(&expected));
    }

    #[test]
    fn parse_in_picks_the_named_side_of_an_overlap() {
        let zone = chicago();
        let cdt = parse_in("2018-11-04 01:30:00.000000000 CDT", "", &zone).unwrap();
        let cst = parse_in("2018-11-04 01:30:00.000000000 CST", "", &zone).unwrap();
        assert_eq!(cdt.nanoseconds_until(&cst), 3_600_000_000_000);
        assert_eq!(cst.abbreviation(), "CST");
    }

    #[test]
    fn parse_in_rejects_wrong_abbreviation() {
        let err = parse_in("2018-07-04 12:00:00.000000000 CST", "", &chicago()).unwrap_err();
        assert!(matches!(err, Error::OffsetMismatch { .. }));
    }

    #[test]
    fn parse_with_zone_from_text() {
        let ts = parse("2020-06-01 09:00:00.000000000 JST", "").unwrap();
        assert_eq!(ts.zone().name(), "Asia/Tokyo");
        assert_eq!(ts.hour(), 9);

        let ts = parse("2020-06-01 09:00 America/Chicago", "YYYY-MM-DD HH:mm ZZZZ").unwrap();
        assert_eq!(ts.zone().name(), "America/Chicago");
        assert_eq!(ts.abbreviation(), "CDT");

        let err = parse("2020-01-01 09:00:00.000000000 CST", "").unwrap_err();
        assert!(matches!(err, Error::AmbiguousAbbreviation { .. }));
    }

    #[test]
    fn parse_with_offset() {
        let ts = parse("2020-06-01T09:00:00-05:00", "YYYY-MM-DDTHH:mm:ssZ").unwrap();
        assert_eq!(ts.zone().name(), "Etc/GMT+5");
        assert_eq!(ts.hour(), 9);
        assert_eq!(ts.utc().to_rfc3339(), "2020-06-01T14:00:00+00:00");

        let ts = parse("2020-06-01T09:00:00+05:30", "YYYY-MM-DDTHH:mm:ssZ").unwrap();
        assert_eq!(ts.zone().name(), "UTC");
        assert_eq!((ts.hour(), ts.minute()), (3, 30));
    }

    #[test]
    fn offsets_without_an_etc_zone_fall_back_to_utc() {
        let ts = parse("2020-06-01T09:00:00-13:00", "YYYY-MM-DDTHH:mm:ssZ").unwrap();
        assert_eq!(ts.zone().name(), "UTC");
        assert_eq!((ts.day(), ts.hour()), (1, 22));

        let ts = parse("2020-06-01T09:00:00+14:00", "YYYY-MM-DDTHH:mm:ssZ").unwrap();
        assert_eq!(ts.zone().name(), "Etc/GMT-14");
        assert_eq!(ts.hour(), 9);
        assert_eq!(ts.utc().to_rfc3339(), "2020-05-31T19:00:00+00:00");
    }

    #[test]
    fn parse_validates_ranges() {
        let zone = chicago();
        assert_eq!(
            parse_in("2020-13-01 00:00", "YYYY-MM-DD HH:mm", &zone),
            Err(Error::range("month", 13, 1, 12))
        );
        assert_eq!(
            parse_in("2020-01-01 25:00", "YYYY-MM-DD HH:mm", &zone),
            Err(Error::range("hour", 25, 0, 23))
        );
        assert!(matches!(
            parse_in("yesterday", "", &zone),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn parse_rejects_bad_patterns() {
        assert!(matches!(
            parse("2020-01-01", "YYYY-MM-DD"),
            Err(Error::InvalidPattern { .. })
        ));
        assert!(matches!(
            parse_in("2020-01", "YYYY-MM", &chicago()),
            Err(Error::InvalidPattern { .. })
        ));
        assert!(matches!(
            parse_in("2020-01-01 2020", "YYYY-MM-DD YYYY", &chicago()),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn format_then_parse_default() {
        let zone = resolve("Europe/Berlin").unwrap();
        let ts = TimestampWithZone::from_civil(2021, 10, 31, 2, 30, 0, 42, &zone).unwrap();
        let text = ts.format("");
        let back = parse_in(&text, "", &zone).unwrap();
        assert!(back.same_rendering(&ts));
    }
}
