//! Military time zones: single letters `A`..`Z` and their phonetic names.
//!
//! `J` (Juliet) is the observer's local time and has no fixed offset.

/// (letter, name, hours east of UTC); `J` is absent.
const MILITARY_ZONES: [(char, &str, i8); 25] = [
    ('A', "Alpha", 1),
    ('B', "Bravo", 2),
    ('C', "Charlie", 3),
    ('D', "Delta", 4),
    ('E', "Echo", 5),
    ('F', "Foxtrot", 6),
    ('G', "Golf", 7),
    ('H', "Hotel", 8),
    ('I', "India", 9),
    ('K', "Kilo", 10),
    ('L', "Lima", 11),
    ('M', "Mike", 12),
    ('N', "November", -1),
    ('O', "Oscar", -2),
    ('P', "Papa", -3),
    ('Q', "Quebec", -4),
    ('R', "Romeo", -5),
    ('S', "Sierra", -6),
    ('T', "Tango", -7),
    ('U', "Uniform", -8),
    ('V', "Victor", -9),
    ('W', "Whiskey", -10),
    ('X', "X-ray", -11),
    ('Y', "Yankee", -12),
    ('Z', "Zulu", 0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Military {
    Fixed { name: &'static str, hours: i8 },
    /// Juliet
    Local,
}

pub(crate) fn lookup(identifier: &str) -> Option<Military> {
    let id = identifier.trim();
    if id.len() == 1 {
        let letter = id.chars().next()?.to_ascii_uppercase();
        if letter == 'J' {
            return Some(Military::Local);
        }
        return MILITARY_ZONES
            .iter()
            .find(|(l, _, _)| *l == letter)
            .map(|&(_, name, hours)| Military::Fixed { name, hours });
    }
    if id.eq_ignore_ascii_case("Juliet") {
        return Some(Military::Local);
    }
    MILITARY_ZONES
        .iter()
        .find(|(_, name, _)| name.eq_ignore_ascii_case(id))
        .map(|&(_, name, hours)| Military::Fixed { name, hours })
}

/// The `Etc/GMT` zone with the given offset. Note the inverted POSIX sign:
/// `Etc/GMT-1` is one hour east of UTC.
pub(crate) fn etc_zone_name(hours: i8) -> String {
    if hours == 0 {
        "Etc/UTC".to_string()
    } else {
        format!("Etc/GMT{:+}", -hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_names() {
        assert_eq!(
            lookup("z"),
            Some(Military::Fixed {
                name: "Zulu",
                hours: 0
            })
        );
        assert_eq!(
            lookup("Alpha"),
            Some(Military::Fixed {
                name: "Alpha",
                hours: 1
            })
        );
        assert_eq!(
            lookup("Y"),
            Some(Military::Fixed {
                name: "Yankee",
                hours: -12
            })
        );
        assert_eq!(lookup("J"), Some(Military::Local));
        assert_eq!(lookup("juliet"), Some(Military::Local));
        assert_eq!(lookup("Zuluu"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn etc_names_invert_sign() {
        assert_eq!(etc_zone_name(1), "Etc/GMT-1");
        assert_eq!(etc_zone_name(-12), "Etc/GMT+12");
        assert_eq!(etc_zone_name(0), "Etc/UTC");
    }
}
