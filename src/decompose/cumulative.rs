use super::DurationBreakdown;
use crate::types::Unit;

/// Successive division by fixed unit sizes, largest unit first. Units
/// without a fixed size are skipped.
pub(super) fn divide(out: &mut DurationBreakdown, units: &[Unit], magnitude: u128) {
    let mut rest = magnitude;
    for &unit in units {
        let Some(size) = unit.fixed_nanoseconds() else {
            continue;
        };
        let count = rest / size;
        rest %= size;
        out.set(unit, count, count * size);
    }
    debug_assert_eq!(rest, 0);
}
