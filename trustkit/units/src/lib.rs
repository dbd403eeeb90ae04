//! Human readable byte counts, in binary units.

use std::fmt;

/// Binary units, each 1024 times the previous one.
pub const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

const STEP: f64 = 1024.0;

/// Scales `bytes` down to the largest unit in which the value is at least 1.
///
/// Returns the unit and the scaled value, e.g. `("MiB", 1.5)` for `1_572_864`.
pub fn humanize_bytes(bytes: u64) -> (&'static str, f64) {
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= STEP && unit < UNITS.len() - 1 {
        value /= STEP;
        unit += 1;
    }

    (UNITS[unit], value)
}

/// Formats `bytes` with [`humanize_bytes`], e.g. `1.5 MiB`.
///
/// Whole values are printed without decimals, others with up to two.
pub fn format_bytes(bytes: u64) -> String {
    ByteSize(bytes).to_string()
}

/// [`fmt::Display`] adapter for [`format_bytes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteSize(pub u64);

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (unit, value) = humanize_bytes(self.0);

        if value.fract() == 0.0 {
            write!(f, "{value} {unit}")
        } else {
            let rounded = format!("{value:.2}");
            let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
            write!(f, "{trimmed} {unit}")
        }
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}
