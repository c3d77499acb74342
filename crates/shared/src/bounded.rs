//! Range-checked integers for timeouts and progress settings.

use std::fmt;
use std::time::Duration;

/// A value fell outside an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange {
    /// Rejected value.
    pub value: u64,
    /// Inclusive minimum.
    pub min: u64,
    /// Inclusive maximum.
    pub max: u64,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} is not within {}..={}", self.value, self.min, self.max)
    }
}

impl std::error::Error for OutOfRange {}

/// `u64` known to lie in `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundedU64<const MIN: u64, const MAX: u64>(u64);

impl<const MIN: u64, const MAX: u64> BoundedU64<MIN, MAX> {
    /// Check `value` against the range.
    pub const fn try_new(value: u64) -> Result<Self, OutOfRange> {
        if value < MIN || value > MAX {
            return Err(OutOfRange {
                value,
                min: MIN,
                max: MAX,
            });
        }
        Ok(Self(value))
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Interpret the value as milliseconds.
    pub const fn as_millis(self) -> Duration {
        Duration::from_millis(self.0)
    }
}
