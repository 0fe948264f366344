use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One numbered day of the event program.
///
/// Day numbers are sparse: content can exist for day 1 and day 4 with
/// nothing in between, so a `DayNumber` carries no contiguity guarantee.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayNumber(u32);

impl DayNumber {
    /// Creates a new `DayNumber`
    #[must_use]
    pub fn new(day: u32) -> Self {
        Self(day)
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DayNumber({})", self.0)
    }
}

impl fmt::Display for DayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing a day number from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDayNumberError;

impl fmt::Display for ParseDayNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse day number from string")
    }
}

impl std::error::Error for ParseDayNumberError {}

impl FromStr for DayNumber {
    type Err = ParseDayNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(DayNumber::new)
            .map_err(|_| ParseDayNumberError)
    }
}
