use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::ParseError;

/// Elapsed time of a backup, displayed as `<minutes>m<seconds>s`.
///
/// `seconds` is always below 60 and the total in seconds always fits a `u64`.
#[derive(Hash, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProcessingTime {
    minutes: u64,
    seconds: u64,
}

impl ProcessingTime {
    /// Create a processing time, carrying whole minutes out of `seconds`.
    ///
    /// Returns `None` when the total in seconds overflows.
    pub fn new(minutes: u64, seconds: u64) -> Option<Self> {
        let total = minutes.checked_mul(60)?.checked_add(seconds)?;

        Some(Self {
            minutes: total / 60,
            seconds: total % 60,
        })
    }

    /// Parse `MM:SS` where `SS` is hundredths of a minute, rounding to whole seconds.
    pub fn from_fractional_minutes(time: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidDuration(time.to_string());

        let (minutes, fraction) = time.split_once(':').ok_or_else(invalid)?;
        let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
        let fraction: u64 = fraction.parse().map_err(|_| invalid())?;

        let seconds = fraction
            .checked_mul(60)
            .and_then(|value| value.checked_add(50))
            .ok_or_else(invalid)?
            / 100;

        Self::new(minutes, seconds).ok_or_else(invalid)
    }

    /// Parse a clock reading, `M:SS` or `H:MM:SS`.
    pub fn from_clock(time: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidDuration(time.to_string());

        let parts = time
            .split(':')
            .map(|part| part.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        let seconds = match parts.as_slice() {
            [minutes, seconds] => minutes.checked_mul(60).and_then(|m| m.checked_add(*seconds)),
            [hours, minutes, seconds] => hours
                .checked_mul(60)
                .and_then(|h| h.checked_add(*minutes))
                .and_then(|m| m.checked_mul(60))
                .and_then(|m| m.checked_add(*seconds)),
            _ => None,
        }
        .ok_or_else(invalid)?;

        Self::new(0, seconds).ok_or_else(invalid)
    }

    /// Whole minutes.
    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    /// Remaining seconds.
    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Total time in seconds.
    pub fn as_seconds(&self) -> u64 {
        self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for ProcessingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m{}s", self.minutes, self.seconds)
    }
}

impl FromStr for ProcessingTime {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidDuration(s.to_string());

        let (minutes, seconds) = s
            .strip_suffix('s')
            .and_then(|time| time.split_once('m'))
            .ok_or_else(invalid)?;

        let minutes = minutes.parse().map_err(|_| invalid())?;
        let seconds = seconds.parse().map_err(|_| invalid())?;

        Self::new(minutes, seconds).ok_or_else(invalid)
    }
}

impl TryFrom<String> for ProcessingTime {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl From<ProcessingTime> for String {
    fn from(value: ProcessingTime) -> Self {
        value.to_string()
    }
}
