use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Deserialize)]
struct RawTimeSignature {
    numerator: u8,
    denominator: u8,
}

/// Meter as (numerator, denominator). Denominator must be a power of two.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "RawTimeSignature")]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    pub fn new(numerator: u8, denominator: u8) -> Result<Self, DomainError> {
        if numerator == 0 {
            return Err(DomainError::InvalidTimeSignature(format!(
                "{numerator}/{denominator}: numerator must be positive"
            )));
        }
        if !denominator.is_power_of_two() {
            return Err(DomainError::InvalidTimeSignature(format!(
                "{numerator}/{denominator}: denominator must be power of two"
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub const fn common() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }

    /// Length of one full measure in quarter notes.
    pub fn quarters_per_measure(&self) -> f64 {
        self.numerator as f64 * 4.0 / self.denominator as f64
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::common()
    }
}

impl TryFrom<RawTimeSignature> for TimeSignature {
    type Error = DomainError;

    fn try_from(raw: RawTimeSignature) -> Result<Self, Self::Error> {
        Self::new(raw.numerator, raw.denominator)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for TimeSignature {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (num, den) = s
            .split_once('/')
            .ok_or_else(|| DomainError::InvalidTimeSignature(s.to_string()))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u8>()
                .map_err(|_| DomainError::InvalidTimeSignature(s.to_string()))
        };
        Self::new(parse(num)?, parse(den)?)
    }
}

/// Serializes a [`TimeSignature`] as its `"N/D"` string form.
pub mod as_fraction {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::TimeSignature;

    pub fn serialize<S: Serializer>(value: &TimeSignature, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeSignature, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
