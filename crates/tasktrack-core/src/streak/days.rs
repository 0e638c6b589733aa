//! Ordered set of streak weekdays (Monday = 0 .. Sunday = 6).
//!
//! Canonical text form is the members sorted ascending and comma-joined,
//! with the empty set written as `""`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Highest valid weekday index.
pub const MAX_WEEKDAY: u8 = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakDays(BTreeSet<u8>);

impl StreakDays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding only `day`.
    pub fn single(day: u8) -> Self {
        let mut days = Self::new();
        days.insert(day);
        days
    }

    /// Insert a weekday; indices above 6 are ignored.
    pub fn insert(&mut self, day: u8) -> bool {
        day <= MAX_WEEKDAY && self.0.insert(day)
    }

    pub fn contains(&self, day: u8) -> bool {
        self.0.contains(&day)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    pub fn is_superset(&self, other: &StreakDays) -> bool {
        self.0.is_superset(&other.0)
    }
}

impl fmt::Display for StreakDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for day in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{day}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for StreakDays {
    type Err = CoreError;

    /// Parses comma-separated indices, tolerating whitespace and empty
    /// segments. Non-numeric or out-of-range entries are an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut days = BTreeSet::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let day: u8 = part
                .parse()
                .map_err(|_| CoreError::MalformedStreakDays(s.to_string()))?;
            if day > MAX_WEEKDAY {
                return Err(CoreError::MalformedStreakDays(s.to_string()));
            }
            days.insert(day);
        }
        Ok(Self(days))
    }
}

impl FromIterator<u8> for StreakDays {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut days = Self::new();
        for day in iter {
            days.insert(day);
        }
        days
    }
}

impl Serialize for StreakDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StreakDays {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
