//! WOCE-style quality flags.
//!
//! Flags carry two pieces of information: the numeric value written to
//! rebuild codes and output files, and a significance rank used for
//! escalation. The numeric values are part of the persisted format and
//! must never change.
//!
//! # Significance
//!
//! `NotSet < Good = AssumedGood < Questionable < Bad < Fatal`
//!
//! `Needed` and `Ignored` sit outside the escalation chain. They rank
//! below `NotSet`, so escalating a field never lands on them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InvalidFlagError;

/// Severity flag attached to a field or a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    /// No flag has been assigned.
    NotSet,
    /// The value passed every check.
    #[default]
    Good,
    /// The value was not checked but is treated as good.
    AssumedGood,
    /// The value may be wrong.
    Questionable,
    /// The value is wrong.
    Bad,
    /// The record cannot be used at all.
    Fatal,
    /// A flag still has to be assigned by a person.
    Needed,
    /// The value is excluded from processing.
    Ignored,
}

impl Flag {
    /// Every flag, in declaration order.
    pub const ALL: [Flag; 8] = [
        Flag::NotSet,
        Flag::Good,
        Flag::AssumedGood,
        Flag::Questionable,
        Flag::Bad,
        Flag::Fatal,
        Flag::Needed,
        Flag::Ignored,
    ];

    /// Returns the persisted numeric value.
    pub fn value(self) -> i32 {
        match self {
            Flag::Good => 2,
            Flag::AssumedGood => -2,
            Flag::Questionable => 3,
            Flag::Bad => 4,
            Flag::Fatal => 44,
            Flag::NotSet => -1000,
            Flag::Needed => -10,
            Flag::Ignored => -1002,
        }
    }

    /// Looks up a flag by its persisted numeric value.
    pub fn from_value(value: i32) -> Result<Self, InvalidFlagError> {
        Flag::ALL
            .into_iter()
            .find(|flag| flag.value() == value)
            .ok_or(InvalidFlagError { value })
    }

    /// Rank used for escalation. Higher is more significant.
    pub fn significance(self) -> u8 {
        match self {
            Flag::Ignored => 0,
            Flag::Needed => 1,
            Flag::NotSet => 2,
            Flag::Good | Flag::AssumedGood => 3,
            Flag::Questionable => 4,
            Flag::Bad => 5,
            Flag::Fatal => 6,
        }
    }

    /// Returns true if this flag is strictly more significant than `other`.
    pub fn more_significant_than(self, other: Flag) -> bool {
        self.significance() > other.significance()
    }

    /// Returns the more significant of two flags, preferring `self` on ties.
    pub fn max_significance(self, other: Flag) -> Flag {
        if other.more_significant_than(self) {
            other
        } else {
            self
        }
    }

    /// Good and Assumed Good both count as good.
    pub fn is_good(self) -> bool {
        matches!(self, Flag::Good | Flag::AssumedGood)
    }

    /// Returns true for the flags that trigger cascades.
    pub fn cascades(self) -> bool {
        matches!(self, Flag::Questionable | Flag::Bad)
    }

    /// Collapses the flag onto the WOCE 2/3/4 scale.
    ///
    /// Flags without a WOCE equivalent return `None`.
    pub fn woce_value(self) -> Option<i32> {
        match self {
            Flag::Good | Flag::AssumedGood => Some(2),
            Flag::Questionable => Some(3),
            Flag::Bad | Flag::Fatal => Some(4),
            Flag::NotSet | Flag::Needed | Flag::Ignored => None,
        }
    }

    /// Human-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            Flag::NotSet => "Not Set",
            Flag::Good => "Good",
            Flag::AssumedGood => "Assumed Good",
            Flag::Questionable => "Questionable",
            Flag::Bad => "Bad",
            Flag::Fatal => "Fatal",
            Flag::Needed => "Needed",
            Flag::Ignored => "Ignored",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Flag {
    type Err = String;

    /// Parses either a flag name (case-insensitive, spaces optional) or its
    /// numeric value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i32>() {
            return Flag::from_value(value).map_err(|e| e.to_string());
        }

        let normalized: String = trimmed
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_uppercase();

        match normalized.as_str() {
            "NOTSET" => Ok(Flag::NotSet),
            "GOOD" => Ok(Flag::Good),
            "ASSUMEDGOOD" => Ok(Flag::AssumedGood),
            "QUESTIONABLE" => Ok(Flag::Questionable),
            "BAD" => Ok(Flag::Bad),
            "FATAL" => Ok(Flag::Fatal),
            "NEEDED" => Ok(Flag::Needed),
            "IGNORED" => Ok(Flag::Ignored),
            _ => Err(format!("Unknown flag: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values_round_trip() {
        for flag in Flag::ALL {
            assert_eq!(Flag::from_value(flag.value()).unwrap(), flag);
        }
        assert!(Flag::from_value(5).is_err());
        assert!(Flag::from_value(0).is_err());
    }

    #[test]
    fn test_flag_from_str() {
        assert_eq!("bad".parse::<Flag>().unwrap(), Flag::Bad);
        assert_eq!("Assumed Good".parse::<Flag>().unwrap(), Flag::AssumedGood);
        assert_eq!("44".parse::<Flag>().unwrap(), Flag::Fatal);
        assert!("7".parse::<Flag>().is_err());
        assert!("terrible".parse::<Flag>().is_err());
    }

    #[test]
    fn test_good_and_assumed_good_are_equally_significant() {
        assert!(!Flag::Good.more_significant_than(Flag::AssumedGood));
        assert!(!Flag::AssumedGood.more_significant_than(Flag::Good));
        assert!(Flag::Good.is_good());
        assert!(Flag::AssumedGood.is_good());
    }

    #[test]
    fn test_woce_values() {
        assert_eq!(Flag::Fatal.woce_value(), Some(4));
        assert_eq!(Flag::AssumedGood.woce_value(), Some(2));
        assert_eq!(Flag::NotSet.woce_value(), None);
    }
}
