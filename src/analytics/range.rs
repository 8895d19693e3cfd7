//! Analytics day-range selector: the last 7, 14 or 30 days.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the supported analytics windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum DayRange {
    #[default]
    Week,
    Fortnight,
    Month,
}

impl DayRange {
    pub const ALL: [DayRange; 3] = [DayRange::Week, DayRange::Fortnight, DayRange::Month];

    /// Map a day count onto a supported range, `None` for anything else.
    pub fn from_days(days: u32) -> Option<Self> {
        match days {
            7 => Some(Self::Week),
            14 => Some(Self::Fortnight),
            30 => Some(Self::Month),
            _ => None,
        }
    }

    pub fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Fortnight => 14,
            Self::Month => 30,
        }
    }
}

impl From<DayRange> for u32 {
    fn from(range: DayRange) -> Self {
        range.days()
    }
}

impl TryFrom<u32> for DayRange {
    type Error = String;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        Self::from_days(days).ok_or_else(|| format!("unsupported day range {days} (use 7, 14 or 30)"))
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_days_accepts_only_supported_values() {
        assert_eq!(DayRange::from_days(7), Some(DayRange::Week));
        assert_eq!(DayRange::from_days(14), Some(DayRange::Fortnight));
        assert_eq!(DayRange::from_days(30), Some(DayRange::Month));
        assert_eq!(DayRange::from_days(0), None);
        assert_eq!(DayRange::from_days(31), None);
    }

    #[test]
    fn serializes_as_day_count() {
        assert_eq!(serde_json::to_string(&DayRange::Fortnight).unwrap(), "14");
        let back: DayRange = serde_json::from_str("30").unwrap();
        assert_eq!(back, DayRange::Month);
        assert!(serde_json::from_str::<DayRange>("5").is_err());
    }
}
