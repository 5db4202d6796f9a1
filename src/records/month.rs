//! Calendar month used to window personal-finance reads.
//!
//! Wire format is the `YYYY-MM` string the `budgets.month` column stores.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

#[derive(Debug, Error)]
#[error("invalid month (expected YYYY-MM): {0}")]
pub struct InvalidMonth(pub String);

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self, InvalidMonth> {
        if !(1..=12).contains(&month) {
            return Err(InvalidMonth(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// The month containing today, in UTC.
    pub fn current() -> Self {
        let today = Utc::now().date_naive();
        Self { year: today.year(), month: today.month() }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // month is validated to 1..=12 at construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    /// Human label, e.g. "January 2024".
    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    /// The last `count` months ending with this one, newest first.
    pub fn recent(&self, count: usize) -> Vec<Month> {
        let mut out = Vec::with_capacity(count);
        let mut cursor = *self;
        for _ in 0..count {
            out.push(cursor);
            cursor = cursor.previous();
        }
        out
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = InvalidMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| InvalidMonth(s.to_string()))?;
        let year: i32 = year.parse().map_err(|_| InvalidMonth(s.to_string()))?;
        let month: u32 = month.parse().map_err(|_| InvalidMonth(s.to_string()))?;
        Month::new(year, month).map_err(|_| InvalidMonth(s.to_string()))
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let month: Month = "2024-01".parse().unwrap();
        assert_eq!(month.to_string(), "2024-01");
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!("2024-13".parse::<Month>().is_err());
        assert!("2024-00".parse::<Month>().is_err());
        assert!("2024".parse::<Month>().is_err());
    }

    #[test]
    fn next_rolls_over_december() {
        let december: Month = "2024-12".parse().unwrap();
        assert_eq!(december.next().to_string(), "2025-01");

        let june: Month = "2024-06".parse().unwrap();
        assert_eq!(june.next().to_string(), "2024-07");
    }

    #[test]
    fn recent_walks_backwards_across_year_boundary() {
        let february: Month = "2024-02".parse().unwrap();
        let months = february.recent(4);
        let labels: Vec<String> = months.iter().map(Month::to_string).collect();
        assert_eq!(labels, ["2024-02", "2024-01", "2023-12", "2023-11"]);
    }

    #[test]
    fn serde_uses_wire_string() {
        let month: Month = "2024-03".parse().unwrap();
        let json = serde_json::to_string(&month).unwrap();
        assert_eq!(json, "\"2024-03\"");
        let back: Month = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month);
    }
}
