//! Calendar months
//!
//! Salary is declared per calendar month, and every rate resolution is scoped
//! to one month. `YearMonth` carries that pair and knows its date bounds.

use crate::error::{Result, SalaryError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month of a specific year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawYearMonth")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

#[derive(Deserialize)]
struct RawYearMonth {
    year: i32,
    month: u32,
}

impl TryFrom<RawYearMonth> for YearMonth {
    type Error = SalaryError;

    fn try_from(raw: RawYearMonth) -> Result<Self> {
        Self::new(raw.year, raw.month)
    }
}

impl YearMonth {
    /// Create a year/month pair, rejecting months outside 1-12
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(SalaryError::InvalidEntry(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        // Also rejects years chrono cannot represent.
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            SalaryError::InvalidEntry(format!("unsupported year: {}", year))
        })?;
        Ok(Self { year, month })
    }

    /// Month containing the given date
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Following calendar month
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First day after the month, the exclusive upper bound of its dates
    pub fn end_exclusive(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.next().year, self.next().month, 1)
            .unwrap_or(NaiveDate::MAX)
    }

    /// Last calendar day of the month
    pub fn last_day(&self) -> NaiveDate {
        self.end_exclusive().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    /// Check whether a date falls in this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}
