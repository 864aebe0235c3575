//! Reporting window planning
//!
//! Entry before June means three calendar years of income must be declared
//! (the entry year included), otherwise two. Within the entry year the entry
//! month itself counts unless the person arrived on its first day.

use crate::calendar::YearMonth;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Last month of the entry year that triggers the longer lookback
const LONG_LOOKBACK_LAST_MONTH: u32 = 5;

/// One year of the window and the last month that must be reported in it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingYear {
    pub year: i32,
    /// 0 when the year contributes no months
    pub last_month: u32,
}

impl ReportingYear {
    /// Months of this year that need a salary entry
    pub fn months(&self) -> impl Iterator<Item = YearMonth> {
        let year = self.year;
        (1..=self.last_month).map(move |month| YearMonth { year, month })
    }

    pub fn is_empty(&self) -> bool {
        self.last_month == 0
    }
}

/// Years (descending) for which income must be declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingWindow {
    pub entry_date: NaiveDate,
    pub years: Vec<ReportingYear>,
}

impl ReportingWindow {
    /// Every (year, month) pair in the window, newest year first, months ascending
    pub fn months(&self) -> Vec<YearMonth> {
        self.years.iter().flat_map(ReportingYear::months).collect()
    }

    pub fn contains(&self, month: YearMonth) -> bool {
        self.years
            .iter()
            .any(|y| y.year == month.year && (1..=y.last_month).contains(&month.month))
    }

    /// Number of months requiring an entry
    pub fn month_count(&self) -> usize {
        self.years.iter().map(|y| y.last_month as usize).sum()
    }
}

/// Plans the reporting window from an entry date
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryWindowPlanner;

impl EntryWindowPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan_window(&self, entry_date: NaiveDate) -> ReportingWindow {
        let years_back = if entry_date.month() > LONG_LOOKBACK_LAST_MONTH {
            2
        } else {
            3
        };

        let entry_year_last_month = if entry_date.day() == 1 {
            entry_date.month() - 1
        } else {
            entry_date.month()
        };

        let years = (0..years_back)
            .map(|offset| {
                let year = entry_date.year() - offset;
                let last_month = if offset == 0 { entry_year_last_month } else { 12 };
                ReportingYear { year, last_month }
            })
            .collect();

        ReportingWindow { entry_date, years }
    }
}

/// Shorthand for [`EntryWindowPlanner::plan_window`]
pub fn plan_window(entry_date: NaiveDate) -> ReportingWindow {
    EntryWindowPlanner::new().plan_window(entry_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_summer_entry_two_years() {
        let window = plan_window(date(2024, 6, 15));

        assert_eq!(
            window.years,
            vec![
                ReportingYear { year: 2024, last_month: 6 },
                ReportingYear { year: 2023, last_month: 12 },
            ]
        );
        assert_eq!(window.month_count(), 18);
    }

    #[test]
    fn test_spring_entry_three_years() {
        let window = plan_window(date(2024, 5, 20));

        let years: Vec<i32> = window.years.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2024, 2023, 2022]);
        assert_eq!(window.years[0].last_month, 5);
        assert_eq!(window.month_count(), 5 + 12 + 12);
    }

    #[test]
    fn test_first_of_month_excludes_entry_month() {
        let window = plan_window(date(2024, 7, 1));
        assert_eq!(window.years[0], ReportingYear { year: 2024, last_month: 6 });
        assert!(!window.contains(YearMonth::new(2024, 7).unwrap()));
        assert!(window.contains(YearMonth::new(2024, 6).unwrap()));
    }

    #[test]
    fn test_june_first_is_still_short_lookback() {
        // Month 6 > 5 decides the lookback even though June itself is excluded.
        let window = plan_window(date(2024, 6, 1));
        assert_eq!(window.years.len(), 2);
        assert_eq!(window.years[0].last_month, 5);
    }

    #[test]
    fn test_january_first_entry_year_empty() {
        let window = plan_window(date(2024, 1, 1));

        assert_eq!(window.years.len(), 3);
        assert!(window.years[0].is_empty());
        assert_eq!(window.years[0].months().count(), 0);

        let months = window.months();
        assert_eq!(months.len(), 24);
        assert!(months.iter().all(|m| m.year == 2023 || m.year == 2022));
        assert_eq!(months[0], YearMonth::new(2023, 1).unwrap());
    }

    #[test]
    fn test_months_order() {
        let window = plan_window(date(2024, 8, 2));
        let months = window.months();

        assert_eq!(months.first(), Some(&YearMonth::new(2024, 1).unwrap()));
        assert_eq!(months[7], YearMonth::new(2024, 8).unwrap());
        assert_eq!(months[8], YearMonth::new(2023, 1).unwrap());
        assert_eq!(months.last(), Some(&YearMonth::new(2023, 12).unwrap()));
    }
}
