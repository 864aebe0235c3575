//! Market date resolution
//!
//! Markets close on weekends and holidays, so the last calendar day of a month
//! often has no observation. The resolver lands on the latest date the feed
//! actually recorded in the month, optionally bounded by a cutoff.

use super::rate_table::RateTable;
use crate::calendar::YearMonth;
use crate::error::{Result, SalaryError};
use chrono::NaiveDate;

/// Finds the latest recorded trading date within a month
#[derive(Debug, Clone, Copy)]
pub struct MarketDateResolver<'a> {
    table: &'a RateTable,
}

impl<'a> MarketDateResolver<'a> {
    pub fn new(table: &'a RateTable) -> Self {
        Self { table }
    }

    /// Latest recorded date in `year`/`month`, strictly before `cutoff` if given
    ///
    /// Never falls through to a neighbouring month: an empty month is a
    /// `DateResolution` error.
    pub fn resolve_market_date(
        &self,
        year: i32,
        month: u32,
        cutoff: Option<NaiveDate>,
    ) -> Result<NaiveDate> {
        let ym = YearMonth::new(year, month)?;
        self.resolve(ym, cutoff)
    }

    /// Same as [`resolve_market_date`](Self::resolve_market_date) for a `YearMonth`
    ///
    /// The month is checked again since its fields are public; an out-of-range
    /// month would otherwise span the whole table.
    pub fn resolve(&self, month: YearMonth, cutoff: Option<NaiveDate>) -> Result<NaiveDate> {
        let month = YearMonth::new(month.year, month.month)?;
        let end = match cutoff {
            Some(cutoff) => cutoff.min(month.end_exclusive()),
            None => month.end_exclusive(),
        };

        self.table
            .dates_between(month.first_day(), end)
            .next_back()
            .ok_or(SalaryError::DateResolution {
                year: month.year,
                month: month.month,
                cutoff,
            })
    }
}
