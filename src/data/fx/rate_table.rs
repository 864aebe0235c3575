//! In-memory table of daily CAD exchange rates
//!
//! Stores observations as `BTreeMap<date, BTreeMap<pair code, rate>>` so the
//! resolver can range-scan a month and take the latest recorded date.

use crate::calendar::YearMonth;
use crate::currency::{currency_from_pair_code_with_prefix, CurrencyCode, SERIES_PREFIX};
use crate::data::frequency::DataFrequency;
use crate::error::{Result, SalaryError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One observation date with the rates recorded on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRateRecord {
    pub date: NaiveDate,
    /// Pair code (e.g. `FXUSDCAD`) -> CAD per unit of foreign currency
    pub rates: BTreeMap<String, Decimal>,
}

impl RawRateRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            rates: BTreeMap::new(),
        }
    }

    /// Builder-style helper used by loaders and fixtures
    pub fn with_rate(mut self, pair_code: impl Into<String>, rate: Decimal) -> Self {
        self.rates.insert(pair_code.into(), rate);
        self
    }
}

/// Date-indexed exchange-rate table for one session
///
/// Built once from raw records and read-only afterwards.
///
/// # Example
/// ```
/// use salary_cad::data::fx::{RateTable, RawRateRecord};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2023, 3, 31).unwrap();
/// let record = RawRateRecord::new(date).with_rate("FXUSDCAD", Decimal::new(135, 2));
/// let table = RateTable::from_records(vec![record]).unwrap();
///
/// assert_eq!(table.lookup(date, "FXUSDCAD"), Some(Decimal::new(135, 2)));
/// assert_eq!(table.lookup(date, "FXEURCAD"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    observations: BTreeMap<NaiveDate, BTreeMap<String, Decimal>>,
}

impl RateTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from raw records in any order
    ///
    /// Rejects duplicate dates and non-positive rates. Every record must carry
    /// daily observations.
    pub fn from_records(records: impl IntoIterator<Item = RawRateRecord>) -> Result<Self> {
        let mut observations = BTreeMap::new();

        for record in records {
            for (pair_code, rate) in &record.rates {
                if *rate <= Decimal::ZERO {
                    return Err(SalaryError::InvalidData(format!(
                        "FX rate must be positive, got {} for {} on {}",
                        rate, pair_code, record.date
                    )));
                }
                if let Some(freq) = DataFrequency::of_series(pair_code) {
                    if freq != DataFrequency::Daily {
                        return Err(SalaryError::InvalidData(format!(
                            "Series {} is {}, only daily series are accepted",
                            pair_code, freq
                        )));
                    }
                }
            }

            if observations.insert(record.date, record.rates).is_some() {
                return Err(SalaryError::DuplicateDate(record.date));
            }
        }

        log::debug!("Built rate table with {} observation dates", observations.len());
        Ok(Self { observations })
    }

    /// Frequency of every observation in the table
    pub fn frequency(&self) -> DataFrequency {
        DataFrequency::Daily
    }

    /// Exact-date lookup; no fallback to neighbouring dates
    pub fn lookup(&self, date: NaiveDate, pair_code: &str) -> Option<Decimal> {
        self.observations.get(&date)?.get(pair_code).copied()
    }

    /// All recorded dates, ascending
    pub fn dates(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        self.observations.keys().copied()
    }

    /// Recorded dates inside one calendar month, ascending
    pub fn dates_in_month(
        &self,
        month: YearMonth,
    ) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        self.dates_between(month.first_day(), month.end_exclusive())
    }

    /// Recorded dates in `[start, end)`, ascending
    pub fn dates_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        // An inverted range would panic inside BTreeMap::range.
        let end = end.max(start);
        self.observations.range(start..end).map(|(date, _)| *date)
    }

    /// Every pair code seen on any date
    pub fn pair_codes(&self) -> BTreeSet<&str> {
        self.observations
            .values()
            .flat_map(|rates| rates.keys().map(String::as_str))
            .collect()
    }

    /// Foreign currencies with a `FX???CAD` series in the table
    pub fn currencies(&self) -> BTreeSet<CurrencyCode> {
        self.currencies_with_prefix(SERIES_PREFIX)
    }

    /// Foreign currencies with a `<prefix>???CAD` series in the table
    pub fn currencies_with_prefix(&self, prefix: &str) -> BTreeSet<CurrencyCode> {
        self.pair_codes()
            .into_iter()
            .filter_map(|code| currency_from_pair_code_with_prefix(prefix, code))
            .collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.keys().next_back().copied()
    }

    /// Number of observation dates
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Total number of (date, pair) rate entries
    pub fn num_entries(&self) -> usize {
        self.observations.values().map(|rates| rates.len()).sum()
    }
}
