//! Rate lookup - currency code to CAD rate on a resolved date

use super::rate_table::RateTable;
use crate::currency::{pair_code_with_prefix, CurrencyCode, SERIES_PREFIX};
use crate::error::{Result, SalaryError};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Trait for reading CAD exchange rates
pub trait CadRateReader {
    /// CAD per one unit of `currency` on exactly `date`
    ///
    /// Returns the rate such that: cad_amount = amount * rate
    fn get_rate(&self, date: NaiveDate, currency: &CurrencyCode) -> Result<Decimal>;

    /// Check if rate is available
    fn has_rate(&self, date: NaiveDate, currency: &CurrencyCode) -> bool {
        self.get_rate(date, currency).is_ok()
    }
}

/// Maps currency codes onto the table's pair codes
///
/// # Example
/// ```
/// use salary_cad::currency::CurrencyCode;
/// use salary_cad::data::fx::{CadRateReader, RateLookup, RateTable};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let table = RateTable::new();
/// let lookup = RateLookup::new(&table);
/// let date = NaiveDate::from_ymd_opt(2023, 3, 31).unwrap();
///
/// // CAD never touches the table
/// assert_eq!(lookup.get_rate(date, &CurrencyCode::cad()).unwrap(), Decimal::ONE);
/// ```
#[derive(Debug, Clone)]
pub struct RateLookup<'a> {
    table: &'a RateTable,
    prefix: String,
}

impl<'a> RateLookup<'a> {
    /// Lookup using the feed's standard `FX` prefix
    pub fn new(table: &'a RateTable) -> Self {
        Self::with_prefix(table, SERIES_PREFIX)
    }

    /// Lookup using a custom series prefix
    pub fn with_prefix(table: &'a RateTable, prefix: &str) -> Self {
        Self {
            table,
            prefix: prefix.to_string(),
        }
    }

    /// Pair code this lookup queries for `currency`
    pub fn pair_code(&self, currency: &CurrencyCode) -> String {
        pair_code_with_prefix(&self.prefix, currency)
    }
}

impl CadRateReader for RateLookup<'_> {
    fn get_rate(&self, date: NaiveDate, currency: &CurrencyCode) -> Result<Decimal> {
        // The feed never publishes a CAD/CAD series.
        if currency.is_cad() {
            return Ok(Decimal::ONE);
        }

        let pair_code = self.pair_code(currency);
        self.table
            .lookup(date, &pair_code)
            .ok_or(SalaryError::RateUnavailable { pair_code, date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fx::RawRateRecord;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    #[test]
    fn test_pair_code_mapping() {
        let table = RateTable::from_records(vec![
            RawRateRecord::new(date(2023, 3, 31)).with_rate("FXUSDCAD", dec!(1.35)),
        ])
        .unwrap();
        let lookup = RateLookup::new(&table);

        assert_eq!(lookup.pair_code(&usd()), "FXUSDCAD");
        assert_eq!(lookup.get_rate(date(2023, 3, 31), &usd()).unwrap(), dec!(1.35));
        assert!(lookup.has_rate(date(2023, 3, 31), &usd()));
    }

    #[test]
    fn test_cad_is_one_on_any_date() {
        let table = RateTable::new();
        let lookup = RateLookup::new(&table);

        for d in [date(1999, 1, 1), date(2023, 3, 31), date(2030, 12, 25)] {
            assert_eq!(lookup.get_rate(d, &CurrencyCode::cad()).unwrap(), Decimal::ONE);
        }
    }

    #[test]
    fn test_missing_rate() {
        let table = RateTable::from_records(vec![
            RawRateRecord::new(date(2023, 3, 31)).with_rate("FXEURCAD", dec!(1.47)),
        ])
        .unwrap();
        let lookup = RateLookup::new(&table);

        let err = lookup.get_rate(date(2023, 3, 31), &usd()).unwrap_err();
        assert!(matches!(
            err,
            SalaryError::RateUnavailable { ref pair_code, .. } if pair_code == "FXUSDCAD"
        ));
        assert!(!lookup.has_rate(date(2023, 3, 30), &CurrencyCode::new("EUR").unwrap()));
    }

    #[test]
    fn test_unknown_currency_is_unavailable() {
        let table = RateTable::from_records(vec![
            RawRateRecord::new(date(2023, 3, 31)).with_rate("FXUSDCAD", dec!(1.35)),
        ])
        .unwrap();
        let lookup = RateLookup::new(&table);

        let err = lookup
            .get_rate(date(2023, 3, 31), &CurrencyCode::new("XYZ").unwrap())
            .unwrap_err();
        assert!(err.is_resolution_failure());
    }

    #[test]
    fn test_custom_prefix() {
        let table = RateTable::from_records(vec![
            RawRateRecord::new(date(2023, 3, 31)).with_rate("IEXEUSDCAD", dec!(1.35)),
        ])
        .unwrap();
        let lookup = RateLookup::with_prefix(&table, "IEXE");

        assert_eq!(lookup.get_rate(date(2023, 3, 31), &usd()).unwrap(), dec!(1.35));
    }
}
