//! Salary sheets - salary rows read from CSV
//!
//! Columns: `year,month,currency,amount`. A header row is required.

use super::entry::SalaryEntry;
use super::window::ReportingWindow;
use crate::calendar::YearMonth;
use crate::currency::CurrencyCode;
use crate::error::{Result, SalaryError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct SheetRow {
    year: i32,
    month: u32,
    currency: String,
    amount: String,
}

/// How a sheet lines up with a reporting window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetCoverage {
    /// Window months without any entry
    pub missing: Vec<YearMonth>,
    /// Entry months outside the window
    pub outside: Vec<YearMonth>,
}

impl SheetCoverage {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.outside.is_empty()
    }
}

/// Salary entries collected for one declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalarySheet {
    entries: Vec<SalaryEntry>,
}

impl SalarySheet {
    pub fn new(entries: Vec<SalaryEntry>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for entry in &entries {
            let month = entry.year_month()?;
            if !seen.insert((month, entry.currency.clone())) {
                return Err(SalaryError::InvalidEntry(format!(
                    "duplicate {} entry for {}",
                    entry.currency, month
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Read a sheet from CSV
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for (idx, row) in rdr.deserialize::<SheetRow>().enumerate() {
            // Line 1 is the header.
            let line = idx + 2;
            let row = row?;
            let amount = Decimal::from_str(&row.amount).map_err(|e| {
                SalaryError::InvalidEntry(format!(
                    "line {}: invalid amount {:?}: {}",
                    line, row.amount, e
                ))
            })?;
            let currency = CurrencyCode::new(&row.currency)
                .map_err(|e| SalaryError::InvalidEntry(format!("line {}: {}", line, e)))?;
            let entry = SalaryEntry::new(row.year, row.month, amount, currency)
                .map_err(|e| SalaryError::InvalidEntry(format!("line {}: {}", line, e)))?;
            entries.push(entry);
        }

        log::debug!("Read {} salary rows", entries.len());
        Self::new(entries)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv(file)
    }

    /// One entry per window month with the same amount and currency
    pub fn uniform(
        window: &ReportingWindow,
        amount: Decimal,
        currency: CurrencyCode,
    ) -> Result<Self> {
        let entries = window
            .months()
            .into_iter()
            .map(|m| SalaryEntry::new(m.year, m.month, amount, currency.clone()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    pub fn entries(&self) -> &[SalaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compare the months covered by the sheet against a window
    pub fn check_against(&self, window: &ReportingWindow) -> SheetCoverage {
        let covered: BTreeSet<YearMonth> = self
            .entries
            .iter()
            .filter_map(|entry| entry.year_month().ok())
            .collect();

        let missing = window
            .months()
            .into_iter()
            .filter(|m| !covered.contains(m))
            .collect();

        let outside = covered
            .iter()
            .copied()
            .filter(|m| !window.contains(*m))
            .collect();

        SheetCoverage { missing, outside }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::income::window::plan_window;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_csv() {
        let data = "year,month,currency,amount\n2023,1,usd,5000.00\n2023,2,EUR, 4200.5\n";
        let sheet = SalarySheet::from_csv(data.as_bytes()).unwrap();

        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.entries()[0].currency.as_str(), "USD");
        assert_eq!(sheet.entries()[1].amount, dec!(4200.5));
    }

    #[test]
    fn test_from_csv_reports_line() {
        let data = "year,month,currency,amount\n2023,1,USD,10\n2023,13,USD,10\n";
        let err = SalarySheet::from_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));

        let data = "year,month,currency,amount\n2023,1,USD,ten\n";
        let err = SalarySheet::from_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_duplicate_month_currency_rejected() {
        let data = "year,month,currency,amount\n2023,1,USD,10\n2023,1,USD,20\n";
        assert!(SalarySheet::from_csv(data.as_bytes()).is_err());

        // Same month in two currencies is fine
        let data = "year,month,currency,amount\n2023,1,USD,10\n2023,1,EUR,20\n";
        assert_eq!(SalarySheet::from_csv(data.as_bytes()).unwrap().len(), 2);
    }

    #[test]
    fn test_check_against_window() {
        let window = plan_window(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        let usd = CurrencyCode::new("USD").unwrap();
        let mut sheet = SalarySheet::uniform(&window, dec!(1000), usd).unwrap();
        assert_eq!(sheet.len(), 18);
        assert!(sheet.check_against(&window).is_complete());

        sheet.entries.retain(|e| !(e.year == 2023 && e.month == 7));
        sheet.entries.push(
            SalaryEntry::new(2021, 3, dec!(1), CurrencyCode::new("USD").unwrap()).unwrap(),
        );

        let coverage = sheet.check_against(&window);
        assert_eq!(coverage.missing, vec![YearMonth::new(2023, 7).unwrap()]);
        assert_eq!(coverage.outside, vec![YearMonth::new(2021, 3).unwrap()]);
    }
}
