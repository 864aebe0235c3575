//! Salary entries

use crate::calendar::YearMonth;
use crate::currency::CurrencyCode;
use crate::error::{Result, SalaryError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One month of salary in one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSalaryEntry")]
pub struct SalaryEntry {
    pub year: i32,
    pub month: u32,
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

#[derive(Deserialize)]
struct RawSalaryEntry {
    year: i32,
    month: u32,
    amount: Decimal,
    currency: CurrencyCode,
}

impl TryFrom<RawSalaryEntry> for SalaryEntry {
    type Error = SalaryError;

    fn try_from(raw: RawSalaryEntry) -> Result<Self> {
        Self::new(raw.year, raw.month, raw.amount, raw.currency)
    }
}

impl SalaryEntry {
    /// Create an entry, rejecting months outside 1-12 and negative amounts
    pub fn new(year: i32, month: u32, amount: Decimal, currency: CurrencyCode) -> Result<Self> {
        YearMonth::new(year, month)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(SalaryError::InvalidEntry(format!(
                "amount must not be negative, got {} for {}-{:02}",
                amount, year, month
            )));
        }
        Ok(Self {
            year,
            month,
            amount,
            currency,
        })
    }

    /// Calendar month of the entry
    ///
    /// Fails for a month outside 1-12, which only an entry assembled field by
    /// field can carry.
    pub fn year_month(&self) -> Result<YearMonth> {
        YearMonth::new(self.year, self.month)
    }
}
