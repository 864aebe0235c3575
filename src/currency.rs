//! Currency codes and Valet pair codes

use crate::error::{Result, SalaryError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix of every Valet foreign-exchange series
pub const SERIES_PREFIX: &str = "FX";

/// Quote currency of every series this crate reads
pub const HOME_CURRENCY: &str = "CAD";

/// ISO 4217 style three-letter currency code
///
/// Codes are stored upper-case. Any three ASCII letters are accepted; whether
/// the feed actually publishes a series for the code is decided at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse and normalise a currency code
    pub fn new(code: &str) -> Result<Self> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SalaryError::InvalidData(format!(
                "Currency code must be three letters, got: {:?}",
                code
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Canadian dollar
    pub fn cad() -> Self {
        Self(HOME_CURRENCY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_cad(&self) -> bool {
        self.0 == HOME_CURRENCY
    }

    /// Valet series code quoting this currency in CAD, e.g. `USD` -> `FXUSDCAD`
    pub fn pair_code(&self) -> String {
        pair_code_with_prefix(SERIES_PREFIX, self)
    }
}

/// Build a pair code with a custom series prefix
pub fn pair_code_with_prefix(prefix: &str, currency: &CurrencyCode) -> String {
    format!("{}{}{}", prefix, currency.as_str(), HOME_CURRENCY)
}

/// Extract the foreign currency from a `FX???CAD` series code
///
/// Returns `None` for anything that does not follow the convention, such as
/// the feed's inverse or index series.
pub fn currency_from_pair_code(pair_code: &str) -> Option<CurrencyCode> {
    currency_from_pair_code_with_prefix(SERIES_PREFIX, pair_code)
}

/// Same as [`currency_from_pair_code`] for a custom series prefix
pub fn currency_from_pair_code_with_prefix(
    prefix: &str,
    pair_code: &str,
) -> Option<CurrencyCode> {
    let rest = pair_code.strip_prefix(prefix)?;
    let code = rest.strip_suffix(HOME_CURRENCY)?;
    CurrencyCode::new(code).ok()
}

impl FromStr for CurrencyCode {
    type Err = SalaryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = SalaryError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&self.0)
    }
}
