//! Observation frequency of Valet exchange-rate series

use serde::{Deserialize, Serialize};
use std::fmt;

/// Frequency of a Valet FX series
///
/// The Bank of Canada encodes the frequency in the series prefix:
/// `FXUSDCAD` is daily, `FXMUSDCAD` the monthly average and `FXAUSDCAD`
/// the annual average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFrequency {
    /// One observation per trading day
    Daily,
    /// Monthly average
    Monthly,
    /// Annual average
    Annual,
}

impl DataFrequency {
    /// Infer the frequency of a `FX...CAD` series code
    pub fn of_series(code: &str) -> Option<Self> {
        // Daily codes are FX + 3 letters + CAD (8 chars); the averaged series
        // carry one extra letter after FX.
        if !code.starts_with("FX") || !code.ends_with("CAD") {
            return None;
        }
        match code.len() {
            8 => Some(DataFrequency::Daily),
            9 if code.starts_with("FXM") => Some(DataFrequency::Monthly),
            9 if code.starts_with("FXA") => Some(DataFrequency::Annual),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFrequency::Daily => "daily",
            DataFrequency::Monthly => "monthly",
            DataFrequency::Annual => "annual",
        }
    }
}

impl fmt::Display for DataFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
