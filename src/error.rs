//! Error types for salary-cad

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for salary-cad
#[derive(Error, Debug)]
pub enum SalaryError {
    #[error("No trading date recorded for {year}-{month:02}{}", cutoff_suffix(.cutoff))]
    DateResolution {
        year: i32,
        month: u32,
        cutoff: Option<NaiveDate>,
    },

    #[error("No rate for {pair_code} on {date}")]
    RateUnavailable { pair_code: String, date: NaiveDate },

    #[error("Invalid salary entry: {0}")]
    InvalidEntry(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Duplicate observation date: {0}")]
    DuplicateDate(NaiveDate),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

fn cutoff_suffix(cutoff: &Option<NaiveDate>) -> String {
    match cutoff {
        Some(date) => format!(" before {}", date),
        None => String::new(),
    }
}

impl SalaryError {
    /// True for the two per-entry failures the engine reports as unresolved
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            SalaryError::DateResolution { .. } | SalaryError::RateUnavailable { .. }
        )
    }
}

/// Result type alias for salary-cad operations
pub type Result<T> = std::result::Result<T, SalaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_resolution_message() {
        let err = SalaryError::DateResolution {
            year: 2023,
            month: 4,
            cutoff: None,
        };
        assert_eq!(err.to_string(), "No trading date recorded for 2023-04");

        let err = SalaryError::DateResolution {
            year: 2024,
            month: 6,
            cutoff: NaiveDate::from_ymd_opt(2024, 6, 3),
        };
        assert_eq!(
            err.to_string(),
            "No trading date recorded for 2024-06 before 2024-06-03"
        );
    }

    #[test]
    fn test_rate_unavailable_message() {
        let err = SalaryError::RateUnavailable {
            pair_code: "FXUSDCAD".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("FXUSDCAD"));
        assert!(msg.contains("2023-03-31"));
        assert!(err.is_resolution_failure());
    }

    #[test]
    fn test_other_errors_are_not_resolution_failures() {
        assert!(!SalaryError::InvalidEntry("month 13".to_string()).is_resolution_failure());
        assert!(!SalaryError::DataError("HTTP 500".to_string()).is_resolution_failure());
    }
}
