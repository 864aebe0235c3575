//! # salary-cad
//!
//! Converts prior-year foreign salary into Canadian dollars for a
//! newcomer's tax-residency declaration.
//!
//! Daily Bank of Canada exchange rates are loaded into a [`RateTable`]; each
//! monthly salary entry is converted at the rate of the latest trading day of
//! its month (bounded by the entry date in the entry month), and the results
//! are totalled per year.
//!
//! ## Example
//!
//! ```rust
//! use salary_cad::prelude::*;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let march_31 = NaiveDate::from_ymd_opt(2023, 3, 31).unwrap();
//! let table = RateTable::from_records(vec![
//!     RawRateRecord::new(march_31).with_rate("FXUSDCAD", Decimal::new(135, 2)),
//! ])
//! .unwrap();
//!
//! let usd = CurrencyCode::new("USD").unwrap();
//! let entry = SalaryEntry::new(2023, 3, Decimal::from(100), usd).unwrap();
//!
//! let report = ConversionEngine::new(&table).convert(&[entry], None);
//! assert_eq!(report.grand_total_cad, Decimal::new(13500, 2));
//! ```
//!
//! [`RateTable`]: data::fx::RateTable

pub mod calendar;
pub mod currency;
pub mod data;
pub mod error;
pub mod income;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::calendar::YearMonth;
    pub use crate::currency::CurrencyCode;
    pub use crate::data::fx::{
        CadRateReader, MarketDateResolver, RateLookup, RateTable, RawRateRecord,
    };
    pub use crate::error::{Result, SalaryError};
    pub use crate::income::{
        plan_window, ConversionEngine, ConversionReport, ConversionStatus, EntryWindowPlanner,
        ReportingWindow, ResolvedConversion, SalaryEntry, SalarySheet, YearlyAggregate,
    };
}
