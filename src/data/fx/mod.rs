//! Foreign Exchange (FX) rate system
//!
//! Resolves the CAD exchange rate that applies to a salary month.
//!
//! # Components
//!
//! - **rate_table**: In-memory, date-indexed table of daily rates
//! - **resolver**: Latest recorded trading date within a month
//! - **lookup**: Currency code to CAD rate on a resolved date
//!
//! # Example
//!
//! ```rust
//! use salary_cad::currency::CurrencyCode;
//! use salary_cad::data::fx::{
//!     CadRateReader, MarketDateResolver, RateLookup, RateTable, RawRateRecord,
//! };
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let friday = NaiveDate::from_ymd_opt(2023, 3, 31).unwrap();
//! let table = RateTable::from_records(vec![
//!     RawRateRecord::new(friday).with_rate("FXUSDCAD", Decimal::new(135, 2)),
//! ])
//! .unwrap();
//!
//! let date = MarketDateResolver::new(&table).resolve_market_date(2023, 3, None).unwrap();
//! assert_eq!(date, friday);
//!
//! let usd = CurrencyCode::new("USD").unwrap();
//! let rate = RateLookup::new(&table).get_rate(date, &usd).unwrap();
//! assert_eq!(rate, Decimal::new(135, 2));
//! ```

pub mod lookup;
pub mod rate_table;
pub mod resolver;

pub use lookup::{CadRateReader, RateLookup};
pub use rate_table::{RateTable, RawRateRecord};
pub use resolver::MarketDateResolver;
