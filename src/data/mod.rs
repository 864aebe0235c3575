//! Exchange-rate data
//!
//! `fx` holds the in-memory rate table and the resolution logic built on it;
//! `valet` turns Bank of Canada payloads into raw records for that table.

pub mod frequency;
pub mod fx;
pub mod valet;

pub use frequency::DataFrequency;
pub use fx::{CadRateReader, MarketDateResolver, RateLookup, RateTable, RawRateRecord};
