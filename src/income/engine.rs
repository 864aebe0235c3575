//! Conversion engine
//!
//! Resolves each salary entry to a trading date and a CAD rate, converts the
//! amount and aggregates the results by year.

use super::entry::SalaryEntry;
use super::report::{ConversionReport, ResolvedConversion, UnresolvedReason};
use crate::calendar::YearMonth;
use crate::data::fx::{CadRateReader, MarketDateResolver, RateLookup, RateTable};
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of converted CAD amounts
pub const CAD_DECIMALS: u32 = 2;

/// Round a CAD amount half-up to cents
pub fn round_cad(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CAD_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts salary entries to CAD against one rate table
pub struct ConversionEngine<'a, R: CadRateReader = RateLookup<'a>> {
    resolver: MarketDateResolver<'a>,
    reader: R,
}

impl<'a> ConversionEngine<'a> {
    /// Engine over a table using the standard `FX???CAD` series
    pub fn new(table: &'a RateTable) -> Self {
        Self::with_reader(table, RateLookup::new(table))
    }
}

impl<'a, R: CadRateReader> ConversionEngine<'a, R> {
    /// Engine resolving dates against `table` and rates through `reader`
    pub fn with_reader(table: &'a RateTable, reader: R) -> Self {
        Self {
            resolver: MarketDateResolver::new(table),
            reader,
        }
    }

    /// Convert every entry and aggregate by year
    ///
    /// `cutoff` (the entry date) only constrains entries in the cutoff's own
    /// month. Unresolved entries stay in the output with their reason and are
    /// left out of every total.
    pub fn convert(
        &self,
        entries: &[SalaryEntry],
        cutoff: Option<NaiveDate>,
    ) -> ConversionReport {
        log::info!("Converting {} salary entries to CAD", entries.len());

        let conversions: Vec<ResolvedConversion> = entries
            .iter()
            .map(|entry| self.convert_entry(entry, cutoff))
            .collect();

        let report = ConversionReport::new(conversions);
        let unresolved = report.unresolved().count();
        if unresolved > 0 {
            log::warn!("{} of {} entries could not be converted", unresolved, entries.len());
        }
        log::info!("Grand total: {} CAD", report.grand_total_cad);

        report
    }

    /// Resolve and convert a single entry
    pub fn convert_entry(
        &self,
        entry: &SalaryEntry,
        cutoff: Option<NaiveDate>,
    ) -> ResolvedConversion {
        let date = match self.market_date_for(entry, cutoff) {
            Ok(date) => date,
            Err(e) => {
                log::warn!("{}-{:02} {}: {}", entry.year, entry.month, entry.currency, e);
                return ResolvedConversion::unresolved(
                    entry.clone(),
                    None,
                    UnresolvedReason::from(&e),
                );
            }
        };

        let rate = match self.reader.get_rate(date, &entry.currency) {
            Ok(rate) => rate,
            Err(e) => {
                log::warn!("{}-{:02} {}: {}", entry.year, entry.month, entry.currency, e);
                return ResolvedConversion::unresolved(
                    entry.clone(),
                    Some(date),
                    UnresolvedReason::from(&e),
                );
            }
        };

        match entry.amount.checked_mul(rate) {
            Some(product) => {
                let cad = round_cad(product);
                log::debug!(
                    "{}-{:02} {} {} @ {} on {} = {} CAD",
                    entry.year,
                    entry.month,
                    entry.amount,
                    entry.currency,
                    rate,
                    date,
                    cad
                );
                ResolvedConversion::success(entry.clone(), date, rate, cad)
            }
            None => {
                let message = format!(
                    "{} {} at {} exceeds the representable CAD amount",
                    entry.amount, entry.currency, rate
                );
                log::warn!("{}-{:02}: {}", entry.year, entry.month, message);
                ResolvedConversion::overflowed(entry.clone(), date, rate, message)
            }
        }
    }

    /// Resolve the trading date an entry would use
    pub fn market_date_for(
        &self,
        entry: &SalaryEntry,
        cutoff: Option<NaiveDate>,
    ) -> Result<NaiveDate> {
        let month = entry.year_month()?;
        self.resolver
            .resolve(month, cutoff.filter(|c| YearMonth::of(*c) == month))
    }
}
