//! Conversion results

use super::entry::SalaryEntry;
use crate::error::SalaryError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of converting one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    Success,
    Unresolved,
}

/// Why an entry could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No trading date in the month (under the cutoff)
    DateResolutionFailure { message: String },
    /// A date resolved but the pair has no rate on it
    RateUnavailable { message: String },
    /// The CAD amount, or a total including it, exceeds `Decimal` range
    AmountOverflow { message: String },
}

impl UnresolvedReason {
    pub fn message(&self) -> &str {
        match self {
            UnresolvedReason::DateResolutionFailure { message }
            | UnresolvedReason::RateUnavailable { message }
            | UnresolvedReason::AmountOverflow { message } => message,
        }
    }
}

impl From<&SalaryError> for UnresolvedReason {
    fn from(err: &SalaryError) -> Self {
        let message = err.to_string();
        match err {
            SalaryError::RateUnavailable { .. } => UnresolvedReason::RateUnavailable { message },
            _ => UnresolvedReason::DateResolutionFailure { message },
        }
    }
}

/// One entry after rate resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConversion {
    #[serde(flatten)]
    pub entry: SalaryEntry,
    pub resolved_date: Option<NaiveDate>,
    pub rate: Option<Decimal>,
    pub converted_cad: Option<Decimal>,
    pub status: ConversionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnresolvedReason>,
}

impl ResolvedConversion {
    pub fn success(entry: SalaryEntry, date: NaiveDate, rate: Decimal, cad: Decimal) -> Self {
        Self {
            entry,
            resolved_date: Some(date),
            rate: Some(rate),
            converted_cad: Some(cad),
            status: ConversionStatus::Success,
            reason: None,
        }
    }

    /// Failed conversion; a resolved date is kept when only the rate was missing
    pub fn unresolved(
        entry: SalaryEntry,
        resolved_date: Option<NaiveDate>,
        reason: UnresolvedReason,
    ) -> Self {
        Self {
            entry,
            resolved_date,
            rate: None,
            converted_cad: None,
            status: ConversionStatus::Unresolved,
            reason: Some(reason),
        }
    }

    /// Rate found but the converted amount does not fit
    pub fn overflowed(
        entry: SalaryEntry,
        date: NaiveDate,
        rate: Decimal,
        message: String,
    ) -> Self {
        Self {
            entry,
            resolved_date: Some(date),
            rate: Some(rate),
            converted_cad: None,
            status: ConversionStatus::Unresolved,
            reason: Some(UnresolvedReason::AmountOverflow { message }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ConversionStatus::Success
    }
}

/// Converted total of one year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearTotal {
    pub year: i32,
    pub total_cad: Decimal,
    /// Successful conversions summed into `total_cad`
    pub included: usize,
}

/// Per-year sums over successful conversions only
///
/// A year whose entries all failed has no total at all rather than a zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YearlyAggregate {
    totals: BTreeMap<i32, YearTotal>,
    #[serde(skip)]
    grand_total: Decimal,
}

impl YearlyAggregate {
    /// Sum successful conversions by year
    ///
    /// A conversion that would push a total past `Decimal` range is left out;
    /// [`ConversionReport::new`] marks such entries unresolved.
    pub fn from_conversions(conversions: &[ResolvedConversion]) -> Self {
        let mut yearly = Self::default();
        for conversion in conversions {
            if let Some(cad) = conversion.converted_cad {
                yearly.include(conversion.entry.year, cad);
            }
        }
        yearly
    }

    /// Add one converted amount, returning `false` if a total would overflow
    ///
    /// Nothing is changed when `false` is returned.
    pub fn include(&mut self, year: i32, cad: Decimal) -> bool {
        let current = self.totals.get(&year).map_or(Decimal::ZERO, |t| t.total_cad);
        let (Some(year_total), Some(grand_total)) = (
            current.checked_add(cad),
            self.grand_total.checked_add(cad),
        ) else {
            return false;
        };

        let total = self.totals.entry(year).or_insert(YearTotal {
            year,
            total_cad: Decimal::ZERO,
            included: 0,
        });
        total.total_cad = year_total;
        total.included += 1;
        self.grand_total = grand_total;
        true
    }

    pub fn get(&self, year: i32) -> Option<&YearTotal> {
        self.totals.get(&year)
    }

    /// Totals by year, newest first
    pub fn years(&self) -> impl Iterator<Item = &YearTotal> {
        self.totals.values().rev()
    }

    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Everything one conversion pass produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub conversions: Vec<ResolvedConversion>,
    pub yearly: YearlyAggregate,
    pub grand_total_cad: Decimal,
}

impl ConversionReport {
    /// Aggregate conversions into yearly and grand totals
    ///
    /// A successful conversion that would overflow a total is turned into an
    /// unresolved one, so every success is counted in the totals.
    pub fn new(mut conversions: Vec<ResolvedConversion>) -> Self {
        let mut yearly = YearlyAggregate::default();
        for conversion in &mut conversions {
            let Some(cad) = conversion.converted_cad else {
                continue;
            };
            if !yearly.include(conversion.entry.year, cad) {
                let message = format!("{} CAD would overflow the running total", cad);
                log::warn!(
                    "{}-{:02} {}: {}",
                    conversion.entry.year,
                    conversion.entry.month,
                    conversion.entry.currency,
                    message
                );
                conversion.converted_cad = None;
                conversion.status = ConversionStatus::Unresolved;
                conversion.reason = Some(UnresolvedReason::AmountOverflow { message });
            }
        }
        let grand_total_cad = yearly.grand_total();
        Self {
            conversions,
            yearly,
            grand_total_cad,
        }
    }

    /// Entries that could not be converted
    pub fn unresolved(&self) -> impl Iterator<Item = &ResolvedConversion> {
        self.conversions.iter().filter(|c| !c.is_success())
    }

    pub fn has_unresolved(&self) -> bool {
        self.unresolved().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyCode;
    use rust_decimal_macros::dec;

    fn entry(year: i32, month: u32, amount: Decimal) -> SalaryEntry {
        SalaryEntry::new(year, month, amount, CurrencyCode::new("USD").unwrap()).unwrap()
    }

    fn ok(year: i32, month: u32, cad: Decimal) -> ResolvedConversion {
        let date = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        ResolvedConversion::success(entry(year, month, cad), date, Decimal::ONE, cad)
    }

    fn failed(year: i32, month: u32) -> ResolvedConversion {
        ResolvedConversion::unresolved(
            entry(year, month, dec!(500)),
            None,
            UnresolvedReason::DateResolutionFailure {
                message: "no date".to_string(),
            },
        )
    }

    #[test]
    fn test_aggregate_skips_unresolved() {
        let report = ConversionReport::new(vec![
            ok(2023, 1, dec!(100.10)),
            failed(2023, 2),
            ok(2023, 3, dec!(200.20)),
            ok(2022, 12, dec!(50)),
        ]);

        let y2023 = report.yearly.get(2023).unwrap();
        assert_eq!(y2023.total_cad, dec!(300.30));
        assert_eq!(y2023.included, 2);
        assert_eq!(report.yearly.get(2022).unwrap().total_cad, dec!(50));
        assert_eq!(report.grand_total_cad, dec!(350.30));
        assert_eq!(report.unresolved().count(), 1);
    }

    #[test]
    fn test_all_failed_year_has_no_total() {
        let report = ConversionReport::new(vec![failed(2021, 5), ok(2022, 1, dec!(10))]);
        assert!(report.yearly.get(2021).is_none());
        assert!(report.has_unresolved());
    }

    #[test]
    fn test_zero_income_is_distinct_from_unresolved() {
        let report = ConversionReport::new(vec![ok(2023, 1, Decimal::ZERO)]);
        let total = report.yearly.get(2023).unwrap();
        assert_eq!(total.total_cad, Decimal::ZERO);
        assert_eq!(total.included, 1);
        assert!(!report.has_unresolved());
    }

    #[test]
    fn test_years_newest_first() {
        let report = ConversionReport::new(vec![ok(2022, 1, dec!(1)), ok(2024, 1, dec!(1))]);
        let years: Vec<i32> = report.yearly.years().map(|t| t.year).collect();
        assert_eq!(years, vec![2024, 2022]);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(failed(2023, 4)).unwrap();
        assert_eq!(json["year"], 2023);
        assert_eq!(json["month"], 4);
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["status"], "unresolved");
        assert!(json["converted_cad"].is_null());
        assert_eq!(json["reason"]["kind"], "date_resolution_failure");
    }

    fn half_of_range() -> Decimal {
        Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0)
    }

    #[test]
    fn test_year_total_overflow_marks_entry_unresolved() {
        let report = ConversionReport::new(vec![
            ok(2023, 1, half_of_range()),
            ok(2023, 2, half_of_range()),
            ok(2023, 3, dec!(10)),
        ]);

        let feb = &report.conversions[1];
        assert_eq!(feb.status, ConversionStatus::Unresolved);
        assert_eq!(feb.converted_cad, None);
        assert!(matches!(feb.reason, Some(UnresolvedReason::AmountOverflow { .. })));

        let y2023 = report.yearly.get(2023).unwrap();
        assert_eq!(y2023.included, 2);
        assert_eq!(y2023.total_cad, half_of_range() + dec!(10));
        assert_eq!(report.grand_total_cad, y2023.total_cad);
        assert_eq!(report.unresolved().count(), 1);
    }

    #[test]
    fn test_grand_total_overflow_across_years() {
        let report = ConversionReport::new(vec![
            ok(2022, 6, half_of_range()),
            ok(2023, 6, half_of_range()),
        ]);

        assert!(report.conversions[0].is_success());
        assert!(!report.conversions[1].is_success());
        assert!(report.yearly.get(2023).is_none());
        assert_eq!(report.grand_total_cad, half_of_range());
    }

    #[test]
    fn test_from_conversions_leaves_out_overflowing_amounts() {
        let yearly = YearlyAggregate::from_conversions(&[
            ok(2023, 1, half_of_range()),
            ok(2023, 2, half_of_range()),
        ]);
        assert_eq!(yearly.get(2023).unwrap().included, 1);
        assert_eq!(yearly.grand_total(), half_of_range());
    }
}
