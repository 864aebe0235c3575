//! Bank of Canada Valet data loading
//!
//! Turns Valet payloads into [`RawRateRecord`]s. Two shapes are supported:
//!
//! - the `observations` JSON returned by
//!   `https://www.bankofcanada.ca/valet/observations/FXUSDCAD,FXEURCAD/json`
//! - a wide CSV table with a `date` column followed by one column per series
//!
//! The series list (`/lists/series/json`) is parsed into the currencies the
//! feed quotes in CAD. The HTTP fetch is only compiled with the `async` feature.

use crate::currency::{currency_from_pair_code_with_prefix, CurrencyCode};
use crate::data::fx::RawRateRecord;
use crate::error::{Result, SalaryError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Default Valet API root
pub const VALET_BASE_URL: &str = "https://www.bankofcanada.ca/valet";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<BTreeMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct SeriesListResponse {
    #[serde(default)]
    series: BTreeMap<String, Value>,
}

/// URL of the Valet list of every published series
pub fn series_list_url(base_url: &str) -> String {
    format!("{}/lists/series/json", base_url.trim_end_matches('/'))
}

/// Currencies with a daily `<prefix>???CAD` series in a Valet series list
///
/// The list also carries interest rates, indexes and the monthly/annual FX
/// averages; anything not matching the pair-code shape is ignored.
pub fn parse_series_list(payload: &str, prefix: &str) -> Result<Vec<CurrencyCode>> {
    let response: SeriesListResponse = serde_json::from_str(payload)?;
    let currencies: BTreeSet<CurrencyCode> = response
        .series
        .keys()
        .filter_map(|code| currency_from_pair_code_with_prefix(prefix, code))
        .collect();

    log::debug!(
        "{} of {} listed series are {}???CAD pairs",
        currencies.len(),
        response.series.len(),
        prefix
    );
    Ok(currencies.into_iter().collect())
}

/// Build the Valet observations URL for a set of series
pub fn observations_url(
    base_url: &str,
    series: &[String],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> String {
    let mut url = format!(
        "{}/observations/{}/json",
        base_url.trim_end_matches('/'),
        series.join(",")
    );

    let mut params = Vec::new();
    if let Some(start) = start {
        params.push(format!("start_date={}", start.format("%Y-%m-%d")));
    }
    if let Some(end) = end {
        params.push(format!("end_date={}", end.format("%Y-%m-%d")));
    }
    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.join("&"));
    }

    url
}

/// Parse a Valet `observations` JSON payload
///
/// Each observation looks like `{"d": "2023-03-31", "FXUSDCAD": {"v": "1.3533"}}`.
/// Series with an empty or missing `v` are skipped for that date.
pub fn parse_observations_json(payload: &str) -> Result<Vec<RawRateRecord>> {
    let response: ObservationsResponse = serde_json::from_str(payload)?;
    let mut records = Vec::with_capacity(response.observations.len());

    for (idx, observation) in response.observations.into_iter().enumerate() {
        let date = match observation.get("d").and_then(Value::as_str) {
            Some(d) => parse_date(d)?,
            None => {
                return Err(SalaryError::ParseError(format!(
                    "Observation {} has no date",
                    idx + 1
                )))
            }
        };

        let mut record = RawRateRecord::new(date);
        for (series, value) in observation {
            if series == "d" {
                continue;
            }
            let raw = match value.get("v") {
                Some(Value::String(s)) => s.trim().to_string(),
                Some(Value::Number(n)) => n.to_string(),
                _ => continue,
            };
            if raw.is_empty() {
                continue;
            }
            let rate = parse_rate(&raw, &series, date)?;
            record.rates.insert(series, rate);
        }

        records.push(record);
    }

    log::debug!("Parsed {} Valet observations", records.len());
    Ok(records)
}

/// Parse a wide CSV table: `date,FXUSDCAD,FXEURCAD,...`
///
/// Empty cells are treated as missing observations.
pub fn parse_wide_csv<R: Read>(reader: R) -> Result<Vec<RawRateRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    match headers.get(0) {
        Some(first) if first.eq_ignore_ascii_case("date") => {}
        _ => {
            return Err(SalaryError::ParseError(
                "First CSV column must be `date`".to_string(),
            ))
        }
    }

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let date = parse_date(row.get(0).unwrap_or_default())?;

        let mut record = RawRateRecord::new(date);
        for (series, cell) in headers.iter().zip(row.iter()).skip(1) {
            if cell.is_empty() {
                continue;
            }
            let rate = parse_rate(cell, series, date)?;
            record.rates.insert(series.to_string(), rate);
        }
        records.push(record);
    }

    log::debug!("Parsed {} CSV rate rows", records.len());
    Ok(records)
}

/// Load records from a saved payload, picking the parser by file extension
///
/// `.csv` files go through [`parse_wide_csv`]; anything else is read as
/// observations JSON.
pub fn load_path(path: &Path) -> Result<Vec<RawRateRecord>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let records = if is_csv {
        parse_wide_csv(File::open(path)?)?
    } else {
        parse_observations_json(&fs::read_to_string(path)?)?
    };

    log::info!("Loaded {} rate records from {}", records.len(), path.display());
    Ok(records)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| SalaryError::ParseError(format!("Invalid date {:?}: {}", s, e)))
}

fn parse_rate(s: &str, series: &str, date: NaiveDate) -> Result<Decimal> {
    Decimal::from_str(s).map_err(|e| {
        SalaryError::ParseError(format!(
            "Invalid rate {:?} for {} on {}: {}",
            s, series, date, e
        ))
    })
}

/// HTTP client for the Valet observations endpoint
#[cfg(feature = "async")]
pub struct ValetClient {
    base_url: String,
    client: reqwest::Client,
}

#[cfg(feature = "async")]
impl ValetClient {
    /// Create a client against `base_url` with a request timeout
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SalaryError::DataError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }

    /// Fetch the raw observations JSON for `series` between `start` and `end`
    ///
    /// One request, no retries.
    pub async fn fetch_payload(
        &self,
        series: &[String],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<String> {
        let url = observations_url(&self.base_url, series, start, end);
        self.get_text(&url).await
    }

    /// Fetch and parse daily observations
    pub async fn fetch_observations(
        &self,
        series: &[String],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<RawRateRecord>> {
        let body = self.fetch_payload(series, start, end).await?;
        parse_observations_json(&body)
    }

    /// Currencies the feed publishes a daily CAD series for
    pub async fn list_series(&self, prefix: &str) -> Result<Vec<CurrencyCode>> {
        let body = self.get_text(&series_list_url(&self.base_url)).await?;
        parse_series_list(&body, prefix)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        log::info!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SalaryError::DataError(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SalaryError::DataError(format!(
                "Valet returned error: {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SalaryError::DataError(format!("Failed to read response: {}", e)))
    }
}
