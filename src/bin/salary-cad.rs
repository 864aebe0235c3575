//! salary-cad CLI - prior-year salary in CAD for a Canada entry date
//!
//! ## Example Usage
//!
//! ```bash
//! # Which months must be declared
//! salary-cad window --entry-date 2024-06-15
//!
//! # Convert a salary sheet against saved Valet observations
//! salary-cad convert --entry-date 2024-06-15 --rates fx.json --salaries salary.csv
//!
//! # Same monthly salary for every month of the window
//! salary-cad convert --entry-date 2024-06-15 --rates fx.json --amount 5000 --currency USD
//!
//! # Currencies available in a rate file
//! salary-cad currencies --rates fx.json
//!
//! # Currencies the Valet feed publishes (async feature)
//! salary-cad currencies
//! ```

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rust_decimal::Decimal;
use salary_cad::currency::{pair_code_with_prefix, CurrencyCode, SERIES_PREFIX};
use salary_cad::data::fx::{RateLookup, RateTable, RawRateRecord};
use salary_cad::data::valet;
use salary_cad::income::{
    plan_window, ConversionEngine, ConversionReport, ReportingWindow, SalarySheet,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// salary-cad: foreign salary converted to CAD at Bank of Canada rates
#[derive(Parser)]
#[command(name = "salary-cad")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Prior-year salary in CAD for a Canada entry date", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the months that must be declared for an entry date
    Window {
        /// Canada entry date (YYYY-MM-DD)
        #[arg(short = 'e', long)]
        entry_date: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Convert salary entries to CAD
    Convert {
        /// Canada entry date (YYYY-MM-DD)
        #[arg(short = 'e', long)]
        entry_date: String,

        /// Saved Valet observations (.json) or wide rate table (.csv)
        #[arg(short = 'r', long)]
        rates: Option<PathBuf>,

        /// Salary sheet CSV (year,month,currency,amount)
        #[arg(short = 's', long, conflicts_with_all = ["amount", "currency"])]
        salaries: Option<PathBuf>,

        /// Monthly amount applied to every month of the window
        #[arg(long, requires = "currency")]
        amount: Option<String>,

        /// Currency of --amount
        #[arg(long, requires = "amount")]
        currency: Option<String>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List currencies with a CAD series, from a rate file or the live feed
    Currencies {
        /// Saved Valet observations (.json) or wide rate table (.csv)
        #[arg(short = 'r', long)]
        rates: Option<PathBuf>,
    },

    /// Download Valet observations covering an entry date's window
    #[cfg(feature = "async")]
    Fetch {
        /// Canada entry date (YYYY-MM-DD)
        #[arg(short = 'e', long)]
        entry_date: String,

        /// Currencies to fetch (default: from config)
        #[arg(long, value_delimiter = ',')]
        currencies: Vec<String>,

        /// File to write the observations JSON to
        #[arg(short = 'o', long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_valet_base_url")]
    valet_base_url: String,
    #[serde(default = "default_series_prefix")]
    series_prefix: String,
    #[serde(default = "default_currencies")]
    default_currencies: Vec<String>,
    #[serde(default = "default_timeout")]
    request_timeout_secs: u64,
}

fn default_valet_base_url() -> String {
    valet::VALET_BASE_URL.to_string()
}

fn default_series_prefix() -> String {
    SERIES_PREFIX.to_string()
}

fn default_currencies() -> Vec<String> {
    vec!["USD".to_string(), "EUR".to_string(), "GBP".to_string()]
}

fn default_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            valet_base_url: default_valet_base_url(),
            series_prefix: default_series_prefix(),
            default_currencies: default_currencies(),
            request_timeout_secs: default_timeout(),
        }
    }
}

impl Config {
    fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => dirs::home_dir().map(|home| home.join(".salary-cad").join("config.toml")),
        };

        if let Some(config_path) = path {
            if config_path.exists() {
                match fs::read_to_string(&config_path) {
                    Ok(contents) => match toml::from_str(&contents) {
                        Ok(config) => return config,
                        Err(e) => {
                            eprintln!("{} Failed to parse config: {}", "Warning:".yellow(), e);
                        }
                    },
                    Err(e) => {
                        eprintln!("{} Failed to read config: {}", "Warning:".yellow(), e);
                    }
                }
            }
        }

        Config::default()
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());

    if cli.verbose {
        println!(
            "{} v{}",
            "salary-cad".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!("Valet: {}", config.valet_base_url.dimmed());
    }

    let result = match cli.command {
        Commands::Window { entry_date, format } => show_window(&entry_date, format),

        Commands::Convert {
            entry_date,
            rates,
            salaries,
            amount,
            currency,
            format,
        } => run_convert(ConvertConfig {
            entry_date,
            rates,
            salaries,
            amount,
            currency,
            format,
            config,
        }),

        Commands::Currencies { rates } => list_currencies(rates.as_deref(), &config),

        #[cfg(feature = "async")]
        Commands::Fetch {
            entry_date,
            currencies,
            output,
        } => fetch_rates(&entry_date, currencies, &output, &config),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

struct ConvertConfig {
    entry_date: String,
    rates: Option<PathBuf>,
    salaries: Option<PathBuf>,
    amount: Option<String>,
    currency: Option<String>,
    format: OutputFormat,
    config: Config,
}

fn parse_entry_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid entry date {:?}, expected YYYY-MM-DD", s))
}

fn show_window(entry_date: &str, format: OutputFormat) -> anyhow::Result<()> {
    let window = plan_window(parse_entry_date(entry_date)?);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&window)?),
        OutputFormat::Text => print_window(&window),
    }
    Ok(())
}

fn print_window(window: &ReportingWindow) {
    println!(
        "{} {}",
        "Reporting window for entry on".bold(),
        window.entry_date.to_string().cyan()
    );
    for year in &window.years {
        if year.is_empty() {
            println!("  {}  {}", year.year, "no months".dimmed());
        } else if year.last_month == 12 {
            println!("  {}  January - December", year.year);
        } else {
            println!("  {}  months 1 - {}", year.year, year.last_month);
        }
    }
    println!("  {} months to declare", window.month_count());
}

fn load_records(
    path: Option<&Path>,
    config: &Config,
    window: &ReportingWindow,
    sheet: &SalarySheet,
) -> anyhow::Result<Vec<RawRateRecord>> {
    match path {
        Some(path) => valet::load_path(path)
            .with_context(|| format!("failed to load rates from {}", path.display())),
        None => {
            let mut currencies: Vec<String> = sheet
                .entries()
                .iter()
                .map(|e| e.currency.to_string())
                .collect();
            currencies.sort();
            currencies.dedup();
            fetch_records(config, window, &currencies)
        }
    }
}

#[cfg(feature = "async")]
fn fetch_records(
    config: &Config,
    window: &ReportingWindow,
    currencies: &[String],
) -> anyhow::Result<Vec<RawRateRecord>> {
    let mut series = series_for(config, currencies)?;
    if series.is_empty() {
        // CAD-only sheets still need trading dates.
        series = series_for(config, &config.default_currencies)?;
    }
    let payload = fetch_window_payload(config, window, &series)?;
    Ok(valet::parse_observations_json(&payload)?)
}

#[cfg(not(feature = "async"))]
fn fetch_records(
    _config: &Config,
    _window: &ReportingWindow,
    _currencies: &[String],
) -> anyhow::Result<Vec<RawRateRecord>> {
    bail!("--rates is required (rebuild with the `async` feature to fetch from Valet)")
}

#[cfg(feature = "async")]
fn series_for(config: &Config, currencies: &[String]) -> anyhow::Result<Vec<String>> {
    let mut series = Vec::new();
    for c in currencies {
        let code = CurrencyCode::new(c)?;
        // CAD needs no series
        if !code.is_cad() {
            series.push(pair_code_with_prefix(&config.series_prefix, &code));
        }
    }
    Ok(series)
}

#[cfg(feature = "async")]
fn fetch_window_payload(
    config: &Config,
    window: &ReportingWindow,
    series: &[String],
) -> anyhow::Result<String> {
    if series.is_empty() {
        bail!("no currencies to fetch");
    }
    let start = window
        .years
        .last()
        .and_then(|y| NaiveDate::from_ymd_opt(y.year, 1, 1));
    let end = Some(window.entry_date);

    let client = valet::ValetClient::new(
        &config.valet_base_url,
        std::time::Duration::from_secs(config.request_timeout_secs),
    )?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    Ok(runtime.block_on(client.fetch_payload(series, start, end))?)
}

#[cfg(feature = "async")]
fn fetch_rates(
    entry_date: &str,
    currencies: Vec<String>,
    output: &Path,
    config: &Config,
) -> anyhow::Result<()> {
    let window = plan_window(parse_entry_date(entry_date)?);
    let currencies = if currencies.is_empty() {
        config.default_currencies.clone()
    } else {
        currencies
    };
    let series = series_for(config, &currencies)?;

    let payload = fetch_window_payload(config, &window, &series)?;
    // Reject payloads we could not load back later.
    let records = valet::parse_observations_json(&payload)?;
    fs::write(output, payload)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "{} {} observations for {} to {}",
        "Saved".green().bold(),
        records.len(),
        series.join(","),
        output.display()
    );
    Ok(())
}

fn run_convert(cfg: ConvertConfig) -> anyhow::Result<()> {
    let entry_date = parse_entry_date(&cfg.entry_date)?;
    let window = plan_window(entry_date);

    let sheet = match (&cfg.salaries, &cfg.amount, &cfg.currency) {
        (Some(path), _, _) => SalarySheet::from_path(path)
            .with_context(|| format!("failed to read salaries from {}", path.display()))?,
        (None, Some(amount), Some(currency)) => {
            let amount: Decimal = amount
                .trim()
                .parse()
                .map_err(|e| anyhow!("invalid amount {:?}: {}", amount, e))?;
            SalarySheet::uniform(&window, amount, CurrencyCode::new(currency)?)?
        }
        _ => bail!("either --salaries or --amount with --currency is required"),
    };

    let coverage = sheet.check_against(&window);
    for month in &coverage.missing {
        eprintln!("{} no salary entry for {}", "Warning:".yellow(), month);
    }
    for month in &coverage.outside {
        eprintln!("{} {} is outside the reporting window", "Warning:".yellow(), month);
    }

    let records = load_records(cfg.rates.as_deref(), &cfg.config, &window, &sheet)?;
    let table = RateTable::from_records(records)?;
    let lookup = RateLookup::with_prefix(&table, &cfg.config.series_prefix);
    let engine = ConversionEngine::with_reader(&table, lookup);

    let report = engine.convert(sheet.entries(), Some(entry_date));

    match cfg.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &ConversionReport) {
    println!(
        "{:<8} {:>12} {:<4} {:<11} {:>10} {:>14}",
        "Month".bold(),
        "Amount".bold(),
        "Ccy".bold(),
        "Rate date".bold(),
        "Rate".bold(),
        "CAD".bold()
    );

    for conv in &report.conversions {
        let month = format!("{}-{:02}", conv.entry.year, conv.entry.month);
        match (conv.resolved_date, conv.rate, conv.converted_cad) {
            (Some(date), Some(rate), Some(cad)) => println!(
                "{:<8} {:>12} {:<4} {:<11} {:>10} {:>14}",
                month,
                conv.entry.amount.to_string(),
                conv.entry.currency,
                date.to_string(),
                rate.to_string(),
                cad.to_string()
            ),
            _ => {
                let reason = conv
                    .reason
                    .as_ref()
                    .map(|r| r.message().to_string())
                    .unwrap_or_default();
                println!(
                    "{:<8} {:>12} {:<4} {} {}",
                    month,
                    conv.entry.amount.to_string(),
                    conv.entry.currency,
                    "UNRESOLVED".red().bold(),
                    reason.dimmed()
                );
            }
        }
    }

    println!();
    for total in report.yearly.years() {
        println!(
            "{} {}: {} CAD ({} months)",
            "Total".bold(),
            total.year,
            total.total_cad.to_string().green(),
            total.included
        );
    }
    println!(
        "{} {} CAD",
        "Grand total:".bold(),
        report.grand_total_cad.to_string().green().bold()
    );

    let unresolved = report.unresolved().count();
    if unresolved > 0 {
        println!(
            "{} {} entries unresolved and excluded from totals",
            "Warning:".yellow(),
            unresolved
        );
    }
}

fn list_currencies(rates: Option<&Path>, config: &Config) -> anyhow::Result<()> {
    let Some(rates) = rates else {
        let currencies = fetch_currency_list(config)?;
        println!(
            "{} currencies quoted in CAD by {}",
            currencies.len(),
            config.valet_base_url.cyan()
        );
        print_currencies(&currencies, &config.series_prefix);
        return Ok(());
    };

    let records = valet::load_path(rates)
        .with_context(|| format!("failed to load rates from {}", rates.display()))?;
    let table = RateTable::from_records(records)?;

    match (table.first_date(), table.last_date()) {
        (Some(first), Some(last)) => println!(
            "{} dates from {} to {}",
            table.len(),
            first.to_string().cyan(),
            last.to_string().cyan()
        ),
        _ => println!("{}", "Rate file has no observations".yellow()),
    }

    let currencies: Vec<CurrencyCode> = table
        .currencies_with_prefix(&config.series_prefix)
        .into_iter()
        .collect();
    print_currencies(&currencies, &config.series_prefix);
    Ok(())
}

fn print_currencies(currencies: &[CurrencyCode], prefix: &str) {
    for code in currencies {
        println!("  {} ({})", code, pair_code_with_prefix(prefix, code));
    }
}

#[cfg(feature = "async")]
fn fetch_currency_list(config: &Config) -> anyhow::Result<Vec<CurrencyCode>> {
    let client = valet::ValetClient::new(
        &config.valet_base_url,
        std::time::Duration::from_secs(config.request_timeout_secs),
    )?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    Ok(runtime.block_on(client.list_series(&config.series_prefix))?)
}

#[cfg(not(feature = "async"))]
fn fetch_currency_list(_config: &Config) -> anyhow::Result<Vec<CurrencyCode>> {
    bail!("--rates is required (rebuild with the `async` feature to list Valet series)")
}
