//! Salary income: entries, reporting windows and CAD conversion
//!
//! # Components
//!
//! - **entry**: One month of salary in one currency
//! - **window**: Which (year, month) pairs must be declared for an entry date
//! - **engine**: Rate resolution, conversion and yearly aggregation
//! - **report**: Per-entry results and yearly totals
//! - **sheet**: Salary rows read from CSV and checked against a window

pub mod engine;
pub mod entry;
pub mod report;
pub mod sheet;
pub mod window;

pub use engine::{round_cad, ConversionEngine, CAD_DECIMALS};
pub use entry::SalaryEntry;
pub use report::{
    ConversionReport, ConversionStatus, ResolvedConversion, UnresolvedReason, YearTotal,
    YearlyAggregate,
};
pub use sheet::{SalarySheet, SheetCoverage};
pub use window::{plan_window, EntryWindowPlanner, ReportingWindow, ReportingYear};
