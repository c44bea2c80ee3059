// src/process/mod.rs
pub mod amount;
pub mod csv;
pub mod date_parser;
pub mod pivot;
pub mod raw_row;
pub mod utils;

use tracing::debug;

use crate::error::ReportError;
use crate::report::Report;

pub use amount::AmountFormat;
pub use raw_row::RawRow;

/// Turn the text of one report CSV into its pivoted [`Report`].
///
/// Pure: no I/O and no state carried between calls. Only a file without a
/// header or without any data line fails; row-level problems are counted
/// in the returned report.
#[tracing::instrument(level = "debug", skip(text, format), fields(bytes = text.len()))]
pub fn pivot_csv(text: &str, format: &AmountFormat) -> Result<Report, ReportError> {
    let rows = csv::parse_csv(text)?;
    debug!(rows = rows.len(), "decoded csv rows");
    Ok(pivot::build_report(&rows, format))
}
