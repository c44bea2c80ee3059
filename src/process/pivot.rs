// src/process/pivot.rs

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::error::RowIssue;
use crate::process::{
    amount::{parse_amount, AmountFormat},
    date_parser::parse_fiscal_year,
    raw_row::RawRow,
};
use crate::report::{Report, ReportRow, SkipCounts};

pub const ITEM_COLUMN: &str = "STD_ITEM_NAME";
pub const DATE_COLUMN: &str = "REPORT_DATE";
pub const AMOUNT_COLUMN: &str = "AMOUNT";

/// The typed view of a `RawRow` that survives validation.
#[derive(Debug, Clone, PartialEq)]
struct Observation<'a> {
    item_name: &'a str,
    year: i32,
    amount: f64,
}

impl<'a> Observation<'a> {
    fn from_raw(row: &'a RawRow) -> Result<Self, RowIssue> {
        let item_name = row
            .non_empty(ITEM_COLUMN)
            .ok_or(RowIssue::MissingField(ITEM_COLUMN))?;
        let date = row
            .non_empty(DATE_COLUMN)
            .ok_or(RowIssue::MissingField(DATE_COLUMN))?;
        let amount = row
            .non_empty(AMOUNT_COLUMN)
            .ok_or(RowIssue::MissingField(AMOUNT_COLUMN))?;

        Ok(Self {
            item_name,
            year: parse_fiscal_year(date)?,
            amount: parse_amount(amount),
        })
    }
}

/// Fold rows into one [`ReportRow`] per distinct `STD_ITEM_NAME`.
///
/// Item order is first-seen order. A repeated (item, year) pair keeps the
/// value from the later row. Rows with a missing field or an unrecognised
/// date are dropped and counted in [`Report::skipped`].
pub fn build_report<'a, I>(rows: I, format: &AmountFormat) -> Report
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let mut out: Vec<ReportRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skipped = SkipCounts::default();

    for (line_no, raw) in rows.into_iter().enumerate() {
        let obs = match Observation::from_raw(raw) {
            Ok(obs) => obs,
            Err(issue) => {
                match &issue {
                    RowIssue::MissingField(_) => {
                        skipped.missing_field += 1;
                        trace!(row = line_no, %issue, "skipping row");
                    }
                    RowIssue::UnknownDateFormat(_) => {
                        skipped.unknown_date += 1;
                        debug!(row = line_no, %issue, "skipping row");
                    }
                }
                continue;
            }
        };

        let slot = match index.get(obs.item_name) {
            Some(&i) => i,
            None => {
                out.push(ReportRow::new(obs.item_name));
                index.insert(obs.item_name.to_string(), out.len() - 1);
                out.len() - 1
            }
        };
        out[slot].years.insert(obs.year, format.format(obs.amount));
    }

    debug!(
        items = out.len(),
        missing_field = skipped.missing_field,
        unknown_date = skipped.unknown_date,
        "pivot complete"
    );

    Report { rows: out, skipped }
}
