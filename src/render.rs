// src/render.rs

use prettytable::{format, Cell, Row, Table};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Write as _;

use crate::report::{Report, StockReports};

/// Placeholder for a year an item has no value for.
pub const MISSING_CELL: &str = "-";

/// A report laid out as item rows by year columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotTable {
    pub years: Vec<i32>,
    pub rows: Vec<(String, Vec<String>)>,
}

impl PivotTable {
    pub fn from_report(report: &Report) -> Self {
        let years = report.years();
        let rows = report
            .rows
            .iter()
            .map(|row| {
                let cells = years
                    .iter()
                    .map(|y| {
                        row.years
                            .get(y)
                            .cloned()
                            .unwrap_or_else(|| MISSING_CELL.to_string())
                    })
                    .collect();
                (row.item_name.clone(), cells)
            })
            .collect();
        Self { years, rows }
    }

    /// Plain-text table: item names left-aligned, amounts right-aligned.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

        let mut titles = vec![Cell::new("Item")];
        titles.extend(
            self.years
                .iter()
                .map(|y| Cell::new(&y.to_string()).style_spec("r")),
        );
        table.set_titles(Row::new(titles));

        for (name, cells) in &self.rows {
            let mut row = vec![Cell::new(name)];
            row.extend(cells.iter().map(|c| Cell::new(c).style_spec("r")));
            table.add_row(Row::new(row));
        }
        table
    }

    pub fn to_text(&self) -> String {
        self.to_table().to_string()
    }
}

/// Every report of a stock as text, failures inline.
pub fn stock_to_text(reports: &StockReports) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {}", stock_label(reports));
    for (kind, result) in reports.iter() {
        let _ = writeln!(out, "\n[{}]", kind.title());
        match result {
            Ok(report) if report.is_empty() => out.push_str("(no data)\n"),
            Ok(report) => out.push_str(&PivotTable::from_report(report).to_text()),
            Err(e) => {
                let _ = writeln!(out, "(failed: {})", e);
            }
        }
    }
    out
}

/// JSON object with one entry per report kind: `{"rows": ...}` or `{"error": ...}`.
pub fn stock_to_json(reports: &StockReports) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("code".into(), json!(reports.stock.code));
    map.insert("name".into(), json!(reports.stock.name));
    for (kind, result) in reports.iter() {
        let entry = match result {
            Ok(report) => json!({
                "years": report.years(),
                "rows": report.rows,
                "skipped": report.skipped,
            }),
            Err(e) => json!({ "error": e.to_string() }),
        };
        map.insert(kind.as_str().into(), entry);
    }
    Value::Object(map)
}

fn stock_label(reports: &StockReports) -> String {
    match &reports.stock.name {
        Some(name) => format!("{} {}", reports.stock.code, name),
        None => reports.stock.code.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::report::{ReportRow, SkipCounts, StockEntry};
    use unicode_width::UnicodeWidthStr;

    fn sample() -> Report {
        let mut revenue = ReportRow::new("營業收入");
        revenue.years.insert(2022, "1,000.00".into());
        revenue.years.insert(2023, "12,500.00".into());
        let mut other = ReportRow::new("Other");
        other.years.insert(2021, "3.00".into());
        Report {
            rows: vec![revenue, other],
            skipped: SkipCounts::default(),
        }
    }

    #[test]
    fn missing_years_show_placeholder() {
        let table = PivotTable::from_report(&sample());
        assert_eq!(table.years, vec![2021, 2022, 2023]);
        assert_eq!(table.rows[0].1, vec!["-", "1,000.00", "12,500.00"]);
        assert_eq!(table.rows[1].1, vec!["3.00", "-", "-"]);
    }

    fn assert_aligned(text: &str) -> Vec<&str> {
        let lines: Vec<&str> = text.lines().collect();
        let widths: Vec<usize> = lines.iter().map(|l| l.width()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{:?}\n{}", widths, text);
        lines
    }

    #[test]
    fn text_columns_line_up() {
        let text = PivotTable::from_report(&sample()).to_text();
        let lines = assert_aligned(&text);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].trim_start().starts_with("Item"));
        assert!(lines[0].trim_end().ends_with("2023"));
        assert!(lines[2].contains("營業收入"));
        assert!(lines[2].trim_end().ends_with("12,500.00"));
        assert!(lines[3].trim_start().starts_with("Other"));
    }

    #[test]
    fn amounts_are_right_aligned() {
        let text = PivotTable::from_report(&sample()).to_text();
        let lines = assert_aligned(&text);
        // "-" and "3.00" share the right edge of the 2021 column.
        let edge = |line: &str, cell: &str| {
            line.find(cell)
                .map(|i| line[..i + cell.trim_end().len()].width())
        };
        assert!(edge(lines[2], " - ").is_some());
        assert_eq!(edge(lines[2], " - "), edge(lines[3], "3.00 "));
    }

    #[test]
    fn wide_item_names_keep_columns_aligned() {
        let mut report = sample();
        let mut wide = ReportRow::new("📈 營收");
        wide.years.insert(2022, "7.00".into());
        report.rows.push(wide);
        assert_eq!("📈 營收".width(), 7);

        let text = PivotTable::from_report(&report).to_text();
        let lines = assert_aligned(&text);
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn json_keeps_failures_per_report() {
        let reports = StockReports {
            stock: StockEntry::new("000001"),
            balance_sheet: Ok(sample()),
            income_statement: Err(ReportError::MalformedInput("no data lines".into())),
            cash_flow: Err(ReportError::NotFound {
                tried: vec!["000001_cash_flow.csv".into()],
            }),
        };
        let v = stock_to_json(&reports);
        assert_eq!(v["code"], "000001");
        assert_eq!(v["balance_sheet"]["years"], json!([2021, 2022, 2023]));
        assert_eq!(v["balance_sheet"]["rows"][0]["years"]["2023"], "12,500.00");
        assert_eq!(
            v["income_statement"]["error"],
            "malformed input: no data lines"
        );
        assert!(v["cash_flow"]["error"]
            .as_str()
            .unwrap()
            .contains("000001_cash_flow.csv"));

        let text = stock_to_text(&reports);
        assert!(text.contains("[Income Statement]\n(failed: malformed input: no data lines)"));
    }
}
