// src/report.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::ReportError;

/// Which of the three statements a CSV holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [
        ReportKind::BalanceSheet,
        ReportKind::IncomeStatement,
        ReportKind::CashFlow,
    ];

    /// Token used in report file names, e.g. `000001_balance_sheet.csv`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::BalanceSheet => "balance_sheet",
            ReportKind::IncomeStatement => "income_statement",
            ReportKind::CashFlow => "cash_flow",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::BalanceSheet => "Balance Sheet",
            ReportKind::IncomeStatement => "Income Statement",
            ReportKind::CashFlow => "Cash Flow",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "balance_sheet" => Some(ReportKind::BalanceSheet),
            "income_statement" => Some(ReportKind::IncomeStatement),
            "cash_flow" => Some(ReportKind::CashFlow),
            _ => None,
        }
    }
}

/// One line item with its formatted amount per fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub item_name: String,
    pub years: BTreeMap<i32, String>,
}

impl ReportRow {
    pub fn new(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            years: BTreeMap::new(),
        }
    }
}

/// Rows dropped while pivoting, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    pub missing_field: usize,
    pub unknown_date: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.missing_field + self.unknown_date
    }
}

/// A pivoted report: rows in first-seen item order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub skipped: SkipCounts,
}

impl Report {
    /// Union of every row's years, ascending. Recomputed on each call.
    pub fn years(&self) -> Vec<i32> {
        self.rows
            .iter()
            .flat_map(|r| r.years.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn row(&self, item_name: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.item_name == item_name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A ticker plus the optional display name used in some file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockEntry {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl StockEntry {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parses the CLI form `CODE` or `CODE:NAME`.
    pub fn parse_arg(arg: &str) -> Option<Self> {
        let (code, name) = match arg.split_once(':') {
            Some((c, n)) => (c.trim(), Some(n.trim())),
            None => (arg.trim(), None),
        };
        if code.is_empty() {
            return None;
        }
        let entry = StockEntry::new(code);
        Some(match name.filter(|n| !n.is_empty()) {
            Some(n) => entry.with_name(n),
            None => entry,
        })
    }
}

/// The three reports of one stock, each loaded or failed on its own.
#[derive(Debug)]
pub struct StockReports {
    pub stock: StockEntry,
    pub balance_sheet: Result<Report, ReportError>,
    pub income_statement: Result<Report, ReportError>,
    pub cash_flow: Result<Report, ReportError>,
}

impl StockReports {
    pub fn get(&self, kind: ReportKind) -> &Result<Report, ReportError> {
        match kind {
            ReportKind::BalanceSheet => &self.balance_sheet,
            ReportKind::IncomeStatement => &self.income_statement,
            ReportKind::CashFlow => &self.cash_flow,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReportKind, &Result<Report, ReportError>)> {
        ReportKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }

    pub fn all_failed(&self) -> bool {
        self.iter().all(|(_, r)| r.is_err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, years: &[(i32, &str)]) -> ReportRow {
        ReportRow {
            item_name: name.to_string(),
            years: years.iter().map(|(y, v)| (*y, v.to_string())).collect(),
        }
    }

    #[test]
    fn years_is_sorted_union() {
        let report = Report {
            rows: vec![
                row("Revenue", &[(2023, "1.00"), (2021, "2.00")]),
                row("Cost", &[(2022, "3.00"), (2023, "4.00")]),
            ],
            skipped: SkipCounts::default(),
        };
        assert_eq!(report.years(), vec![2021, 2022, 2023]);
    }

    #[test]
    fn report_kind_tokens_round_trip() {
        for kind in ReportKind::ALL {
            assert_eq!(ReportKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(ReportKind::from_str("ledger"), None);
    }

    #[test]
    fn parse_stock_arg() {
        assert_eq!(StockEntry::parse_arg("000001"), Some(StockEntry::new("000001")));
        assert_eq!(
            StockEntry::parse_arg("000001:平安銀行"),
            Some(StockEntry::new("000001").with_name("平安銀行"))
        );
        assert_eq!(StockEntry::parse_arg("000002:"), Some(StockEntry::new("000002")));
        assert_eq!(StockEntry::parse_arg(":name"), None);
    }
}
