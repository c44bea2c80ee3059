// src/fetch/mod.rs
pub mod decode;

pub use decode::TextDecoding;

use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ReportError;
use crate::process::{self, AmountFormat};
use crate::report::{Report, ReportKind, StockEntry, StockReports};

/// Where report CSVs are read from.
#[derive(Debug, Clone)]
pub enum ReportSource {
    /// A local directory holding the CSV files directly.
    Directory(PathBuf),
    /// A base URL the file names are resolved against.
    Http { client: Client, base: Url },
}

impl ReportSource {
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        ReportSource::Directory(dir.into())
    }

    /// `base` is treated as a directory even without a trailing slash.
    pub fn http(client: Client, base: &str) -> Result<Self, ReportError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(ReportSource::Http { client, base })
    }

    /// Full path or URL of `file_name` under this source.
    pub fn locate(&self, file_name: &str) -> Result<String, ReportError> {
        match self {
            ReportSource::Directory(dir) => Ok(dir.join(file_name).display().to_string()),
            ReportSource::Http { base, .. } => Ok(base.join(file_name)?.to_string()),
        }
    }

    /// Read `file_name`. `Ok(None)` means the file does not exist.
    pub async fn fetch(&self, file_name: &str) -> Result<Option<Vec<u8>>, ReportError> {
        match self {
            ReportSource::Directory(dir) => {
                let path = dir.join(file_name);
                match fs::read(&path).await {
                    Ok(bytes) => Ok(Some(bytes)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(source) => Err(ReportError::Io {
                        file: path.display().to_string(),
                        source,
                    }),
                }
            }
            ReportSource::Http { client, base } => {
                let url = base.join(file_name)?;
                let http_err = |source| ReportError::Http {
                    url: url.to_string(),
                    source,
                };
                let resp = client.get(url.clone()).send().await.map_err(http_err)?;
                if resp.status() == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                let bytes = resp
                    .error_for_status()
                    .map_err(http_err)?
                    .bytes()
                    .await
                    .map_err(http_err)?;
                Ok(Some(bytes.to_vec()))
            }
        }
    }
}

/// How fetched bytes become a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub decoding: TextDecoding,
    pub format: AmountFormat,
}

/// File names tried for one report, most specific first:
///  - `<name>-W_<code>_<kind>_年度.csv` (only when the stock has a name)
///  - `W_<code>_<kind>_年度.csv`
///  - `<code>_<kind>.csv`
pub fn candidate_file_names(stock: &StockEntry, kind: ReportKind) -> Vec<String> {
    let code = stock.code.trim();
    let token = kind.as_str();
    let annual = format!("W_{}_{}_年度.csv", code, token);

    let mut names = Vec::with_capacity(3);
    if let Some(name) = stock.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        names.push(format!("{}-{}", name, annual));
    }
    names.push(annual);
    names.push(format!("{}_{}.csv", code, token));
    names
}

/// Fetch, decode and pivot one report of `stock`.
#[tracing::instrument(level = "info", skip(source, opts), fields(code = %stock.code, kind = kind.as_str()))]
pub async fn load_report(
    source: &ReportSource,
    stock: &StockEntry,
    kind: ReportKind,
    opts: &LoadOptions,
) -> Result<Report, ReportError> {
    let candidates = candidate_file_names(stock, kind);
    for file_name in &candidates {
        let Some(bytes) = source.fetch(file_name).await? else {
            debug!(file = %file_name, "not present");
            continue;
        };
        debug!(file = %file_name, bytes = bytes.len(), "fetched");

        let text = opts.decoding.decode(file_name, &bytes)?;
        let report = process::pivot_csv(&text, &opts.format)?;
        if report.skipped.total() > 0 {
            warn!(
                file = %file_name,
                missing_field = report.skipped.missing_field,
                unknown_date = report.skipped.unknown_date,
                "rows skipped"
            );
        }
        info!(file = %file_name, items = report.rows.len(), years = ?report.years(), "loaded");
        return Ok(report);
    }

    Err(ReportError::NotFound { tried: candidates })
}

/// Load all three reports of `stock` concurrently.
pub async fn load_stock(
    source: &ReportSource,
    stock: &StockEntry,
    opts: &LoadOptions,
) -> StockReports {
    let (balance_sheet, income_statement, cash_flow) = tokio::join!(
        load_report(source, stock, ReportKind::BalanceSheet, opts),
        load_report(source, stock, ReportKind::IncomeStatement, opts),
        load_report(source, stock, ReportKind::CashFlow, opts),
    );
    StockReports {
        stock: stock.clone(),
        balance_sheet,
        income_statement,
        cash_flow,
    }
}
