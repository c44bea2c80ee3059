// src/cache.rs

use futures::future::join_all;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::fetch::{load_stock, LoadOptions, ReportSource};
use crate::report::{StockEntry, StockReports};

/// Loaded reports keyed by ticker code.
///
/// Owned by whoever drives the UI; nothing in the pipeline holds one.
#[derive(Debug, Default)]
pub struct FinancialCache {
    stocks: HashMap<String, StockReports>,
}

impl FinancialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> Option<&StockReports> {
        self.stocks.get(code)
    }

    /// Store `reports`, replacing any earlier entry for the same code.
    pub fn insert(&mut self, reports: StockReports) -> Option<StockReports> {
        self.stocks.insert(reports.stock.code.clone(), reports)
    }

    pub fn remove(&mut self, code: &str) -> Option<StockReports> {
        self.stocks.remove(code)
    }

    /// Cached reports for `stock`, loading them first on a miss.
    pub async fn get_or_load(
        &mut self,
        source: &ReportSource,
        stock: &StockEntry,
        opts: &LoadOptions,
    ) -> &StockReports {
        if !self.stocks.contains_key(&stock.code) {
            let reports = load_stock(source, stock, opts).await;
            self.stocks.insert(stock.code.clone(), reports);
        } else {
            debug!(code = %stock.code, "cache hit");
        }
        &self.stocks[&stock.code]
    }

    /// Load every uncached stock concurrently. Returns how many were loaded.
    pub async fn preload(
        &mut self,
        source: &ReportSource,
        stocks: &[StockEntry],
        opts: &LoadOptions,
    ) -> usize {
        let mut seen = std::collections::HashSet::new();
        let missing: Vec<&StockEntry> = stocks
            .iter()
            .filter(|s| !self.stocks.contains_key(&s.code) && seen.insert(s.code.as_str()))
            .collect();

        let loaded = join_all(missing.iter().map(|s| load_stock(source, s, opts))).await;
        let count = loaded.len();
        for reports in loaded {
            self.insert(reports);
        }
        info!(loaded = count, cached = self.len(), "preload finished");
        count
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.stocks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_reports(dir: &std::path::Path, code: &str, amount: &str) {
        for kind in ["balance_sheet", "income_statement", "cash_flow"] {
            fs::write(
                dir.join(format!("{}_{}.csv", code, kind)),
                format!("REPORT_DATE,STD_ITEM_NAME,AMOUNT\n2023,Total,{}\n", amount),
            )
            .unwrap();
        }
    }

    #[tokio::test]
    async fn hit_does_not_reload() {
        let dir = tempdir().unwrap();
        write_reports(dir.path(), "000001", "1");
        let source = ReportSource::directory(dir.path());
        let stock = StockEntry::new("000001");
        let opts = LoadOptions::default();

        let mut cache = FinancialCache::new();
        let first = cache.get_or_load(&source, &stock, &opts).await;
        assert_eq!(
            first.cash_flow.as_ref().unwrap().rows[0].years[&2023],
            "1.00"
        );

        // Changing the file on disk must not leak through a cache hit.
        write_reports(dir.path(), "000001", "2");
        let second = cache.get_or_load(&source, &stock, &opts).await;
        assert_eq!(
            second.cash_flow.as_ref().unwrap().rows[0].years[&2023],
            "1.00"
        );
        assert_eq!(cache.len(), 1);

        cache.remove("000001");
        let third = cache.get_or_load(&source, &stock, &opts).await;
        assert_eq!(
            third.cash_flow.as_ref().unwrap().rows[0].years[&2023],
            "2.00"
        );
    }

    #[tokio::test]
    async fn preload_loads_each_missing_stock_once() {
        let dir = tempdir().unwrap();
        write_reports(dir.path(), "000001", "1");
        write_reports(dir.path(), "000002", "2");
        let source = ReportSource::directory(dir.path());
        let opts = LoadOptions::default();
        let stocks = vec![
            StockEntry::new("000001"),
            StockEntry::new("000002"),
            StockEntry::new("000002"),
            StockEntry::new("999999"),
        ];

        let mut cache = FinancialCache::new();
        assert_eq!(cache.preload(&source, &stocks, &opts).await, 3);
        assert_eq!(cache.len(), 3);
        assert!(cache.get("999999").unwrap().all_failed());
        assert_eq!(cache.preload(&source, &stocks, &opts).await, 0);

        let mut codes: Vec<_> = cache.codes().collect();
        codes.sort();
        assert_eq!(codes, vec!["000001", "000002", "999999"]);
    }
}
