pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod process;
pub mod render;
pub mod report;

pub use cache::FinancialCache;
pub use error::{ReportError, RowIssue};
pub use report::{Report, ReportKind, ReportRow, StockEntry, StockReports};
