// src/error.rs

use thiserror::Error;

/// Failure that aborts one whole report.
///
/// Each report of a stock carries its own `Result`, so one of these never
/// hides the other reports of the same ticker.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Fewer than two non-empty lines: no header or no data.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// None of the candidate file names exist at the source.
    #[error("report file not found (tried {})", .tried.join(", "))]
    NotFound { tried: Vec<String> },

    /// The payload decodes under neither the primary nor the fallback encoding.
    #[error("{file}: not valid {primary} or {fallback}")]
    Undecodable {
        file: String,
        primary: &'static str,
        fallback: &'static str,
    },

    #[error("reading {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid report url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Reason a single CSV row was left out of the pivot. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowIssue {
    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("unknown date format {0:?}")]
    UnknownDateFormat(String),
}
