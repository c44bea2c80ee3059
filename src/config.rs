// src/config.rs

use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};
use thiserror::Error;

use crate::fetch::{LoadOptions, ReportSource, TextDecoding};
use crate::process::AmountFormat;
use crate::report::StockEntry;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown encoding label {0:?}")]
    UnknownEncoding(String),

    #[error("invalid base url {url:?}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: crate::error::ReportError,
    },

    #[error("invalid stock argument {0:?}, expected CODE or CODE:NAME")]
    StockArg(String),

    #[error("unknown output format {0:?}, expected `table` or `json`")]
    Output(String),

    #[error("no stocks configured; pass CODE[:NAME] arguments or list `stocks` in the config file")]
    NoStocks,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" | "text" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Runtime settings. Every field has a default so a YAML file may set
/// only what it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the report CSVs. Ignored when `base_url` is set.
    pub data_dir: PathBuf,
    pub base_url: Option<String>,
    pub primary_encoding: String,
    pub fallback_encoding: String,
    pub grouping_separator: char,
    pub decimal_separator: char,
    pub output: OutputFormat,
    pub stocks: Vec<StockEntry>,
}

impl Default for Config {
    fn default() -> Self {
        let format = AmountFormat::default();
        Self {
            data_dir: PathBuf::from("data"),
            base_url: None,
            primary_encoding: "utf-8".into(),
            fallback_encoding: "gbk".into(),
            grouping_separator: format.grouping_separator,
            decimal_separator: format.decimal_separator,
            output: OutputFormat::Table,
            stocks: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_yaml(path: &str, text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Defaults, then the YAML named by `FINPIVOT_CONFIG`, then the
    /// `FINPIVOT_*` overrides, then `CODE[:NAME]` arguments.
    pub fn load<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cfg = match env::var("FINPIVOT_CONFIG") {
            Ok(path) => {
                let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                Self::from_yaml(&path, &text)?
            }
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(|key| env::var(key).ok())?;
        cfg.apply_args(args)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// `lookup` stands in for `env::var` so tests need not touch the
    /// process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("FINPIVOT_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("FINPIVOT_BASE_URL") {
            self.base_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(out) = lookup("FINPIVOT_OUTPUT") {
            self.output = OutputFormat::from_str(&out).ok_or(ConfigError::Output(out))?;
        }
        Ok(())
    }

    /// Positional arguments replace the configured stock list. Either way
    /// the resulting list holds each code once.
    pub fn apply_args<I>(&mut self, args: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let stocks = args
            .into_iter()
            .map(|a| StockEntry::parse_arg(&a).ok_or(ConfigError::StockArg(a)))
            .collect::<Result<Vec<_>, _>>()?;
        if !stocks.is_empty() {
            self.stocks = stocks;
        }
        self.dedupe_stocks();
        Ok(())
    }

    /// Collapse repeated codes into the first entry, which takes the first
    /// name given for that code.
    pub fn dedupe_stocks(&mut self) {
        let mut merged: Vec<StockEntry> = Vec::with_capacity(self.stocks.len());
        for stock in self.stocks.drain(..) {
            match merged.iter_mut().find(|s| s.code == stock.code) {
                Some(kept) => {
                    if kept.name.is_none() {
                        kept.name = stock.name;
                    }
                }
                None => merged.push(stock),
            }
        }
        self.stocks = merged;
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.decoding()?;
        if self.stocks.is_empty() {
            return Err(ConfigError::NoStocks);
        }
        Ok(())
    }

    pub fn decoding(&self) -> Result<TextDecoding, ConfigError> {
        TextDecoding::from_labels(&self.primary_encoding, &self.fallback_encoding).ok_or_else(
            || {
                let bad = if encoding_known(&self.primary_encoding) {
                    &self.fallback_encoding
                } else {
                    &self.primary_encoding
                };
                ConfigError::UnknownEncoding(bad.clone())
            },
        )
    }

    pub fn load_options(&self) -> Result<LoadOptions, ConfigError> {
        Ok(LoadOptions {
            decoding: self.decoding()?,
            format: AmountFormat::new(self.grouping_separator, self.decimal_separator),
        })
    }

    pub fn source(&self) -> Result<ReportSource, ConfigError> {
        match &self.base_url {
            Some(url) => ReportSource::http(reqwest::Client::new(), url).map_err(|source| {
                ConfigError::BaseUrl {
                    url: url.clone(),
                    source,
                }
            }),
            None => Ok(ReportSource::directory(self.data_dir.clone())),
        }
    }
}

fn encoding_known(label: &str) -> bool {
    encoding_rs::Encoding::for_label(label.trim().as_bytes()).is_some()
}
