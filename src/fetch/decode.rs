use encoding_rs::{Encoding, GBK, UTF_8};
use std::borrow::Cow;
use tracing::{debug, warn};

use crate::error::ReportError;

/// Primary encoding plus the one tried when the payload is not valid in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextDecoding {
    pub primary: &'static Encoding,
    pub fallback: &'static Encoding,
}

impl Default for TextDecoding {
    fn default() -> Self {
        Self {
            primary: UTF_8,
            fallback: GBK,
        }
    }
}

impl TextDecoding {
    /// Build from WHATWG labels such as `"utf-8"`, `"gbk"` or `"big5"`.
    pub fn from_labels(primary: &str, fallback: &str) -> Option<Self> {
        Some(Self {
            primary: Encoding::for_label(primary.trim().as_bytes())?,
            fallback: Encoding::for_label(fallback.trim().as_bytes())?,
        })
    }

    /// Decode `bytes`, strictly, first as `primary` then as `fallback`.
    ///
    /// A leading BOM is kept in the output text; the CSV reader strips it
    /// from the first header cell.
    pub fn decode<'b>(&self, file: &str, bytes: &'b [u8]) -> Result<Cow<'b, str>, ReportError> {
        if let Some(text) = self
            .primary
            .decode_without_bom_handling_and_without_replacement(bytes)
        {
            return Ok(text);
        }
        warn!(
            file,
            primary = self.primary.name(),
            fallback = self.fallback.name(),
            "payload is not valid in primary encoding, retrying"
        );
        match self
            .fallback
            .decode_without_bom_handling_and_without_replacement(bytes)
        {
            Some(text) => {
                debug!(file, encoding = self.fallback.name(), "decoded with fallback");
                Ok(text)
            }
            None => Err(ReportError::Undecodable {
                file: file.to_string(),
                primary: self.primary.name(),
                fallback: self.fallback.name(),
            }),
        }
    }
}
