use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RowIssue;

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("ISO date pattern should be valid"));
static BARE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})$").expect("bare year pattern should be valid"));
static CJK_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})年$").expect("CJK year pattern should be valid"));

/// Map a `REPORT_DATE` cell to its fiscal year.
///
/// Tried in order, first match wins:
/// - `"YYYY-MM-DD"`, which must be a real calendar date (no timezone applied)
/// - `"YYYY"`
/// - `"YYYY年"`
pub fn parse_fiscal_year(s: &str) -> Result<i32, RowIssue> {
    let s = s.trim();

    if ISO_DATE.is_match(s) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(|d| d.year())
            .map_err(|_| RowIssue::UnknownDateFormat(s.to_string()));
    }

    BARE_YEAR
        .captures(s)
        .or_else(|| CJK_YEAR.captures(s))
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| RowIssue::UnknownDateFormat(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_formats_yield_the_year() {
        assert_eq!(parse_fiscal_year("2023-06-30"), Ok(2023));
        assert_eq!(parse_fiscal_year("2023"), Ok(2023));
        assert_eq!(parse_fiscal_year("2023年"), Ok(2023));
        assert_eq!(parse_fiscal_year(" 2019-12-31 "), Ok(2019));
    }

    #[test]
    fn year_end_is_not_shifted() {
        assert_eq!(parse_fiscal_year("2022-12-31"), Ok(2022));
        assert_eq!(parse_fiscal_year("2023-01-01"), Ok(2023));
    }

    #[test]
    fn other_formats_are_rejected() {
        for s in [
            "June 2023",
            "2023/06/30",
            "23",
            "20230630",
            "2023-6-30",
            "2023-02-30",
            "2023年6月",
            "",
        ] {
            assert_eq!(
                parse_fiscal_year(s),
                Err(RowIssue::UnknownDateFormat(s.to_string())),
                "{:?} should not parse",
                s
            );
        }
    }
}
