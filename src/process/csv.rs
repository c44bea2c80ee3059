// src/process/csv.rs

use tracing::trace;

use crate::error::ReportError;
use crate::process::raw_row::RawRow;
use crate::process::utils::{non_empty_lines, strip_bom};

/// Split report CSV text into header-keyed rows.
///
/// The first non-empty line is the header; every later non-empty line
/// becomes one [`RawRow`]. Cells are split on every comma: quoted fields
/// are NOT supported, so a quoted value containing a comma spills into
/// the next column. Missing trailing cells read as empty strings and cells
/// beyond the header width are ignored.
pub fn parse_csv(text: &str) -> Result<Vec<RawRow>, ReportError> {
    let mut lines = non_empty_lines(text);

    let header_line = lines
        .next()
        .ok_or_else(|| ReportError::MalformedInput("no header line".into()))?;
    let mut headers: Vec<String> = header_line
        .split(',')
        .map(|h| h.trim().to_string())
        .collect();
    if let Some(first) = headers.first_mut() {
        *first = strip_bom(first).to_string();
    }

    let rows: Vec<RawRow> = lines
        .map(|line| RawRow::from_cells(&headers, line.split(',')))
        .collect();
    if rows.is_empty() {
        return Err(ReportError::MalformedInput("no data lines".into()));
    }

    trace!(columns = headers.len(), rows = rows.len(), "parsed csv");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_keys_rows_positionally() {
        let text = "REPORT_DATE, STD_ITEM_NAME ,AMOUNT\n2023-12-31,Revenue , 100\n";
        let rows = parse_csv(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("REPORT_DATE"), Some("2023-12-31"));
        assert_eq!(rows[0].get("STD_ITEM_NAME"), Some("Revenue"));
        assert_eq!(rows[0].get("AMOUNT"), Some("100"));
    }

    #[test]
    fn bom_does_not_change_headers() {
        let plain = parse_csv("REPORT_DATE,AMOUNT\n2023,1\n").unwrap();
        let with_bom = parse_csv("\u{feff}REPORT_DATE,AMOUNT\n2023,1\n").unwrap();
        assert_eq!(plain, with_bom);
        assert_eq!(with_bom[0].get("REPORT_DATE"), Some("2023"));
    }

    #[test]
    fn short_rows_pad_and_long_rows_truncate() {
        let rows = parse_csv("A,B,C\n1\n1,2,3,4,5\n").unwrap();
        assert_eq!(rows[0].get("B"), Some(""));
        assert_eq!(rows[0].get("C"), Some(""));
        assert_eq!(rows[1].len(), 3);
        assert_eq!(rows[1].get("C"), Some("3"));
    }

    #[test]
    fn blank_lines_and_crlf_are_ignored() {
        let rows = parse_csv("A,B\r\n\r\n1,2\r\n   \n3,4\r\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("B"), Some("2"));
        assert_eq!(rows[1].get("A"), Some("3"));
    }

    #[test]
    fn duplicate_header_later_column_shadows() {
        let rows = parse_csv("AMOUNT,AMOUNT\n1,2\n").unwrap();
        assert_eq!(rows[0].get("AMOUNT"), Some("2"));
    }

    #[test]
    fn quoted_commas_are_not_special() {
        let rows = parse_csv("NAME,AMOUNT\n\"a,b\",5\n").unwrap();
        assert_eq!(rows[0].get("NAME"), Some("\"a"));
        assert_eq!(rows[0].get("AMOUNT"), Some("b\""));
    }

    #[test]
    fn fewer_than_two_lines_is_malformed() {
        for text in ["", "\n\n  \n", "A,B,C\n", "\u{feff}A,B\n\n"] {
            assert!(
                matches!(parse_csv(text), Err(ReportError::MalformedInput(_))),
                "expected MalformedInput for {:?}",
                text
            );
        }
    }
}
