use std::collections::HashMap;

/// One data line of a report CSV, keyed by the header row's column names.
///
/// Values are trimmed but otherwise uncoerced. When the header repeats a
/// name, the later column wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn from_cells<'a, I>(headers: &[String], cells: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut cells = cells.into_iter();
        let mut fields = HashMap::with_capacity(headers.len());
        for header in headers {
            let value = cells.next().map(str::trim).unwrap_or_default();
            fields.insert(header.clone(), value.to_string());
        }
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Like [`RawRow::get`] but treats an empty cell as absent.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
