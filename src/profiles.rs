//! Allelic profile tables of a scheme.

use serde::Serialize;

use crate::error::Result;

/// Tab-separated profile listing, one row per sequence type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ProfileTable {
    pub fn from_tsv(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(false)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at `row` under the named column.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column(column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// First row whose `column` cell equals `value`.
    pub fn find(&self, column: &str, value: &str) -> Option<&[String]> {
        let col = self.column(column)?;
        self.rows
            .iter()
            .find(|row| row.get(col).is_some_and(|cell| cell == value))
            .map(Vec::as_slice)
    }
}
