//! Raw CSV tables as uploaded, before any cleaning.

use crate::error::MetrixResult;
use crate::types::UserCount;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows:    Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from in-memory headers and rows.
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Parse a CSV document. Ragged rows are accepted; a short row simply
    /// has no value for the missing cells.
    pub fn from_reader<R: io::Read>(reader: R) -> MetrixResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn from_path(path: impl AsRef<Path>) -> MetrixResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let table = Self::from_reader(io::BufReader::new(file))?;
        log::debug!(
            "Read {} rows from {}",
            table.rows.len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    /// Cell text at (row, column), if the row is long enough.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Iterate (label, users) cell pairs for two resolved columns.
    pub fn pairs(&self, label_col: usize, users_col: usize) -> impl Iterator<Item = (Option<&str>, Option<&str>)> {
        self.rows
            .iter()
            .map(move |row| (row.get(label_col).map(String::as_str), row.get(users_col).map(String::as_str)))
    }
}

/// Parse a USERS cell. Accepts a non-negative integer, or a finite
/// non-negative float with no fractional part ("1100.0").
pub fn parse_users(cell: &str) -> Option<UserCount> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<UserCount>() {
        return Some(n);
    }
    let value: f64 = trimmed.parse().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Some(value as UserCount)
    } else {
        None
    }
}
