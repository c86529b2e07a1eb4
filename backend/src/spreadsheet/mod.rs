//! Turns an uploaded spreadsheet into an ordered sequence of raw rows.
//!
//! CSV files go through the `csv` crate, every other upload is handed to
//! calamine, which sniffs xlsx, xlsm, xlsb, xls and ods. Only the first sheet of
//! a workbook is read. In both cases the first row holds the headers and every
//! following non-blank row becomes a [`RawRow`] mapping each header to its cell.

mod delimited;
mod workbook;

use chrono::{NaiveDateTime, NaiveTime};
use thiserror::Error;

/// A single spreadsheet cell, before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Wraps text, mapping the empty string to [`CellValue::Empty`].
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(text.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Renders the cell the way a person reading the sheet would type it.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.trim().to_string(),
            CellValue::Number(n) => {
                // Integers stored as floats
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) if dt.time() == NaiveTime::MIN => {
                dt.format("%Y-%m-%d").to_string()
            }
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        CellValue::from_text(text)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// One data row: header strings paired with their cells, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: impl Into<String>, value: CellValue) {
        self.cells.push((header.into(), value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(header, value)| (header.as_str(), value))
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(header, _)| header.as_str())
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.is_blank())
    }
}

impl<H: Into<String>, V: Into<CellValue>> FromIterator<(H, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (H, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(header, value)| (header.into(), value.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Excel has no sheets")]
    NoSheets,

    #[error("Failed to open spreadsheet: {0}")]
    Unreadable(String),

    #[error("Failed to read sheet '{sheet}': {reason}")]
    Sheet { sheet: String, reason: String },

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Parses an uploaded file into raw rows, picking the reader from the file name.
pub fn parse_upload(filename: &str, bytes: &[u8]) -> Result<Vec<RawRow>, SpreadsheetError> {
    if filename.to_ascii_lowercase().ends_with(".csv") {
        delimited::parse(bytes)
    } else {
        workbook::parse_first_sheet(bytes)
    }
}

/// Pairs every data row with the header row, padding short rows with empty
/// cells and dropping rows with nothing in them.
fn rows_from_grid(headers: Vec<String>, grid: Vec<Vec<CellValue>>) -> Vec<RawRow> {
    grid.into_iter()
        .map(|cells| {
            let mut cells = cells.into_iter();
            headers
                .iter()
                .map(|header| (header.clone(), cells.next().unwrap_or(CellValue::Empty)))
                .collect::<RawRow>()
        })
        .filter(|row| !row.is_blank())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_without_trailing_fraction() {
        assert_eq!(CellValue::Number(1001.0).to_text(), "1001");
        assert_eq!(CellValue::Number(12.5).to_text(), "12.5");
        assert_eq!(CellValue::Text("  INT-7 ".to_string()).to_text(), "INT-7");
    }

    #[test]
    fn midnight_datetimes_render_as_dates() {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::DateTime(dt).to_text(), "2024-01-15");
    }

    #[test]
    fn grid_rows_are_padded_and_blank_rows_dropped() {
        let headers = vec!["A".to_string(), "B".to_string()];
        let grid = vec![
            vec![CellValue::from("1")],
            vec![CellValue::Empty, CellValue::from("  ")],
            vec![CellValue::from("2"), CellValue::from("x")],
        ];

        let rows = rows_from_grid(headers, grid);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("B"), Some(&CellValue::Empty));
        assert_eq!(rows[1].get("B"), Some(&CellValue::from("x")));
    }

    #[test]
    fn unknown_extension_goes_through_the_workbook_reader() {
        let err = parse_upload("certificates.xlsx", b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, SpreadsheetError::Unreadable(_)));
    }

    #[test]
    fn csv_extension_is_case_insensitive() {
        let rows = parse_upload("BATCH.CSV", b"Certificate ID\nC-1\n").unwrap();
        assert_eq!(rows.len(), 1);
    }
}
