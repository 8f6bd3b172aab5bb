//! In-memory spreadsheet: a header row plus data rows.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::CellValue;
use crate::text::normalize;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// First worksheet of a workbook, header row split from the data rows.
///
/// Rows may be ragged; reads past the end of a row see [`CellValue::Empty`]
/// and writes pad the row as needed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpreadsheetDocument {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

/// One cell that differs between two versions of a document.
///
/// `row` counts sheet rows from the header, so `row == 0` is a header cell
/// and `row == n + 1` is data row `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct CellChange {
    pub row: usize,
    pub col: usize,
    pub value: CellValue,
}

/// Key used to compare header text: trimmed, upper-cased, accents removed.
pub fn header_key(header: &str) -> String {
    normalize(header)
}

impl SpreadsheetDocument {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn from_parts(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest of the header row and every data row.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Map of header key → column index. Blank headers are skipped and the
    /// first occurrence of a repeated header wins.
    pub fn header_map(&self) -> HashMap<String, usize> {
        let mut map = HashMap::new();
        for (col, header) in self.headers.iter().enumerate() {
            let key = header_key(header);
            if !key.is_empty() {
                map.entry(key).or_insert(col);
            }
        }
        map
    }

    /// Index of the first header matching any of `names` (in `names` order).
    pub fn find_column<S: AsRef<str>>(&self, names: &[S]) -> Option<usize> {
        let map = self.header_map();
        names
            .iter()
            .find_map(|name| map.get(&header_key(name.as_ref())).copied())
    }

    /// Append a header after the last used column and return its index.
    pub fn append_column(&mut self, name: &str) -> usize {
        let col = self.column_count();
        self.headers.resize(col, String::new());
        self.headers.push(name.to_string());
        col
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Set a cell, growing the row (and row list) as needed.
    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    /// Header and data cells whose value differs from `before`.
    pub fn changes_from(&self, before: &SpreadsheetDocument) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (col, header) in self.headers.iter().enumerate() {
            if before.headers.get(col) != Some(header) && !header.is_empty() {
                changes.push(CellChange {
                    row: 0,
                    col,
                    value: CellValue::Text(header.clone()),
                });
            }
        }
        for (row, cells) in self.rows.iter().enumerate() {
            for (col, value) in cells.iter().enumerate() {
                if before.cell(row, col) != value {
                    changes.push(CellChange {
                        row: row + 1,
                        col,
                        value: value.clone(),
                    });
                }
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpreadsheetDocument {
        let mut doc = SpreadsheetDocument::new(["FECHA", " Tipo de Atención ", "", "SEXO", "sexo"]);
        doc.push_row(vec!["01-07-2025".into(), "ASISTE".into()]);
        doc
    }

    #[test]
    fn test_header_lookup_ignores_case_and_accents() {
        let doc = sample();
        assert_eq!(doc.find_column(&["TIPO DE ATENCION"]), Some(1));
        assert_eq!(doc.find_column(&["tipo de atención"]), Some(1));
        assert_eq!(doc.find_column(&["DEFICIT", "DÉFICIT"]), None);
    }

    #[test]
    fn test_first_duplicate_header_wins() {
        let doc = sample();
        assert_eq!(doc.find_column(&["SEXO"]), Some(3));
        assert!(!doc.header_map().contains_key(""));
    }

    #[test]
    fn test_append_column_after_last_used() {
        let mut doc = SpreadsheetDocument::new(["A"]);
        doc.push_row(vec!["1".into(), "2".into(), "3".into()]);
        let col = doc.append_column("CONSEJERIA");
        assert_eq!(col, 3);
        assert_eq!(doc.headers(), ["A", "", "", "CONSEJERIA"]);
    }

    #[test]
    fn test_cell_reads_past_end_are_empty() {
        let doc = sample();
        assert_eq!(doc.cell(0, 4), &CellValue::Empty);
        assert_eq!(doc.cell(9, 0), &CellValue::Empty);
    }

    #[test]
    fn test_changes_from_lists_new_headers_and_cells() {
        let before = sample();
        let mut after = before.clone();
        let col = after.append_column("CONSEJERIA");
        after.set_cell(0, col, "LME".into());
        after.set_cell(0, 1, "ASISTE".into());

        assert_eq!(
            after.changes_from(&before),
            vec![
                CellChange { row: 0, col: 5, value: "CONSEJERIA".into() },
                CellChange { row: 1, col: 5, value: "LME".into() },
            ]
        );
        assert!(before.changes_from(&before).is_empty());
    }

    #[test]
    fn test_set_cell_pads() {
        let mut doc = sample();
        doc.set_cell(2, 3, "FEMENINO".into());
        assert_eq!(doc.row_count(), 3);
        assert_eq!(doc.cell(2, 3), &CellValue::from("FEMENINO"));
        assert_eq!(doc.cell(2, 0), &CellValue::Empty);
    }
}
