use crate::cell::Cell;
use crate::error::{ReferenceError, Result};
use crate::references::InputRecord;
use serde::{Deserialize, Serialize};

/// Header of the tracking number column in a docket log export.
pub const TRACKING_NUMBER_COLUMN: &str = "TN #";
/// Header of the docketed date column.
pub const DOCKETED_DATE_COLUMN: &str = "Docketed Date";
/// Header of the document title column.
pub const DOCUMENT_TITLE_COLUMN: &str = "Document Title";

/// One worksheet: a header row plus typed data rows.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Build a sheet from a grid of cells, using the first non-empty row as header.
    ///
    /// Returns `EmptySheet` when the grid has no header row at all.
    pub fn from_grid(name: &str, grid: Vec<Vec<Cell>>) -> Result<Self> {
        let mut rows = grid.into_iter();

        let header_row = loop {
            match rows.next() {
                Some(row) if row.iter().any(has_content) => break row,
                Some(_) => continue,
                None => {
                    return Err(ReferenceError::EmptySheet {
                        name: name.to_string(),
                    });
                }
            }
        };

        let headers = header_row
            .iter()
            .map(|cell| cell.as_identifier().unwrap_or_default())
            .collect();

        Ok(Sheet {
            name: name.to_string(),
            headers,
            rows: rows.collect(),
        })
    }

    /// Spreadsheet-style column letters (1 = A, 27 = AA).
    pub fn col_to_letter(col: usize) -> String {
        let mut col = col;
        let mut result = String::new();
        while col > 0 {
            col -= 1;
            result.push(((col % 26) as u8 + b'A') as char);
            col /= 26;
        }
        result.chars().rev().collect()
    }

    /// Find a column by header name, ignoring surrounding whitespace and ASCII case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(wanted))
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| ReferenceError::MissingColumn {
                column: name.to_string(),
                available: self
                    .headers
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| !h.trim().is_empty())
                    .map(|(i, h)| format!("{}: {}", Self::col_to_letter(i + 1), h.trim()))
                    .collect(),
            })
    }

    /// Cell at a row/column, treating ragged rows as padded with empties.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }

    /// Extract the three docket columns of every data row.
    ///
    /// Fails with `MissingColumn` when any required header is absent. Rows are
    /// returned unfiltered; incomplete ones are dropped later by the builder.
    pub fn records(&self) -> Result<Vec<InputRecord>> {
        let tn_col = self.require_column(TRACKING_NUMBER_COLUMN)?;
        let date_col = self.require_column(DOCKETED_DATE_COLUMN)?;
        let title_col = self.require_column(DOCUMENT_TITLE_COLUMN)?;

        Ok((0..self.rows.len())
            .map(|r| InputRecord {
                tracking_number: self.cell(r, tn_col).clone(),
                docketed_date: self.cell(r, date_col).clone(),
                document_title: self.cell(r, title_col).clone(),
            })
            .collect())
    }
}

// A header cell needs visible text; whitespace-only rows are skipped.
fn has_content(cell: &Cell) -> bool {
    cell.as_identifier().is_some_and(|s| !s.is_empty())
}
