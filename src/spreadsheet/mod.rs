//! # Spreadsheet Access Module
//!
//! The binding engine never opens files itself. It talks to a [`SheetSource`],
//! which hands out the header spans and raw text rows of each sheet, and uses the
//! helpers in [`reference`] to move between cell names and coordinates.
use crate::spreadsheet::span::spans_from_header_rows;
use crate::spreadsheet::span::HeaderSpan;
use thiserror::Error;

pub mod memory;
pub mod reference;
pub mod span;

/// Errors raised while resolving sheets and cell names.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Sheet '{0}' is invalid or doesn't exist")]
    SheetNotFound(String),

    #[error("No sheet exists")]
    NoSheet,

    #[error("Invalid cell reference '{0}'")]
    InvalidReference(String),

    #[error("Invalid column '{0}'")]
    InvalidColumn(String),
}

/// Read access to the sheets of an opened spreadsheet document.
pub trait SheetSource: Send + Sync {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Merged-cell regions of a sheet, in row-major order.
    fn merged_cells(&self, sheet: &str) -> Result<Vec<HeaderSpan>, SpreadsheetError>;

    /// All rows of a sheet as raw cell text, header rows included.
    fn rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, SpreadsheetError>;

    /// Number of used columns in a sheet.
    fn column_count(&self, sheet: &str) -> Result<usize, SpreadsheetError> {
        Ok(self.rows(sheet)?.iter().map(Vec::len).max().unwrap_or(0))
    }

    /// Header spans of a sheet: merged cells when `header_rows` is 0, otherwise
    /// spans synthesized from the first `header_rows` rows.
    fn header_spans(&self, sheet: &str, header_rows: usize) -> Result<Vec<HeaderSpan>, SpreadsheetError> {
        if header_rows == 0 {
            self.merged_cells(sheet)
        } else {
            let rows = self.rows(sheet)?;
            let count = header_rows.min(rows.len());
            spans_from_header_rows(&rows[..count])
        }
    }
}
