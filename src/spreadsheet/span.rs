use crate::spreadsheet::reference::coordinates_to_reference;
use crate::spreadsheet::reference::reference_to_coordinates;
use crate::spreadsheet::SpreadsheetError;
use std::fmt::Display;

/// A rectangular run of header cells sharing one label, usually a merged cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderSpan {
    /// Top-left cell name, e.g. "A1"
    pub start: String,
    /// Bottom-right cell name, e.g. "B1"
    pub end: String,
    /// Header text
    pub label: String,
}

/// Integer extent of a span, 1-based and inclusive on both ends.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Extent {
    pub col_start: usize,
    pub col_end: usize,
    pub row_start: usize,
    pub row_end: usize,
}

impl HeaderSpan {
    /// Creates a span from a range such as "A1:C2". A single cell name spans itself.
    pub fn new(range: &str, label: &str) -> Self {
        let (start, end) = range.split_once(':').unwrap_or((range, range));
        Self {
            start: start.trim().to_owned(),
            end: end.trim().to_owned(),
            label: label.to_owned(),
        }
    }

    /// Creates a single-row span covering `col_start..=col_end`.
    pub fn from_coordinates(
        col_start: usize,
        col_end: usize,
        row: usize,
        label: &str,
    ) -> Result<Self, SpreadsheetError> {
        Ok(Self {
            start: coordinates_to_reference(col_start, row)?,
            end: coordinates_to_reference(col_end, row)?,
            label: label.to_owned(),
        })
    }

    /// Resolves the axis names into integer coordinates.
    pub fn extent(&self) -> Result<Extent, SpreadsheetError> {
        let (col_start, row_start) = reference_to_coordinates(&self.start)?;
        let (col_end, row_end) = reference_to_coordinates(&self.end)?;
        Ok(Extent {
            col_start,
            col_end,
            row_start,
            row_end,
        })
    }
}

impl Display for HeaderSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} '{}'", self.start, self.end, self.label)
    }
}

/// Synthesizes header spans from plain header rows when the sheet has no merged cells.
///
/// A row is ignored when it is empty or its first cell is empty. Otherwise every
/// non-empty cell opens a span that runs up to the cell before the next non-empty
/// one, and the last span runs to the end of the row.
pub fn spans_from_header_rows(rows: &[Vec<String>]) -> Result<Vec<HeaderSpan>, SpreadsheetError> {
    let mut spans = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        if row.first().map(String::is_empty).unwrap_or(true) {
            continue;
        }

        // (label, start, end), 0-based columns
        let mut runs: Vec<(&str, usize, usize)> = Vec::new();
        for (col, text) in row.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            if let Some(last) = runs.last_mut() {
                last.2 = col - 1;
            }
            runs.push((text, col, col));
        }
        if let Some(last) = runs.last_mut() {
            last.2 = row.len() - 1;
        }

        for (label, start, end) in runs {
            spans.push(HeaderSpan::from_coordinates(start + 1, end + 1, index + 1, label)?);
        }
    }
    Ok(spans)
}
