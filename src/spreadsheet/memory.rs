use crate::spreadsheet::span::HeaderSpan;
use crate::spreadsheet::SheetSource;
use crate::spreadsheet::SpreadsheetError;

/// A sheet held entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
    pub merged_cells: Vec<HeaderSpan>,
}

impl MemorySheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Appends a row of cell text.
    pub fn row<S: AsRef<str>>(mut self, cells: &[S]) -> Self {
        self.rows.push(cells.iter().map(|cell| cell.as_ref().to_owned()).collect());
        self
    }

    /// Registers a merged region such as "A1:C1".
    pub fn merge(mut self, range: &str, label: &str) -> Self {
        self.merged_cells.push(HeaderSpan::new(range, label));
        self
    }
}

/// A workbook backed by [`MemorySheet`]s, useful for tests and for callers that
/// already decoded the document elsewhere.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorkbook {
    pub sheets: Vec<MemorySheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, sheet: MemorySheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    fn find(&self, name: &str) -> Result<&MemorySheet, SpreadsheetError> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .ok_or_else(|| SpreadsheetError::SheetNotFound(name.to_owned()))
    }
}

impl SheetSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.to_owned()).collect()
    }

    fn merged_cells(&self, sheet: &str) -> Result<Vec<HeaderSpan>, SpreadsheetError> {
        Ok(self.find(sheet)?.merged_cells.clone())
    }

    fn rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, SpreadsheetError> {
        Ok(self.find(sheet)?.rows.clone())
    }
}
