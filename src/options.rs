use crate::binding::ScanSettings;
use glob::Pattern;

/// Policy for record fields whose binding path matches no header column.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum UnmatchedFields {
    /// Leave the field at its default value
    #[default]
    Lenient,
    /// Fail the scan with [`crate::binding::BindingError::UnboundField`]
    Strict,
}

/// Settings for opening a [`crate::workbook::Workbook`].
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Sheet name patterns to bind; empty selects every sheet.
    pub active_sheets: Vec<Pattern>,
    /// Worker threads for batch scans, 0 for the default.
    pub scan_workers: usize,
    /// Report conversion failures as a message naming the header path.
    pub human_error_message: bool,
    /// Number of plain header rows; 0 reads headers from merged cells.
    pub header_rows: usize,
    pub unmatched_fields: UnmatchedFields,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sheet name or glob pattern such as `"2024-*"`.
    pub fn with_active_sheet(mut self, pattern: &str) -> Result<Self, glob::PatternError> {
        self.active_sheets.push(Pattern::new(pattern)?);
        Ok(self)
    }

    pub fn with_scan_workers(mut self, workers: usize) -> Self {
        self.scan_workers = workers;
        self
    }

    pub fn with_human_error_message(mut self, enabled: bool) -> Self {
        self.human_error_message = enabled;
        self
    }

    pub fn with_header_rows(mut self, rows: usize) -> Self {
        self.header_rows = rows;
        self
    }

    pub fn with_unmatched_fields(mut self, policy: UnmatchedFields) -> Self {
        self.unmatched_fields = policy;
        self
    }

    /// Selects the sheets to bind, keeping workbook order.
    pub(crate) fn accept(&self, sheet_name: &str) -> bool {
        self.active_sheets.is_empty()
            || self.active_sheets.iter().any(|pattern| pattern.matches(sheet_name))
    }
}

impl From<&Options> for ScanSettings {
    fn from(options: &Options) -> Self {
        ScanSettings {
            workers: options.scan_workers,
            human_error_message: options.human_error_message,
            unmatched_fields: options.unmatched_fields,
        }
    }
}
