//! # Workbook
//!
//! An opened spreadsheet document ready for binding. Opening a workbook resolves
//! the active sheets and builds one header tree per sheet up front; every later
//! call reuses those trees.
//!
//! The first active sheet is the *default sheet*, which the unqualified row and
//! scan methods work on.
use crate::binding::batch::BatchRow;
use crate::binding::node::HeaderNode;
use crate::binding::record::RecordHandle;
use crate::binding::BindingError;
use crate::binding::ScanSettings;
use crate::error::ResultMessage;
use crate::error::SheetBinderError;
use crate::options::Options;
use crate::spreadsheet::reference::column_name;
use crate::spreadsheet::SheetSource;
use crate::spreadsheet::SpreadsheetError;
use crossbeam_channel::Receiver;
use log::debug;

pub struct Workbook<S: SheetSource> {
    source: S,
    options: Options,
    /// One tree per active sheet in workbook order, labelled by sheet name
    trees: Vec<HeaderNode>,
}

impl<S: SheetSource> Workbook<S> {
    /// Opens `source`, binding the sheets selected by `options`.
    ///
    /// Fails when the source has no sheet, or when an active sheet pattern
    /// matches none of its sheets.
    pub fn open(source: S, options: Options) -> Result<Self, SheetBinderError> {
        let names = source.sheet_names();
        if names.is_empty() {
            Err(SpreadsheetError::NoSheet)?;
        }
        for pattern in &options.active_sheets {
            if !names.iter().any(|name| pattern.matches(name)) {
                Err(SpreadsheetError::SheetNotFound(pattern.as_str().to_owned()))?;
            }
        }

        let settings = ScanSettings::from(&options);
        let trees = names
            .iter()
            .filter(|name| options.accept(name))
            .map(|name| build_tree(&source, name, options.header_rows, settings).with_prefix(name))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Opened workbook with {} of {} sheets active", trees.len(), names.len());

        Ok(Self { source, options, trees })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Names of the active sheets, in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.trees.iter().map(HeaderNode::label).collect()
    }

    /// Header tree of the default sheet.
    pub fn tree(&self) -> &HeaderNode {
        // open() leaves at least one active sheet
        &self.trees[0]
    }

    /// Header tree of an active sheet.
    pub fn sheet_tree(&self, sheet: &str) -> Option<&HeaderNode> {
        self.trees.iter().find(|tree| tree.label() == sheet)
    }

    fn require_tree(&self, sheet: &str) -> Result<&HeaderNode, SpreadsheetError> {
        self.sheet_tree(sheet)
            .ok_or_else(|| SpreadsheetError::SheetNotFound(sheet.to_owned()))
    }

    /// Finds a header node of the default sheet, e.g. `"Sales|Total"` or `"Sales.Total"`.
    pub fn sub_node(&self, path: &str) -> Option<&HeaderNode> {
        self.tree().sub_node(path)
    }

    /// First and last column of the default sheet.
    pub fn col_index_pos(&self) -> (usize, usize) {
        self.tree().col_index_pos()
    }

    pub fn row_index_pos(&self) -> (usize, usize) {
        self.tree().row_index_pos()
    }

    /// Letters of the last column of the default sheet.
    pub fn last_col_name(&self) -> Result<String, SheetBinderError> {
        let (_, col_end) = self.col_index_pos();
        Ok(column_name(col_end)?)
    }

    /// Letters of the column right after the default sheet's last column.
    pub fn next_col_name(&self) -> Result<String, SheetBinderError> {
        let (_, col_end) = self.col_index_pos();
        Ok(column_name(col_end + 1)?)
    }

    /// All rows of the default sheet, header rows included.
    pub fn rows_with_header(&self) -> Result<Vec<Vec<String>>, SheetBinderError> {
        self.sheet_rows_with_header(self.tree().label())
    }

    pub fn sheet_rows_with_header(
        &self,
        sheet: &str,
    ) -> Result<Vec<Vec<String>>, SheetBinderError> {
        self.require_tree(sheet)?;
        Ok(self.source.rows(sheet)?)
    }

    /// Rows of every active sheet. The first sheet is taken whole, later sheets
    /// contribute their data rows only.
    pub fn all_rows_with_header(&self) -> Result<Vec<Vec<String>>, SheetBinderError> {
        let mut rows = self.rows_with_header()?;
        for tree in self.trees.iter().skip(1) {
            rows.extend(self.data_rows(tree)?);
        }
        Ok(rows)
    }

    /// Data rows of the default sheet: header rows and empty rows are skipped.
    pub fn rows_without_header(&self) -> Result<Vec<Vec<String>>, SheetBinderError> {
        self.data_rows(self.tree())
    }

    pub fn sheet_rows_without_header(
        &self,
        sheet: &str,
    ) -> Result<Vec<Vec<String>>, SheetBinderError> {
        self.data_rows(self.require_tree(sheet)?)
    }

    /// Data rows of every active sheet, each sheet cut by its own header.
    pub fn all_rows_without_header(&self) -> Result<Vec<Vec<String>>, SheetBinderError> {
        let mut rows = Vec::new();
        for tree in &self.trees {
            rows.extend(self.data_rows(tree)?);
        }
        Ok(rows)
    }

    fn data_rows(&self, tree: &HeaderNode) -> Result<Vec<Vec<String>>, SheetBinderError> {
        let data_row_start = tree.data_row_start();
        let rows = self
            .source
            .rows(tree.label())
            .map_err(SheetBinderError::from)
            .with_prefix(tree.label())?;
        Ok(rows
            .into_iter()
            .skip(data_row_start)
            .filter(|row| !is_empty_row(row))
            .collect())
    }

    /// Scans one row against the default sheet's header. See [`HeaderNode::scan`].
    pub fn scan_row<T: AsRef<str>>(
        &self,
        row: &[T],
        records: &mut [&mut dyn RecordHandle],
    ) -> Result<(), BindingError> {
        self.tree().scan(row, records)
    }

    pub fn relative_scan_row<T: AsRef<str>>(
        &self,
        row: &[T],
        records: &mut [&mut dyn RecordHandle],
    ) -> Result<(), BindingError> {
        self.tree().scan_relative(row, records)
    }

    /// Scans every data row of the default sheet concurrently.
    /// See [`HeaderNode::scan_all`].
    pub fn scan_rows(
        &self,
        templates: &[&dyn RecordHandle],
    ) -> Result<Receiver<BatchRow>, SheetBinderError> {
        let rows = self.rows_without_header()?;
        Ok(self.tree().scan_all(rows, templates))
    }

    pub fn relative_scan_rows(
        &self,
        templates: &[&dyn RecordHandle],
    ) -> Result<Receiver<BatchRow>, SheetBinderError> {
        let rows = self.rows_without_header()?;
        Ok(self.tree().scan_all_relative(rows, templates))
    }

    /// True when every active sheet's header matches the fields of `templates`.
    pub fn is_header_consistent(
        &self,
        templates: &[&dyn RecordHandle],
    ) -> Result<bool, BindingError> {
        for tree in &self.trees {
            if !tree.is_consistent(templates)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Like [`Workbook::is_header_consistent`], naming the first sheet and
    /// column that disagree.
    pub fn ensure_header_consistent(
        &self,
        templates: &[&dyn RecordHandle],
    ) -> Result<(), SheetBinderError> {
        for tree in &self.trees {
            tree.ensure_consistent(templates)
                .map_err(SheetBinderError::from)
                .with_prefix(tree.label())?;
        }
        Ok(())
    }
}

fn build_tree<S: SheetSource>(
    source: &S,
    sheet: &str,
    header_rows: usize,
    settings: ScanSettings,
) -> Result<HeaderNode, SheetBinderError> {
    let col_end = source.column_count(sheet)?;
    let spans = source.header_spans(sheet, header_rows)?;
    Ok(HeaderNode::root(sheet, 1, col_end, settings).build(&spans)?)
}

fn is_empty_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}
