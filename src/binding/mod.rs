//! # Header Binding Module
//!
//! Builds a tree out of (possibly merged, multi-row) header spans, derives the
//! ordered list of leaf columns, and fills typed records from raw rows by matching
//! each field's binding path against the leaf paths.
//!
//! - [`node`]: tree construction, leaf index, sub-tree lookup
//! - [`path`]: binding paths and exact / relative matching
//! - [`record`]: field descriptors and value translators
//! - [`scan`]: single-row scanning
//! - [`batch`]: concurrent scanning of many rows
//! - [`consistency`]: header shape validation
use crate::options::UnmatchedFields;
use crate::spreadsheet::SpreadsheetError;
use thiserror::Error;

pub mod batch;
pub mod consistency;
pub mod node;
pub mod path;
pub mod record;
pub mod scan;

/// Worker count used by batch scans when none is configured.
pub const DEFAULT_SCAN_WORKERS: usize = 100;

/// Errors raised while building header trees and binding rows to records.
#[derive(Error, Debug)]
pub enum BindingError {
    /// A header span could not be resolved to coordinates
    #[error("Malformed header span {span}: {source}")]
    MalformedHeader {
        span: String,
        source: SpreadsheetError,
    },

    /// A cell could not be converted to its field type
    #[error("Invalid cell at column {column} ({path}): {source}")]
    CellConversion {
        column: usize,
        path: String,
        source: anyhow::Error,
    },

    /// Human readable form of a conversion failure
    #[error("{path} cell is invalid, please correct it")]
    InvalidCell { column: usize, path: String },

    /// A field's binding path matched no leaf column (strict mode only)
    #[error("Field '{field}' bound to '{path}' matches no header column")]
    UnboundField { field: &'static str, path: String },

    /// A panic recovered at a public entry point
    #[error("{operation}: internal error: {message}")]
    InternalFault {
        operation: &'static str,
        message: String,
    },

    /// Sheet headers differ from the declared field paths
    #[error("Header mismatch at column {position}: expected '{expected}', found '{found}'")]
    HeaderMismatch {
        position: usize,
        expected: String,
        found: String,
    },
}

impl BindingError {
    /// The 1-based column a row scan failed at, when one can be attributed.
    pub fn column(&self) -> Option<usize> {
        match self {
            Self::CellConversion { column, .. } | Self::InvalidCell { column, .. } => Some(*column),
            _ => None,
        }
    }
}

/// Tunables a tree root hands down to every node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScanSettings {
    /// Batch scan worker count, 0 for [`DEFAULT_SCAN_WORKERS`]
    pub workers: usize,
    /// Replace raw conversion errors with a message naming the header path
    pub human_error_message: bool,
    /// What to do with fields whose path matches no leaf
    pub unmatched_fields: UnmatchedFields,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            workers: 0,
            human_error_message: false,
            unmatched_fields: UnmatchedFields::Lenient,
        }
    }
}

impl ScanSettings {
    pub(crate) fn worker_count(&self) -> usize {
        if self.workers == 0 {
            DEFAULT_SCAN_WORKERS
        } else {
            self.workers
        }
    }
}
