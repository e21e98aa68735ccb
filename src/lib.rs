//! # Sheet Binder
//!
//! Binds rows of spreadsheet sheets with multi-row, merged-cell headers to typed
//! records.
//!
//! The header of each sheet is turned into a tree: every merged header cell is a
//! node, and every leaf is one data column addressed by the labels from the top
//! header down to it (its *path*, e.g. `Sales|Total`). Record types declare, per
//! field, the path they bind to; a row is then scanned by walking the leaves left
//! to right and assigning each cell to the first field whose path matches.
//!
//! ## Features
//!
//! - **Nested headers**: headers from merged cells, or synthesized from a fixed
//!   number of plain header rows
//! - **Exact or relative binding**: match a field by its full path or by a path suffix
//! - **Concurrent batch scanning**: bounded worker pool, per-row error isolation
//! - **Header validation**: check a sheet's columns against a set of record types
//! - **Typed conversion**: built-in translators for text, numbers, booleans,
//!   dates, times and ISO 8601 durations, plus custom ones per field
//!
//! ## Example
//!
//! ```
//! use sheet_binder::binding::record::{Record, Schema};
//! use sheet_binder::options::Options;
//! use sheet_binder::spreadsheet::memory::{MemorySheet, MemoryWorkbook};
//! use sheet_binder::workbook::Workbook;
//! use std::sync::OnceLock;
//!
//! #[derive(Default)]
//! struct Sales {
//!     region: String,
//!     total: f64,
//! }
//!
//! impl Record for Sales {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: OnceLock<Schema<Sales>> = OnceLock::new();
//!         SCHEMA.get_or_init(|| {
//!             Schema::<Sales>::builder()
//!                 .field("region", "Sales|Region", |sales: &mut Sales, region: String| sales.region = region)
//!                 .field("total", "Sales|Total", |sales: &mut Sales, total: f64| sales.total = total)
//!                 .build()
//!         })
//!     }
//! }
//!
//! let source = MemoryWorkbook::new().sheet(
//!     MemorySheet::new("2024")
//!         .merge("A1:B1", "Sales")
//!         .merge("A2", "Region")
//!         .merge("B2", "Total")
//!         .row(&["Sales", ""])
//!         .row(&["Region", "Total"])
//!         .row(&["North", "12.5"]),
//! );
//! let workbook = Workbook::open(source, Options::new()).unwrap();
//!
//! let mut sales = Sales::default();
//! workbook.scan_row(&["South", "3"], &mut [&mut sales]).unwrap();
//! assert_eq!(sales.region, "South");
//! assert_eq!(sales.total, 3.0);
//! ```
mod error;
mod helpers;

pub mod binding;
pub mod options;
pub mod spreadsheet;
pub mod workbook;

pub use crate::binding::node::HeaderNode;
pub use crate::binding::record::Record;
pub use crate::binding::record::RecordHandle;
pub use crate::binding::record::Schema;
pub use crate::binding::record::Translate;
pub use crate::binding::BindingError;
pub use crate::error::SheetBinderError;
pub use crate::options::Options;
pub use crate::workbook::Workbook;
