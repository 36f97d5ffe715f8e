//! Export of result tables.
//!
//! This module renders category results and the summary into delimited
//! text, XLSX workbooks and annotated previews.

pub mod generator;
pub mod table;
pub mod workbook;

pub use generator::*;
pub use table::{Cell, Field, Marker, TableView};
pub use workbook::build_workbook;
