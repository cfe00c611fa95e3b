//! Spreadsheet export of merged datasets.
//!
//! - [`xlsx`]: serializes a [`crate::types::DataSet`] into a single-sheet `.xlsx` workbook
//! - [`cache`]: [`ExportCache`], which serializes each distinct dataset only once

pub mod cache;
pub mod xlsx;

pub use cache::{CacheStats, ExportCache, ExportFn};
pub use xlsx::{write_xlsx, ExportBlob, ExportOptions};
