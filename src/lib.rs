//! `logger-merge` merges semicolon-delimited logger export files into one chronologically
//! ordered, in-memory [`types::DataSet`] and exports it as an `.xlsx` workbook.
//!
//! The primary entrypoint is [`merge::merge_logger_files`]; the result is handed to an
//! [`export::ExportCache`], which serializes each distinct dataset once.
//!
//! ## Input layout
//!
//! Every logger file is expected to be:
//!
//! - Latin-1 encoded
//! - a 7-line metadata preamble, then a `;`-delimited table with a header row
//! - numbers written with a `,` decimal separator
//! - a `Date` column (`DD/MM/YYYY`), a `Time` column (`HH:MM`) and a `Record n` column
//!
//! Any other columns are carried through. Files may have different column sets; the merged
//! dataset has the union of all columns and [`types::Value::Null`] where a file lacked one.
//!
//! ## Output
//!
//! - rows without a `Date` are dropped silently
//! - rows are stable-sorted by `Date` + `Time`
//! - `Date` holds [`types::Value::Date`], `Record n` holds [`types::Value::Int64`]
//!
//! ## Example: merge, preview and export
//!
//! ```rust
//! use logger_merge::export::ExportCache;
//! use logger_merge::ingestion::RawLogFile;
//! use logger_merge::merge::{merge_logger_files, MergeOptions};
//! use logger_merge::preview::PreviewTable;
//!
//! # fn main() -> Result<(), logger_merge::MergeError> {
//! let preamble = "Logger\nSerial\nSite\nUnits\nInterval\nStart\nEnd\n";
//! let files = vec![
//!     RawLogFile::new("a.csv", format!("{preamble}Date;Time;Record n;Temp\n01/01/2023;10:00;1;5,5\n")),
//!     RawLogFile::new("b.csv", format!("{preamble}Date;Time;Record n;Temp\n01/01/2023;09:30;1;3,2\n;;;\n")),
//! ];
//!
//! let merged = merge_logger_files(&files, &MergeOptions::default())?;
//! assert_eq!(merged.row_count(), 2);
//!
//! let preview = PreviewTable::from_dataset(&merged, Some(50));
//! assert_eq!(preview.columns, vec!["Date", "Time", "Record n", "Temp"]);
//!
//! let cache = ExportCache::default();
//! let blob = cache.get_or_export(&merged)?;
//! assert_eq!(blob.file_name, "merged_data.xlsx");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: logger file parsing, column classification and observer hooks
//! - [`processing`]: schema merge, date cleaning, timestamp derivation and ordering
//! - [`merge`]: the merge entrypoint and its options
//! - [`export`]: `.xlsx` serialization and the export cache
//! - [`preview`]: serializable preview table
//! - [`types`]: schema + in-memory dataset types
//! - [`error`]: error types

pub mod error;
pub mod export;
pub mod ingestion;
pub mod merge;
pub mod preview;
pub mod processing;
pub mod types;

pub use error::{MergeError, MergeResult};
