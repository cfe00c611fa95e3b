//! Normalization stages applied to parsed logger files.
//!
//! The stages run in this order inside [`crate::merge::merge_logger_files`]:
//!
//! 1. [`concat_tables`]: merge per-file schemas and concatenate rows (with their origins)
//! 2. [`drop_missing`]: discard rows without a `Date`
//! 3. [`derive_timestamps`], [`parse_date_column`], [`coerce_integer_column`]
//! 4. [`sort_by_timestamp`]: stable chronological order, fresh row positions
//!
//! Each stage is usable on its own for callers that assemble [`StagedRows`] themselves.

pub mod concat;
pub mod filter;
pub mod sort;
pub mod timestamp;

pub use concat::{concat_tables, merge_schemas, RowOrigin, StagedRows};
pub use filter::drop_missing;
pub use sort::sort_by_timestamp;
pub use timestamp::{coerce_integer_column, derive_timestamps, parse_date_column};
