//! Merge entrypoint.
//!
//! Most callers should use [`merge_logger_files`], which turns an ordered list of raw logger
//! exports into one chronologically ordered [`DataSet`]:
//!
//! - each file is decoded as Latin-1, its preamble skipped, and its columns typed
//! - per-file schemas are merged and rows concatenated in input order
//! - rows without a `Date` are dropped
//! - `Date` + `Time` become the sort key, `Date` becomes a pure date, `Record n` an integer
//! - rows are stable-sorted by the key
//!
//! Any failure aborts the whole merge. If an [`MergeObserver`] is configured, per-file
//! results, success and failure (plus alerts) are reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{MergeError, MergeResult};
use crate::ingestion::observability::{
    FileStats, MergeContext, MergeObserver, MergeSeverity, MergeStats,
};
use crate::ingestion::{parse_logger_file, RawLogFile};
use crate::processing::{
    coerce_integer_column, concat_tables, derive_timestamps, drop_missing, parse_date_column,
    sort_by_timestamp,
};
use crate::types::DataSet;

/// Options controlling how logger files are read and merged.
///
/// Use [`Default`] for the standard logger export layout.
#[derive(Clone)]
pub struct MergeOptions {
    /// Lines skipped at the top of every file before the header row.
    pub skip_rows: usize,
    /// Field delimiter.
    pub delimiter: u8,
    /// Column holding the `DD/MM/YYYY` date. Rows without it are dropped.
    pub date_column: String,
    /// Column holding the `HH:MM` time.
    pub time_column: String,
    /// Column holding the logger's record counter; coerced to integer.
    pub record_column: String,
    /// `chrono` format of the date column.
    pub date_format: String,
    /// `chrono` format of the time column.
    pub time_format: String,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn MergeObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: MergeSeverity,
}

impl MergeOptions {
    /// Columns every logger file must contain.
    pub fn required_columns(&self) -> [&str; 3] {
        [
            self.date_column.as_str(),
            self.time_column.as_str(),
            self.record_column.as_str(),
        ]
    }
}

impl fmt::Debug for MergeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeOptions")
            .field("skip_rows", &self.skip_rows)
            .field("delimiter", &(self.delimiter as char))
            .field("date_column", &self.date_column)
            .field("time_column", &self.time_column)
            .field("record_column", &self.record_column)
            .field("date_format", &self.date_format)
            .field("time_format", &self.time_format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            skip_rows: 7,
            delimiter: b';',
            date_column: "Date".to_string(),
            time_column: "Time".to_string(),
            record_column: "Record n".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            time_format: "%H:%M".to_string(),
            observer: None,
            alert_at_or_above: MergeSeverity::Critical,
        }
    }
}

/// Merge logger files into one chronologically ordered [`DataSet`].
///
/// When an observer is configured, this function reports:
///
/// - `on_file_parsed` for every file that parses
/// - `on_success` on success, with row counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Errors
///
/// - [`MergeError::EmptyInput`] if `files` is empty
/// - [`MergeError::Schema`] if a file does not have the expected layout
/// - [`MergeError::Parse`] if a date/time does not match the configured formats
/// - [`MergeError::Coercion`] if a record counter is not an integer
///
/// # Examples
///
/// ```rust
/// use logger_merge::ingestion::RawLogFile;
/// use logger_merge::merge::{merge_logger_files, MergeOptions};
/// use logger_merge::types::Value;
///
/// # fn main() -> Result<(), logger_merge::MergeError> {
/// let preamble = "a\nb\nc\nd\ne\nf\ng\n";
/// let a = RawLogFile::new("a.csv", format!("{preamble}Date;Time;Record n;T\n01/01/2023;10:00;1;5,5\n"));
/// let b = RawLogFile::new("b.csv", format!("{preamble}Date;Time;Record n;T\n01/01/2023;09:30;1;3,2\n"));
///
/// let ds = merge_logger_files(&[a, b], &MergeOptions::default())?;
/// assert_eq!(ds.row_count(), 2);
/// assert_eq!(ds.rows[0][3], Value::Float64(3.2));
/// # Ok(())
/// # }
/// ```
pub fn merge_logger_files(files: &[RawLogFile], options: &MergeOptions) -> MergeResult<DataSet> {
    let ctx = MergeContext {
        files: files.iter().map(|f| f.name.clone()).collect(),
    };
    let result = merge_impl(files, options);
    report(&ctx, options, result)
}

/// Read logger files from disk and merge them with [`merge_logger_files`].
///
/// A file that cannot be read fails the merge with [`MergeError::Io`].
pub fn merge_logger_paths<P: AsRef<Path>>(
    paths: &[P],
    options: &MergeOptions,
) -> MergeResult<DataSet> {
    let files: MergeResult<Vec<RawLogFile>> =
        paths.iter().map(|p| RawLogFile::from_path(p)).collect();
    match files {
        Ok(files) => merge_logger_files(&files, options),
        Err(e) => {
            let ctx = MergeContext {
                files: paths
                    .iter()
                    .map(|p| p.as_ref().display().to_string())
                    .collect(),
            };
            report(&ctx, options, Err(e))
        }
    }
}

fn merge_impl(
    files: &[RawLogFile],
    options: &MergeOptions,
) -> MergeResult<(DataSet, MergeStats)> {
    if files.is_empty() {
        return Err(MergeError::EmptyInput);
    }

    let mut tables = Vec::with_capacity(files.len());
    for file in files {
        let table = parse_logger_file(file, options)?;
        if let Some(obs) = options.observer.as_ref() {
            obs.on_file_parsed(
                &table.file,
                FileStats {
                    rows: table.dataset.row_count(),
                    columns: table.dataset.schema.fields.len(),
                },
            );
        }
        tables.push(table);
    }

    let mut staged = concat_tables(tables);
    let rows_read = staged.dataset.row_count();
    debug!(
        rows = rows_read,
        columns = staged.dataset.schema.fields.len(),
        "concatenated logger files"
    );

    let rows_dropped = drop_missing(&mut staged, &options.date_column);
    if rows_dropped > 0 {
        debug!(
            rows_dropped,
            column = options.date_column.as_str(),
            "dropped rows without a date"
        );
    }

    let keys = derive_timestamps(
        &staged,
        &options.date_column,
        &options.time_column,
        &options.date_format,
        &options.time_format,
    )?;
    parse_date_column(&mut staged, &options.date_column, &options.date_format)?;
    coerce_integer_column(&mut staged, &options.record_column)?;

    let dataset = sort_by_timestamp(staged, keys)?;
    let stats = MergeStats {
        files: files.len(),
        rows_read,
        rows_dropped,
        rows: dataset.row_count(),
    };
    Ok((dataset, stats))
}

fn report(
    ctx: &MergeContext,
    options: &MergeOptions,
    result: MergeResult<(DataSet, MergeStats)>,
) -> MergeResult<DataSet> {
    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok((_, stats)) => obs.on_success(ctx, *stats),
            Err(e) => {
                let sev = MergeSeverity::for_error(e);
                obs.on_failure(ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }

    result.map(|(dataset, stats)| {
        debug!(files = stats.files, rows = stats.rows, "merge complete");
        dataset
    })
}
