//! Row filtering for staged logger rows.

use crate::types::Value;

use super::concat::StagedRows;

/// Drop every row whose `column` is missing. Returns the number of rows dropped.
///
/// Blank or truncated trailing rows are common in logger exports; they are discarded here
/// without raising an error. If `column` does not exist every row counts as missing.
pub fn drop_missing(staged: &mut StagedRows, column: &str) -> usize {
    let before = staged.dataset.row_count();
    match staged.dataset.schema.index_of(column) {
        Some(idx) => staged.retain(|row| !matches!(row.get(idx), Some(Value::Null) | None)),
        None => staged.retain(|_| false),
    }
    before - staged.dataset.row_count()
}
