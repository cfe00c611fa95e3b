//! Chronological ordering of merged rows.

use chrono::NaiveDateTime;

use crate::error::{MergeError, MergeResult};
use crate::types::DataSet;

use super::concat::StagedRows;

/// Stable-sort rows by `keys` ascending and return the final dataset.
///
/// Rows with equal keys keep their concatenation order. The keys and row origins are
/// dropped; row identity in the result is the new 0-based position.
///
/// # Errors
///
/// [`MergeError::Schema`] if `keys.len()` differs from the number of staged rows.
pub fn sort_by_timestamp(staged: StagedRows, keys: Vec<NaiveDateTime>) -> MergeResult<DataSet> {
    let StagedRows { dataset, .. } = staged;
    if keys.len() != dataset.row_count() {
        return Err(MergeError::schema(
            "<merged>",
            format!(
                "expected one timestamp per row: {} timestamps for {} rows",
                keys.len(),
                dataset.row_count()
            ),
        ));
    }

    let mut keyed: Vec<(NaiveDateTime, Vec<_>)> = keys.into_iter().zip(dataset.rows).collect();
    keyed.sort_by_key(|(key, _)| *key);

    Ok(DataSet::new(
        dataset.schema,
        keyed.into_iter().map(|(_, row)| row).collect(),
    ))
}
