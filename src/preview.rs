//! Read-only preview of a merged dataset for display.

use serde::Serialize;

use crate::types::{DataSet, Value};

/// A serializable snapshot of a [`DataSet`] for a presentation layer.
///
/// Cells are plain JSON scalars: numbers, strings, ISO `YYYY-MM-DD` dates and `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewTable {
    /// Column names in schema order.
    pub columns: Vec<String>,
    /// The previewed rows (possibly fewer than `row_count`).
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Total number of rows in the dataset.
    pub row_count: usize,
}

impl PreviewTable {
    /// Build a preview of at most `limit` rows (all rows when `None`).
    pub fn from_dataset(dataset: &DataSet, limit: Option<usize>) -> Self {
        let take = limit.unwrap_or(dataset.row_count());
        Self {
            columns: dataset.schema.field_names().map(str::to_owned).collect(),
            rows: dataset
                .rows
                .iter()
                .take(take)
                .map(|row| row.iter().map(json_cell).collect())
                .collect(),
            row_count: dataset.row_count(),
        }
    }

    /// Serialize the preview as a JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn json_cell(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Int64(v) => serde_json::Value::from(*v),
        // NaN and infinities have no JSON form.
        Value::Float64(v) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Date(_) | Value::Utf8(_) => serde_json::Value::String(value.to_string()),
    }
}
