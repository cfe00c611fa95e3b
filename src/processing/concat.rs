//! Schema merge and row concatenation across logger files.
//!
//! Files do not have to share a column set. [`merge_schemas`] first computes the canonical
//! column list (first-seen order, widened types); [`concat_tables`] then projects every
//! file's rows onto it, filling absent columns with [`Value::Null`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::ingestion::LogTable;
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Where a row came from, kept for diagnostics until the final ordering step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOrigin {
    /// Source file name.
    pub file: Arc<str>,
    /// 1-based line in the source file.
    pub line: usize,
}

/// Rows of all files in concatenation order, with their origins.
///
/// `origins[i]` describes `dataset.rows[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedRows {
    /// Rows on the merged schema, in concatenation order.
    pub dataset: DataSet,
    /// Source of each row, index-aligned with `dataset.rows`.
    pub origins: Vec<RowOrigin>,
}

impl StagedRows {
    /// Keep only rows for which `predicate` returns `true`, origins included.
    pub fn retain<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        let keep: Vec<bool> = self
            .dataset
            .rows
            .iter()
            .map(|row| predicate(row.as_slice()))
            .collect();
        let mut flags = keep.iter();
        self.dataset.rows.retain(|_| *flags.next().unwrap_or(&false));
        let mut flags = keep.iter();
        self.origins.retain(|_| *flags.next().unwrap_or(&false));
    }
}

/// Compute the canonical schema for a set of parsed files.
///
/// Columns appear in the order they are first seen. A column's type is the widening of
/// the types inferred in each file that had values for it; a column that never had a value
/// is [`DataType::Utf8`].
pub fn merge_schemas(tables: &[LogTable]) -> Schema {
    let mut names: Vec<String> = Vec::new();
    let mut types: Vec<Option<DataType>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for table in tables {
        for (field, inferred) in table.dataset.schema.fields.iter().zip(&table.inferred) {
            let idx = *index.entry(field.name.clone()).or_insert_with(|| {
                names.push(field.name.clone());
                types.push(None);
                names.len() - 1
            });
            types[idx] = match (types[idx], *inferred) {
                (Some(a), Some(b)) => Some(a.widen(b)),
                (a, b) => a.or(b),
            };
        }
    }

    Schema::new(
        names
            .into_iter()
            .zip(types)
            .map(|(name, t)| Field::new(name, t.unwrap_or(DataType::Utf8)))
            .collect(),
    )
}

/// Concatenate parsed files row-wise onto their merged schema.
pub fn concat_tables(tables: Vec<LogTable>) -> StagedRows {
    let schema = merge_schemas(&tables);
    let total: usize = tables.iter().map(|t| t.dataset.row_count()).sum();

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(total);
    let mut origins: Vec<RowOrigin> = Vec::with_capacity(total);

    for table in tables {
        let file: Arc<str> = Arc::from(table.file.as_str());
        let projection: Vec<Option<usize>> = schema
            .fields
            .iter()
            .map(|f| table.dataset.schema.index_of(&f.name))
            .collect();

        for (mut row, line) in table.dataset.rows.into_iter().zip(table.lines) {
            let out = schema
                .fields
                .iter()
                .zip(&projection)
                .map(|(field, src)| match src {
                    Some(i) => std::mem::replace(&mut row[*i], Value::Null).cast(field.data_type),
                    None => Value::Null,
                })
                .collect();
            rows.push(out);
            origins.push(RowOrigin {
                file: Arc::clone(&file),
                line,
            });
        }
    }

    StagedRows {
        dataset: DataSet::new(schema, rows),
        origins,
    }
}
