//! Core data model types shared by ingestion, processing and export.
//!
//! Parsed logger files and the merged result are both in-memory [`DataSet`]s: a [`Schema`]
//! (ordered, typed [`Field`]s) plus row-major storage of tagged [`Value`]s.

use std::fmt;

use chrono::NaiveDate;

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number (comma decimals already normalized).
    Float64,
    /// Calendar date without time or timezone.
    Date,
    /// UTF-8 string.
    Utf8,
}

impl DataType {
    /// The narrowest type able to hold values of both `self` and `other`.
    ///
    /// Integers widen to floats; any other disagreement falls back to text.
    pub fn widen(self, other: DataType) -> DataType {
        match (self, other) {
            (a, b) if a == b => a,
            (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
                DataType::Float64
            }
            _ => DataType::Utf8,
        }
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single tagged value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Returns `true` for the missing-value marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert this value to `data_type`, used when per-file columns are widened.
    ///
    /// `Null` stays `Null`. Only lossless or textual conversions are performed; a value that
    /// already has the requested type is returned unchanged.
    pub fn cast(self, data_type: DataType) -> Value {
        match (self, data_type) {
            (Value::Null, _) => Value::Null,
            (Value::Int64(v), DataType::Float64) => Value::Float64(v as f64),
            (v @ Value::Utf8(_), DataType::Utf8) => v,
            (v, DataType::Utf8) => Value::Utf8(v.to_string()),
            (v, _) => v,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields. Row
/// identity is positional.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.field_names().collect()
    }

    /// Iterate the values of a named column, or `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.schema.index_of(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }
}
