use thiserror::Error;

/// Convenience result type for merge and export operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Error type returned by the merge pipeline and the export cache.
///
/// Every variant is fatal to the current request: no partial dataset or blob is produced.
/// Display strings are meant to be shown to an operator verbatim.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Underlying I/O error while reading a logger file from disk.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No logger files were supplied.
    #[error("no logger files to merge")]
    EmptyInput,

    /// A logger file does not have the expected delimiter/header layout.
    #[error("schema mismatch in '{file}': {message}")]
    Schema { file: String, message: String },

    /// A `Date`/`Time` value does not match the required pattern.
    #[error("failed to parse value in '{file}' line {line} column '{column}': {message} (raw='{raw}')")]
    Parse {
        file: String,
        line: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A value could not be coerced to the column's required type (e.g. `Record n` to integer).
    #[error("failed to coerce value in '{file}' line {line} column '{column}': {message} (raw='{raw}')")]
    Coercion {
        file: String,
        line: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// The spreadsheet writer rejected the workbook.
    #[error("export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    /// A cell value cannot be represented in the spreadsheet.
    #[error("export error: unsupported value at row {row} column '{column}': {message}")]
    UnsupportedValue {
        row: usize,
        column: String,
        message: String,
    },
}

impl MergeError {
    /// Returns `true` for failures raised while serializing a dataset.
    pub fn is_export(&self) -> bool {
        matches!(self, Self::Export(_) | Self::UnsupportedValue { .. })
    }

    pub(crate) fn schema(file: &str, message: impl Into<String>) -> Self {
        Self::Schema {
            file: file.to_owned(),
            message: message.into(),
        }
    }
}
