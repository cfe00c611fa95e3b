//! Logger export reader.
//!
//! A logger file is Latin-1 text: a fixed metadata preamble, then a `;`-delimited table whose
//! first row holds the column names. Numbers use `,` as the decimal separator.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::{MergeError, MergeResult};
use crate::merge::MergeOptions;
use crate::types::{DataSet, DataType, Field, Schema};

use super::classify::{classify_column, convert_cell};

/// A raw logger export handed in by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogFile {
    /// Name used in diagnostics only.
    pub name: String,
    /// Undecoded file content.
    pub content: Vec<u8>,
}

impl RawLogFile {
    /// Wrap an in-memory buffer.
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a logger file from disk. The file name component becomes [`RawLogFile::name`].
    pub fn from_path(path: impl AsRef<Path>) -> MergeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, content })
    }
}

/// One parsed logger file.
#[derive(Debug, Clone, PartialEq)]
pub struct LogTable {
    /// Source file name.
    pub file: String,
    /// Typed rows. Columns without any value are typed [`DataType::Utf8`] here.
    pub dataset: DataSet,
    /// Classification result per column; `None` when the column had no values at all.
    pub inferred: Vec<Option<DataType>>,
    /// 1-based source line of each row in `dataset.rows`.
    pub lines: Vec<usize>,
}

/// Decode a logger file as ISO-8859-1. Every byte maps to exactly one character.
pub fn decode_latin1(bytes: &[u8]) -> String {
    encoding_rs::mem::decode_latin1(bytes).into_owned()
}

/// Parse one logger file into a typed [`LogTable`].
///
/// Rules:
///
/// - The first `options.skip_rows` lines are skipped unconditionally.
/// - The next non-blank line is the header; blank lines are ignored everywhere.
/// - Rows shorter than the header are padded with missing values; longer rows are an error.
/// - The date, time and record columns configured in `options` must be present.
pub fn parse_logger_file(file: &RawLogFile, options: &MergeOptions) -> MergeResult<LogTable> {
    let name = file.name.as_str();
    let text = decode_latin1(&file.content);

    let body = text.splitn(options.skip_rows + 1, '\n').nth(options.skip_rows).ok_or_else(|| {
        MergeError::schema(
            name,
            format!(
                "expected {} preamble lines followed by a header row",
                options.skip_rows
            ),
        )
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let raw_headers = rdr
        .headers()
        .map_err(|e| MergeError::schema(name, e.to_string()))?
        .clone();
    if raw_headers.is_empty() {
        return Err(MergeError::schema(name, "missing header row"));
    }
    let headers = normalize_headers(raw_headers.iter());

    for required in options.required_columns() {
        if !headers.iter().any(|h| h == required) {
            return Err(MergeError::schema(
                name,
                format!("missing required column '{required}'. headers={headers:?}"),
            ));
        }
    }

    let width = headers.len();
    let mut cells: Vec<Vec<String>> = Vec::new();
    let mut lines: Vec<usize> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| MergeError::schema(name, e.to_string()))?;
        let line = record
            .position()
            .map(|p| p.line() as usize + options.skip_rows)
            .unwrap_or_default();
        if record.len() > width {
            return Err(MergeError::schema(
                name,
                format!(
                    "line {line} has {} fields but the header has {width}",
                    record.len()
                ),
            ));
        }

        let mut row: Vec<String> = record.iter().map(|c| c.trim().to_owned()).collect();
        row.resize(width, String::new());
        cells.push(row);
        lines.push(line);
    }

    let inferred: Vec<Option<DataType>> = (0..width)
        .map(|col| classify_column(cells.iter().map(|row| row[col].as_str())))
        .collect();

    let schema = Schema::new(
        headers
            .into_iter()
            .zip(&inferred)
            .map(|(h, t)| Field::new(h, t.unwrap_or(DataType::Utf8)))
            .collect(),
    );
    let rows = cells
        .iter()
        .map(|row| {
            row.iter()
                .zip(&inferred)
                .map(|(raw, t)| convert_cell(raw, *t))
                .collect()
        })
        .collect();

    let dataset = DataSet::new(schema, rows);
    debug!(
        file = name,
        rows = dataset.row_count(),
        columns = width,
        "parsed logger file"
    );

    Ok(LogTable {
        file: name.to_owned(),
        dataset,
        inferred,
        lines,
    })
}

/// Trim header names, name empty ones `Unnamed: {index}` and suffix repeats with `.1`, `.2`, ...
fn normalize_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::new();
    for (idx, h) in raw.enumerate() {
        let base = match h.trim() {
            "" => format!("Unnamed: {idx}"),
            trimmed => trimmed.to_owned(),
        };
        let mut name = base.clone();
        if let Some(&used) = seen.get(&base) {
            let mut n = used;
            loop {
                n += 1;
                name = format!("{base}.{n}");
                if !seen.contains_key(&name) {
                    break;
                }
            }
            seen.insert(base, n);
        }
        seen.insert(name.clone(), 0);
        out.push(name);
    }
    out
}
