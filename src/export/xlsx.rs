//! `.xlsx` serialization of a [`DataSet`].

use chrono::Datelike;
use rust_xlsxwriter::{ColNum, ExcelDateTime, Format, RowNum, Workbook};

use crate::error::{MergeError, MergeResult};
use crate::types::{DataSet, Value};

/// Options for workbook export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Name of the single worksheet.
    pub sheet_name: String,
    /// Suggested download file name.
    pub file_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: "data".to_string(),
            file_name: "merged_data.xlsx".to_string(),
        }
    }
}

/// A serialized workbook, ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBlob {
    /// Suggested file name.
    pub file_name: String,
    /// Workbook bytes.
    pub bytes: Vec<u8>,
}

impl ExportBlob {
    /// MIME type of the open XML spreadsheet format.
    pub const MIME_TYPE: &'static str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

    /// Workbook bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the workbook in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the blob holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Serialize `dataset` into a single-sheet workbook.
///
/// Layout:
///
/// - row 0 holds the column names in schema order
/// - each dataset row follows in order; no index column is written
/// - integers and floats become numeric cells, text becomes string cells, dates become date
///   cells formatted `yyyy-mm-dd`, and missing values are left empty
///
/// Non-finite floats cannot be stored and fail with [`MergeError::UnsupportedValue`].
pub fn write_xlsx(dataset: &DataSet, options: &ExportOptions) -> MergeResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&options.sheet_name)?;

    for (col, name) in dataset.schema.field_names().enumerate() {
        let col = col_num(col, name)?;
        worksheet.write_string(0, col, name)?;
    }

    for (idx, row) in dataset.rows.iter().enumerate() {
        let row_num = RowNum::try_from(idx + 1).map_err(|_| MergeError::UnsupportedValue {
            row: idx,
            column: String::new(),
            message: "row index exceeds worksheet limits".to_string(),
        })?;

        for (col, (value, field)) in row.iter().zip(&dataset.schema.fields).enumerate() {
            let col = col_num(col, &field.name)?;
            match value {
                Value::Null => {}
                Value::Int64(v) => {
                    worksheet.write_number(row_num, col, *v as f64)?;
                }
                Value::Float64(v) if v.is_finite() => {
                    worksheet.write_number(row_num, col, *v)?;
                }
                Value::Float64(v) => {
                    return Err(MergeError::UnsupportedValue {
                        row: idx,
                        column: field.name.clone(),
                        message: format!("non-finite number {v}"),
                    });
                }
                Value::Date(d) => {
                    let (year, month, day) =
                        ymd(*d).ok_or_else(|| MergeError::UnsupportedValue {
                            row: idx,
                            column: field.name.clone(),
                            message: format!("date {d} is outside the spreadsheet range"),
                        })?;
                    let date = ExcelDateTime::from_ymd(year, month, day)?;
                    worksheet.write_datetime_with_format(row_num, col, &date, &date_format)?;
                }
                Value::Utf8(s) => {
                    worksheet.write_string(row_num, col, s)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn col_num(idx: usize, name: &str) -> MergeResult<ColNum> {
    ColNum::try_from(idx).map_err(|_| MergeError::UnsupportedValue {
        row: 0,
        column: name.to_owned(),
        message: "column index exceeds worksheet limits".to_string(),
    })
}

fn ymd(d: chrono::NaiveDate) -> Option<(u16, u8, u8)> {
    let year = u16::try_from(d.year()).ok()?;
    Some((year, d.month() as u8, d.day() as u8))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::types::{DataType, Field, Schema};

    #[test]
    fn writes_a_zip_container() {
        let ds = DataSet::new(
            Schema::new(vec![
                Field::new("Date", DataType::Date),
                Field::new("Record n", DataType::Int64),
            ]),
            vec![vec![
                Value::Date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()),
                Value::Int64(1),
            ]],
        );
        let bytes = write_xlsx(&ds, &ExportOptions::default()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let ds = DataSet::new(
            Schema::new(vec![Field::new("Temp", DataType::Float64)]),
            vec![vec![Value::Float64(1.0)], vec![Value::Float64(f64::NAN)]],
        );
        let err = write_xlsx(&ds, &ExportOptions::default()).unwrap_err();
        assert!(err.is_export());
        assert!(matches!(err, MergeError::UnsupportedValue { row: 1, .. }));
    }

    #[test]
    fn invalid_sheet_names_fail() {
        let ds = DataSet::new(Schema::new(vec![]), vec![]);
        let opts = ExportOptions {
            sheet_name: "bad[name]".to_string(),
            ..Default::default()
        };
        let err = write_xlsx(&ds, &opts).unwrap_err();
        assert!(matches!(err, MergeError::Export(_)));
    }

    #[test]
    fn blob_reports_mime_and_size() {
        let blob = ExportBlob {
            file_name: "merged_data.xlsx".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(blob.len(), 3);
        assert!(!blob.is_empty());
        assert!(ExportBlob::MIME_TYPE.contains("spreadsheetml"));
    }
}
