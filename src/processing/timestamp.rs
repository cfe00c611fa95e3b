//! Timestamp reconstruction and type coercion for staged rows.
//!
//! Logger files split each sample's timestamp over a `Date` (`DD/MM/YYYY`) and a `Time`
//! (`HH:MM`) column. The combined value is the sort key; it is naive (no timezone) and is
//! never written back to the dataset.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::{MergeError, MergeResult};
use crate::types::{DataType, Value};

use super::concat::StagedRows;

/// Compute the timestamp key of every row from `date_column` and `time_column`.
///
/// The two cells are joined with a single space and parsed with `"{date_format} {time_format}"`.
/// There is no fallback format: a missing or malformed value fails the whole merge. `%Y` must
/// be exactly four digits.
pub fn derive_timestamps(
    staged: &StagedRows,
    date_column: &str,
    time_column: &str,
    date_format: &str,
    time_format: &str,
) -> MergeResult<Vec<NaiveDateTime>> {
    let date_idx = column_index(staged, date_column)?;
    let time_idx = column_index(staged, time_column)?;
    let format = format!("{date_format} {time_format}");
    let pattern = strict_pattern(&format)?;

    staged
        .dataset
        .rows
        .iter()
        .zip(&staged.origins)
        .map(|(row, origin)| {
            let raw = format!("{} {}", row[date_idx], row[time_idx]);
            let parsed = if pattern.is_match(&raw) {
                NaiveDateTime::parse_from_str(&raw, &format).map_err(|e| e.to_string())
            } else {
                Err(format!("does not match '{format}'"))
            };
            parsed.map_err(|message| MergeError::Parse {
                file: origin.file.to_string(),
                line: origin.line,
                column: format!("{date_column} + {time_column}"),
                raw,
                message,
            })
        })
        .collect()
}

/// Replace the text dates in `column` with [`Value::Date`] parsed with `date_format`.
pub fn parse_date_column(staged: &mut StagedRows, column: &str, date_format: &str) -> MergeResult<()> {
    let idx = column_index(staged, column)?;
    let pattern = strict_pattern(date_format)?;

    for (row, origin) in staged.dataset.rows.iter_mut().zip(&staged.origins) {
        let parsed = match &row[idx] {
            Value::Date(d) => *d,
            other => {
                let raw = other.to_string();
                let parsed = if pattern.is_match(&raw) {
                    NaiveDate::parse_from_str(&raw, date_format).map_err(|e| e.to_string())
                } else {
                    Err(format!("does not match '{date_format}'"))
                };
                parsed.map_err(|message| MergeError::Parse {
                    file: origin.file.to_string(),
                    line: origin.line,
                    column: column.to_owned(),
                    raw,
                    message,
                })?
            }
        };
        row[idx] = Value::Date(parsed);
    }

    staged.dataset.schema.fields[idx].data_type = DataType::Date;
    Ok(())
}

/// Coerce every value of `column` to [`Value::Int64`].
///
/// Floats are truncated toward zero and text must hold a plain integer. Missing values,
/// non-numeric text and non-finite floats are errors.
pub fn coerce_integer_column(staged: &mut StagedRows, column: &str) -> MergeResult<()> {
    let idx = column_index(staged, column)?;

    for (row, origin) in staged.dataset.rows.iter_mut().zip(&staged.origins) {
        let coerced = to_integer(&row[idx]).map_err(|message| MergeError::Coercion {
            file: origin.file.to_string(),
            line: origin.line,
            column: column.to_owned(),
            raw: row[idx].to_string(),
            message,
        })?;
        row[idx] = Value::Int64(coerced);
    }

    staged.dataset.schema.fields[idx].data_type = DataType::Int64;
    Ok(())
}

fn to_integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Int64(v) => Ok(*v),
        Value::Float64(f) => {
            let t = f.trunc();
            if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
                Ok(t as i64)
            } else {
                Err("cannot convert non-finite or out-of-range float to integer".to_string())
            }
        }
        Value::Utf8(s) => s.trim().parse::<i64>().map_err(|e| e.to_string()),
        Value::Null => Err("missing value".to_string()),
        Value::Date(_) => Err("expected integer, found date".to_string()),
    }
}

/// Anchored regex for the shape of `format`: `%Y` is exactly four digits, the other numeric
/// fields one or two. chrono alone accepts years of any width.
fn strict_pattern(format: &str) -> MergeResult<Regex> {
    let mut pattern = String::from("^");
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            let mut buf = [0u8; 4];
            pattern.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            continue;
        }
        match chars.next() {
            Some('Y') => pattern.push_str("[0-9]{4}"),
            Some('d' | 'm' | 'y' | 'H' | 'M' | 'S') => pattern.push_str("[0-9]{1,2}"),
            Some('%') => pattern.push('%'),
            _ => pattern.push_str(".+?"),
        }
    }
    pattern.push('$');

    Regex::new(&pattern).map_err(|e| MergeError::Schema {
        file: "<merged>".to_string(),
        message: format!("unsupported date/time format '{format}': {e}"),
    })
}

fn column_index(staged: &StagedRows, column: &str) -> MergeResult<usize> {
    staged.dataset.schema.index_of(column).ok_or_else(|| MergeError::Schema {
        file: "<merged>".to_string(),
        message: format!("missing required column '{column}'"),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::processing::concat::RowOrigin;
    use crate::types::{DataSet, Field, Schema};

    fn staged(rows: Vec<Vec<Value>>) -> StagedRows {
        let schema = Schema::new(vec![
            Field::new("Date", DataType::Utf8),
            Field::new("Time", DataType::Utf8),
            Field::new("Record n", DataType::Int64),
        ]);
        let origins = (0..rows.len())
            .map(|i| RowOrigin {
                file: Arc::from("logger.csv"),
                line: i + 9,
            })
            .collect();
        StagedRows {
            dataset: DataSet::new(schema, rows),
            origins,
        }
    }

    fn text(s: &str) -> Value {
        Value::Utf8(s.to_string())
    }

    #[test]
    fn derives_naive_timestamps() {
        let s = staged(vec![
            vec![text("01/02/2023"), text("09:30"), Value::Int64(1)],
            vec![text("1/2/2023"), text("9:05"), Value::Int64(2)],
        ]);
        let keys = derive_timestamps(&s, "Date", "Time", "%d/%m/%Y", "%H:%M").unwrap();
        assert_eq!(
            keys[0],
            NaiveDate::from_ymd_opt(2023, 2, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        );
        assert_eq!(
            keys[1],
            NaiveDate::from_ymd_opt(2023, 2, 1)
                .unwrap()
                .and_hms_opt(9, 5, 0)
                .unwrap()
        );
    }

    #[test]
    fn malformed_or_missing_time_is_a_parse_error() {
        let s = staged(vec![
            vec![text("01/02/2023"), text("09:30"), Value::Int64(1)],
            vec![text("01/02/2023"), Value::Null, Value::Int64(2)],
        ]);
        let err = derive_timestamps(&s, "Date", "Time", "%d/%m/%Y", "%H:%M").unwrap_err();
        match err {
            MergeError::Parse { file, line, .. } => {
                assert_eq!(file, "logger.csv");
                assert_eq!(line, 10);
            }
            other => panic!("unexpected error: {other}"),
        }

        let s = staged(vec![vec![text("2023-02-01"), text("09:30"), Value::Int64(1)]]);
        assert!(derive_timestamps(&s, "Date", "Time", "%d/%m/%Y", "%H:%M").is_err());

        let s = staged(vec![vec![text("01/02/2023"), text("09:30:15"), Value::Int64(1)]]);
        assert!(derive_timestamps(&s, "Date", "Time", "%d/%m/%Y", "%H:%M").is_err());
    }

    #[test]
    fn two_digit_years_are_rejected() {
        let s = staged(vec![vec![text("01/01/23"), text("10:00"), Value::Int64(1)]]);
        let err = derive_timestamps(&s, "Date", "Time", "%d/%m/%Y", "%H:%M").unwrap_err();
        assert!(matches!(err, MergeError::Parse { line: 9, .. }));
        assert!(err.to_string().contains("raw='01/01/23 10:00'"));

        let mut s = staged(vec![vec![text("01/01/23"), text("10:00"), Value::Int64(1)]]);
        assert!(matches!(
            parse_date_column(&mut s, "Date", "%d/%m/%Y"),
            Err(MergeError::Parse { .. })
        ));

        let s = staged(vec![vec![text("01/01/20230"), text("10:00"), Value::Int64(1)]]);
        assert!(derive_timestamps(&s, "Date", "Time", "%d/%m/%Y", "%H:%M").is_err());
    }

    #[test]
    fn strict_pattern_follows_the_format() {
        let p = strict_pattern("%d/%m/%Y %H:%M").unwrap();
        assert!(p.is_match("1/2/2023 9:05"));
        assert!(p.is_match("01/02/2023 09:30"));
        assert!(!p.is_match("01/02/23 09:30"));
        assert!(!p.is_match("01.02.2023 09:30"));
        assert!(strict_pattern("%Y-%m-%d").unwrap().is_match("2023-03-05"));
    }

    #[test]
    fn date_column_becomes_pure_dates() {
        let mut s = staged(vec![vec![text("31/12/2022"), text("23:50"), Value::Int64(1)]]);
        parse_date_column(&mut s, "Date", "%d/%m/%Y").unwrap();
        assert_eq!(
            s.dataset.rows[0][0],
            Value::Date(NaiveDate::from_ymd_opt(2022, 12, 31).unwrap())
        );
        assert_eq!(s.dataset.schema.fields[0].data_type, DataType::Date);
    }

    #[test]
    fn record_column_coerces_to_integers() {
        let mut s = staged(vec![
            vec![text("01/01/2023"), text("10:00"), Value::Int64(7)],
            vec![text("01/01/2023"), text("10:00"), Value::Float64(8.9)],
            vec![text("01/01/2023"), text("10:00"), text(" 9 ")],
        ]);
        coerce_integer_column(&mut s, "Record n").unwrap();
        let values: Vec<&Value> = s.dataset.column("Record n").unwrap().collect();
        assert_eq!(
            values,
            vec![&Value::Int64(7), &Value::Int64(8), &Value::Int64(9)]
        );
    }

    #[test]
    fn non_numeric_record_is_a_coercion_error() {
        let mut s = staged(vec![
            vec![text("01/01/2023"), text("10:00"), Value::Int64(1)],
            vec![text("01/01/2023"), text("10:10"), text("abc")],
        ]);
        let err = coerce_integer_column(&mut s, "Record n").unwrap_err();
        assert!(matches!(err, MergeError::Coercion { line: 10, .. }));
        assert!(err.to_string().contains("raw='abc'"));

        let mut s = staged(vec![vec![text("01/01/2023"), text("10:00"), Value::Null]]);
        assert!(matches!(
            coerce_integer_column(&mut s, "Record n"),
            Err(MergeError::Coercion { .. })
        ));
    }
}
