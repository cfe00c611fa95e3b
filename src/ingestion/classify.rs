//! Per-column type classification for raw logger cells.
//!
//! Logger exports write numbers with a comma decimal separator (`5,5`). Each column is
//! inspected as a whole: it becomes numeric only if every non-missing cell looks numeric,
//! otherwise it stays text. The result is a typed column of [`Value`]s.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{DataType, Value};

static INTEGER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").unwrap());
static DECIMAL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+(,[0-9]+)?$").unwrap());

/// Classify a column from its raw (already trimmed) cells.
///
/// Returns `None` when the column has no non-missing cell, i.e. no type evidence.
pub fn classify_column<'a, I>(cells: I) -> Option<DataType>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen_any = false;
    let mut all_int = true;
    let mut all_decimal = true;

    for cell in cells.into_iter().filter(|c| !c.is_empty()) {
        seen_any = true;
        if all_int && !(INTEGER_PATTERN.is_match(cell) && cell.parse::<i64>().is_ok()) {
            all_int = false;
        }
        if !DECIMAL_PATTERN.is_match(cell) {
            all_decimal = false;
            break;
        }
    }

    if !seen_any {
        None
    } else if all_int {
        Some(DataType::Int64)
    } else if all_decimal {
        Some(DataType::Float64)
    } else {
        Some(DataType::Utf8)
    }
}

/// Convert a trimmed raw cell into a [`Value`] of the classified column type.
///
/// Callers only pass types returned by [`classify_column`] for the same column, so numeric
/// parsing cannot fail; a cell that still does not parse is kept as text.
pub fn convert_cell(raw: &str, data_type: Option<DataType>) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match data_type {
        Some(DataType::Int64) => raw
            .parse::<i64>()
            .map(Value::Int64)
            .unwrap_or_else(|_| Value::Utf8(raw.to_owned())),
        Some(DataType::Float64) => parse_comma_decimal(raw)
            .map(Value::Float64)
            .unwrap_or_else(|| Value::Utf8(raw.to_owned())),
        _ => Value::Utf8(raw.to_owned()),
    }
}

/// Parse `-12,5` style numbers.
pub fn parse_comma_decimal(raw: &str) -> Option<f64> {
    raw.replacen(',', ".", 1).parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_columns_stay_integer() {
        assert_eq!(classify_column(["1", "-2", "", "30"]), Some(DataType::Int64));
    }

    #[test]
    fn comma_decimals_make_a_float_column() {
        assert_eq!(classify_column(["1", "5,5", "-0,25"]), Some(DataType::Float64));
        assert_eq!(convert_cell("-0,25", Some(DataType::Float64)), Value::Float64(-0.25));
        assert_eq!(convert_cell("3", Some(DataType::Float64)), Value::Float64(3.0));
    }

    #[test]
    fn dot_decimals_and_text_are_not_numeric() {
        assert_eq!(classify_column(["1.5"]), Some(DataType::Utf8));
        assert_eq!(classify_column(["1", "n/a"]), Some(DataType::Utf8));
        assert_eq!(classify_column(["01/01/2023"]), Some(DataType::Utf8));
        assert_eq!(classify_column(["10:00"]), Some(DataType::Utf8));
        assert_eq!(classify_column(["1,2,3"]), Some(DataType::Utf8));
    }

    #[test]
    fn integers_overflowing_i64_fall_back_to_float() {
        assert_eq!(
            classify_column(["99999999999999999999"]),
            Some(DataType::Float64)
        );
    }

    #[test]
    fn empty_column_has_no_evidence() {
        assert_eq!(classify_column(["", ""]), None);
        assert_eq!(convert_cell("", Some(DataType::Int64)), Value::Null);
        assert_eq!(convert_cell("abc", None), Value::Utf8("abc".to_string()));
    }
}
