//! Shared utilities for the cleaning and validation pipeline.
//!
//! This module contains helpers used by both the cleaner and the validator
//! so that, for example, "duplicate row" means exactly the same thing in
//! both places.

use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for cleaning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

/// Names of the numeric columns of a frame, in column order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Series Value Extraction
// =============================================================================

/// Per-row view of a column as `f64`, with `None` for missing or unparseable cells.
///
/// The cast is non-strict, so text that does not parse as a number becomes `None`.
pub fn float_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    let ca = float_series.f64()?;
    Ok(ca
        .into_iter()
        .map(|v| v.filter(|val| !val.is_nan()))
        .collect())
}

/// Non-missing values of a column as `f64`.
pub fn present_float_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(float_values(series)?.into_iter().flatten().collect())
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Most frequent value of a column rendered as text.
///
/// Ties resolve to the smallest value in sort order, so the result is
/// deterministic regardless of hash ordering.
pub fn string_mode(series: &Series) -> Option<String> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return None;
    }

    let str_series = non_null.cast(&DataType::String).ok()?;
    let str_chunked = str_series.str().ok()?;

    let mut value_counts: HashMap<&str, usize> = HashMap::new();
    for val in str_chunked.into_iter().flatten() {
        *value_counts.entry(val).or_insert(0) += 1;
    }

    value_counts
        .into_iter()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| vb.cmp(va)))
        .map(|(val, _)| val.to_string())
}

/// Most frequent value of a boolean column (`false` wins ties).
pub fn boolean_mode(series: &Series) -> Option<bool> {
    let ca = series.bool().ok()?;
    let (mut trues, mut falses) = (0usize, 0usize);
    for val in ca.into_iter().flatten() {
        if val {
            trues += 1;
        } else {
            falses += 1;
        }
    }
    match (trues, falses) {
        (0, 0) => None,
        (t, f) => Some(t > f),
    }
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let mask = series.is_null();
    let len = series.len();
    let mut result_vec = Vec::with_capacity(len);

    for i in 0..len {
        if mask.get(i).unwrap_or(false) {
            result_vec.push(Some(fill_value));
        } else {
            let val = series.get(i)?;
            result_vec.push(Some(val.try_extract::<f64>()?));
        }
    }

    Ok(Series::new(series.name().clone(), result_vec))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let str_series = series.cast(&DataType::String)?;
    let ca = str_series.str()?;
    let result_vec: Vec<Option<String>> = ca
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value).to_string()))
        .collect();

    Ok(Series::new(series.name().clone(), result_vec))
}

/// Fill null values in a boolean Series with a specific value.
pub fn fill_boolean_nulls(series: &Series, fill_value: bool) -> PolarsResult<Series> {
    let ca = series.bool()?;
    let result_vec: Vec<Option<bool>> = ca
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();

    Ok(Series::new(series.name().clone(), result_vec))
}

// =============================================================================
// Row Utilities
// =============================================================================

/// Drop rows that exactly repeat an earlier row.
///
/// All columns take part in the comparison and two missing cells compare
/// equal. The first occurrence of each distinct row is kept and survivors
/// keep their order.
pub fn drop_duplicate_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.unique_stable(None, UniqueKeepStrategy::First, None)
}

/// Number of rows that exactly repeat an earlier row.
pub fn count_duplicate_rows(df: &DataFrame) -> PolarsResult<usize> {
    Ok(df.height() - drop_duplicate_rows(df)?.height())
}

/// Flag every row that has at least one missing cell.
pub fn rows_with_nulls(df: &DataFrame) -> Vec<bool> {
    let mut flags = vec![false; df.height()];
    for column in df.get_columns() {
        if column.null_count() == 0 {
            continue;
        }
        let nulls = column.as_materialized_series().is_null();
        for (flag, is_null) in flags.iter_mut().zip(&nulls) {
            if is_null.unwrap_or(false) {
                *flag = true;
            }
        }
    }
    flags
}

/// Keep only rows whose flag is `false`.
pub fn drop_flagged_rows(df: &DataFrame, flags: &[bool]) -> PolarsResult<DataFrame> {
    let keep: Vec<bool> = flags.iter().map(|flag| !flag).collect();
    let mask = BooleanChunked::from_slice("mask".into(), &keep);
    df.filter(&mask)
}

/// Total number of missing cells in a frame.
pub fn total_null_count(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|col| col.null_count()).sum()
}

// =============================================================================
// Tests
// =============================================================================
