//! Dataset profiling module.
//!
//! Lightweight, read-only measurements over a frame: per-column missing
//! counts and dtype listings. Numeric statistics live in [`statistics`].

pub mod statistics;

use crate::types::MissingColumn;
use indexmap::IndexMap;
use polars::prelude::*;

/// Read-only profiling helpers.
pub struct DataProfiler;

impl DataProfiler {
    /// Missing-value counts for every column that has at least one missing cell.
    ///
    /// Percentages are relative to the row count.
    pub fn missing_by_column(df: &DataFrame) -> Vec<MissingColumn> {
        let rows = df.height();
        df.get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .map(|col| {
                let missing_count = col.null_count();
                MissingColumn {
                    column: col.name().to_string(),
                    missing_count,
                    missing_percentage: (missing_count as f64 / rows as f64) * 100.0,
                }
            })
            .collect()
    }

    /// Dtype of every column, in column order.
    pub fn column_dtypes(df: &DataFrame) -> IndexMap<String, String> {
        df.get_columns()
            .iter()
            .map(|col| (col.name().to_string(), col.dtype().to_string()))
            .collect()
    }
}
