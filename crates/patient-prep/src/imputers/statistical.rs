//! Statistical imputation methods.
//!
//! Numeric columns are filled with their median, text and boolean columns
//! with their most frequent value.

use crate::error::Result;
use crate::profiler::statistics;
use crate::types::{Imputation, ImputationMethod};
use crate::utils::{
    DtypeCategory, boolean_mode, fill_boolean_nulls, fill_numeric_nulls, fill_string_nulls,
    get_dtype_category, string_mode,
};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill every column that has missing values.
    ///
    /// Statistics are taken from the frame as it is when called. Columns
    /// that cannot be filled (all missing, unsupported dtype) are left as
    /// they are.
    pub fn impute_all(df: &mut DataFrame) -> Result<Vec<Imputation>> {
        let targets: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .map(|col| col.name().to_string())
            .collect();

        let mut imputations = Vec::with_capacity(targets.len());
        for name in &targets {
            if let Some(imputation) = Self::impute_column(df, name)? {
                imputations.push(imputation);
            }
        }
        Ok(imputations)
    }

    /// Fill the missing values of a single column.
    pub fn impute_column(df: &mut DataFrame, col_name: &str) -> Result<Option<Imputation>> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let cells_filled = series.null_count();
        if cells_filled == 0 {
            return Ok(None);
        }

        let (filled, method, fill_value) = match get_dtype_category(series.dtype()) {
            DtypeCategory::Numeric => {
                let Some(median) = statistics::median(&series)? else {
                    warn!("Column '{}' has no values to take a median from", col_name);
                    return Ok(None);
                };
                (
                    fill_numeric_nulls(&series, median)?,
                    ImputationMethod::Median,
                    median.to_string(),
                )
            }
            DtypeCategory::String => {
                let Some(mode) = string_mode(&series) else {
                    warn!("Column '{}' has no values to take a mode from", col_name);
                    return Ok(None);
                };
                (
                    fill_string_nulls(&series, &mode)?,
                    ImputationMethod::Mode,
                    mode,
                )
            }
            DtypeCategory::Boolean => {
                let Some(mode) = boolean_mode(&series) else {
                    warn!("Column '{}' has no values to take a mode from", col_name);
                    return Ok(None);
                };
                (
                    fill_boolean_nulls(&series, mode)?,
                    ImputationMethod::Mode,
                    mode.to_string(),
                )
            }
            DtypeCategory::Datetime | DtypeCategory::Other => {
                warn!(
                    "Column '{}' has unsupported dtype {} for imputation, leaving {} missing",
                    col_name,
                    series.dtype(),
                    cells_filled
                );
                return Ok(None);
            }
        };

        df.replace(col_name, filled)?;
        info!(
            "Imputed {} missing values in '{}' with {:?}: {}",
            cells_filled, col_name, method, fill_value
        );
        debug!("Column '{}' now {}", col_name, df.column(col_name)?.dtype());

        Ok(Some(Imputation {
            column: col_name.to_string(),
            method,
            fill_value,
            cells_filled,
        }))
    }
}
