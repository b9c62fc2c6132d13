//! Outlier detection module.
//!
//! Detection runs per numeric column and never touches missing cells.
//! Removal is a separate, opt-in step driven by the same per-column flags.

use crate::config::OutlierMethod;
use crate::error::Result;
use crate::profiler::statistics;
use crate::types::OutlierFinding;
use crate::utils::{float_values, numeric_column_names};
use polars::prelude::*;
use tracing::debug;

/// Multiplier applied to the IQR to place the fences.
pub const IQR_FENCE: f64 = 1.5;

/// Absolute z-score above which a value is an outlier.
pub const ZSCORE_THRESHOLD: f64 = 3.0;

/// Per-column outlier flags and the fences that produced them.
#[derive(Debug, Clone)]
pub struct ColumnOutliers {
    pub column: String,
    pub flags: Vec<bool>,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ColumnOutliers {
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }
}

/// Detects outliers in numeric columns.
#[derive(Debug, Clone, Copy)]
pub struct OutlierDetector {
    method: OutlierMethod,
}

impl OutlierDetector {
    pub fn new(method: OutlierMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> OutlierMethod {
        self.method
    }

    /// Flag outliers in one column.
    ///
    /// Returns `None` when the column has no usable spread: no present values
    /// for IQR, fewer than two values or zero standard deviation for z-score.
    pub fn flag_column(&self, series: &Series) -> Result<Option<ColumnOutliers>> {
        let values = float_values(series)?;

        let flagged = match self.method {
            OutlierMethod::Iqr => {
                let Some((q1, q3)) = statistics::quartiles(series)? else {
                    return Ok(None);
                };
                let iqr = q3 - q1;
                let lower = q1 - IQR_FENCE * iqr;
                let upper = q3 + IQR_FENCE * iqr;
                debug!(
                    "{}: Q1={:.4}, Q3={:.4}, bounds=[{:.4}, {:.4}]",
                    series.name(),
                    q1,
                    q3,
                    lower,
                    upper
                );
                let flags = values
                    .iter()
                    .map(|v| v.is_some_and(|v| v < lower || v > upper))
                    .collect();
                (flags, lower, upper)
            }
            OutlierMethod::ZScore => {
                let (Some(mean), Some(std)) =
                    (statistics::mean(series)?, statistics::sample_std(series)?)
                else {
                    return Ok(None);
                };
                if std == 0.0 || !std.is_finite() {
                    debug!("{}: zero spread, no z-score outliers", series.name());
                    return Ok(None);
                }
                debug!("{}: mean={:.4}, std={:.4}", series.name(), mean, std);
                let flags = values
                    .iter()
                    .map(|v| v.is_some_and(|v| ((v - mean) / std).abs() > ZSCORE_THRESHOLD))
                    .collect();
                (
                    flags,
                    mean - ZSCORE_THRESHOLD * std,
                    mean + ZSCORE_THRESHOLD * std,
                )
            }
        };

        let (flags, lower_bound, upper_bound) = flagged;
        Ok(Some(ColumnOutliers {
            column: series.name().to_string(),
            flags,
            lower_bound,
            upper_bound,
        }))
    }

    /// Flags for every numeric column of the frame, in column order.
    pub fn flag_frame(&self, df: &DataFrame) -> Result<Vec<ColumnOutliers>> {
        let mut result = Vec::new();
        for name in numeric_column_names(df) {
            let series = df.column(&name)?.as_materialized_series();
            if let Some(outliers) = self.flag_column(series)? {
                result.push(outliers);
            }
        }
        Ok(result)
    }

    /// Findings for every numeric column holding at least one outlier.
    pub fn detect(&self, df: &DataFrame) -> Result<Vec<OutlierFinding>> {
        let rows = df.height();
        Ok(self
            .flag_frame(df)?
            .into_iter()
            .filter_map(|col| {
                let count = col.count();
                (count > 0).then(|| OutlierFinding {
                    percentage: (count as f64 / rows as f64) * 100.0,
                    column: col.column,
                    method: self.method,
                    count,
                    lower_bound: col.lower_bound,
                    upper_bound: col.upper_bound,
                })
            })
            .collect())
    }

    /// Flag every row holding an outlier in any numeric column.
    pub fn outlier_rows(&self, df: &DataFrame) -> Result<Vec<bool>> {
        let mut rows = vec![false; df.height()];
        for col in self.flag_frame(df)? {
            for (row, flag) in rows.iter_mut().zip(&col.flags) {
                *row |= *flag;
            }
        }
        Ok(rows)
    }
}
