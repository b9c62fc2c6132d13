//! Descriptive statistics for numeric columns.
//!
//! Every function casts the column to `Float64` and drops missing and NaN
//! cells before handing it to polars. `None` means the statistic is
//! undefined for the present values.

use crate::utils::present_float_values;
use polars::prelude::*;

/// Present values of a column as a `Float64` series.
pub fn present_values(series: &Series) -> PolarsResult<Series> {
    let values = present_float_values(series)?;
    Ok(Series::new(series.name().clone(), values))
}

/// Arithmetic mean.
pub fn mean(series: &Series) -> PolarsResult<Option<f64>> {
    Ok(present_values(series)?.mean())
}

/// Sample standard deviation (ddof = 1). Needs at least two values.
pub fn sample_std(series: &Series) -> PolarsResult<Option<f64>> {
    let present = present_values(series)?;
    if present.len() < 2 {
        return Ok(None);
    }
    Ok(present.std(1))
}

/// Median of the present values.
pub fn median(series: &Series) -> PolarsResult<Option<f64>> {
    Ok(present_values(series)?.median())
}

/// Quantile with linear interpolation between closest ranks.
///
/// For `[1, 2, 3, 4, 5, 100]` the 0.25 quantile is 2.25 and the 0.75
/// quantile is 4.75.
pub fn quantile(series: &Series, q: f64) -> PolarsResult<Option<f64>> {
    let present = present_values(series)?;
    present.f64()?.quantile(q, QuantileMethod::Linear)
}

/// First and third quartiles.
pub fn quartiles(series: &Series) -> PolarsResult<Option<(f64, f64)>> {
    let present = present_values(series)?;
    let ca = present.f64()?;
    let q1 = ca.quantile(0.25, QuantileMethod::Linear)?;
    let q3 = ca.quantile(0.75, QuantileMethod::Linear)?;
    Ok(q1.zip(q3))
}
