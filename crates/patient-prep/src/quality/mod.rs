//! Data quality validation module.
//!
//! [`DataValidator`] measures completeness, full-row uniqueness, column
//! dtypes and configured value ranges, and records each measurement with a
//! pass/fail verdict in a [`ValidationResult`].

mod result;
mod validator;

pub use result::{Check, CheckOutcome, MetricValue, ValidationResult, ValidationResultBuilder};
pub use validator::{COMPLETENESS_THRESHOLD, DataValidator};
