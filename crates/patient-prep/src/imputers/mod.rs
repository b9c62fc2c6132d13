//! Imputation module for handling missing values.
//!
//! Only statistical imputation is provided: median for numeric columns,
//! most frequent value for text and boolean columns.

mod statistical;

pub use statistical::StatisticalImputer;
