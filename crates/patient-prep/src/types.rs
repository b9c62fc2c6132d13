use crate::config::{MissingValueStrategy, OutlierMethod};
use crate::quality::ValidationResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Missing-value count for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingColumn {
    pub column: String,
    pub missing_count: usize,
    /// Relative to the row count at the time of measurement.
    pub missing_percentage: f64,
}

/// How a column's missing values were filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationMethod {
    Median,
    Mode,
}

/// A single imputation decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Imputation {
    pub column: String,
    pub method: ImputationMethod,
    /// Fill value rendered as text.
    pub fill_value: String,
    pub cells_filled: usize,
}

/// Result of the missing-value step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueSummary {
    pub strategy: MissingValueStrategy,
    /// Columns that had missing values before the step ran.
    pub columns: Vec<MissingColumn>,
    /// Rows removed by [`MissingValueStrategy::Drop`].
    pub rows_removed: usize,
    pub imputations: Vec<Imputation>,
}

impl MissingValueSummary {
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing_count).sum()
    }
}

/// Outliers found in one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierFinding {
    pub column: String,
    pub method: OutlierMethod,
    pub count: usize,
    /// Relative to the row count.
    pub percentage: f64,
    /// Inclusive fence below which values are outliers.
    pub lower_bound: f64,
    /// Inclusive fence above which values are outliers.
    pub upper_bound: f64,
}

/// Everything a cleaning run did, in machine-readable form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningOutcome {
    pub generated_at: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub report_path: PathBuf,
    pub shape_before: (usize, usize),
    pub shape_after: (usize, usize),
    pub columns_renamed: bool,
    pub duplicates_removed: usize,
    pub missing: MissingValueSummary,
    pub outliers: Vec<OutlierFinding>,
    pub outlier_rows_removed: usize,
}

/// Everything a validation run measured, in machine-readable form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub generated_at: String,
    pub dataset: String,
    pub source: PathBuf,
    pub report_path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub result: ValidationResult,
    pub passed: bool,
}

/// Outcome of a full clean-then-validate run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub cleaning: CleaningOutcome,
    pub validation: ValidationOutcome,
}

impl PipelineOutcome {
    pub fn passed(&self) -> bool {
        self.validation.passed
    }
}
