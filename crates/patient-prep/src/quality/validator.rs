use crate::config::{RangeRules, ValidationConfig};
use crate::error::Result;
use crate::pipeline::progress::{PipelineStage, ProgressReporter, ProgressUpdate};
use crate::profiler::DataProfiler;
use crate::quality::result::{Check, MetricValue, ValidationResult, ValidationResultBuilder};
use crate::reporting::{VALIDATION_REPORT_FILE, ValidationReport, sibling_path};
use crate::storage;
use crate::types::ValidationOutcome;
use crate::utils::{count_duplicate_rows, float_values, total_null_count};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Minimum completeness percentage for the completeness check to pass.
pub const COMPLETENESS_THRESHOLD: f64 = 95.0;

/// Runs quality checks over one table.
///
/// Checks never abort the run: a failing check is recorded and logged, and
/// the report is written regardless.
pub struct DataValidator {
    df: DataFrame,
    dataset: String,
    source: Option<PathBuf>,
    result: ValidationResultBuilder,
}

static_assertions::assert_impl_all!(DataValidator: Send);

impl DataValidator {
    /// Load a CSV to validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let df = storage::load_csv(path)?;
        let dataset = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut validator = Self::from_frame(df, dataset);
        validator.source = Some(path.to_path_buf());
        Ok(validator)
    }

    /// Validate an in-memory frame under the given dataset name.
    pub fn from_frame(df: DataFrame, dataset: impl Into<String>) -> Self {
        Self {
            df,
            dataset: dataset.into(),
            source: None,
            result: ValidationResultBuilder::new(),
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Result of the checks run so far.
    pub fn result(&self) -> ValidationResult {
        self.result.snapshot()
    }

    /// Percentage of non-missing cells; passes at or above
    /// [`COMPLETENESS_THRESHOLD`]. An empty table scores zero.
    pub fn validate_completeness(&mut self) -> bool {
        let (rows, columns) = self.df.shape();
        let total_cells = rows * columns;
        let completeness = if total_cells == 0 {
            0.0
        } else {
            let missing = total_null_count(&self.df);
            ((total_cells - missing) as f64 / total_cells as f64) * 100.0
        };

        let passed = completeness >= COMPLETENESS_THRESHOLD;
        if passed {
            info!("Completeness: {:.2}%", completeness);
        } else {
            warn!(
                "Completeness {:.2}% is below {:.2}%",
                completeness, COMPLETENESS_THRESHOLD
            );
        }

        self.result.record(
            Check::Completeness,
            MetricValue::Percentage(completeness),
            passed,
        );
        passed
    }

    /// Count full-row duplicates; passes only when there are none.
    ///
    /// `id_column` is logged for context and does not affect the count.
    pub fn validate_uniqueness(&mut self, id_column: Option<&str>) -> Result<bool> {
        if let Some(id) = id_column {
            debug!("Identifier column: {}", id);
        }

        let duplicates = count_duplicate_rows(&self.df)?;
        let passed = duplicates == 0;
        if passed {
            info!("No duplicate rows");
        } else {
            warn!("Found {} duplicate rows", duplicates);
        }

        self.result
            .record(Check::Uniqueness, MetricValue::Count(duplicates), passed);
        Ok(passed)
    }

    /// Record the dtype of every column. Always passes.
    pub fn validate_data_types(&mut self) -> bool {
        let dtypes = DataProfiler::column_dtypes(&self.df);
        for (name, dtype) in &dtypes {
            debug!("{}: {}", name, dtype);
        }

        self.result
            .record(Check::DataTypes, MetricValue::DataTypes(dtypes), true);
        true
    }

    /// Count values outside each rule's inclusive bounds.
    ///
    /// Text columns are cast to numbers non-strictly; cells that do not
    /// parse are ignored. Rules naming absent columns are skipped.
    pub fn validate_value_ranges(&mut self, rules: &RangeRules) -> Result<bool> {
        let mut violations = Vec::new();

        for (column, rule) in rules.iter() {
            let Ok(col) = self.df.column(column) else {
                debug!("Range rule for '{}' skipped: column not present", column);
                continue;
            };

            let outside = float_values(col.as_materialized_series())?
                .into_iter()
                .flatten()
                .filter(|v| !rule.contains(*v))
                .count();

            if outside > 0 {
                warn!("{}: {} values outside range {}", column, outside, rule);
                violations.push(format!(
                    "{}: {} values outside range {}",
                    column, outside, rule
                ));
            } else {
                debug!("{}: all values within {}", column, rule);
            }
        }

        let passed = violations.is_empty();
        self.result
            .record(Check::ValueRanges, MetricValue::Violations(violations), passed);
        Ok(passed)
    }

    /// Run every check in report order.
    pub fn validate_all(&mut self, rules: &RangeRules, id_column: Option<&str>) -> Result<bool> {
        self.validate_completeness();
        self.validate_uniqueness(id_column)?;
        self.validate_data_types();
        self.validate_value_ranges(rules)?;
        Ok(self.result.snapshot().passed())
    }

    /// Write the validation report to `path`.
    pub fn write_report(&self, path: impl AsRef<Path>) -> Result<()> {
        let result = self.result.snapshot();
        let (rows, columns) = self.df.shape();
        ValidationReport::new(&self.dataset, rows, columns, &result).write_to(path)
    }

    /// Summarize the run.
    pub fn into_outcome(self, report_path: PathBuf) -> ValidationOutcome {
        let (rows, columns) = self.df.shape();
        let result = self.result.build();
        ValidationOutcome {
            generated_at: chrono::Local::now().to_rfc3339(),
            passed: result.passed(),
            dataset: self.dataset,
            source: self.source.unwrap_or_default(),
            report_path,
            rows,
            columns,
            result,
        }
    }

    /// Load, check and report on the file described by `config`.
    pub fn run(config: &ValidationConfig) -> Result<ValidationOutcome> {
        Self::run_with_progress(config, None)
    }

    /// Like [`run`](Self::run), reporting each stage to `progress`.
    pub fn run_with_progress(
        config: &ValidationConfig,
        progress: Option<&dyn ProgressReporter>,
    ) -> Result<ValidationOutcome> {
        let notify = |stage: PipelineStage, message: &str| {
            if let Some(reporter) = progress {
                reporter.report(ProgressUpdate::new(stage, message));
            }
        };

        notify(PipelineStage::Validation, "Validating data");
        info!("Validating {}", config.source.display());
        let mut validator = Self::load(&config.source)?;
        let passed = validator.validate_all(&config.range_rules, config.id_column.as_deref())?;

        notify(PipelineStage::ReportGeneration, "Writing validation report");
        let report_path = sibling_path(&config.source, VALIDATION_REPORT_FILE);
        validator.write_report(&report_path)?;

        if passed {
            info!("All validation checks passed");
        } else {
            let failed = validator.result.snapshot().failed_checks();
            warn!("Validation failed: {:?}", failed);
        }

        Ok(validator.into_outcome(report_path))
    }
}
