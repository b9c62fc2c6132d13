//! Data cleaning module.
//!
//! [`DataCleaner`] owns a frame for the length of one run and applies the
//! cleaning steps in a fixed order:
//!
//! 1. Standardize column names
//! 2. Remove exact duplicate rows
//! 3. Analyze, drop or impute missing values
//! 4. Detect outliers (and optionally remove the rows holding them)
//! 5. Save the frame and the cleaning report
//!
//! Every step appends to a [`CleaningReportBuilder`] so the report always
//! mirrors what was actually done.

mod sanitizers;

use crate::config::{CleaningConfig, MissingValueStrategy, OutlierMethod};
use crate::error::Result;
use crate::imputers::StatisticalImputer;
use crate::pipeline::outliers::OutlierDetector;
use crate::pipeline::progress::{PipelineStage, ProgressReporter, ProgressUpdate};
use crate::profiler::DataProfiler;
use crate::reporting::{CLEANING_REPORT_FILE, CleaningReport, CleaningReportBuilder, sibling_path};
use crate::storage;
use crate::types::{CleaningOutcome, MissingValueSummary, OutlierFinding};
use crate::utils::{drop_duplicate_rows, drop_flagged_rows, rows_with_nulls};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Cleans one table and records what it did.
pub struct DataCleaner {
    df: DataFrame,
    source: Option<PathBuf>,
    report: CleaningReportBuilder,
    shape_before: (usize, usize),
    columns_renamed: bool,
    duplicates_removed: usize,
    missing: Option<MissingValueSummary>,
    outliers: Vec<OutlierFinding>,
    outlier_rows_removed: usize,
}

static_assertions::assert_impl_all!(DataCleaner: Send);

impl DataCleaner {
    /// Load a raw CSV and start a cleaning run over it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let df = storage::load_csv(path)?;
        let mut cleaner = Self::from_frame(df);
        cleaner.source = Some(path.to_path_buf());
        Ok(cleaner)
    }

    /// Start a cleaning run over an in-memory frame.
    pub fn from_frame(df: DataFrame) -> Self {
        let shape_before = df.shape();
        let mut report = CleaningReportBuilder::new();
        report.original_shape(shape_before.0, shape_before.1);

        Self {
            df,
            source: None,
            report,
            shape_before,
            columns_renamed: false,
            duplicates_removed: 0,
            missing: None,
            outliers: Vec::new(),
            outlier_rows_removed: 0,
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_frame(self) -> DataFrame {
        self.df
    }

    /// Report entries accumulated so far.
    pub fn report(&self) -> CleaningReport {
        self.report.snapshot()
    }

    /// Lower-case column names and replace spaces and hyphens with underscores.
    ///
    /// Returns whether any name changed.
    pub fn standardize_column_names(&mut self) -> Result<bool> {
        let current: Vec<String> = self
            .df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let standardized = sanitizers::standardize_column_names(&current)?;

        if standardized == current {
            debug!("Column names already standardized");
            return Ok(false);
        }

        self.df
            .set_column_names(standardized.iter().map(String::as_str))?;
        self.columns_renamed = true;
        self.report.columns_standardized();
        info!("Column names standardized: {:?}", standardized);
        Ok(true)
    }

    /// Remove rows that exactly repeat an earlier row, keeping the first.
    pub fn remove_duplicates(&mut self) -> Result<usize> {
        let deduped = drop_duplicate_rows(&self.df)?;
        let removed = self.df.height() - deduped.height();

        if removed > 0 {
            self.df = deduped;
            warn!("Removed {} duplicate rows", removed);
        } else {
            info!("No duplicate rows found");
        }

        self.duplicates_removed += removed;
        self.report.duplicates(removed);
        Ok(removed)
    }

    /// Report missing values and apply `strategy` to them.
    pub fn handle_missing_values(
        &mut self,
        strategy: MissingValueStrategy,
    ) -> Result<MissingValueSummary> {
        let columns = DataProfiler::missing_by_column(&self.df);
        let mut summary = MissingValueSummary {
            strategy,
            columns,
            rows_removed: 0,
            imputations: Vec::new(),
        };

        if summary.columns.is_empty() {
            info!("No missing values");
            self.report.no_missing_values();
            self.missing = Some(summary.clone());
            return Ok(summary);
        }

        for column in &summary.columns {
            self.report.missing_column(column);
            debug!(
                "Missing in {}: {} ({:.2}%)",
                column.column, column.missing_count, column.missing_percentage
            );
        }
        info!(
            "{} missing values across {} columns, strategy '{}'",
            summary.total_missing(),
            summary.columns.len(),
            strategy
        );

        match strategy {
            MissingValueStrategy::Analyze => {}
            MissingValueStrategy::Drop => {
                let flags = rows_with_nulls(&self.df);
                let removed = flags.iter().filter(|f| **f).count();
                self.df = drop_flagged_rows(&self.df, &flags)?;
                summary.rows_removed = removed;
                self.report.rows_removed_for_missing(removed);
                info!("Rows removed (missing values): {}", removed);
            }
            MissingValueStrategy::Impute => {
                summary.imputations = StatisticalImputer::impute_all(&mut self.df)?;
                self.report.missing_values_imputed();
            }
        }

        self.missing = Some(summary.clone());
        Ok(summary)
    }

    /// Report outliers in every numeric column. The frame is not changed.
    pub fn detect_outliers(&mut self, method: OutlierMethod) -> Result<Vec<OutlierFinding>> {
        let findings = OutlierDetector::new(method).detect(&self.df)?;

        for finding in &findings {
            self.report.outliers(finding);
            info!(
                "Outliers in {}: {} ({:.2}%)",
                finding.column, finding.count, finding.percentage
            );
        }
        if findings.is_empty() {
            debug!("No outliers detected with {}", method);
        }

        self.outliers = findings.clone();
        Ok(findings)
    }

    /// Remove every row holding an outlier in any numeric column.
    ///
    /// Fences are computed per column on the frame before removal.
    pub fn remove_outliers(&mut self, method: OutlierMethod) -> Result<usize> {
        let flags = OutlierDetector::new(method).outlier_rows(&self.df)?;
        let removed = flags.iter().filter(|f| **f).count();

        if removed > 0 {
            self.df = drop_flagged_rows(&self.df, &flags)?;
        }

        self.outlier_rows_removed += removed;
        self.report.rows_removed_for_outliers(removed);
        info!("Rows removed (outliers): {}", removed);
        Ok(removed)
    }

    /// Write the cleaned frame to `destination` and record the final shape.
    pub fn save(&mut self, destination: impl AsRef<Path>) -> Result<()> {
        storage::save_csv(&mut self.df, destination)?;
        let (rows, columns) = self.df.shape();
        self.report.final_shape(rows, columns);
        Ok(())
    }

    /// Write the cleaning report next to `destination`.
    pub fn write_report(&self, destination: impl AsRef<Path>) -> Result<PathBuf> {
        let path = sibling_path(destination.as_ref(), CLEANING_REPORT_FILE);
        self.report.snapshot().write_to(&path)?;
        Ok(path)
    }

    /// Summarize the run.
    pub fn into_outcome(self, destination: PathBuf, report_path: PathBuf) -> CleaningOutcome {
        let shape_after = self.df.shape();
        CleaningOutcome {
            generated_at: chrono::Local::now().to_rfc3339(),
            source: self.source.unwrap_or_default(),
            destination,
            report_path,
            shape_before: self.shape_before,
            shape_after,
            columns_renamed: self.columns_renamed,
            duplicates_removed: self.duplicates_removed,
            missing: self.missing.unwrap_or(MissingValueSummary {
                strategy: MissingValueStrategy::Analyze,
                columns: Vec::new(),
                rows_removed: 0,
                imputations: Vec::new(),
            }),
            outliers: self.outliers,
            outlier_rows_removed: self.outlier_rows_removed,
        }
    }

    /// Run the whole cleaning sequence described by `config`.
    pub fn run(config: &CleaningConfig) -> Result<CleaningOutcome> {
        Self::run_with_progress(config, None)
    }

    /// Run the whole cleaning sequence, reporting each stage to `progress`.
    pub fn run_with_progress(
        config: &CleaningConfig,
        progress: Option<&dyn ProgressReporter>,
    ) -> Result<CleaningOutcome> {
        let notify = |stage: PipelineStage, message: &str| {
            if let Some(reporter) = progress {
                reporter.report(ProgressUpdate::new(stage, message));
            }
        };

        info!(
            "Cleaning {} -> {}",
            config.source.display(),
            config.destination.display()
        );

        notify(PipelineStage::Loading, "Loading raw data");
        let mut cleaner = Self::load(&config.source)?;

        notify(PipelineStage::Standardizing, "Standardizing column names");
        cleaner.standardize_column_names()?;

        notify(PipelineStage::Deduplicating, "Removing duplicate rows");
        cleaner.remove_duplicates()?;

        notify(PipelineStage::MissingValues, "Handling missing values");
        cleaner.handle_missing_values(config.missing_strategy)?;

        notify(PipelineStage::OutlierDetection, "Detecting outliers");
        cleaner.detect_outliers(config.outlier_method)?;
        if config.remove_outliers {
            cleaner.remove_outliers(config.outlier_method)?;
        }

        notify(PipelineStage::Saving, "Saving cleaned data");
        // The cleaned CSV only lands at the destination once the report is written.
        let staged = storage::staging_path(&config.destination);
        cleaner.save(&staged)?;
        let report_path = match cleaner.write_report(&config.destination) {
            Ok(path) => path,
            Err(e) => {
                storage::discard_staged(&staged);
                return Err(e);
            }
        };
        storage::commit_staged(&staged, &config.destination)?;

        let outcome = cleaner.into_outcome(config.destination.clone(), report_path);
        info!(
            "Cleaning complete: {:?} -> {:?}",
            outcome.shape_before, outcome.shape_after
        );
        Ok(outcome)
    }
}
