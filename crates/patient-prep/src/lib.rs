//! Patient Data Preparation Library
//!
//! A cleaning and validation pipeline for tabular patient data, built with
//! Rust and Polars.
//!
//! # Overview
//!
//! The pipeline has two stages connected by a file handoff:
//!
//! - **Cleaning**: column name standardization, exact duplicate removal,
//!   missing value analysis/removal/imputation, outlier detection (IQR or
//!   z-score) and optional outlier removal
//! - **Validation**: completeness, full-row uniqueness, dtype listing and
//!   per-column value range checks, with an aggregate verdict
//!
//! Each stage writes a plain-text report next to the data it touched and
//! returns a serializable outcome.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use patient_prep::{CleaningConfig, MissingValueStrategy, Pipeline, RangeRules, ValidationConfig};
//!
//! let cleaning = CleaningConfig::builder()
//!     .source("raw_data/patient_data.csv")
//!     .destination("processed_data/patient_data_cleaned.csv")
//!     .missing_strategy(MissingValueStrategy::Impute)
//!     .build()?;
//!
//! let validation = ValidationConfig::builder()
//!     .source("processed_data/patient_data_cleaned.csv")
//!     .range_rules(RangeRules::new().with_rule("age", 0.0, 120.0)?)
//!     .build()?;
//!
//! let outcome = Pipeline::builder()
//!     .cleaning(cleaning)
//!     .validation(validation)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("Duplicates removed: {}", outcome.cleaning.duplicates_removed);
//! println!("Validation passed: {}", outcome.passed());
//! ```
//!
//! # Running stages separately
//!
//! ```rust,ignore
//! use patient_prep::{DataCleaner, DataValidator, OutlierMethod, MissingValueStrategy};
//!
//! let mut cleaner = DataCleaner::load("raw_data/patient_data.csv")?;
//! cleaner.standardize_column_names()?;
//! cleaner.remove_duplicates()?;
//! cleaner.handle_missing_values(MissingValueStrategy::Drop)?;
//! cleaner.detect_outliers(OutlierMethod::ZScore)?;
//! cleaner.save("processed_data/patient_data_cleaned.csv")?;
//! cleaner.write_report("processed_data/patient_data_cleaned.csv")?;
//!
//! let mut validator = DataValidator::load("processed_data/patient_data_cleaned.csv")?;
//! validator.validate_completeness();
//! validator.validate_uniqueness(Some("patient_id"))?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod storage;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{
    CleaningConfig, CleaningConfigBuilder, ConfigValidationError, MissingValueStrategy,
    OutlierMethod, RangeRule, RangeRules, ValidationConfig, ValidationConfigBuilder,
};
pub use error::{ErrorCategory, PrepError, Result as PrepResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use pipeline::{
    ClosureProgressReporter, OutlierDetector, Pipeline, PipelineBuilder, PipelineStage,
    ProgressReporter, ProgressUpdate,
};
pub use profiler::DataProfiler;
pub use quality::{
    COMPLETENESS_THRESHOLD, Check, CheckOutcome, DataValidator, MetricValue, ValidationResult,
    ValidationResultBuilder,
};
pub use reporting::{CleaningReport, CleaningReportBuilder, ValidationReport};
pub use types::{
    CleaningOutcome, Imputation, ImputationMethod, MissingColumn, MissingValueSummary,
    OutlierFinding, PipelineOutcome, ValidationOutcome,
};
pub use utils::{DtypeCategory, get_dtype_category, is_numeric_dtype};
