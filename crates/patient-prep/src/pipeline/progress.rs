//! Progress reporting for the cleaning and validation pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use patient_prep::Pipeline;
//!
//! let outcome = Pipeline::builder()
//!     .cleaning(cleaning_config)
//!     .validation(validation_config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the raw CSV
    Loading,
    /// Normalizing column names
    Standardizing,
    /// Removing exact duplicate rows
    Deduplicating,
    /// Analyzing, dropping or imputing missing values
    MissingValues,
    /// Detecting (and optionally removing) outliers
    OutlierDetection,
    /// Writing the cleaned CSV and cleaning report
    Saving,
    /// Running the validation checks on the cleaned file
    Validation,
    /// Writing the validation report
    ReportGeneration,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Standardizing => "Standardizing Columns",
            Self::Deduplicating => "Removing Duplicates",
            Self::MissingValues => "Handling Missing Values",
            Self::OutlierDetection => "Detecting Outliers",
            Self::Saving => "Saving Cleaned Data",
            Self::Validation => "Validating Data",
            Self::ReportGeneration => "Generating Reports",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run taken by this stage.
    ///
    /// Non-terminal weights sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.10,
            Self::Standardizing => 0.05,
            Self::Deduplicating => 0.10,
            Self::MissingValues => 0.20,
            Self::OutlierDetection => 0.15,
            Self::Saving => 0.10,
            Self::Validation => 0.25,
            Self::ReportGeneration => 0.05,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Complete => 1.0,
            Self::Failed => 0.0,
            stage => Self::WORK_STAGES
                .iter()
                .take_while(|s| *s != stage)
                .map(Self::weight)
                .sum(),
        }
    }

    /// Non-terminal stages in execution order.
    pub const WORK_STAGES: [PipelineStage; 8] = [
        Self::Loading,
        Self::Standardizing,
        Self::Deduplicating,
        Self::MissingValues,
        Self::OutlierDetection,
        Self::Saving,
        Self::Validation,
        Self::ReportGeneration,
    ];
}

/// A single progress update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0), the start of the current stage
    pub progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    /// Update marking the start of `stage`.
    pub fn new(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: stage.base_progress().clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            progress: 1.0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates from the pipeline.
pub trait ProgressReporter: Send + Sync {
    /// Called at every stage boundary. Implementations should not block.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
