//! Main pipeline module.
//!
//! This module provides the `Pipeline` struct and builder that run the
//! cleaner and then the validator on the file the cleaner wrote.

use crate::cleaner::DataCleaner;
use crate::config::{CleaningConfig, ConfigValidationError, ValidationConfig};
use crate::error::{PrepError, Result};
use crate::pipeline::progress::{ClosureProgressReporter, ProgressReporter, ProgressUpdate};
use crate::quality::DataValidator;
use crate::types::PipelineOutcome;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Clean-then-validate pipeline.
///
/// Use [`Pipeline::builder()`] to create a pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use patient_prep::{CleaningConfig, MissingValueStrategy, Pipeline};
///
/// let cleaning = CleaningConfig::builder()
///     .source("raw_data/patient_data.csv")
///     .destination("processed_data/patient_data_cleaned.csv")
///     .missing_strategy(MissingValueStrategy::Impute)
///     .build()?;
///
/// let outcome = Pipeline::builder()
///     .cleaning(cleaning)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run()?;
///
/// println!("Validation passed: {}", outcome.passed());
/// ```
pub struct Pipeline {
    cleaning: CleaningConfig,
    validation: ValidationConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn cleaning_config(&self) -> &CleaningConfig {
        &self.cleaning
    }

    pub fn validation_config(&self) -> &ValidationConfig {
        &self.validation
    }

    /// Clean the source file, then validate the cleaned file.
    ///
    /// A failing validation verdict is not an error; check
    /// [`PipelineOutcome::passed`].
    pub fn run(&self) -> Result<PipelineOutcome> {
        match self.run_internal() {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self) -> Result<PipelineOutcome> {
        let start_time = Instant::now();
        let progress = self.progress_reporter.as_deref();

        info!("Step 1: Cleaning {}", self.cleaning.source.display());
        let cleaning = DataCleaner::run_with_progress(&self.cleaning, progress)?;

        info!("Step 2: Validating {}", self.validation.source.display());
        let validation = DataValidator::run_with_progress(&self.validation, progress)?;

        if !validation.passed {
            warn!(
                "Validation failed for {}: {:?}",
                validation.dataset,
                validation.result.failed_checks()
            );
        }
        info!(
            "Pipeline finished in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );

        Ok(PipelineOutcome {
            cleaning,
            validation,
        })
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    cleaning: Option<CleaningConfig>,
    validation: Option<ValidationConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the cleaning configuration. Required.
    pub fn cleaning(mut self, config: CleaningConfig) -> Self {
        self.cleaning = Some(config);
        self
    }

    /// Set the validation configuration.
    ///
    /// Its source must be the cleaning destination. When omitted, the
    /// cleaned file is validated without range rules.
    pub fn validation(mut self, config: ValidationConfig) -> Self {
        self.validation = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline, validating both configurations.
    pub fn build(self) -> Result<Pipeline> {
        let cleaning = self
            .cleaning
            .ok_or(ConfigValidationError::MissingField("cleaning"))?;
        cleaning.validate()?;

        let validation = match self.validation {
            Some(config) => {
                config.validate()?;
                if config.source != cleaning.destination {
                    return Err(PrepError::InvalidConfig(format!(
                        "validation source {} is not the cleaning destination {}",
                        config.source.display(),
                        cleaning.destination.display()
                    )));
                }
                config
            }
            None => ValidationConfig::builder()
                .source(cleaning.destination.clone())
                .build()?,
        };

        Ok(Pipeline {
            cleaning,
            validation,
            progress_reporter: self.progress_reporter,
        })
    }
}
