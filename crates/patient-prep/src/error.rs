//! Error types for the cleaning and validation pipeline.
//!
//! Every failure is classified into one of three categories (see
//! [`ErrorCategory`]): configuration errors are raised before any data is
//! touched, I/O errors abort the run without partial output, and data-shape
//! errors cover the few structural problems that cannot be absorbed locally.
//!
//! Errors are serializable so that the CLI can emit them as JSON.

use crate::config::ConfigValidationError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the pipeline.
#[derive(Error, Debug)]
pub enum PrepError {
    /// Unrecognized missing-value strategy name.
    #[error("Unknown missing-value strategy '{0}' (expected one of: analyze, drop, impute)")]
    UnknownStrategy(String),

    /// Unrecognized outlier detection method name.
    #[error("Unknown outlier method '{0}' (expected one of: iqr, zscore)")]
    UnknownOutlierMethod(String),

    /// Malformed range rule.
    #[error("Invalid range rule '{rule}': {reason}")]
    InvalidRangeRule { rule: String, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration failed builder validation.
    #[error(transparent)]
    ConfigValidation(#[from] ConfigValidationError),

    /// Source file does not exist.
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Two columns collapse onto the same standardized name.
    #[error("Columns '{first}' and '{second}' both standardize to '{standardized}'")]
    DuplicateColumnName {
        first: String,
        second: String,
        standardized: String,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper (CSV parse/write failures, frame operations).
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PrepError>,
    },
}

/// Coarse classification of a [`PrepError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad strategy/method names, malformed rules, incomplete configuration.
    Configuration,
    /// Missing or unreadable source, unwritable destination, unparseable CSV.
    Io,
    /// Structural problems in the data itself.
    DataShape,
}

impl PrepError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PrepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownStrategy(_) => "UNKNOWN_STRATEGY",
            Self::UnknownOutlierMethod(_) => "UNKNOWN_OUTLIER_METHOD",
            Self::InvalidRangeRule { .. } => "INVALID_RANGE_RULE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ConfigValidation(_) => "CONFIG_VALIDATION_FAILED",
            Self::SourceNotFound(_) => "SOURCE_NOT_FOUND",
            Self::DuplicateColumnName { .. } => "DUPLICATE_COLUMN_NAME",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Which part of the error taxonomy this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownStrategy(_)
            | Self::UnknownOutlierMethod(_)
            | Self::InvalidRangeRule { .. }
            | Self::InvalidConfig(_)
            | Self::ConfigValidation(_)
            | Self::Json(_) => ErrorCategory::Configuration,
            Self::SourceNotFound(_) | Self::Io(_) | Self::Polars(_) => ErrorCategory::Io,
            Self::DuplicateColumnName { .. } => ErrorCategory::DataShape,
            Self::WithContext { source, .. } => source.category(),
        }
    }

    /// Check if this error was caused by configuration rather than data or I/O.
    pub fn is_config_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}

impl Serialize for PrepError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PrepError", 3)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("category", &self.category())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Io(e).with_context(context))
    }
}
