//! Pipeline module.
//!
//! This module provides the clean-then-validate pipeline, outlier detection
//! and progress reporting.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use outliers::{ColumnOutliers, OutlierDetector};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
