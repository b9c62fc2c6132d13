//! Report generation module.
//!
//! Both stages leave a plain-text audit file next to the data they touched:
//!
//! - [`CleaningReport`] is accumulated step by step through a
//!   [`CleaningReportBuilder`] and frozen at the end of the run.
//! - [`ValidationReport`] renders a finished
//!   [`ValidationResult`](crate::quality::ValidationResult) with a short
//!   dataset header.
//!
//! # Example
//!
//! ```rust,ignore
//! use patient_prep::reporting::CleaningReportBuilder;
//!
//! let mut builder = CleaningReportBuilder::new();
//! builder.original_shape(120, 8);
//! builder.duplicates(3);
//! let report = builder.build();
//! report.write_to("processed_data/cleaning_report.txt")?;
//! ```

mod cleaning;
mod validation;

pub use cleaning::{CLEANING_REPORT_FILE, CleaningReport, CleaningReportBuilder};
pub use validation::{VALIDATION_REPORT_FILE, ValidationReport};

use std::path::{Path, PathBuf};

/// Width of the `=` rule under each report title.
pub(crate) const SEPARATOR_WIDTH: usize = 50;

/// Path of a report file living in the same directory as `data_path`.
pub fn sibling_path(data_path: &Path, file_name: &str) -> PathBuf {
    match data_path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}
