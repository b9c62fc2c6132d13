use crate::error::Result;
use crate::reporting::SEPARATOR_WIDTH;
use crate::types::{MissingColumn, OutlierFinding};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

/// File name of the cleaning report, written next to the cleaned CSV.
pub const CLEANING_REPORT_FILE: &str = "cleaning_report.txt";

const TITLE: &str = "Data Cleaning Report";

/// Append-only accumulator for cleaning report entries.
///
/// The typed helpers keep entry wording identical across runs; [`push`](Self::push)
/// accepts anything else.
#[derive(Debug, Clone, Default)]
pub struct CleaningReportBuilder {
    entries: Vec<String>,
}

impl CleaningReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a free-text entry.
    pub fn push(&mut self, entry: impl Into<String>) -> &mut Self {
        self.entries.push(entry.into());
        self
    }

    pub fn original_shape(&mut self, rows: usize, columns: usize) -> &mut Self {
        self.push(format!("Original shape: ({}, {})", rows, columns))
    }

    pub fn columns_standardized(&mut self) -> &mut Self {
        self.push("Column names standardized")
    }

    pub fn duplicates(&mut self, removed: usize) -> &mut Self {
        if removed > 0 {
            self.push(format!("Duplicates removed: {}", removed))
        } else {
            self.push("No duplicates found")
        }
    }

    pub fn missing_column(&mut self, missing: &MissingColumn) -> &mut Self {
        self.push(format!(
            "Missing in {}: {} ({:.2}%)",
            missing.column, missing.missing_count, missing.missing_percentage
        ))
    }

    pub fn no_missing_values(&mut self) -> &mut Self {
        self.push("No missing values")
    }

    pub fn rows_removed_for_missing(&mut self, removed: usize) -> &mut Self {
        self.push(format!("Rows removed (missing values): {}", removed))
    }

    pub fn missing_values_imputed(&mut self) -> &mut Self {
        self.push("Missing values imputed")
    }

    pub fn outliers(&mut self, finding: &OutlierFinding) -> &mut Self {
        self.push(format!(
            "Outliers in {}: {} ({:.2}%)",
            finding.column, finding.count, finding.percentage
        ))
    }

    pub fn rows_removed_for_outliers(&mut self, removed: usize) -> &mut Self {
        self.push(format!("Rows removed (outliers): {}", removed))
    }

    pub fn final_shape(&mut self, rows: usize, columns: usize) -> &mut Self {
        self.push(format!("Final shape: ({}, {})", rows, columns))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Report of the entries accumulated so far.
    pub fn snapshot(&self) -> CleaningReport {
        CleaningReport {
            entries: self.entries.clone(),
        }
    }

    /// Freeze the accumulated entries.
    pub fn build(self) -> CleaningReport {
        CleaningReport {
            entries: self.entries,
        }
    }
}

/// Immutable, ordered cleaning audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    entries: Vec<String>,
}

impl CleaningReport {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Check whether any entry starts with `prefix`.
    pub fn contains_entry(&self, prefix: &str) -> bool {
        self.entries.iter().any(|e| e.starts_with(prefix))
    }

    /// Render the report file contents.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Write the report, creating parent directories as needed.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render())?;
        info!("Cleaning report saved: {}", path.display());
        Ok(())
    }
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", TITLE)?;
        writeln!(f, "{}", "=".repeat(SEPARATOR_WIDTH))?;
        writeln!(f)?;
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}
