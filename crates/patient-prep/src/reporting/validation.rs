use crate::error::Result;
use crate::quality::ValidationResult;
use crate::reporting::SEPARATOR_WIDTH;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

/// File name of the validation report, written next to the validated CSV.
pub const VALIDATION_REPORT_FILE: &str = "validation_report.txt";

const TITLE: &str = "Data Validation Report";

/// Text rendering of a finished validation run.
#[derive(Debug)]
pub struct ValidationReport<'a> {
    dataset: &'a str,
    rows: usize,
    columns: usize,
    result: &'a ValidationResult,
}

impl<'a> ValidationReport<'a> {
    pub fn new(dataset: &'a str, rows: usize, columns: usize, result: &'a ValidationResult) -> Self {
        Self {
            dataset,
            rows,
            columns,
            result,
        }
    }

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
        info!("Validation report saved: {}", path.display());
        Ok(())
    }
}

impl fmt::Display for ValidationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", TITLE)?;
        writeln!(f, "{}", "=".repeat(SEPARATOR_WIDTH))?;
        writeln!(f)?;
        writeln!(f, "Dataset: {}", self.dataset)?;
        writeln!(f, "Rows: {}", self.rows)?;
        writeln!(f, "Columns: {}", self.columns)?;
        writeln!(f)?;
        for (key, value) in self.result.metrics() {
            writeln!(f, "{}: {}", key, value)?;
        }
        Ok(())
    }
}
