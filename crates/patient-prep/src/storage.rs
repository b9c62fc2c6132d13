//! CSV persistence for both pipeline stages.

use crate::error::{PrepError, Result, ResultExt};
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions, NullValues};
use polars::prelude::*;
use std::fs::{self, File};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Cell markers read as missing, in addition to empty fields.
pub const NULL_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "#N/A",
];

/// Read a headered CSV, scanning the whole file for schema inference.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PrepError::SourceNotFound(path.to_path_buf()));
    }

    let null_values = NullValues::AllColumns(NULL_MARKERS.iter().map(|m| (*m).into()).collect());

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(CsvParseOptions::default().with_null_values(Some(null_values)))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("opening {}", path.display()))?
        .finish()
        .context(format!("parsing {}", path.display()))?;

    info!(
        "Loaded {}: {} rows, {} columns",
        path.display(),
        df.height(),
        df.width()
    );
    debug!("Columns: {:?}", df.get_column_names());
    Ok(df)
}

/// Write a frame as a headered CSV without an index column, creating parent
/// directories as needed.
pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context(format!("creating {}", parent.display()))?;
    }

    let mut file = File::create(path).context(format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("writing {}", path.display()))?;

    info!("Dataset saved: {}", path.display());
    Ok(())
}

/// Sibling path a file is written to before it is moved into place.
pub fn staging_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Move a staged file over its final path.
pub fn commit_staged(staged: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<()> {
    let (staged, path) = (staged.as_ref(), path.as_ref());
    fs::rename(staged, path).context(format!(
        "moving {} to {}",
        staged.display(),
        path.display()
    ))?;
    debug!("Committed {}", path.display());
    Ok(())
}

/// Remove a staged file left behind by a failed run.
pub fn discard_staged(staged: impl AsRef<Path>) {
    let staged = staged.as_ref();
    if let Err(e) = fs::remove_file(staged) {
        warn!("Could not remove {}: {}", staged.display(), e);
    }
}
