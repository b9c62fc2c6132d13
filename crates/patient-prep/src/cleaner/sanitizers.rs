//! Column-name sanitization.

use crate::error::{PrepError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Spaces and hyphens, each replaced by a single underscore.
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \-]").expect("Invalid regex: column separators"));

/// Lower-case a column name and replace spaces and hyphens with underscores.
pub(crate) fn standardize_column_name(name: &str) -> String {
    SEPARATORS.replace_all(&name.to_lowercase(), "_").into_owned()
}

/// Standardize a full header, rejecting names that collapse onto each other.
pub(crate) fn standardize_column_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<String>> {
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(names.len());
    let mut standardized = Vec::with_capacity(names.len());

    for name in names {
        let original = name.as_ref();
        let new_name = standardize_column_name(original);
        if let Some(first) = seen.insert(new_name.clone(), original) {
            return Err(PrepError::DuplicateColumnName {
                first: first.to_string(),
                second: original.to_string(),
                standardized: new_name,
            });
        }
        standardized.push(new_name);
    }

    Ok(standardized)
}
