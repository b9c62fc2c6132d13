//! Configuration types for the cleaning and validation pipeline.
//!
//! This module provides configuration options using the builder pattern.
//! Strategy and method selectors are closed enums, so an unknown name is
//! rejected when the configuration is parsed or built, never silently
//! ignored during a run.

use crate::error::PrepError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Strategy for handling missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingValueStrategy {
    /// Only measure and report missing values; the table is left unchanged.
    #[default]
    Analyze,
    /// Remove every row containing at least one missing value.
    Drop,
    /// Fill numeric columns with the median and categorical columns with the mode.
    Impute,
}

impl MissingValueStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::Drop => "drop",
            Self::Impute => "impute",
        }
    }
}

impl fmt::Display for MissingValueStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingValueStrategy {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "analyze" => Ok(Self::Analyze),
            "drop" => Ok(Self::Drop),
            "impute" => Ok(Self::Impute),
            _ => Err(PrepError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Method used to flag outliers in numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutlierMethod {
    /// Values outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
    #[default]
    #[serde(rename = "iqr")]
    Iqr,
    /// Values more than three standard deviations from the mean.
    #[serde(rename = "zscore")]
    ZScore,
}

impl OutlierMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iqr => "iqr",
            Self::ZScore => "zscore",
        }
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutlierMethod {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iqr" => Ok(Self::Iqr),
            "zscore" | "z-score" | "z_score" => Ok(Self::ZScore),
            _ => Err(PrepError::UnknownOutlierMethod(s.to_string())),
        }
    }
}

// =============================================================================
// Range rules
// =============================================================================

/// Inclusive `[min, max]` bound for a single column.
///
/// Serialized as a two-element array so rule files read as
/// `{"age": [0, 120]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct RangeRule {
    min: f64,
    max: f64,
}

impl RangeRule {
    /// Create a rule, rejecting non-finite bounds and `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigValidationError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ConfigValidationError::NonFiniteBound { min, max });
        }
        if min > max {
            return Err(ConfigValidationError::InvertedBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Check whether a value lies inside the inclusive bound.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl TryFrom<(f64, f64)> for RangeRule {
    type Error = ConfigValidationError;

    fn try_from((min, max): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(min, max)
    }
}

impl From<RangeRule> for (f64, f64) {
    fn from(rule: RangeRule) -> Self {
        (rule.min, rule.max)
    }
}

impl fmt::Display for RangeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Ordered set of range rules keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeRules(IndexMap<String, RangeRule>);

impl RangeRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rule for a column.
    pub fn insert(
        &mut self,
        column: impl Into<String>,
        min: f64,
        max: f64,
    ) -> Result<(), ConfigValidationError> {
        let rule = RangeRule::new(min, max)?;
        self.0.insert(column.into(), rule);
        Ok(())
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_rule(
        mut self,
        column: impl Into<String>,
        min: f64,
        max: f64,
    ) -> Result<Self, ConfigValidationError> {
        self.insert(column, min, max)?;
        Ok(self)
    }

    /// Parse a rule written as `column=min:max`, e.g. `age=0:120`.
    pub fn parse_rule(spec: &str) -> Result<(String, RangeRule), PrepError> {
        let invalid = |reason: &str| PrepError::InvalidRangeRule {
            rule: spec.to_string(),
            reason: reason.to_string(),
        };

        let (column, bounds) = spec
            .rsplit_once('=')
            .ok_or_else(|| invalid("expected 'column=min:max'"))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(invalid("column name is empty"));
        }

        let (min, max) = bounds
            .split_once(':')
            .ok_or_else(|| invalid("expected bounds as 'min:max'"))?;
        let min: f64 = min
            .trim()
            .parse()
            .map_err(|_| invalid("lower bound is not a number"))?;
        let max: f64 = max
            .trim()
            .parse()
            .map_err(|_| invalid("upper bound is not a number"))?;

        let rule = RangeRule::new(min, max).map_err(|e| invalid(&e.to_string()))?;
        Ok((column.to_string(), rule))
    }

    /// Build a rule set from `column=min:max` strings.
    pub fn from_specs<I, S>(specs: I) -> Result<Self, PrepError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Self::new();
        for spec in specs {
            let (column, rule) = Self::parse_rule(spec.as_ref())?;
            rules.0.insert(column, rule);
        }
        Ok(rules)
    }

    /// Parse a JSON object of the form `{"age": [0, 120]}`.
    pub fn from_json_str(json: &str) -> Result<Self, PrepError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load rules from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PrepError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Merge another rule set into this one; later rules win.
    pub fn extend(&mut self, other: RangeRules) {
        self.0.extend(other.0);
    }

    pub fn get(&self, column: &str) -> Option<&RangeRule> {
        self.0.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RangeRule)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Cleaning configuration
// =============================================================================

/// Configuration for a cleaning run.
///
/// Use [`CleaningConfig::builder()`] to create one.
///
/// # Example
///
/// ```rust,ignore
/// use patient_prep::config::{CleaningConfig, MissingValueStrategy, OutlierMethod};
///
/// let config = CleaningConfig::builder()
///     .source("raw_data/patient_data.csv")
///     .destination("processed_data/patient_data_cleaned.csv")
///     .missing_strategy(MissingValueStrategy::Impute)
///     .outlier_method(OutlierMethod::Iqr)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Raw CSV to read.
    pub source: PathBuf,

    /// Where the cleaned CSV is written. The cleaning report lands next to it.
    pub destination: PathBuf,

    /// How missing values are handled.
    /// Default: Analyze
    #[serde(default)]
    pub missing_strategy: MissingValueStrategy,

    /// How outliers are detected.
    /// Default: Iqr
    #[serde(default)]
    pub outlier_method: OutlierMethod,

    /// Whether rows holding a detected outlier are removed after detection.
    /// Default: false
    #[serde(default)]
    pub remove_outliers: bool,
}

impl CleaningConfig {
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.source.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingField("source"));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingField("destination"));
        }
        if self.source == self.destination {
            return Err(ConfigValidationError::SourceIsDestination(
                self.source.clone(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`CleaningConfig`].
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    source: Option<PathBuf>,
    destination: Option<PathBuf>,
    missing_strategy: Option<MissingValueStrategy>,
    outlier_method: Option<OutlierMethod>,
    remove_outliers: Option<bool>,
}

impl CleaningConfigBuilder {
    /// Set the raw CSV path.
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Set the cleaned CSV path.
    pub fn destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination = Some(path.into());
        self
    }

    pub fn missing_strategy(mut self, strategy: MissingValueStrategy) -> Self {
        self.missing_strategy = Some(strategy);
        self
    }

    pub fn outlier_method(mut self, method: OutlierMethod) -> Self {
        self.outlier_method = Some(method);
        self
    }

    /// Enable removal of rows that hold an outlier.
    pub fn remove_outliers(mut self, remove: bool) -> Self {
        self.remove_outliers = Some(remove);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            source: self
                .source
                .ok_or(ConfigValidationError::MissingField("source"))?,
            destination: self
                .destination
                .ok_or(ConfigValidationError::MissingField("destination"))?,
            missing_strategy: self.missing_strategy.unwrap_or_default(),
            outlier_method: self.outlier_method.unwrap_or_default(),
            remove_outliers: self.remove_outliers.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Validation configuration
// =============================================================================

/// Configuration for a validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// CSV to validate. The validation report lands next to it.
    pub source: PathBuf,

    /// Per-column inclusive bounds checked by range validation.
    #[serde(default)]
    pub range_rules: RangeRules,

    /// Identifying column. Accepted for reporting only; uniqueness is always
    /// judged on whole rows.
    #[serde(default)]
    pub id_column: Option<String>,
}

impl ValidationConfig {
    pub fn builder() -> ValidationConfigBuilder {
        ValidationConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.source.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingField("source"));
        }
        Ok(())
    }
}

/// Builder for [`ValidationConfig`].
#[derive(Debug, Default)]
pub struct ValidationConfigBuilder {
    source: Option<PathBuf>,
    range_rules: Option<RangeRules>,
    id_column: Option<String>,
}

impl ValidationConfigBuilder {
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn range_rules(mut self, rules: RangeRules) -> Self {
        self.range_rules = Some(rules);
        self
    }

    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = Some(column.into());
        self
    }

    pub fn build(self) -> Result<ValidationConfig, ConfigValidationError> {
        let config = ValidationConfig {
            source: self
                .source
                .ok_or(ConfigValidationError::MissingField("source"))?,
            range_rules: self.range_rules.unwrap_or_default(),
            id_column: self.id_column,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required setting '{0}'")]
    MissingField(&'static str),

    #[error("Source and destination are the same file: {}", .0.display())]
    SourceIsDestination(PathBuf),

    #[error("Range bounds must be finite, got [{min}, {max}]")]
    NonFiniteBound { min: f64, max: f64 },

    #[error("Range lower bound {min} exceeds upper bound {max}")]
    InvertedBounds { min: f64, max: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "impute".parse::<MissingValueStrategy>().unwrap(),
            MissingValueStrategy::Impute
        );
        assert_eq!(
            " DROP ".parse::<MissingValueStrategy>().unwrap(),
            MissingValueStrategy::Drop
        );
        let err = "fill".parse::<MissingValueStrategy>().unwrap_err();
        assert!(matches!(err, PrepError::UnknownStrategy(ref s) if s == "fill"));
    }

    #[test]
    fn test_outlier_method_from_str() {
        assert_eq!("iqr".parse::<OutlierMethod>().unwrap(), OutlierMethod::Iqr);
        assert_eq!(
            "zscore".parse::<OutlierMethod>().unwrap(),
            OutlierMethod::ZScore
        );
        assert!(matches!(
            "mad".parse::<OutlierMethod>(),
            Err(PrepError::UnknownOutlierMethod(_))
        ));
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(
            serde_json::to_string(&MissingValueStrategy::Impute).unwrap(),
            "\"impute\""
        );
        assert_eq!(
            serde_json::to_string(&OutlierMethod::ZScore).unwrap(),
            "\"zscore\""
        );
        let bad: Result<OutlierMethod, _> = serde_json::from_str("\"median\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_range_rule_validation() {
        assert!(RangeRule::new(0.0, 120.0).is_ok());
        assert!(RangeRule::new(5.0, 5.0).is_ok());
        assert!(matches!(
            RangeRule::new(10.0, 1.0),
            Err(ConfigValidationError::InvertedBounds { .. })
        ));
        assert!(matches!(
            RangeRule::new(f64::NAN, 1.0),
            Err(ConfigValidationError::NonFiniteBound { .. })
        ));
    }

    #[test]
    fn test_range_rule_contains_is_inclusive() {
        let rule = RangeRule::new(0.0, 120.0).unwrap();
        assert!(rule.contains(0.0));
        assert!(rule.contains(120.0));
        assert!(!rule.contains(120.5));
        assert!(!rule.contains(-1.0));
    }

    #[test]
    fn test_parse_rule() {
        let (column, rule) = RangeRules::parse_rule("age=0:120").unwrap();
        assert_eq!(column, "age");
        assert_eq!(rule.min(), 0.0);
        assert_eq!(rule.max(), 120.0);

        let (_, rule) = RangeRules::parse_rule("temperature=-5.5:42").unwrap();
        assert_eq!(rule.min(), -5.5);
    }

    #[test]
    fn test_parse_rule_rejects_malformed() {
        for spec in ["age", "age=0", "=0:1", "age=a:1", "age=10:1"] {
            assert!(
                matches!(
                    RangeRules::parse_rule(spec),
                    Err(PrepError::InvalidRangeRule { .. })
                ),
                "expected '{}' to be rejected",
                spec
            );
        }
    }

    #[test]
    fn test_rules_from_json_preserve_order() {
        let rules =
            RangeRules::from_json_str(r#"{"blood_pressure": [60, 200], "age": [0, 120]}"#)
                .unwrap();
        let columns: Vec<&String> = rules.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["blood_pressure", "age"]);
        assert_eq!(rules.get("age").unwrap().max(), 120.0);
    }

    #[test]
    fn test_rules_from_json_rejects_inverted() {
        let result = RangeRules::from_json_str(r#"{"age": [120, 0]}"#);
        assert!(matches!(result, Err(PrepError::Json(_))));
    }

    #[test]
    fn test_cleaning_builder_defaults() {
        let config = CleaningConfig::builder()
            .source("raw.csv")
            .destination("out/clean.csv")
            .build()
            .unwrap();

        assert_eq!(config.missing_strategy, MissingValueStrategy::Analyze);
        assert_eq!(config.outlier_method, OutlierMethod::Iqr);
        assert!(!config.remove_outliers);
    }

    #[test]
    fn test_cleaning_builder_requires_paths() {
        let result = CleaningConfig::builder().source("raw.csv").build();
        assert!(matches!(
            result,
            Err(ConfigValidationError::MissingField("destination"))
        ));
    }

    #[test]
    fn test_cleaning_builder_rejects_same_paths() {
        let result = CleaningConfig::builder()
            .source("data.csv")
            .destination("data.csv")
            .build();
        assert!(matches!(
            result,
            Err(ConfigValidationError::SourceIsDestination(_))
        ));
    }

    #[test]
    fn test_cleaning_config_from_json() {
        let json = r#"{
            "source": "raw_data/patient_data.csv",
            "destination": "processed_data/patient_data_cleaned.csv",
            "missing_strategy": "impute",
            "outlier_method": "zscore",
            "remove_outliers": true
        }"#;

        let config: CleaningConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.missing_strategy, MissingValueStrategy::Impute);
        assert_eq!(config.outlier_method, OutlierMethod::ZScore);
        assert!(config.remove_outliers);
    }

    #[test]
    fn test_cleaning_config_from_json_unknown_strategy() {
        let json = r#"{
            "source": "a.csv",
            "destination": "b.csv",
            "missing_strategy": "interpolate"
        }"#;
        let result: Result<CleaningConfig, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_builder() {
        let rules = RangeRules::new().with_rule("age", 0.0, 120.0).unwrap();
        let config = ValidationConfig::builder()
            .source("clean.csv")
            .range_rules(rules)
            .id_column("patient_id")
            .build()
            .unwrap();

        assert_eq!(config.range_rules.len(), 1);
        assert_eq!(config.id_column.as_deref(), Some("patient_id"));
    }
}
