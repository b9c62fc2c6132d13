use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four checks a validation run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    Completeness,
    Uniqueness,
    DataTypes,
    ValueRanges,
}

impl Check {
    /// Key under which the check's metric is stored and reported.
    pub fn metric_key(&self) -> &'static str {
        match self {
            Check::Completeness => "completeness",
            Check::Uniqueness => "duplicates",
            Check::DataTypes => "data_types",
            Check::ValueRanges => "range_violations",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Check::Completeness => "completeness",
            Check::Uniqueness => "uniqueness",
            Check::DataTypes => "data_types",
            Check::ValueRanges => "value_ranges",
        };
        f.write_str(name)
    }
}

/// A measured validation metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    /// Percentage in `[0, 100]`.
    Percentage(f64),
    Count(usize),
    /// Column name to dtype, in column order.
    DataTypes(IndexMap<String, String>),
    Violations(Vec<String>),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Percentage(p) => write!(f, "{:.2}", p),
            MetricValue::Count(n) => write!(f, "{}", n),
            MetricValue::DataTypes(types) => {
                let body = types
                    .iter()
                    .map(|(name, dtype)| format!("{}: {}", name, dtype))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{}}}", body)
            }
            MetricValue::Violations(violations) => write!(f, "[{}]", violations.join(", ")),
        }
    }
}

/// Pass/fail flag for one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check: Check,
    pub passed: bool,
}

/// Metrics and verdicts of a validation run.
///
/// Metrics keep the order in which checks were recorded. The overall
/// verdict passes only when every recorded check passed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    metrics: IndexMap<String, MetricValue>,
    checks: Vec<CheckOutcome>,
}

impl ValidationResult {
    pub fn builder() -> ValidationResultBuilder {
        ValidationResultBuilder::new()
    }

    pub fn metrics(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn metric(&self, key: &str) -> Option<&MetricValue> {
        self.metrics.get(key)
    }

    pub fn checks(&self) -> &[CheckOutcome] {
        &self.checks
    }

    /// Verdict of a single check, if it was recorded.
    pub fn check_passed(&self, check: Check) -> Option<bool> {
        self.checks
            .iter()
            .rev()
            .find(|c| c.check == check)
            .map(|c| c.passed)
    }

    /// Overall verdict.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Checks that did not pass.
    pub fn failed_checks(&self) -> Vec<Check> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.check)
            .collect()
    }

    pub fn completeness(&self) -> Option<f64> {
        match self.metrics.get(Check::Completeness.metric_key()) {
            Some(MetricValue::Percentage(p)) => Some(*p),
            _ => None,
        }
    }

    pub fn duplicates(&self) -> Option<usize> {
        match self.metrics.get(Check::Uniqueness.metric_key()) {
            Some(MetricValue::Count(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn data_types(&self) -> Option<&IndexMap<String, String>> {
        match self.metrics.get(Check::DataTypes.metric_key()) {
            Some(MetricValue::DataTypes(types)) => Some(types),
            _ => None,
        }
    }

    pub fn range_violations(&self) -> Option<&[String]> {
        match self.metrics.get(Check::ValueRanges.metric_key()) {
            Some(MetricValue::Violations(v)) => Some(v),
            _ => None,
        }
    }
}

/// Accumulates check results into a [`ValidationResult`].
#[derive(Debug, Clone, Default)]
pub struct ValidationResultBuilder {
    result: ValidationResult,
}

impl ValidationResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a check's metric and verdict. Re-recording a check replaces it.
    pub fn record(&mut self, check: Check, metric: MetricValue, passed: bool) -> &mut Self {
        self.result
            .metrics
            .insert(check.metric_key().to_string(), metric);
        self.result.checks.retain(|c| c.check != check);
        self.result.checks.push(CheckOutcome { check, passed });
        self
    }

    /// Result of the checks recorded so far.
    pub fn snapshot(&self) -> ValidationResult {
        self.result.clone()
    }

    pub fn build(self) -> ValidationResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_verdict_requires_every_check() {
        let mut builder = ValidationResult::builder();
        builder
            .record(Check::Completeness, MetricValue::Percentage(100.0), true)
            .record(Check::Uniqueness, MetricValue::Count(2), false);
        let result = builder.build();

        assert!(!result.passed());
        assert_eq!(result.failed_checks(), vec![Check::Uniqueness]);
        assert_eq!(result.check_passed(Check::Completeness), Some(true));
        assert_eq!(result.check_passed(Check::ValueRanges), None);
    }

    #[test]
    fn test_empty_result_passes() {
        assert!(ValidationResult::default().passed());
    }

    #[test]
    fn test_typed_accessors() {
        let mut builder = ValidationResult::builder();
        builder
            .record(Check::Completeness, MetricValue::Percentage(96.5), true)
            .record(Check::Uniqueness, MetricValue::Count(0), true)
            .record(
                Check::ValueRanges,
                MetricValue::Violations(vec!["age: 2 values outside range [0, 120]".into()]),
                false,
            );
        let result = builder.build();

        assert_eq!(result.completeness(), Some(96.5));
        assert_eq!(result.duplicates(), Some(0));
        assert!(result.data_types().is_none());
        assert_eq!(result.range_violations().map(|v| v.len()), Some(1));
    }

    #[test]
    fn test_rerecord_replaces() {
        let mut builder = ValidationResult::builder();
        builder
            .record(Check::Uniqueness, MetricValue::Count(3), false)
            .record(Check::Uniqueness, MetricValue::Count(0), true);
        let result = builder.build();

        assert_eq!(result.checks().len(), 1);
        assert_eq!(result.duplicates(), Some(0));
        assert!(result.passed());
    }

    #[test]
    fn test_metric_display() {
        assert_eq!(MetricValue::Percentage(95.0).to_string(), "95.00");
        assert_eq!(MetricValue::Violations(vec![]).to_string(), "[]");
        let mut types = IndexMap::new();
        types.insert("a".to_string(), "i64".to_string());
        assert_eq!(MetricValue::DataTypes(types).to_string(), "{a: i64}");
    }

    #[test]
    fn test_serialize_keys() {
        let mut builder = ValidationResult::builder();
        builder.record(Check::Uniqueness, MetricValue::Count(1), false);
        let json = serde_json::to_value(builder.build()).unwrap();

        assert_eq!(json["metrics"]["duplicates"]["kind"], "count");
        assert_eq!(json["metrics"]["duplicates"]["value"], 1);
        assert_eq!(json["checks"][0]["check"], "uniqueness");
    }
}
