//! Integration tests for the cleaning and validation pipeline.
//!
//! These tests drive the file-based entry points against CSV fixtures written
//! into temporary directories.

use patient_prep::storage::load_csv;
use patient_prep::{
    CleaningConfig, DataCleaner, DataValidator, MissingValueStrategy, OutlierMethod, Pipeline,
    PipelineStage, PrepError, RangeRules, ValidationConfig,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

const PATIENT_CSV: &str = "\
Patient ID,Age,Gender,Annual Income
1,30,F,50000
2,40,M,
3,45,F,60000
3,45,F,60000
4,50,M,70000
";

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn clean_config(source: &Path, destination: &Path, strategy: MissingValueStrategy) -> CleaningConfig {
    CleaningConfig::builder()
        .source(source)
        .destination(destination)
        .missing_strategy(strategy)
        .build()
        .expect("valid cleaning config")
}

fn float_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

// ============================================================================
// Cleaning
// ============================================================================

#[test]
fn test_end_to_end_cleaning_fixture() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "patient_data.csv", PATIENT_CSV);
    let destination = dir.path().join("processed_data/patient_data_cleaned.csv");

    let outcome = DataCleaner::run(&clean_config(
        &source,
        &destination,
        MissingValueStrategy::Impute,
    ))
    .unwrap();

    assert_eq!(outcome.shape_before, (5, 4));
    assert_eq!(outcome.shape_after, (4, 4));
    assert_eq!(outcome.duplicates_removed, 1);

    let cleaned = load_csv(&destination).unwrap();
    assert_eq!(cleaned.height(), 4);
    let names: Vec<String> = cleaned
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, vec!["patient_id", "age", "gender", "annual_income"]);

    // Median of the non-missing incomes after dedup.
    let income = float_column(&cleaned, "annual_income");
    assert_eq!(income[1], Some(60000.0));
    assert!(income.iter().all(Option::is_some));

    let report = fs::read_to_string(dir.path().join("processed_data/cleaning_report.txt")).unwrap();
    assert!(report.contains("Duplicates removed: 1\n"));
    assert!(report.contains("Missing in annual_income: 1 (25.00%)\n"));
    assert!(report.contains("Missing values imputed\n"));
    assert!(report.ends_with("Final shape: (4, 4)\n"));
}

#[test]
fn test_cleaning_report_layout() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "raw.csv", "Name,Score\na,1\nb,2\nb,2\nc,3\n");
    let destination = dir.path().join("clean.csv");

    let outcome = DataCleaner::run(&clean_config(
        &source,
        &destination,
        MissingValueStrategy::Impute,
    ))
    .unwrap();

    let report = fs::read_to_string(&outcome.report_path).unwrap();
    let expected = format!(
        "Data Cleaning Report\n{}\n\n\
         Original shape: (4, 2)\n\
         Column names standardized\n\
         Duplicates removed: 1\n\
         No missing values\n\
         Final shape: (3, 2)\n",
        "=".repeat(50)
    );
    assert_eq!(report, expected);
}

#[test]
fn test_drop_strategy() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "patient_data.csv", PATIENT_CSV);
    let destination = dir.path().join("clean.csv");

    let outcome = DataCleaner::run(&clean_config(
        &source,
        &destination,
        MissingValueStrategy::Drop,
    ))
    .unwrap();

    assert_eq!(outcome.missing.rows_removed, 1);
    assert_eq!(outcome.shape_after, (3, 4));

    let report = fs::read_to_string(&outcome.report_path).unwrap();
    assert!(report.contains("Rows removed (missing values): 1\n"));
}

#[test]
fn test_analyze_strategy_keeps_missing() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "patient_data.csv", PATIENT_CSV);
    let destination = dir.path().join("clean.csv");

    let outcome = DataCleaner::run(&clean_config(
        &source,
        &destination,
        MissingValueStrategy::Analyze,
    ))
    .unwrap();

    assert_eq!(outcome.missing.total_missing(), 1);
    assert!(outcome.missing.imputations.is_empty());

    let cleaned = load_csv(&destination).unwrap();
    assert_eq!(cleaned.column("annual_income").unwrap().null_count(), 1);
}

#[test]
fn test_rerun_on_cleaned_output_is_noop() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "patient_data.csv", PATIENT_CSV);
    let first = dir.path().join("first/clean.csv");
    let second = dir.path().join("second/clean.csv");

    DataCleaner::run(&clean_config(&source, &first, MissingValueStrategy::Impute)).unwrap();
    let outcome =
        DataCleaner::run(&clean_config(&first, &second, MissingValueStrategy::Impute)).unwrap();

    assert!(!outcome.columns_renamed);
    assert_eq!(outcome.duplicates_removed, 0);
    assert_eq!(outcome.missing.total_missing(), 0);
    assert_eq!(outcome.shape_before, outcome.shape_after);
}

#[test]
fn test_outlier_detection_and_removal() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "raw.csv", "id,v\n1,1\n2,2\n3,3\n4,4\n5,5\n6,100\n");
    let destination = dir.path().join("clean.csv");

    let config = CleaningConfig::builder()
        .source(&source)
        .destination(&destination)
        .outlier_method(OutlierMethod::Iqr)
        .remove_outliers(true)
        .build()
        .unwrap();
    let outcome = DataCleaner::run(&config).unwrap();

    assert_eq!(outcome.outliers.len(), 1);
    assert_eq!(outcome.outliers[0].column, "v");
    assert_eq!(outcome.outliers[0].count, 1);
    assert_eq!(outcome.outlier_rows_removed, 1);
    assert_eq!(outcome.shape_after, (5, 2));

    let report = fs::read_to_string(&outcome.report_path).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    let n = lines.len();
    assert_eq!(lines[n - 2], "Rows removed (outliers): 1");
    assert_eq!(lines[n - 1], "Final shape: (5, 2)");
}

#[test]
fn test_outliers_reported_without_removal() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "raw.csv", "v\n1\n2\n3\n4\n5\n100\n");
    let destination = dir.path().join("clean.csv");

    let outcome = DataCleaner::run(&clean_config(
        &source,
        &destination,
        MissingValueStrategy::Analyze,
    ))
    .unwrap();

    assert_eq!(outcome.outlier_rows_removed, 0);
    assert_eq!(outcome.shape_after, (6, 1));
    let report = fs::read_to_string(&outcome.report_path).unwrap();
    assert!(report.contains("Outliers in v: 1 (16.67%)\n"));
    assert!(!report.contains("Rows removed (outliers)"));
}

#[test]
fn test_missing_source_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = clean_config(
        &dir.path().join("absent.csv"),
        &dir.path().join("clean.csv"),
        MissingValueStrategy::Impute,
    );

    let err = DataCleaner::run(&config).unwrap_err();
    assert!(matches!(err, PrepError::SourceNotFound(_)));
    assert!(!dir.path().join("cleaning_report.txt").exists());
}

#[test]
fn test_unknown_strategy_rejected() {
    let err = "fill".parse::<MissingValueStrategy>().unwrap_err();
    assert!(matches!(err, PrepError::UnknownStrategy(_)));
    assert!(err.is_config_error());

    let err = "mad".parse::<OutlierMethod>().unwrap_err();
    assert!(matches!(err, PrepError::UnknownOutlierMethod(_)));
}

// ============================================================================
// Validation
// ============================================================================

fn ten_by_four(missing: usize, extra_line: Option<&str>) -> String {
    let mut csv = String::from("patient_id,age,score,group\n");
    for i in 0..10 {
        let score = if i < missing {
            String::new()
        } else {
            format!("{}", i * 10)
        };
        csv.push_str(&format!("{},{},{},g{}\n", i, 20 + i, score, i % 3));
    }
    if let Some(line) = extra_line {
        csv.push_str(line);
    }
    csv
}

#[test]
fn test_completeness_threshold_boundary() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "data.csv", &ten_by_four(2, None));

    let config = ValidationConfig::builder().source(&source).build().unwrap();
    let outcome = DataValidator::run(&config).unwrap();

    assert_eq!(outcome.result.completeness(), Some(95.0));
    assert!(outcome.passed);
}

#[test]
fn test_completeness_below_threshold() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "data.csv", &ten_by_four(3, None));

    let config = ValidationConfig::builder().source(&source).build().unwrap();
    let outcome = DataValidator::run(&config).unwrap();

    assert!(!outcome.passed);
    assert!(outcome.report_path.exists());
}

#[test]
fn test_uniqueness_counts_duplicate_rows() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "data.csv", &ten_by_four(0, Some("0,20,0,g0\n")));

    let config = ValidationConfig::builder()
        .source(&source)
        .id_column("patient_id")
        .build()
        .unwrap();
    let outcome = DataValidator::run(&config).unwrap();

    assert_eq!(outcome.result.duplicates(), Some(1));
    assert!(!outcome.passed);
}

#[test]
fn test_range_rules_and_report() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "patient_data_cleaned.csv", "age,bmi\n30,22.1\n150,24.3\n45,19.9\n");

    let rules = RangeRules::from_specs(["age=0:120", "height=100:250"]).unwrap();
    let config = ValidationConfig::builder()
        .source(&source)
        .range_rules(rules)
        .build()
        .unwrap();
    let outcome = DataValidator::run(&config).unwrap();

    assert_eq!(
        outcome.result.range_violations().unwrap(),
        &["age: 1 values outside range [0, 120]".to_string()]
    );
    assert!(!outcome.passed);

    let report = fs::read_to_string(dir.path().join("validation_report.txt")).unwrap();
    let expected_header = format!(
        "Data Validation Report\n{}\n\n\
         Dataset: patient_data_cleaned.csv\n\
         Rows: 3\n\
         Columns: 2\n\n\
         completeness: 100.00\n\
         duplicates: 0\n",
        "=".repeat(50)
    );
    assert!(report.starts_with(&expected_header), "report was:\n{report}");
    assert!(report.contains("data_types: {age: i64, bmi: f64}\n"));
    assert!(report.ends_with("range_violations: [age: 1 values outside range [0, 120]]\n"));
}

#[test]
fn test_range_rules_from_json_file() {
    let dir = TempDir::new().unwrap();
    let rules_path = write_fixture(&dir, "rules.json", r#"{"age": [0, 120], "bmi": [10, 60]}"#);

    let rules = RangeRules::from_json_file(&rules_path).unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules.get("bmi").unwrap().max(), 60.0);

    let bad_path = write_fixture(&dir, "bad.json", r#"{"age": [120, 0]}"#);
    assert!(RangeRules::from_json_file(&bad_path).is_err());
}

#[test]
fn test_validation_missing_source() {
    let dir = TempDir::new().unwrap();
    let config = ValidationConfig::builder()
        .source(dir.path().join("absent.csv"))
        .build()
        .unwrap();

    let err = DataValidator::run(&config).unwrap_err();
    assert!(matches!(err, PrepError::SourceNotFound(_)));
}

// ============================================================================
// Full Pipeline
// ============================================================================

#[test]
fn test_pipeline_file_handoff() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "patient_data.csv", PATIENT_CSV);
    let destination = dir.path().join("processed/patient_data_cleaned.csv");

    let validation = ValidationConfig::builder()
        .source(&destination)
        .range_rules(RangeRules::from_specs(["age=0:120"]).unwrap())
        .id_column("patient_id")
        .build()
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();

    let outcome = Pipeline::builder()
        .cleaning(clean_config(&source, &destination, MissingValueStrategy::Impute))
        .validation(validation)
        .on_progress(move |update| {
            assert!((0.0..=1.0).contains(&update.progress));
            calls_clone.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(outcome.passed());
    assert_eq!(outcome.validation.rows, outcome.cleaning.shape_after.0);
    assert_eq!(outcome.validation.dataset, "patient_data_cleaned.csv");
    assert!(dir.path().join("processed/cleaning_report.txt").exists());
    assert!(dir.path().join("processed/validation_report.txt").exists());
    assert!(calls.load(Ordering::SeqCst) >= 8);
}

#[test]
fn test_pipeline_failing_verdict_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "raw.csv", "Age,Weight\n30,70\n150,80\n45,65\n");
    let destination = dir.path().join("clean.csv");

    let validation = ValidationConfig::builder()
        .source(&destination)
        .range_rules(RangeRules::from_specs(["age=0:120"]).unwrap())
        .build()
        .unwrap();

    let stages = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = stages.clone();

    let outcome = Pipeline::builder()
        .cleaning(clean_config(&source, &destination, MissingValueStrategy::Impute))
        .validation(validation)
        .on_progress(move |update| sink.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(!outcome.passed());
    assert_eq!(
        outcome.validation.result.failed_checks(),
        vec![patient_prep::Check::ValueRanges]
    );
    assert_eq!(stages.lock().unwrap().last(), Some(&PipelineStage::Complete));
}

#[test]
fn test_outcome_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir, "patient_data.csv", PATIENT_CSV);
    let destination = dir.path().join("clean.csv");

    let outcome = Pipeline::builder()
        .cleaning(clean_config(&source, &destination, MissingValueStrategy::Impute))
        .build()
        .unwrap()
        .run()
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["cleaning"]["duplicates_removed"], 1);
    assert_eq!(json["cleaning"]["missing"]["strategy"], "impute");
    assert_eq!(
        json["cleaning"]["missing"]["imputations"][0]["method"],
        "median"
    );
    assert_eq!(json["validation"]["passed"], true);
    assert_eq!(
        json["validation"]["result"]["metrics"]["completeness"]["value"],
        100.0
    );
}
