//! CLI entry point for the patient data cleaning and validation pipeline.

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use patient_prep::{
    CleaningConfig, CleaningOutcome, DataCleaner, DataValidator, MissingValueStrategy,
    OutlierMethod, Pipeline, PrepError, RangeRules, ValidationConfig, ValidationOutcome,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

/// CLI-compatible missing-value strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingStrategy {
    /// Report missing values only
    Analyze,
    /// Drop every row with a missing value
    Drop,
    /// Fill with the median (numeric) or most frequent value (text)
    Impute,
}

impl From<CliMissingStrategy> for MissingValueStrategy {
    fn from(cli: CliMissingStrategy) -> Self {
        match cli {
            CliMissingStrategy::Analyze => MissingValueStrategy::Analyze,
            CliMissingStrategy::Drop => MissingValueStrategy::Drop,
            CliMissingStrategy::Impute => MissingValueStrategy::Impute,
        }
    }
}

/// CLI-compatible outlier method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierMethod {
    /// Outside Q1 - 1.5*IQR .. Q3 + 1.5*IQR
    Iqr,
    /// Absolute z-score above 3
    #[value(alias = "z-score")]
    Zscore,
}

impl From<CliOutlierMethod> for OutlierMethod {
    fn from(cli: CliOutlierMethod) -> Self {
        match cli {
            CliOutlierMethod::Iqr => OutlierMethod::Iqr,
            CliOutlierMethod::Zscore => OutlierMethod::ZScore,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "patient-prep",
    version,
    about = "Cleaning and validation pipeline for tabular patient data",
    long_about = "Cleans a raw patient CSV (column names, duplicates, missing values, outliers)\n\
                  and validates the result (completeness, uniqueness, dtypes, value ranges).\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG    Log filter, overrides --log-level (read from .env if present)\n\n\
                  EXAMPLES:\n  \
                  # Clean with median/mode imputation\n  \
                  patient-prep clean -i raw_data/patient_data.csv -o processed_data/patient_data_cleaned.csv\n\n  \
                  # Validate with range rules\n  \
                  patient-prep validate -i processed_data/patient_data_cleaned.csv --rule age=0:120\n\n  \
                  # Clean, then validate the cleaned file\n  \
                  patient-prep run -i raw_data/patient_data.csv -o processed_data/patient_data_cleaned.csv --rules rules.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print the machine-readable outcome as JSON to stdout
    ///
    /// Disables all logging so stdout only carries JSON.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean a raw CSV and write the cleaning report next to the output
    Clean(CleanArgs),
    /// Validate a CSV and write the validation report next to it
    Validate(ValidateArgs),
    /// Clean, then validate the cleaned file
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Raw CSV to clean
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the cleaned CSV
    #[arg(short, long)]
    output: PathBuf,

    /// How missing values are handled
    #[arg(long, value_enum, default_value = "impute")]
    strategy: CliMissingStrategy,

    /// How outliers are detected
    #[arg(long, value_enum, default_value = "iqr")]
    outlier_method: CliOutlierMethod,

    /// Remove rows that hold an outlier
    #[arg(long)]
    remove_outliers: bool,
}

#[derive(Args, Debug)]
struct RuleArgs {
    /// Inclusive range rule, repeatable (e.g. --rule age=0:120)
    #[arg(long = "rule", value_name = "COL=MIN:MAX")]
    rules: Vec<String>,

    /// JSON file of range rules, e.g. {"age": [0, 120]}
    ///
    /// Rules given with --rule take precedence.
    #[arg(long = "rules", value_name = "JSON")]
    rules_file: Option<PathBuf>,

    /// Identifier column (informational only)
    #[arg(long)]
    id_column: Option<String>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// CSV to validate
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    rules: RuleArgs,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    clean: CleanArgs,

    #[command(flatten)]
    rules: RuleArgs,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env first so RUST_LOG from it reaches the filter.
    dotenv().ok();
    init_logging(&cli.log_level, cli.quiet, cli.json);

    let result = match &cli.command {
        Command::Clean(args) => run_clean(args, cli.json),
        Command::Validate(args) => run_validate(args, cli.json),
        Command::Run(args) => run_all(args, cli.json),
    };

    if let Err(e) = &result {
        if cli.json
            && let Some(prep_error) = e.downcast_ref::<PrepError>()
        {
            print_json(&ErrorOutput { error: prep_error })?;
        }
        error!("{:#}", e);
    }
    result
}

#[derive(Serialize)]
struct ErrorOutput<'a> {
    error: &'a PrepError,
}

fn cleaning_config(args: &CleanArgs) -> Result<CleaningConfig> {
    Ok(CleaningConfig::builder()
        .source(&args.input)
        .destination(&args.output)
        .missing_strategy(args.strategy.into())
        .outlier_method(args.outlier_method.into())
        .remove_outliers(args.remove_outliers)
        .build()
        .map_err(PrepError::from)?)
}

fn range_rules(args: &RuleArgs) -> Result<RangeRules> {
    let mut rules = match &args.rules_file {
        Some(path) => RangeRules::from_json_file(path)?,
        None => RangeRules::new(),
    };
    rules.extend(RangeRules::from_specs(&args.rules)?);
    Ok(rules)
}

fn validation_config(source: PathBuf, args: &RuleArgs) -> Result<ValidationConfig> {
    let mut builder = ValidationConfig::builder()
        .source(source)
        .range_rules(range_rules(args)?);
    if let Some(id) = &args.id_column {
        builder = builder.id_column(id);
    }
    Ok(builder.build().map_err(PrepError::from)?)
}

fn run_clean(args: &CleanArgs, json: bool) -> Result<()> {
    let config = cleaning_config(args)?;
    let outcome = DataCleaner::run(&config)?;

    if json {
        print_json(&outcome)?;
    } else {
        print_cleaning_summary(&outcome);
    }
    Ok(())
}

fn run_validate(args: &ValidateArgs, json: bool) -> Result<()> {
    let config = validation_config(args.input.clone(), &args.rules)?;
    let outcome = DataValidator::run(&config)?;

    if json {
        print_json(&outcome)?;
    } else {
        print_validation_summary(&outcome);
    }
    verdict(&outcome)
}

fn run_all(args: &RunArgs, json: bool) -> Result<()> {
    let cleaning = cleaning_config(&args.clean)?;
    let validation = validation_config(args.clean.output.clone(), &args.rules)?;

    let pipeline = Pipeline::builder()
        .cleaning(cleaning)
        .validation(validation)
        .on_progress(|update| {
            info!(
                "[{:>3.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        })
        .build()?;

    let outcome = pipeline.run()?;

    if json {
        print_json(&outcome)?;
    } else {
        print_cleaning_summary(&outcome.cleaning);
        print_validation_summary(&outcome.validation);
    }
    verdict(&outcome.validation)
}

fn verdict(outcome: &ValidationOutcome) -> Result<()> {
    if outcome.passed {
        Ok(())
    } else {
        Err(anyhow!(
            "Validation failed: {:?} (see {})",
            outcome.result.failed_checks(),
            outcome.report_path.display()
        ))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a short human-readable summary of a cleaning run.
///
/// Uses `println!` intentionally: this is the primary output of the command
/// and must show regardless of log level.
fn print_cleaning_summary(outcome: &CleaningOutcome) {
    println!();
    println!("{}", "=".repeat(60));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(60));
    println!(
        "Input:  {} ({} rows x {} columns)",
        outcome.source.display(),
        outcome.shape_before.0,
        outcome.shape_before.1
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        outcome.destination.display(),
        outcome.shape_after.0,
        outcome.shape_after.1
    );
    println!("Duplicates removed: {}", outcome.duplicates_removed);
    println!(
        "Missing values: {} ({})",
        outcome.missing.total_missing(),
        outcome.missing.strategy
    );
    for imputation in &outcome.missing.imputations {
        println!(
            "  {} <- {} ({} cells)",
            imputation.column, imputation.fill_value, imputation.cells_filled
        );
    }
    for finding in &outcome.outliers {
        println!(
            "Outliers in {}: {} ({:.2}%)",
            finding.column, finding.count, finding.percentage
        );
    }
    if outcome.outlier_rows_removed > 0 {
        println!("Rows removed (outliers): {}", outcome.outlier_rows_removed);
    }
    println!("Report: {}", outcome.report_path.display());
}

/// Print a short human-readable summary of a validation run.
fn print_validation_summary(outcome: &ValidationOutcome) {
    println!();
    println!("{}", "=".repeat(60));
    println!(
        "VALIDATION {}",
        if outcome.passed { "PASSED" } else { "FAILED" }
    );
    println!("{}", "=".repeat(60));
    println!(
        "Dataset: {} ({} rows x {} columns)",
        outcome.dataset, outcome.rows, outcome.columns
    );
    for check in outcome.result.checks() {
        println!(
            "  {:<14} {}",
            check.check.to_string(),
            if check.passed { "ok" } else { "FAILED" }
        );
    }
    println!("Report: {}", outcome.report_path.display());
}
