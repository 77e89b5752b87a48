use crate::cli::{CleanArgs, RulesCheckArgs};
use crate::report::{write_clean_csv, CleanReport};
use chrono::Utc;
use seat_matrix::config::AppConfig;
use seat_matrix::error::AppError;
use seat_matrix::pipeline::{CleanOutput, PipelineOptions, SeatMatrixPipeline};
use seat_matrix::rules::ReconstructionRules;
use seat_matrix::telemetry;
use std::fs::File;
use std::io::{self, BufWriter};
use std::sync::Arc;
use tracing::info;

pub(crate) fn run_clean(args: CleanArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_clean_overrides(&mut config, &args);
    telemetry::init(&config.telemetry)?;

    let output = clean(&config, &args)?;
    info!(
        environment = ?config.environment,
        records = output.records.len(),
        warnings = output.warnings.len(),
        unresolved = output.unresolved_warnings().count(),
        structural_errors = output.structural_errors.len(),
        "seat matrix cleaned"
    );
    Ok(())
}

pub(crate) fn run_rules_check(args: RulesCheckArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = args.rules {
        config.rules.path = path;
    }
    telemetry::init(&config.telemetry)?;

    let rules = ReconstructionRules::from_path(&config.rules.path)?;
    println!("{}", describe_rules(&rules, &config.rules.path.display().to_string()));
    Ok(())
}

fn apply_clean_overrides(config: &mut AppConfig, args: &CleanArgs) {
    if let Some(path) = &args.rules {
        config.rules.path = path.clone();
    }
    if let Some(expected) = args.expected {
        config.rules.expected_records = Some(expected);
    }
    if let Some(lookback) = args.context_lookback {
        config.rules.context_lookback = lookback;
    }
}

/// Runs the pipeline and writes the report and optional CSV. Expects
/// telemetry to be installed already, if at all.
pub(crate) fn clean(config: &AppConfig, args: &CleanArgs) -> Result<CleanOutput, AppError> {
    let rules = Arc::new(ReconstructionRules::from_path(&config.rules.path)?);
    info!(
        version = rules.version(),
        path = %config.rules.path.display(),
        "rule file loaded"
    );

    let pipeline =
        SeatMatrixPipeline::new(rules.clone()).with_options(PipelineOptions::from(&config.rules));
    let output = pipeline.run_path(&args.input)?;

    let report = CleanReport::new(
        &output,
        rules.version(),
        args.input.display().to_string(),
        Utc::now(),
    );
    match &args.output {
        Some(path) => report.write_json(BufWriter::new(File::create(path)?))?,
        None => report.write_json(io::stdout().lock())?,
    }

    if let Some(path) = &args.csv {
        write_clean_csv(BufWriter::new(File::create(path)?), rules.categories(), &output.records)?;
        info!(path = %path.display(), records = output.records.len(), "clean table written");
    }

    Ok(output)
}

fn describe_rules(rules: &ReconstructionRules, path: &str) -> String {
    format!(
        "rule file {path}\n- version {}\n- {} categories: {}\n- {} suffixes\n- {} fragment entries\n- {} placeholders with {} keywords",
        rules.version(),
        rules.categories().len(),
        rules.categories().join(", "),
        rules.suffix_count(),
        rules.fragment_count(),
        rules.placeholder_count(),
        rules.keyword_count(),
    )
}
