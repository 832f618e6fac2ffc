//! cleanset CLI
//!
//! Cleans raw short-message datasets into a deduplicated, normalized and
//! validated JSONL export

mod config;
mod progress;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use cleanset_core::{
    append_stats_log, run_validation, run_validation_records, CleanOutput, CleaningPipeline,
    Error, PipelineObserver, StageStatistics, Status, ValidationReport,
};
use cleanset_filters::LanguageClassifier;
use cleanset_formats::{open_dataset, read_dataset, read_rows, write_jsonl};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use config::PipelineConfig;
use progress::StageProgress;

#[derive(Parser)]
#[command(name = "cleanset")]
#[command(version, about = "Clean, deduplicate and validate short-message datasets", long_about = None)]
#[command(author = "cleanset")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output statistics in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: clean, export, log and validate
    Run {
        /// Pipeline config file (YAML or TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Override the configured input file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Override the configured output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Validate without writing the cleaned data or the log
        #[arg(long)]
        dry_run: bool,
    },

    /// Clean a dataset without the validation gate
    Clean {
        /// Pipeline config file (YAML or TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Input file (CSV, TSV or JSONL)
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSONL file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Validate a previously cleaned JSONL file
    Validate {
        /// Pipeline config file (YAML or TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Cleaned JSONL file
        #[arg(short, long)]
        input: PathBuf,

        /// Report path (defaults to the configured output directory)
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Write a default pipeline config
    Init {
        /// Config file to create (YAML or TOML)
        #[arg(value_name = "FILE", default_value = "pipeline.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Inspect a dataset file
    Inspect {
        /// Path to the dataset file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Number of records to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Count records in a dataset
    Count {
        /// Path to the dataset file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(!cli.json) // Disable colors if JSON output
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run {
            config,
            input,
            output_dir,
            dry_run,
        } => run_pipeline(config, input, output_dir, dry_run, cli.json),
        Commands::Clean {
            config,
            input,
            output,
        } => {
            clean_dataset(config, input, output, cli.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate {
            config,
            input,
            report,
        } => validate_dataset(config, input, report, cli.json),
        Commands::Init { path, force } => {
            init_config(&path, force)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Inspect { input, limit } => {
            inspect_dataset(input, limit)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Count { input } => {
            count_dataset(input)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn classifier_for(config: &PipelineConfig) -> Result<LanguageClassifier> {
    LanguageClassifier::whatlang(config.cleaning.min_confidence)
        .context("Invalid language detection settings")
}

fn progress_for(json_output: bool) -> StageProgress {
    if json_output {
        StageProgress::hidden()
    } else {
        StageProgress::new()
    }
}

/// Absorb a validation failure into `None`, propagating any other error
fn gate(result: cleanset_core::Result<ValidationReport>) -> Result<Option<ValidationReport>> {
    match result {
        Ok(report) => Ok(Some(report)),
        Err(Error::Validation(failure)) => {
            error!("Validation failed: {}", failure);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn stats_json(
    input: &Path,
    output: Option<&Path>,
    stats: &StageStatistics,
    passed: Option<bool>,
) -> serde_json::Value {
    serde_json::json!({
        "input": input.to_string_lossy().to_string(),
        "output": output.map(|p| p.to_string_lossy().to_string()),
        "stats": stats,
        "removal_rate": stats.removal_rate(),
        "validation": passed.map(|pass| if pass { "PASS" } else { "FAIL" }),
    })
}

/// What a full pipeline run produced
struct RunOutcome {
    output: CleanOutput,
    /// Cleaned data path, `None` on a dry run
    exported: Option<PathBuf>,
    /// `None` when validation failed
    report: Option<ValidationReport>,
}

impl RunOutcome {
    fn passed(&self) -> bool {
        self.report.is_some()
    }

    fn status(&self) -> Status {
        if self.passed() {
            Status::Pass
        } else {
            Status::Fail
        }
    }
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Clean, export, log and validate according to `config`
///
/// The validation report is written even on a dry run or a failed gate.
fn execute_run(
    config: &PipelineConfig,
    classifier: &LanguageClassifier,
    dry_run: bool,
    observer: &mut dyn PipelineObserver,
) -> Result<RunOutcome> {
    let dataset = read_dataset(&config.input.path)
        .with_context(|| format!("Failed to load dataset: {}", config.input.path.display()))?;

    let pipeline = CleaningPipeline::new(config.cleaning.clone(), classifier);
    let output = pipeline.run_with_observer(dataset, observer);

    let exported = if dry_run {
        info!("Dry run: skipping export and cleaning log");
        None
    } else {
        let cleaned_path = config.output.cleaned_data();
        let written = write_jsonl(&cleaned_path, &output.records)
            .with_context(|| format!("Failed to write {}", cleaned_path.display()))?;
        info!("Exported {} records to {:?}", written, cleaned_path);
        append_stats_log(&config.output.cleaning_log(), &output.stats)?;
        Some(cleaned_path)
    };

    let report = gate(run_validation_records(
        &output.records,
        &config.cleaning,
        classifier,
        &config.output.validation_report(),
    ))?;

    Ok(RunOutcome {
        output,
        exported,
        report,
    })
}

fn run_pipeline(
    config_path: PathBuf,
    input: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    dry_run: bool,
    json_output: bool,
) -> Result<ExitCode> {
    let config = PipelineConfig::load(&config_path)?.with_overrides(input, output_dir);

    info!("Running cleaning pipeline");
    info!("  Config: {:?}", config_path);
    info!("  Input: {:?}", config.input.path);
    info!("  Output dir: {:?}", config.output.dir);

    let classifier = classifier_for(&config)?;
    let mut progress = progress_for(json_output);
    let outcome = execute_run(&config, &classifier, dry_run, &mut progress)?;
    progress.finish();

    let stats = &outcome.output.stats;
    let exported = outcome.exported.as_deref();
    if json_output {
        let summary = stats_json(&config.input.path, exported, stats, Some(outcome.passed()));
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        progress::print_summary_report(&config.input.path, exported, stats, Some(outcome.status()));
    }

    Ok(exit_code(outcome.passed()))
}

fn clean_dataset(
    config_path: PathBuf,
    input: PathBuf,
    output: PathBuf,
    json_output: bool,
) -> Result<()> {
    info!("Cleaning dataset");
    info!("  Input: {:?}", input);
    info!("  Output: {:?}", output);

    let config = PipelineConfig::load(&config_path)?;
    let dataset = read_dataset(&input)
        .with_context(|| format!("Failed to load dataset: {}", input.display()))?;
    let classifier = classifier_for(&config)?;

    let mut progress = progress_for(json_output);
    let result = CleaningPipeline::new(config.cleaning, &classifier)
        .run_with_observer(dataset, &mut progress);
    progress.finish();

    write_jsonl(&output, &result.records)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if json_output {
        let summary = stats_json(&input, Some(&output), &result.stats, None);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        progress::print_summary_report(&input, Some(&output), &result.stats, None);
    }

    Ok(())
}

/// Validate a cleaned JSONL file, persisting the report to `report_path`
fn execute_validate(
    input: &Path,
    config: &PipelineConfig,
    classifier: &LanguageClassifier,
    report_path: &Path,
) -> Result<Option<ValidationReport>> {
    let rows = read_rows(input)
        .with_context(|| format!("Failed to read cleaned data: {}", input.display()))?;

    gate(run_validation(&rows, &config.cleaning, classifier, report_path))
}

fn validate_dataset(
    config_path: PathBuf,
    input: PathBuf,
    report_path: Option<PathBuf>,
    json_output: bool,
) -> Result<ExitCode> {
    let config = PipelineConfig::load(&config_path)?;
    let report_path = report_path.unwrap_or_else(|| config.output.validation_report());

    info!("Validating {:?}", input);

    let classifier = classifier_for(&config)?;
    let report = execute_validate(&input, &config, &classifier, &report_path)?;

    if json_output {
        let saved = std::fs::read_to_string(&report_path)
            .with_context(|| format!("Failed to read report: {}", report_path.display()))?;
        println!("{}", saved.trim_end());
    } else {
        match &report {
            Some(report) => println!(
                "Validation PASS: {} rows, report saved to {}",
                report.row_count(),
                report_path.display()
            ),
            None => println!(
                "Validation FAIL: see {} for details",
                report_path.display()
            ),
        }
    }

    Ok(exit_code(report.is_some()))
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite it",
            path.display()
        );
    }

    PipelineConfig::default_indonesian().save(path)?;
    info!("Wrote default pipeline config to {:?}", path);

    Ok(())
}

fn inspect_dataset(input: PathBuf, limit: usize) -> Result<()> {
    info!("Inspecting dataset: {:?}", input);

    let mut reader = open_dataset(&input)?;
    let mut count = 0;

    while count < limit {
        let Some(result) = reader.next() else {
            break;
        };
        let record = result?;
        count += 1;
        println!(
            "Record #{}: {}",
            count,
            serde_json::to_string_pretty(&record)?
        );
    }

    info!("Read {} source rows", reader.records_processed());

    Ok(())
}

fn count_dataset(input: PathBuf) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    info!("Counting records in: {:?}", input);

    let mut reader = open_dataset(&input)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("[{elapsed_precise}] {spinner} {human_pos} records")?);

    let mut count = 0;
    while let Some(result) = reader.next() {
        let _record = result?;
        count += 1;

        if count % 1000 == 0 {
            pb.set_position(count);
        }

        if count % 10000 == 0 {
            info!("Processed {} records...", count);
        }
    }

    pb.finish_and_clear();

    println!("Total records: {}", count);
    info!(
        "Skipped {} malformed rows",
        reader.records_processed().saturating_sub(count as usize)
    );

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanset_core::{CleaningConfig, NoopObserver};
    use cleanset_filters::{DetectionError, LanguageDetector};
    use crate::config::{
        InputConfig, OutputConfig, CLEANED_DATA_FILE, CLEANING_LOG_FILE, VALIDATION_REPORT_FILE,
    };
    use tempfile::TempDir;

    struct Indonesian;

    impl LanguageDetector for Indonesian {
        fn detect(&self, _text: &str) -> std::result::Result<String, DetectionError> {
            Ok("id".to_string())
        }
    }

    fn setup(raw: &str) -> (TempDir, PipelineConfig) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("raw.csv");
        std::fs::write(&input, raw).unwrap();

        let config = PipelineConfig {
            input: InputConfig { path: input },
            output: OutputConfig {
                dir: dir.path().join("out"),
            },
            cleaning: CleaningConfig {
                min_length: 5,
                max_length: 60,
                ..CleaningConfig::default()
            },
        };
        (dir, config)
    }

    fn saved_status(path: &Path) -> String {
        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        report["status"].as_str().unwrap().to_string()
    }

    const RAW: &str = "1,saldo saya belum masuk!!!!\n2,saldo saya belum masuk!!!!\n3,ok\n4,tolong cek transaksi saya kak\n";

    #[test]
    fn test_run_passes_and_writes_outputs() {
        let (_dir, config) = setup(RAW);
        let classifier = LanguageClassifier::new(Indonesian);

        let outcome = execute_run(&config, &classifier, false, &mut NoopObserver).unwrap();

        assert!(outcome.passed());
        assert_eq!(outcome.status(), Status::Pass);
        assert_eq!(outcome.output.records.len(), 2);
        assert_eq!(outcome.exported, Some(config.output.cleaned_data()));

        let out = &config.output.dir;
        assert!(out.join(CLEANED_DATA_FILE).exists());
        assert!(out.join(CLEANING_LOG_FILE).exists());
        assert_eq!(saved_status(&out.join(VALIDATION_REPORT_FILE)), "PASS");

        let exported = read_rows(out.join(CLEANED_DATA_FILE)).unwrap();
        assert_eq!(exported.len(), 2);
    }

    #[test]
    fn test_dry_run_writes_only_the_report() {
        let (_dir, config) = setup(RAW);
        let classifier = LanguageClassifier::new(Indonesian);

        let outcome = execute_run(&config, &classifier, true, &mut NoopObserver).unwrap();

        assert!(outcome.passed());
        assert_eq!(outcome.exported, None);

        let out = &config.output.dir;
        assert!(!out.join(CLEANED_DATA_FILE).exists());
        assert!(!out.join(CLEANING_LOG_FILE).exists());
        assert_eq!(saved_status(&out.join(VALIDATION_REPORT_FILE)), "PASS");
    }

    #[test]
    fn test_run_fails_on_missing_input() {
        let (dir, mut config) = setup(RAW);
        config.input.path = dir.path().join("missing.csv");
        let classifier = LanguageClassifier::new(Indonesian);

        assert!(execute_run(&config, &classifier, false, &mut NoopObserver).is_err());
        assert!(!config.output.validation_report().exists());
    }

    #[test]
    fn test_validate_fails_and_persists_report() {
        let (dir, config) = setup(RAW);
        let classifier = LanguageClassifier::new(Indonesian);
        let cleaned = dir.path().join("cleaned.jsonl");
        std::fs::write(
            &cleaned,
            "{\"id\":\"1\",\"text\":\"hi\",\"text_length\":2,\"detected_lang\":\"id\"}\n",
        )
        .unwrap();
        let report_path = dir.path().join("report.json");

        let report = execute_validate(&cleaned, &config, &classifier, &report_path).unwrap();

        assert!(report.is_none());
        assert_eq!(saved_status(&report_path), "FAIL");
    }

    #[test]
    fn test_validate_passes_clean_export() {
        let (_dir, config) = setup(RAW);
        let classifier = LanguageClassifier::new(Indonesian);
        execute_run(&config, &classifier, false, &mut NoopObserver).unwrap();

        let report_path = config.output.dir.join("revalidated.json");
        let report = execute_validate(
            &config.output.cleaned_data(),
            &config,
            &classifier,
            &report_path,
        )
        .unwrap();

        assert_eq!(report.map(|r| r.row_count()), Some(2));
        assert_eq!(saved_status(&report_path), "PASS");
    }

    #[test]
    fn test_validate_rejects_unparseable_input() {
        let (dir, config) = setup(RAW);
        let classifier = LanguageClassifier::new(Indonesian);
        let garbage = dir.path().join("garbage.jsonl");
        std::fs::write(&garbage, "not json at all\nstill not json\n").unwrap();
        let report_path = dir.path().join("report.json");

        assert!(execute_validate(&garbage, &config, &classifier, &report_path).is_err());
        assert!(!report_path.exists());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.yaml");

        init_config(&path, false).unwrap();
        assert_eq!(
            PipelineConfig::load(&path).unwrap(),
            PipelineConfig::default_indonesian()
        );

        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
    }
}
