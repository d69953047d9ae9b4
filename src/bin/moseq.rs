//! moseq CLI - Command-line interface for moseq-stats
//!
//! Commands:
//! - process: Compute per-trial syllable statistics and write reports
//! - inspect: List the trials in a results file
//! - decode: Decode a trial key into its parts
//! - config: Print the default configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use moseq_stats::runs::group_run_lengths;
use moseq_stats::{
    write_reports, ComputeError, ExperimentProcessor, OutputFormat, StatsConfig, TrialName,
    PRODUCER_NAME, VERSION,
};

/// moseq - Syllable run-length statistics for MoSeq recordings
#[derive(Parser)]
#[command(name = "moseq")]
#[command(version = VERSION)]
#[command(about = "Compute per-trial syllable statistics from MoSeq results", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute statistics and write one report per experiment
    Process {
        /// Results file (.h5 / .hdf5 / .json)
        #[arg(short, long)]
        input: PathBuf,

        /// Directory the reports are written into
        #[arg(short, long)]
        output: PathBuf,

        /// Report format (overrides the config file)
        #[arg(long)]
        format: Option<FormatArg>,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Compute trials in parallel
        #[arg(long)]
        parallel: bool,

        /// Exit with an error when any trial fails
        #[arg(long)]
        strict: bool,
    },

    /// List the trials in a results file
    Inspect {
        /// Results file (.h5 / .hdf5 / .json)
        #[arg(short, long)]
        input: PathBuf,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a trial key into subject, experiment and trial number
    Decode {
        /// Trial key, e.g. ANM1-odor-trial-3DLC_resnet50
        key: String,
    },

    /// Print the default configuration as JSON
    Config,
}

#[derive(Clone, ValueEnum)]
enum FormatArg {
    /// xlsx workbook, one sheet per trial
    Xlsx,
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Xlsx => OutputFormat::Xlsx,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        "moseq_stats=debug,moseq=debug"
    } else {
        "moseq_stats=info,moseq=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), MoseqCliError> {
    match cli.command {
        Commands::Process {
            input,
            output,
            format,
            config,
            parallel,
            strict,
        } => cmd_process(&input, &output, format, config.as_deref(), parallel, strict),

        Commands::Inspect { input, config, json } => cmd_inspect(&input, config.as_deref(), json),

        Commands::Decode { key } => cmd_decode(&key),

        Commands::Config => {
            println!("{}", StatsConfig::default().to_json()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<StatsConfig, MoseqCliError> {
    match path {
        Some(path) => Ok(StatsConfig::from_file(path)?),
        None => Ok(StatsConfig::default()),
    }
}

fn cmd_process(
    input: &Path,
    output: &Path,
    format: Option<FormatArg>,
    config: Option<&Path>,
    parallel: bool,
    strict: bool,
) -> Result<(), MoseqCliError> {
    let mut config = load_config(config)?;
    if let Some(format) = format {
        config.output_format = format.into();
    }
    config.parallel |= parallel;

    // Fail on a missing output directory before reading any trials
    if !output.is_dir() {
        return Err(ComputeError::OutputDirNotFound(output.to_path_buf()).into());
    }

    let processor = ExperimentProcessor::new(config.clone());
    let reports = processor.process_file(input)?;
    if reports.is_empty() {
        return Err(MoseqCliError::NoTrials);
    }

    let summary = write_reports(&reports, output, &config)?;
    for path in &summary.written {
        println!("{}", path.display());
    }

    info!(
        experiments = reports.len(),
        skipped = summary.skipped.len(),
        failed_trials = summary.failed_trials,
        "finished processing"
    );

    if strict && summary.failed_trials > 0 {
        Err(MoseqCliError::TrialsFailed(summary.failed_trials))
    } else {
        Ok(())
    }
}

fn cmd_inspect(input: &Path, config: Option<&Path>, json: bool) -> Result<(), MoseqCliError> {
    let config = load_config(config)?;
    let processor = ExperimentProcessor::new(config);
    let trials = processor.load_trials(input)?;

    let entries: Vec<InspectEntry> = trials
        .iter()
        .map(|(key, record)| {
            let decoded = TrialName::parse(key);
            InspectEntry {
                key: key.clone(),
                subject: decoded.as_ref().ok().map(|n| n.subject.clone()),
                experiment: decoded.as_ref().ok().map(|n| n.experiment.clone()),
                trial_number: decoded.as_ref().ok().map(|n| n.trial_number),
                frames: record.num_frames(),
                syllables: group_run_lengths(&record.syllable).len(),
                decode_error: decoded.err().map(|e| e.to_string()),
            }
        })
        .collect();

    let report = InspectReport {
        producer: PRODUCER_NAME.to_string(),
        version: VERSION.to_string(),
        source: input.display().to_string(),
        trials: entries,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Trial File Report");
        println!("=================");
        println!("Source: {}", report.source);
        println!("Trials: {}", report.trials.len());
        println!();

        for entry in &report.trials {
            match (&entry.subject, &entry.experiment, entry.trial_number) {
                (Some(subject), Some(experiment), Some(number)) => println!(
                    "  {} -> {} / {} / trial {}: {} frames, {} syllables",
                    entry.key, subject, experiment, number, entry.frames, entry.syllables
                ),
                _ => println!(
                    "  {} [undecodable: {}]: {} frames, {} syllables",
                    entry.key,
                    entry.decode_error.as_deref().unwrap_or("unknown"),
                    entry.frames,
                    entry.syllables
                ),
            }
        }
    }

    Ok(())
}

fn cmd_decode(key: &str) -> Result<(), MoseqCliError> {
    let name = TrialName::parse(key)?;
    println!("{}", serde_json::to_string_pretty(&name)?);
    Ok(())
}

// Error types

#[derive(Debug)]
enum MoseqCliError {
    Compute(ComputeError),
    Json(serde_json::Error),
    NoTrials,
    TrialsFailed(usize),
}

impl From<ComputeError> for MoseqCliError {
    fn from(e: ComputeError) -> Self {
        MoseqCliError::Compute(e)
    }
}

impl From<serde_json::Error> for MoseqCliError {
    fn from(e: serde_json::Error) -> Self {
        MoseqCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MoseqCliError> for CliError {
    fn from(e: MoseqCliError) -> Self {
        match e {
            MoseqCliError::Compute(e) => {
                let (code, hint) = match &e {
                    ComputeError::FileNotFound(_) | ComputeError::OutputDirNotFound(_) => {
                        ("NOT_FOUND", "Check file paths and permissions")
                    }
                    ComputeError::TrialNameParse(_) => (
                        "PARSE_ERROR",
                        "Trial keys must look like {subject}-{experiment}-trial-{number}",
                    ),
                    ComputeError::InvalidInput(_) => ("INVALID_INPUT", "Check the trial contents"),
                    ComputeError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
                    _ => ("COMPUTE_ERROR", "Run 'moseq inspect' on the input for details"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            MoseqCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            MoseqCliError::NoTrials => CliError {
                code: "NO_TRIALS".to_string(),
                message: "No trials found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            MoseqCliError::TrialsFailed(count) => CliError {
                code: "TRIALS_FAILED".to_string(),
                message: format!("{} trials could not be processed", count),
                hint: Some("Reports for the other trials were written; see the log".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct InspectReport {
    producer: String,
    version: String,
    source: String,
    trials: Vec<InspectEntry>,
}

#[derive(serde::Serialize)]
struct InspectEntry {
    key: String,
    subject: Option<String>,
    experiment: Option<String>,
    trial_number: Option<u32>,
    frames: usize,
    syllables: usize,
    decode_error: Option<String>,
}
