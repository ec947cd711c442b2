use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use schema_survey_analysis::{
    DirectoryAnalyzer, OutputFormat, Progress, ReportSynthesizer, SurveyConfig, format_report,
    format_snapshot, write_output,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "schema-survey.yaml";

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
    Yaml,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Text => Self::Text,
            CliOutputFormat::Json => Self::Json,
            CliOutputFormat::Yaml => Self::Yaml,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "schema-survey")]
#[command(about = "Infer the effective schema of a directory of JSON documents")]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Survey every matching document under a directory and print a report.
    Analyze(AnalyzeArgs),
    /// Write the default configuration as YAML.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// Directory to scan recursively.
    directory: PathBuf,
    /// Glob matched against file names.
    #[arg(long, default_value = "*.json")]
    pattern: String,
    /// Report destination (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Report format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
    /// Also write the raw per-field statistics as JSON.
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Worker threads per batch (default: twice the CPU count).
    #[arg(long)]
    jobs: Option<usize>,
    /// Files per sequential batch.
    #[arg(long)]
    batch_size: Option<usize>,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Destination path.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::InitConfig(args) => run_init_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => SurveyConfig::load(path)
            .map_err(|e| format!("failed to load config '{}': {e}", path.display()))?,
        None => SurveyConfig::default(),
    };
    if let Some(jobs) = args.jobs {
        config.analysis.parallelism = Some(jobs);
    }
    if let Some(batch_size) = args.batch_size {
        config.analysis.batch_size = batch_size;
    }
    config.validate().map_err(|e| e.to_string())?;
    debug!(config = ?config, "Resolved configuration");

    let synthesizer = ReportSynthesizer::from_config(&config).map_err(|e| e.to_string())?;
    let analyzer = DirectoryAnalyzer::new(config.analysis.clone());
    let outcome = analyzer
        .analyze_with_progress(&args.directory, &args.pattern, &|progress: Progress| {
            eprintln!("  {}/{} files", progress.processed, progress.total);
        })
        .map_err(|e| e.to_string())?;

    let report = synthesizer.synthesize(&outcome.snapshot, &outcome.errors);
    let rendered = format_report(&report, args.format.into()).map_err(|e| e.to_string())?;
    match &args.output {
        Some(path) => {
            write_output(path, &rendered)
                .map_err(|e| format!("failed to write '{}': {e}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    if let Some(path) = &args.snapshot {
        let raw = format_snapshot(&outcome.snapshot, OutputFormat::Json)
            .map_err(|e| e.to_string())?;
        write_output(path, &raw)
            .map_err(|e| format!("failed to write '{}': {e}", path.display()))?;
        eprintln!("Snapshot written to {}", path.display());
    }

    eprintln!(
        "Analyzed {} of {} files ({} errors, {} fields) in {:.1}s",
        outcome.snapshot.total_files,
        outcome.files_discovered,
        outcome.errors.len(),
        outcome.snapshot.fields.len(),
        outcome.elapsed.as_secs_f64()
    );
    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create '{}': {e}", parent.display()))?;
    }
    SurveyConfig::default()
        .save(&args.output)
        .map_err(|e| format!("failed to write '{}': {e}", args.output.display()))?;
    eprintln!("Default configuration written to {}", args.output.display());
    Ok(())
}
