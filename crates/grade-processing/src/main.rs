//! CLI entry point for the student performance preprocessing pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use grade_processing::{
    FittedTransformer, InferenceHandler, Pipeline, PipelineConfig, PipelineResult,
    TransformerArtifact,
};
use std::io::Read;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Student performance preprocessing pipeline",
    long_about = "Scales and one-hot encodes the student performance survey tables.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  SM_CHANNEL_TRAIN      Default input directory\n  \
                  SM_OUTPUT_DATA_DIR    Default output directory for train/test tables\n  \
                  SM_MODEL_DIR          Default directory for the fitted transformer\n\n\
                  EXAMPLES:\n  \
                  # Preprocess both course files\n  \
                  grade-processing preprocess -i data/student-mat.csv -i data/student-por.csv\n\n  \
                  # Transform one served request\n  \
                  grade-processing transform -a model/transformer.json < request.csv"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split, fit and transform the raw tables; write train/test and the transformer
    Preprocess(PreprocessArgs),
    /// Run one request body through the served adapter
    Transform(TransformArgs),
    /// Print the fitted state of a saved transformer
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct PreprocessArgs {
    /// Input files or directories (a directory contributes all its files)
    #[arg(short, long = "input", env = "SM_CHANNEL_TRAIN", value_delimiter = ',')]
    inputs: Vec<PathBuf>,

    /// Directory for the train and test tables
    #[arg(short, long, env = "SM_OUTPUT_DATA_DIR")]
    output_dir: Option<PathBuf>,

    /// Directory for the fitted transformer
    #[arg(short, long, env = "SM_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Label column carried through untransformed
    #[arg(short, long)]
    target: Option<String>,

    /// Fraction of rows held out for testing (0.0 - 1.0, exclusive)
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Seed for the row shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Keep input order; the last rows become the test partition
    #[arg(long)]
    no_shuffle: bool,

    /// Field separator of the input files
    #[arg(long)]
    separator: Option<char>,

    /// JSON configuration file; command-line options override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TransformArgs {
    /// Saved transformer artifact
    #[arg(short, long)]
    artifact: PathBuf,

    /// Request body file (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Media type of the request body
    #[arg(long, default_value = "text/csv")]
    content_type: String,

    /// Media type of the response body
    #[arg(long, default_value = "application/json")]
    accept: String,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Saved transformer artifact
    #[arg(short, long)]
    artifact: PathBuf,
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
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Load .env before parsing so it can supply argument defaults
    dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.quiet, cli.json);

    match &cli.command {
        Command::Preprocess(args) => run_preprocess(args, cli.json),
        Command::Transform(args) => run_transform(args, cli.json),
        Command::Inspect(args) => run_inspect(args),
    }
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &PreprocessArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(dir) = &args.model_dir {
        config.model_dir = dir.clone();
    }
    if let Some(target) = &args.target {
        config.target_column = target.clone();
    }
    if let Some(fraction) = args.test_fraction {
        config.test_fraction = fraction;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(separator) = args.separator {
        config.separator = separator;
    }
    if args.no_shuffle {
        config.shuffle = false;
    }

    config.validate()?;
    Ok(config)
}

fn run_preprocess(args: &PreprocessArgs, json: bool) -> Result<()> {
    let config = build_config(args)?;
    let quiet_progress = json;

    let pipeline = Pipeline::builder()
        .config(config)
        .on_progress(move |update| {
            if !quiet_progress {
                info!(
                    "[{:>3.0}%] {}: {}",
                    update.progress * 100.0,
                    update.stage.display_name(),
                    update.message
                );
            }
        })
        .build()?;

    info!("{}", "=".repeat(80));
    info!("Starting preprocessing pipeline...");
    info!("{}", "=".repeat(80));

    match pipeline.run(&args.inputs) {
        Ok(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_summary(&result);
            }
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            if json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            Err(anyhow!("Pipeline failed: {}", e))
        }
    }
}

fn run_transform(args: &TransformArgs, json: bool) -> Result<()> {
    let handler = InferenceHandler::load(&args.artifact)?;

    let body = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            body
        }
    };

    match handler.handle(&body, &args.content_type, &args.accept) {
        Ok(response) => {
            print!("{}", response.body);
            if !response.body.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        Err(e) => {
            if json {
                println!("{}", serde_json::to_string(&e)?);
            }
            let kind = if e.is_client_error() { "Rejected request" } else { "Request failed" };
            Err(anyhow!("{} [{}]: {}", kind, e.error_code(), e))
        }
    }
}

fn run_inspect(args: &InspectArgs) -> Result<()> {
    let artifact = TransformerArtifact::load(&args.artifact)?;
    info!(
        "Artifact v{} created {} with {} output features",
        artifact.format_version,
        artifact.created_at,
        artifact.transformer.n_features_out()
    );
    println!("{}", artifact.to_json()?);
    Ok(())
}

/// Print a human-readable run summary.
///
/// Uses `println!` intentionally: this is the command's output, not a log.
fn print_summary(result: &PipelineResult) {
    println!("\n{}", "=".repeat(80));
    println!("PREPROCESSING COMPLETE");
    println!("{}", "=".repeat(80));

    println!("\nSOURCES");
    println!("{}", "-".repeat(40));
    for source in &result.sources {
        println!("  {:<50} {:>6} rows", source.path, source.rows);
    }
    println!("  {:<50} {:>6} rows", "total", result.total_rows);

    println!("\nPARTITIONS");
    println!("{}", "-".repeat(40));
    println!("  Train: {:>6} rows -> {}", result.train_rows, result.train_path);
    println!("  Test:  {:>6} rows -> {}", result.test_rows, result.test_path);

    println!("\nFEATURES ({})", result.n_features());
    println!("{}", "-".repeat(40));
    for chunk in result.feature_names.chunks(4) {
        println!("  {}", chunk.join(", "));
    }

    println!("\nTransformer saved to {}", result.artifact_path);
    println!("Completed in {} ms", result.duration_ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        let command = Cli::command();
        command.clone().debug_assert();
        assert!(command.get_author().is_none());
    }
}
