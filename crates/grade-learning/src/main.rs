//! CLI entry point for the grade regressor.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use grade_learning::{
    GradeModel, Instances, LabelPosition, LinearGradeModel, Trainer, TrainerConfig,
    TrainingReport,
};
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Final-grade regression on preprocessed student features",
    long_about = "Fits an elastic net on the preprocessed train table and predicts grades.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  SM_MODEL_DIR    Default directory for the fitted model\n\n\
                  EXAMPLES:\n  \
                  grade-learning train --train out/data/train.csv --test out/data/test.csv\n  \
                  grade-learning predict --model out/model/model.json --input response.json"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Output JSON to stdout instead of a human-readable summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the regressor and save it
    Train(TrainArgs),
    /// Predict grades for a served JSON-instances payload
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Preprocessed training table
    #[arg(long)]
    train: PathBuf,

    /// Preprocessed test table to score against
    #[arg(long)]
    test: Option<PathBuf>,

    /// Directory for the fitted model
    #[arg(short, long, env = "SM_MODEL_DIR", default_value = "model")]
    model_dir: PathBuf,

    /// Label column
    #[arg(short, long, default_value = "G3")]
    target: String,

    /// Tables are header-less with the label first
    #[arg(long)]
    label_first: bool,

    /// Regularization strength
    #[arg(long, default_value_t = 0.1)]
    penalty: f64,

    /// Share of L1 in the penalty (0 = ridge, 1 = lasso)
    #[arg(long, default_value_t = 0.5)]
    l1_ratio: f64,

    /// Coordinate descent iteration cap
    #[arg(long, default_value_t = 1000)]
    max_iterations: u32,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Saved model file
    #[arg(short, long)]
    model: PathBuf,

    /// JSON instances file (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

fn init_logging(level: &str, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json);

    match &cli.command {
        Command::Train(args) => run_train(args, cli.json),
        Command::Predict(args) => run_predict(args),
    }
}

fn run_train(args: &TrainArgs, json: bool) -> Result<()> {
    let position = if args.label_first {
        LabelPosition::First
    } else {
        LabelPosition::Named
    };
    let config = TrainerConfig::builder()
        .target_column(&args.target)
        .label_position(position)
        .penalty(args.penalty)
        .l1_ratio(args.l1_ratio)
        .max_iterations(args.max_iterations)
        .build()?;

    let (_, report) = Trainer::new(config)
        .run(&args.train, args.test.as_deref(), &args.model_dir)
        .context("Training failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn run_predict(args: &PredictArgs) -> Result<()> {
    let model = LinearGradeModel::load(&args.model)?;

    let body = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            body
        }
    };

    let instances = Instances::from_json(&body)?;
    let features = instances.to_features(model.n_features())?;
    let predictions = model.predict(&features.view())?;
    info!("Predicted {} rows", predictions.len());

    println!(
        "{}",
        serde_json::to_string(&serde_json::json!({ "predictions": predictions.to_vec() }))?
    );
    Ok(())
}

fn print_report(report: &TrainingReport) {
    println!("\n{}", "=".repeat(60));
    println!("TRAINING COMPLETE");
    println!("{}", "=".repeat(60));
    println!("  Target:     {}", report.target_column);
    println!("  Features:   {}", report.n_features);
    println!("  Train rows: {}", report.train_rows);
    println!("  Intercept:  {:.4}", report.intercept);

    let rows = std::iter::once(("train", Some(&report.train_metrics)))
        .chain(std::iter::once(("test", report.test_metrics.as_ref())));
    for (name, metrics) in rows {
        let Some(m) = metrics else { continue };
        println!(
            "  {:<5} n={:<5} R2={:>7} RMSE={:>7} MAE={:>7}",
            name,
            m.n_samples,
            fmt_metric(m.r2),
            fmt_metric(m.rmse),
            fmt_metric(m.mae)
        );
    }

    println!("\nModel saved to {}", report.model_path);
    println!("Completed in {} ms", report.duration_ms);
}

fn fmt_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}
