//! Command-line interface for training, evaluation, prediction and serving.

use clap::{Parser, Subcommand};
use colored::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::artifacts::FsArtifactStore;
use crate::config::PipelineConfig;
use crate::inference::{FinancialRequest, IrisRequest, Predictor};
use crate::server::{run_server, ServerConfig};
use crate::training::{ClassificationReport, TrainEngine, TrainingSummary};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "finhealth")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Financial condition classifier: training, evaluation and serving")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory holding the persisted artifacts
    #[arg(long, global = true, env = "FINHEALTH_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit the encoder and financial model on the training CSV
    Train {
        /// Training data (CSV)
        #[arg(short, long, env = "FINHEALTH_DATA_PATH")]
        data: Option<PathBuf>,

        /// Fraction of rows held out for evaluation
        #[arg(long)]
        test_size: Option<f64>,

        /// Seed for the train/test shuffle
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Score the persisted financial model on the held-out split
    Evaluate {
        /// Labelled data (CSV)
        #[arg(short, long, env = "FINHEALTH_DATA_PATH")]
        data: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict financial condition for a JSON request (object or array)
    Predict {
        /// Request file; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Fit the Iris decision tree on the bundled dataset
    TrainIris,

    /// Classify one Iris flower
    PredictIris {
        sepal_length: f64,
        sepal_width: f64,
        petal_length: f64,
        petal_width: f64,
    },

    /// Start the HTTP prediction server
    Serve {
        /// Server port
        #[arg(short, long, env = "API_PORT", default_value = "8000")]
        port: u16,

        /// Server host
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,
    },
}

impl Cli {
    /// Pipeline configuration with command-line overrides applied
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        if let Some(dir) = &self.model_dir {
            config = config.with_model_dir(dir.clone());
        }
        config
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn print_report(report: &ClassificationReport) {
    println!();
    for line in report.to_string().lines() {
        println!("  {}", line);
    }
}

fn print_summary(summary: &TrainingSummary) {
    println!();
    kv("Model", &summary.model);
    kv("Rows", &format!("{} ({} train / {} test)", summary.n_rows, summary.train_rows, summary.test_rows));
    kv("Features", &summary.feature_columns.len().to_string());
    kv("Accuracy", &format!("{:.4}", summary.test_report.accuracy));
    kv("Time", &format!("{:.3}s", summary.training_time_secs));
}

pub fn cmd_train(
    mut config: PipelineConfig,
    data: Option<PathBuf>,
    test_size: Option<f64>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    if let Some(path) = data {
        config = config.with_data_path(path);
    }
    if let Some(t) = test_size {
        config = config.with_test_size(t);
    }
    if let Some(s) = seed {
        config = config.with_seed(s);
    }

    section("Train");
    step_run(&format!("Training on {}", config.data_path.display()));
    let start = Instant::now();
    let engine = TrainEngine::from_config(config);
    let summary = engine.train_financial_from_path()?;
    step_done(&format!("{:?}", start.elapsed()));

    print_summary(&summary);
    kv("Artifacts", &engine.config().model_dir.display().to_string());
    println!();
    Ok(())
}

pub fn cmd_evaluate(mut config: PipelineConfig, data: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    if let Some(path) = data {
        config = config.with_data_path(path);
    }

    let engine = TrainEngine::from_config(config);
    if json {
        let report = engine.evaluate_financial_from_path()?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    section("Evaluate");
    step_run("Scoring held-out split");
    let report = engine.evaluate_financial_from_path()?;
    step_done(&format!("{} rows", report.n_samples));
    print_report(&report);
    println!();
    Ok(())
}

fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Accepts a single request object or an array of them
pub fn parse_requests(text: &str) -> anyhow::Result<Vec<FinancialRequest>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let requests = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(requests)
}

pub fn cmd_predict(config: PipelineConfig, input: Option<PathBuf>) -> anyhow::Result<()> {
    let requests = parse_requests(&read_input(input.as_deref())?)?;
    let predictor = Predictor::new(std::sync::Arc::new(FsArtifactStore::new(config.model_dir)));
    let responses = predictor.predict_batch(&requests)?;

    let out = if responses.len() == 1 {
        serde_json::to_string_pretty(&responses[0])?
    } else {
        serde_json::to_string_pretty(&responses)?
    };
    println!("{}", out);
    Ok(())
}

pub fn cmd_train_iris(config: PipelineConfig) -> anyhow::Result<()> {
    section("Train Iris");
    step_run("Fitting decision tree");
    let start = Instant::now();
    let summary = TrainEngine::from_config(config).train_iris()?;
    step_done(&format!("{:?}", start.elapsed()));

    print_summary(&summary);
    print_report(&summary.test_report);
    println!();
    Ok(())
}

pub fn cmd_predict_iris(config: PipelineConfig, request: IrisRequest) -> anyhow::Result<()> {
    let predictor = Predictor::new(std::sync::Arc::new(FsArtifactStore::new(config.model_dir)));
    let response = predictor
        .predict_iris(&[request])?
        .pop()
        .ok_or_else(|| anyhow::anyhow!("model returned no prediction"))?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub async fn cmd_serve(config: PipelineConfig, host: String, port: u16) -> anyhow::Result<()> {
    section("Serve");
    kv("Address", &format!("http://{}:{}", host, port));
    kv("Artifacts", &config.model_dir.display().to_string());
    println!();

    run_server(ServerConfig {
        host,
        port,
        model_dir: config.model_dir,
    })
    .await
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.pipeline_config();
    match cli.command {
        Commands::Train { data, test_size, seed } => cmd_train(config, data, test_size, seed),
        Commands::Evaluate { data, json } => cmd_evaluate(config, data, json),
        Commands::Predict { input } => cmd_predict(config, input),
        Commands::TrainIris => cmd_train_iris(config),
        Commands::PredictIris {
            sepal_length,
            sepal_width,
            petal_length,
            petal_width,
        } => cmd_predict_iris(
            config,
            IrisRequest {
                sepal_length,
                sepal_width,
                petal_length,
                petal_width,
            },
        ),
        Commands::Serve { port, host } => cmd_serve(config, host, port).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["finhealth", "--model-dir", "/tmp/m", "train", "--seed", "7"]).unwrap();
        assert_eq!(cli.model_dir, Some(PathBuf::from("/tmp/m")));
        assert!(matches!(cli.command, Commands::Train { seed: Some(7), .. }));
        assert_eq!(cli.pipeline_config().model_dir, PathBuf::from("/tmp/m"));

        let cli = Cli::try_parse_from(["finhealth", "predict-iris", "5.1", "3.5", "1.4", "0.2"]).unwrap();
        assert!(matches!(cli.command, Commands::PredictIris { petal_width, .. } if petal_width == 0.2));
    }

    #[test]
    fn test_parse_requests_object_and_array() {
        let one = r#"{"age": 30, "gender": "Male", "education_level": "Bachelor",
            "employment_status": "Employed", "job_title": "Clerk",
            "monthly_income_usd": 3000.0, "monthly_expenses_usd": 1500.0,
            "savings_usd": 2000.0, "has_loan": "No", "loan_amount_usd": 0.0,
            "loan_term_months": 0, "monthly_emi_usd": 0.0,
            "loan_interest_rate_pct": 0.0, "region": "West"}"#;
        assert_eq!(parse_requests(one).unwrap().len(), 1);
        assert_eq!(parse_requests(&format!("[{one},{one}]")).unwrap().len(), 2);
        assert!(parse_requests("{}").is_err());
    }
}
