//! pointcast CLI: validate a model on a history table and rank the next period.
//!
//! Commands:
//! - `run`: cross-validate on past periods, score one period, print picks
//! - `config`: print the default pipeline config as TOML

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

use pointcast_core::schema::i64_values;
use pointcast_core::{synthetic_history, SyntheticConfig};
use pointcast_runner::{Pipeline, PipelineConfig, PipelineReport};

#[derive(Parser)]
#[command(
    name = "pointcast",
    about = "pointcast: leakage-safe per-period outcome forecasting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cross-validate on past periods, then score and rank one period.
    Run(RunArgs),
    /// Print the default pipeline config as TOML.
    Config,
}

#[derive(Args)]
struct RunArgs {
    /// History table as CSV with a header row.
    #[arg(long)]
    history: Option<PathBuf>,

    /// Use a generated history instead of --history.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Seed for --synthetic.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Path to a TOML pipeline config. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Period to score. Defaults to the last period in the history.
    #[arg(long)]
    period: Option<i64>,

    /// Picks per role.
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Rank picks by this column instead of the configured sort key,
    /// e.g. `derived_value_metric`.
    #[arg(long)]
    sort_by: Option<String>,

    /// Write the full report as JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_cmd(args),
        Commands::Config => {
            print!("{}", PipelineConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}

fn run_cmd(args: RunArgs) -> Result<()> {
    if args.history.is_some() && args.synthetic {
        bail!("--history and --synthetic are mutually exclusive");
    }

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(key) = args.sort_by {
        config.ranking.sort_key = key;
    }

    let history = match &args.history {
        Some(path) => read_history(path)?,
        None if args.synthetic => synthetic_history(
            &SyntheticConfig {
                seed: args.seed,
                ..Default::default()
            },
            &config.features,
        )?,
        None => bail!("one of --history or --synthetic is required"),
    };

    let score_period = match args.period {
        Some(p) => p,
        None => last_period(&history, &config.features.columns.period)?,
    };
    tracing::info!(rows = history.height(), score_period, "history loaded");

    let report = Pipeline::new(config)?
        .run(&history, score_period, args.top)
        .with_context(|| format!("pipeline run for period {score_period}"))?;

    print_summary(&report);

    if let Some(path) = args.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing report {}", path.display()))?;
        println!("Report saved to: {}", path.display());
    }
    Ok(())
}

fn read_history(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("reading CSV {}", path.display()))
}

fn last_period(history: &DataFrame, column: &str) -> Result<i64> {
    i64_values(history, column)?
        .into_iter()
        .max()
        .context("history is empty")
}

fn print_summary(report: &PipelineReport) {
    let cv = &report.validation;
    println!();
    println!("=== Validation ===");
    println!("Run:            {}", cv.run_id);
    println!("Config:         {}", report.config_fingerprint);
    println!("Regressor:      {}", cv.regressor);
    println!("Training rows:  {}", report.training_rows);
    println!("Features:       {}", cv.feature_columns.len());
    for fold in &cv.folds {
        println!(
            "Fold {}:         train ≤ {:>3}  validate ≥ {:>3}  MAE {:.3}  R² {:.3}",
            fold.fold_index + 1,
            fold.train_max_period,
            fold.validation_min_period,
            fold.mae,
            fold.r2
        );
    }
    println!("Mean MAE:       {:.3}", cv.mean_mae);
    println!("Mean R²:        {:.3}", cv.mean_r2);

    if !cv.feature_importance.is_empty() {
        println!();
        println!("--- Top features ---");
        for fi in cv.feature_importance.iter().take(10) {
            println!("{:<32} {:.4}", fi.feature, fi.importance);
        }
    }

    println!();
    println!(
        "=== Picks for period {} ({} rows scored) ===",
        report.score_period, report.scored_rows
    );
    for picks in &report.picks {
        println!();
        println!("--- {} ---", picks.role);
        println!("{}", picks.columns.join("  "));
        for row in &picks.rows {
            let cells: Vec<String> = row.iter().map(render_cell).collect();
            println!("{}", cells.join("  "));
        }
    }
}

fn render_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{f:.2}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
