//! CLI binary for assessrec.

use std::path::{Path, PathBuf};

use anyhow::Context;
use assessrec::config::AppConfig;
use assessrec::dataset::{self, PredictionRow};
use assessrec::{RecommendServer, startup};
use assessrec_core::eval;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Number of recommendations exported per test query.
const PREDICTIONS_PER_QUERY: usize = 10;

/// assessrec: assessment recommendations from job descriptions.
#[derive(Parser)]
#[command(name = "assessrec", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Catalog file, overriding `catalog.path`.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Start the HTTP service.
    Serve {
        /// Bind host, overriding `server.host`.
        #[arg(long)]
        host: Option<String>,
        /// Bind port, overriding `server.port`.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print recommendations for a single query.
    Recommend {
        /// Job description or hiring query.
        query: String,
        /// Number of results.
        #[arg(short = 'k', long, default_value_t = 10)]
        top_k: usize,
    },

    /// Normalize a raw catalog file.
    ProcessCatalog {
        /// Raw catalog JSON.
        input: PathBuf,
        /// Where to write the processed catalog.
        output: PathBuf,
    },

    /// Measure mean Recall@K on a labeled dataset.
    Evaluate {
        /// Labeled dataset (`.json` or spreadsheet).
        dataset: PathBuf,
        /// Worksheet holding the labeled rows.
        #[arg(long, default_value = "Train-Set")]
        sheet: String,
        /// Cutoff for Recall@K.
        #[arg(short, long, default_value_t = 10)]
        k: usize,
        /// Where to write the JSON report.
        #[arg(short, long, default_value = "evaluation_results.json")]
        output: PathBuf,
    },

    /// Write top recommendations for every test query as CSV.
    Predict {
        /// Test dataset (`.json` or spreadsheet).
        dataset: PathBuf,
        /// Worksheet holding the test queries.
        #[arg(long, default_value = "Test-Set")]
        sheet: String,
        /// Where to write the CSV.
        #[arg(short, long, default_value = "predictions.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("assessrec=info,assessrec_core=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(catalog) = cli.catalog {
        config.catalog.path = catalog;
    }

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_serve(config).await
        }
        Command::Recommend { query, top_k } => run_recommend(config, &query, top_k).await,
        Command::ProcessCatalog { input, output } => {
            let count = startup::process_catalog(&input, &output)?;
            println!("Processed {count} assessments into {}", output.display());
            Ok(())
        }
        Command::Evaluate {
            dataset,
            sheet,
            k,
            output,
        } => run_evaluate(config, &dataset, &sheet, k, &output).await,
        Command::Predict {
            dataset,
            sheet,
            output,
        } => run_predict(config, &dataset, &sheet, &output).await,
    }
}

/// Explicit file, else the default path if present, else defaults; then
/// environment overrides.
fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let default = AppConfig::default_config_path();
            if default.exists() {
                AppConfig::from_file(&default)
                    .with_context(|| format!("failed to load config {}", default.display()))?
            } else {
                AppConfig::default()
            }
        }
    };
    config.apply_env_overrides();
    Ok(config)
}

async fn run_serve(config: AppConfig) -> anyhow::Result<()> {
    println!("assessrec v{}", env!("CARGO_PKG_VERSION"));

    let recommender = startup::initialize(&config)?;
    let server = RecommendServer::start(recommender, &config.server).await?;
    println!("\nServing on http://{}. Press Ctrl+C to stop.\n", server.addr());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("received Ctrl+C, shutting down...");
    server.shutdown();
    Ok(())
}

async fn run_recommend(config: AppConfig, query: &str, top_k: usize) -> anyhow::Result<()> {
    anyhow::ensure!(!query.trim().is_empty(), "query must not be empty");
    anyhow::ensure!(top_k > 0, "--top-k must be greater than 0");

    let recommender = startup::initialize(&config)?;
    let categories = recommender.required_categories(query).await;
    let recommendations = recommender.recommend_with(query, top_k, &categories);

    println!("Categories: {categories}\n");
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{:>2}. [{}] {} ({:.3})\n    {}",
            rank + 1,
            rec.test_type,
            rec.assessment_name,
            rec.score,
            rec.assessment_url
        );
    }
    if recommendations.is_empty() {
        println!("No recommendations.");
    }
    Ok(())
}

async fn run_evaluate(
    config: AppConfig,
    dataset: &Path,
    sheet: &str,
    k: usize,
    output: &Path,
) -> anyhow::Result<()> {
    anyhow::ensure!(k > 0, "--k must be greater than 0");

    let labeled = dataset::load_labeled(dataset, Some(sheet))?;
    let recommender = startup::initialize(&config)?;
    println!("Evaluating {} queries...", labeled.len());

    let report = eval::evaluate(&*recommender, &labeled, k).await;

    for (i, result) in report.per_query_results.iter().enumerate() {
        println!(
            "Query {}: Recall@{k} {:.4} ({} relevant)",
            i + 1,
            result.recall,
            result.relevant.len()
        );
    }
    println!("\nMean Recall@{k}: {:.4}", report.mean_recall_at_k);

    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(output, json)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Report saved to {}", output.display());
    Ok(())
}

async fn run_predict(
    config: AppConfig,
    dataset: &Path,
    sheet: &str,
    output: &Path,
) -> anyhow::Result<()> {
    let queries = dataset::load_queries(dataset, Some(sheet))?;
    let recommender = startup::initialize(&config)?;

    let pb = ProgressBar::new(queries.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("  {msg} [{bar:30}] {pos}/{len}") {
        pb.set_style(style);
    }
    pb.set_message("Predicting");

    let mut rows = Vec::new();
    for query in &queries {
        let recommendations = recommender.recommend(query, PREDICTIONS_PER_QUERY).await;
        rows.extend(recommendations.into_iter().map(|rec| PredictionRow {
            query: query.clone(),
            assessment_url: rec.assessment_url,
        }));
        pb.inc(1);
    }
    pb.finish_and_clear();

    dataset::write_predictions(output, &rows)?;
    println!(
        "Predictions for {} queries ({} rows) saved to {}",
        queries.len(),
        rows.len(),
        output.display()
    );
    Ok(())
}
